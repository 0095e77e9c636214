mod annotate_cmd;
mod cli;
mod page_range;
mod shared;
mod tags_cmd;
mod tree_cmd;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Annotate {
            ref input,
            ref output,
            dpi,
            coords,
            format,
            ref pages,
            metrics_fallback,
        } => annotate_cmd::run(
            input,
            &annotate_cmd::AnnotateArgs {
                output: output.clone(),
                dpi,
                coords: coords.into(),
                format,
                pages: pages.clone(),
                metrics_fallback,
            },
        ),
        Commands::Tree { ref file } => tree_cmd::run(file),
        Commands::Tags {
            ref file,
            format,
            ref pages,
        } => tags_cmd::run(file, format, pages.as_deref()),
    };

    if let Err(code) = result {
        std::process::exit(code);
    }
}

/// Log to stderr. `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    let filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
