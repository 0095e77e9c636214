//! Simple-font encodings: character code to glyph name.
//!
//! Covers StandardEncoding, WinAnsiEncoding and MacRomanEncoding plus
//! `/Differences` overrides, and a best-effort glyph name to Unicode
//! mapping used when a font has no ToUnicode CMap.

use std::collections::HashMap;

/// A predefined base encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseEncoding {
    Standard,
    WinAnsi,
    MacRoman,
}

impl BaseEncoding {
    /// Parse an `/Encoding` or `/BaseEncoding` name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "StandardEncoding" => Some(Self::Standard),
            "WinAnsiEncoding" => Some(Self::WinAnsi),
            "MacRomanEncoding" => Some(Self::MacRoman),
            _ => None,
        }
    }

    /// Glyph name for `code`, or `None` where the encoding leaves it unset.
    pub fn glyph_name(self, code: u8) -> Option<&'static str> {
        match code {
            39 if self == Self::Standard => Some("quoteright"),
            96 if self == Self::Standard => Some("quoteleft"),
            32..=126 => Some(ASCII_NAMES[usize::from(code - 32)]),
            127..=255 => match self {
                Self::Standard => STANDARD_HIGH
                    .iter()
                    .find(|(c, _)| *c == code)
                    .map(|(_, name)| *name),
                Self::WinAnsi => match code {
                    128..=159 => WIN_ANSI_C1[usize::from(code - 128)],
                    160 => Some("space"),
                    161..=255 => Some(LATIN1_HIGH[usize::from(code - 161)]),
                    _ => None,
                },
                Self::MacRoman => match code {
                    128..=255 => Some(MAC_ROMAN_HIGH[usize::from(code - 128)]),
                    _ => None,
                },
            },
            _ => None,
        }
    }
}

/// The encoding of a simple font: a base encoding plus `/Differences`.
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleEncoding {
    base: Option<BaseEncoding>,
    differences: HashMap<u8, String>,
}

impl SimpleEncoding {
    pub fn new(base: Option<BaseEncoding>) -> Self {
        Self {
            base,
            differences: HashMap::new(),
        }
    }

    /// Override the glyph name of `code`.
    pub fn set(&mut self, code: u8, name: impl Into<String>) {
        self.differences.insert(code, name.into());
    }

    /// Apply a `/Differences` array given as a flat list of numbers and
    /// names: each number starts a run of consecutive codes.
    pub fn apply_differences<'a>(&mut self, entries: impl IntoIterator<Item = DifferencesEntry<'a>>) {
        let mut code: u32 = 0;
        for entry in entries {
            match entry {
                DifferencesEntry::Code(c) => code = c,
                DifferencesEntry::Name(name) => {
                    if let Ok(c) = u8::try_from(code) {
                        self.set(c, name);
                    }
                    code += 1;
                }
            }
        }
    }

    pub fn glyph_name(&self, code: u8) -> Option<&str> {
        self.differences
            .get(&code)
            .map(String::as_str)
            .or_else(|| self.base.and_then(|b| b.glyph_name(code)))
    }
}

/// One element of a `/Differences` array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DifferencesEntry<'a> {
    Code(u32),
    Name(&'a str),
}

/// Best-effort Unicode text for a glyph name.
///
/// Knows the names of the three base encodings, `uniXXXX` and `uXXXX[XX]`.
pub fn glyph_name_to_unicode(name: &str) -> Option<char> {
    if let Some(i) = ASCII_NAMES.iter().position(|n| *n == name) {
        return char::from_u32(32 + i as u32);
    }
    if name == "quoteright" {
        return Some('\u{2019}');
    }
    if name == "quoteleft" {
        return Some('\u{2018}');
    }
    if let Some(i) = LATIN1_HIGH.iter().position(|n| *n == name) {
        return char::from_u32(161 + i as u32);
    }
    if let Some(&(_, c)) = EXTRA_UNICODE.iter().find(|(n, _)| *n == name) {
        return Some(c);
    }
    let hex = name
        .strip_prefix("uni")
        .filter(|h| h.len() == 4)
        .or_else(|| name.strip_prefix('u').filter(|h| (4..=6).contains(&h.len())))?;
    u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
}

/// Codes 32..=126, shared by all three encodings except for 39 and 96 in
/// StandardEncoding.
static ASCII_NAMES: [&str; 95] = [
    "space", "exclam", "quotedbl", "numbersign", "dollar", "percent", "ampersand", "quotesingle",
    "parenleft", "parenright", "asterisk", "plus", "comma", "hyphen", "period", "slash", "zero",
    "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "colon", "semicolon",
    "less", "equal", "greater", "question", "at", "A", "B", "C", "D", "E", "F", "G", "H", "I", "J",
    "K", "L", "M", "N", "O", "P", "Q", "R", "S", "T", "U", "V", "W", "X", "Y", "Z", "bracketleft",
    "backslash", "bracketright", "asciicircum", "underscore", "grave", "a", "b", "c", "d", "e",
    "f", "g", "h", "i", "j", "k", "l", "m", "n", "o", "p", "q", "r", "s", "t", "u", "v", "w", "x",
    "y", "z", "braceleft", "bar", "braceright", "asciitilde",
];

/// WinAnsiEncoding 128..=159.
static WIN_ANSI_C1: [Option<&str>; 32] = [
    Some("Euro"),
    None,
    Some("quotesinglbase"),
    Some("florin"),
    Some("quotedblbase"),
    Some("ellipsis"),
    Some("dagger"),
    Some("daggerdbl"),
    Some("circumflex"),
    Some("perthousand"),
    Some("Scaron"),
    Some("guilsinglleft"),
    Some("OE"),
    None,
    Some("Zcaron"),
    None,
    None,
    Some("quoteleft"),
    Some("quoteright"),
    Some("quotedblleft"),
    Some("quotedblright"),
    Some("bullet"),
    Some("endash"),
    Some("emdash"),
    Some("tilde"),
    Some("trademark"),
    Some("scaron"),
    Some("guilsinglright"),
    Some("oe"),
    None,
    Some("zcaron"),
    Some("Ydieresis"),
];

/// ISO Latin-1 names for 161..=255 (WinAnsiEncoding upper half).
static LATIN1_HIGH: [&str; 95] = [
    "exclamdown", "cent", "sterling", "currency", "yen", "brokenbar", "section", "dieresis",
    "copyright", "ordfeminine", "guillemotleft", "logicalnot", "hyphen", "registered", "macron",
    "degree", "plusminus", "twosuperior", "threesuperior", "acute", "mu", "paragraph",
    "periodcentered", "cedilla", "onesuperior", "ordmasculine", "guillemotright", "onequarter",
    "onehalf", "threequarters", "questiondown", "Agrave", "Aacute", "Acircumflex", "Atilde",
    "Adieresis", "Aring", "AE", "Ccedilla", "Egrave", "Eacute", "Ecircumflex", "Edieresis",
    "Igrave", "Iacute", "Icircumflex", "Idieresis", "Eth", "Ntilde", "Ograve", "Oacute",
    "Ocircumflex", "Otilde", "Odieresis", "multiply", "Oslash", "Ugrave", "Uacute", "Ucircumflex",
    "Udieresis", "Yacute", "Thorn", "germandbls", "agrave", "aacute", "acircumflex", "atilde",
    "adieresis", "aring", "ae", "ccedilla", "egrave", "eacute", "ecircumflex", "edieresis",
    "igrave", "iacute", "icircumflex", "idieresis", "eth", "ntilde", "ograve", "oacute",
    "ocircumflex", "otilde", "odieresis", "divide", "oslash", "ugrave", "uacute", "ucircumflex",
    "udieresis", "yacute", "thorn", "ydieresis",
];

/// StandardEncoding above 127 (sparse).
static STANDARD_HIGH: [(u8, &str); 54] = [
    (161, "exclamdown"),
    (162, "cent"),
    (163, "sterling"),
    (164, "fraction"),
    (165, "yen"),
    (166, "florin"),
    (167, "section"),
    (168, "currency"),
    (169, "quotesingle"),
    (170, "quotedblleft"),
    (171, "guillemotleft"),
    (172, "guilsinglleft"),
    (173, "guilsinglright"),
    (174, "fi"),
    (175, "fl"),
    (177, "endash"),
    (178, "dagger"),
    (179, "daggerdbl"),
    (180, "periodcentered"),
    (182, "paragraph"),
    (183, "bullet"),
    (184, "quotesinglbase"),
    (185, "quotedblbase"),
    (186, "quotedblright"),
    (187, "guillemotright"),
    (188, "ellipsis"),
    (189, "perthousand"),
    (191, "questiondown"),
    (193, "grave"),
    (194, "acute"),
    (195, "circumflex"),
    (196, "tilde"),
    (197, "macron"),
    (198, "breve"),
    (199, "dotaccent"),
    (200, "dieresis"),
    (202, "ring"),
    (203, "cedilla"),
    (205, "hungarumlaut"),
    (206, "ogonek"),
    (207, "caron"),
    (208, "emdash"),
    (225, "AE"),
    (227, "ordfeminine"),
    (232, "Lslash"),
    (233, "Oslash"),
    (234, "OE"),
    (235, "ordmasculine"),
    (241, "ae"),
    (245, "dotlessi"),
    (248, "lslash"),
    (249, "oslash"),
    (250, "oe"),
    (251, "germandbls"),
];

/// MacRomanEncoding 128..=255.
static MAC_ROMAN_HIGH: [&str; 128] = [
    "Adieresis", "Aring", "Ccedilla", "Eacute", "Ntilde", "Odieresis", "Udieresis", "aacute",
    "agrave", "acircumflex", "adieresis", "atilde", "aring", "ccedilla", "eacute", "egrave",
    "ecircumflex", "edieresis", "iacute", "igrave", "icircumflex", "idieresis", "ntilde",
    "oacute", "ograve", "ocircumflex", "odieresis", "otilde", "uacute", "ugrave", "ucircumflex",
    "udieresis", "dagger", "degree", "cent", "sterling", "section", "bullet", "paragraph",
    "germandbls", "registered", "copyright", "trademark", "acute", "dieresis", "notequal", "AE",
    "Oslash", "infinity", "plusminus", "lessequal", "greaterequal", "yen", "mu", "partialdiff",
    "summation", "product", "pi", "integral", "ordfeminine", "ordmasculine", "Omega", "ae",
    "oslash", "questiondown", "exclamdown", "logicalnot", "radical", "florin", "approxequal",
    "Delta", "guillemotleft", "guillemotright", "ellipsis", "space", "Agrave", "Atilde", "Otilde",
    "OE", "oe", "endash", "emdash", "quotedblleft", "quotedblright", "quoteleft", "quoteright",
    "divide", "lozenge", "ydieresis", "Ydieresis", "fraction", "currency", "guilsinglleft",
    "guilsinglright", "fi", "fl", "daggerdbl", "periodcentered", "quotesinglbase", "quotedblbase",
    "perthousand", "Acircumflex", "Ecircumflex", "Aacute", "Edieresis", "Egrave", "Iacute",
    "Icircumflex", "Idieresis", "Igrave", "Oacute", "Ocircumflex", "apple", "Ograve", "Uacute",
    "Ucircumflex", "Ugrave", "dotlessi", "circumflex", "tilde", "macron", "breve", "dotaccent",
    "ring", "cedilla", "hungarumlaut", "ogonek", "caron",
];

/// Names outside ASCII and Latin-1 that the base encodings use.
static EXTRA_UNICODE: [(&str, char); 27] = [
    ("Euro", '\u{20AC}'),
    ("quotesinglbase", '\u{201A}'),
    ("florin", '\u{0192}'),
    ("quotedblbase", '\u{201E}'),
    ("ellipsis", '\u{2026}'),
    ("dagger", '\u{2020}'),
    ("daggerdbl", '\u{2021}'),
    ("circumflex", '\u{02C6}'),
    ("perthousand", '\u{2030}'),
    ("Scaron", '\u{0160}'),
    ("guilsinglleft", '\u{2039}'),
    ("OE", '\u{0152}'),
    ("Zcaron", '\u{017D}'),
    ("quotedblleft", '\u{201C}'),
    ("quotedblright", '\u{201D}'),
    ("bullet", '\u{2022}'),
    ("endash", '\u{2013}'),
    ("emdash", '\u{2014}'),
    ("tilde", '\u{02DC}'),
    ("trademark", '\u{2122}'),
    ("scaron", '\u{0161}'),
    ("guilsinglright", '\u{203A}'),
    ("oe", '\u{0153}'),
    ("zcaron", '\u{017E}'),
    ("Ydieresis", '\u{0178}'),
    ("fi", '\u{FB01}'),
    ("fl", '\u{FB02}'),
];
