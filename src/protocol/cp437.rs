//! # Code Page 437 Encoding
//!
//! Converts Unicode strings to the single-byte PC437 table that ESC/POS
//! printers select after `ESC @`.
//!
//! - Printable ASCII and `\n` pass through unchanged.
//! - Tabs become spaces. Every other C0 control and DEL becomes `?`, so
//!   user text can never smuggle an escape sequence into the stream.
//! - The 128 upper-half code points map to bytes 0x80–0xFF.
//! - Common typographic characters with no PC437 glyph are transliterated
//!   (curly quotes, dashes, ellipsis, euro sign).
//! - Anything else is replaced with `?` and logged.

use std::borrow::Cow;

use tracing::warn;

/// PC437 upper half, indexed by `byte - 0x80`.
const UPPER_HALF: [char; 128] = [
    // 0x80
    'Ç', 'ü', 'é', 'â', 'ä', 'à', 'å', 'ç', 'ê', 'ë', 'è', 'ï', 'î', 'ì', 'Ä', 'Å',
    // 0x90
    'É', 'æ', 'Æ', 'ô', 'ö', 'ò', 'û', 'ù', 'ÿ', 'Ö', 'Ü', '¢', '£', '¥', '₧', 'ƒ',
    // 0xA0
    'á', 'í', 'ó', 'ú', 'ñ', 'Ñ', 'ª', 'º', '¿', '⌐', '¬', '½', '¼', '¡', '«', '»',
    // 0xB0
    '░', '▒', '▓', '│', '┤', '╡', '╢', '╖', '╕', '╣', '║', '╗', '╝', '╜', '╛', '┐',
    // 0xC0
    '└', '┴', '┬', '├', '─', '┼', '╞', '╟', '╚', '╔', '╩', '╦', '╠', '═', '╬', '╧',
    // 0xD0
    '╨', '╤', '╥', '╙', '╘', '╒', '╓', '╫', '╪', '┘', '┌', '█', '▄', '▌', '▐', '▀',
    // 0xE0
    'α', 'ß', 'Γ', 'π', 'Σ', 'σ', 'µ', 'τ', 'Φ', 'Θ', 'Ω', 'δ', '∞', 'φ', 'ε', '∩',
    // 0xF0
    '≡', '±', '≥', '≤', '⌠', '⌡', '÷', '≈', '°', '∙', '·', '√', 'ⁿ', '²', '■', '\u{00A0}',
];

/// Replacement byte for characters that cannot be represented.
pub const REPLACEMENT: u8 = b'?';

/// Encode a Unicode string as PC437 bytes.
///
/// ## Example
///
/// ```
/// use recibo::protocol::cp437;
///
/// assert_eq!(cp437::encode("Café"), vec![0x43, 0x61, 0x66, 0x82]);
/// assert_eq!(cp437::encode("“ok”"), b"\"ok\"".to_vec());
/// ```
pub fn encode(s: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(s.len());
    for ch in s.chars() {
        let ch = neutralize_control(ch);
        if ch.is_ascii() {
            out.push(ch as u8);
        } else if let Some(byte) = to_byte(ch) {
            out.push(byte);
        } else if let Some(ascii) = transliterate(ch) {
            out.extend_from_slice(ascii.as_bytes());
        } else {
            warn!(
                "cp437: unmapped character '{}' (U+{:04X}), replacing with '?'",
                ch, ch as u32
            );
            out.push(REPLACEMENT);
        }
    }
    out
}

/// Replace control characters in text that is sent without transcoding.
///
/// Same rules as [`encode`]: `\n` is kept, `\t` becomes a space and every
/// other C0 control or DEL becomes `?`.
///
/// ```
/// use recibo::protocol::cp437;
///
/// assert_eq!(cp437::strip_controls("a\tb\x1B@"), "a b?@");
/// assert_eq!(cp437::strip_controls("ok\n"), "ok\n");
/// ```
pub fn strip_controls(s: &str) -> Cow<'_, str> {
    if s.chars().any(|ch| ch != '\n' && ch.is_ascii_control()) {
        Cow::Owned(s.chars().map(neutralize_control).collect())
    } else {
        Cow::Borrowed(s)
    }
}

fn neutralize_control(ch: char) -> char {
    match ch {
        '\n' => ch,
        '\t' => ' ',
        c if c.is_ascii_control() => {
            warn!("control character U+{:04X} in text, replacing with '?'", c as u32);
            REPLACEMENT as char
        }
        c => c,
    }
}

/// Decode a single PC437 byte back to the glyph the printer shows.
pub fn decode_byte(byte: u8) -> char {
    if byte < 0x80 {
        byte as char
    } else {
        UPPER_HALF[(byte - 0x80) as usize]
    }
}

/// What the printer will actually show for `s`: unmappable characters
/// become `?` and transliterations are expanded.
pub fn printable(s: &str) -> String {
    encode(s).into_iter().map(decode_byte).collect()
}

fn to_byte(ch: char) -> Option<u8> {
    UPPER_HALF
        .iter()
        .position(|&c| c == ch)
        .map(|index| 0x80 + index as u8)
}

/// ASCII stand-ins for punctuation that word processors and AI output
/// produce but PC437 lacks.
fn transliterate(ch: char) -> Option<&'static str> {
    let ascii = match ch {
        '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{2032}' => "'",
        '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{2033}' => "\"",
        '\u{2010}' | '\u{2011}' | '\u{2012}' | '\u{2013}' | '\u{2014}' | '\u{2015}' => "-",
        '\u{2026}' => "...",
        '\u{2022}' => "*",
        '\u{20AC}' => "EUR",
        '\u{00D7}' => "x",
        '\u{2122}' => "TM",
        '\u{00A9}' => "(c)",
        '\u{00AE}' => "(R)",
        '\u{2009}' | '\u{200A}' | '\u{202F}' | '\u{2002}' | '\u{2003}' => " ",
        '\u{200B}' | '\u{FEFF}' => "",
        _ => return None,
    };
    Some(ascii)
}
