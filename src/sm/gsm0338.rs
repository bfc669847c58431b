// ABOUTME: GSM 03.38 default alphabet translation between Rust strings and
// ABOUTME: septet values, including the escape-prefixed extension table

use thiserror::Error;

/// Escape septet selecting the extension table.
pub const ESCAPE: u8 = 0x1B;

#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum Gsm0338Error {
    #[error("character {0:?} is outside the GSM 03.38 alphabet")]
    UnencodableChar(char),
    #[error("byte {0:#04x} is not a GSM 03.38 septet")]
    InvalidSeptet(u8),
}

// Septet -> character for the default alphabet. Index 0x1B is the escape to
// the extension table and never resolves through this array; the replacement
// character marks the slot.
const DEFAULT_ALPHABET: [char; 128] = [
    '@', '£', '$', '¥', 'è', 'é', 'ù', 'ì', 'ò', 'Ç', '\n', 'Ø', 'ø', '\r', 'Å', 'å', //
    'Δ', '_', 'Φ', 'Γ', 'Λ', 'Ω', 'Π', 'Ψ', 'Σ', 'Θ', 'Ξ', '\u{FFFD}', 'Æ', 'æ', 'ß', 'É', //
    ' ', '!', '"', '#', '¤', '%', '&', '\'', '(', ')', '*', '+', ',', '-', '.', '/', //
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', ':', ';', '<', '=', '>', '?', //
    '¡', 'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', //
    'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z', 'Ä', 'Ö', 'Ñ', 'Ü', '§', //
    '¿', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o', //
    'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z', 'ä', 'ö', 'ñ', 'ü', 'à', //
];

fn to_default(c: char) -> Option<u8> {
    DEFAULT_ALPHABET
        .iter()
        .position(|&g| g == c)
        .filter(|&i| i != ESCAPE as usize)
        .map(|i| i as u8)
}

fn to_extension(c: char) -> Option<u8> {
    Some(match c {
        '\u{000C}' => 0x0A, // form feed
        '^' => 0x14,
        '{' => 0x28,
        '}' => 0x29,
        '\\' => 0x2F,
        '[' => 0x3C,
        '~' => 0x3D,
        ']' => 0x3E,
        '|' => 0x40,
        '€' => 0x65,
        _ => return None,
    })
}

fn from_extension(septet: u8) -> char {
    match septet {
        0x0A => '\u{000C}',
        0x14 => '^',
        0x28 => '{',
        0x29 => '}',
        0x2F => '\\',
        0x3C => '[',
        0x3D => '~',
        0x3E => ']',
        0x40 => '|',
        0x65 => '€',
        // an unassigned extension code displays as non-breaking space
        _ => '\u{00A0}',
    }
}

/// Number of septets `c` occupies, or `None` when it cannot be encoded.
/// Extension-table characters cost two: the escape plus the code.
pub fn septet_len(c: char) -> Option<usize> {
    if to_default(c).is_some() {
        Some(1)
    } else if to_extension(c).is_some() {
        Some(2)
    } else {
        None
    }
}

/// Encode text to GSM 03.38 septet values (one per output byte, unpacked).
pub fn encode(text: &str) -> Result<Vec<u8>, Gsm0338Error> {
    let mut out = Vec::with_capacity(text.len());
    for c in text.chars() {
        if let Some(septet) = to_default(c) {
            out.push(septet);
        } else if let Some(septet) = to_extension(c) {
            out.push(ESCAPE);
            out.push(septet);
        } else {
            return Err(Gsm0338Error::UnencodableChar(c));
        }
    }
    Ok(out)
}

/// Decode GSM 03.38 septet values back to text.
///
/// A dangling escape at the end of input decodes as U+00A0, matching the
/// display behavior most handsets implement.
pub fn decode(data: &[u8]) -> Result<String, Gsm0338Error> {
    let mut out = String::with_capacity(data.len());
    let mut iter = data.iter();
    while let Some(&septet) = iter.next() {
        if septet > 0x7F {
            return Err(Gsm0338Error::InvalidSeptet(septet));
        }
        if septet == ESCAPE {
            match iter.next() {
                Some(&next) if next <= 0x7F => out.push(from_extension(next)),
                Some(&next) => return Err(Gsm0338Error::InvalidSeptet(next)),
                None => out.push('\u{00A0}'),
            }
        } else {
            out.push(DEFAULT_ALPHABET[septet as usize]);
        }
    }
    Ok(out)
}

/// True when every character of `text` has a GSM 03.38 encoding.
pub fn is_representable(text: &str) -> bool {
    text.chars().all(|c| septet_len(c).is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_alphanumeric() {
        assert_eq!(encode("Abc1234").unwrap(), b"Abc1234");
    }

    #[test]
    fn encode_special_chars() {
        assert_eq!(encode("ü and € is à").unwrap(), b"~ and \x1be is \x7f");
    }

    #[test]
    fn encode_escaped() {
        assert_eq!(
            encode("{ brackets text }").unwrap(),
            b"\x1b( brackets text \x1b)"
        );
    }

    #[test]
    fn decode_alphanumeric() {
        assert_eq!(decode(b"Abc1234").unwrap(), "Abc1234");
    }

    #[test]
    fn decode_special_chars() {
        assert_eq!(decode(b"~ and \x1be is \x7f").unwrap(), "ü and € is à");
    }

    #[test]
    fn decode_escaped() {
        assert_eq!(decode(b"\x1b( brackets text \x1b)").unwrap(), "{ brackets text }");
    }

    #[test]
    fn unencodable_char() {
        assert_eq!(
            encode("可"),
            Err(Gsm0338Error::UnencodableChar('可'))
        );
        assert!(!is_representable("英文"));
        assert!(is_representable("Ça märche @ 100%"));
    }

    #[test]
    fn decode_rejects_high_bytes() {
        assert_eq!(decode(b"\x80"), Err(Gsm0338Error::InvalidSeptet(0x80)));
    }

    #[test]
    fn dangling_escape_decodes_as_nbsp() {
        assert_eq!(decode(b"a\x1b").unwrap(), "a\u{00A0}");
        assert_eq!(decode(b"\x1b\x01").unwrap(), "\u{00A0}");
    }

    #[test]
    fn septet_costs() {
        assert_eq!(septet_len('A'), Some(1));
        assert_eq!(septet_len('€'), Some(2));
        assert_eq!(septet_len('可'), None);
    }
}
