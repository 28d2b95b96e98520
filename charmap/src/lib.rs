//! Shared bijection between byte codes and display glyphs, consumed by
//! character literals in the compiler and by the VM's text buffer.
//!
//! Code 0 is the empty string and code 1 is a single space; the remaining
//! codes cover punctuation, Latin letters, Cyrillic letters, digits and
//! symbols (see DESIGN.md for where this table is grounded). The reverse
//! map is intentionally partial: a glyph that never appears in the table
//! has no code and is rejected by `glyph_to_code`.

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CharMapError {
    #[error("'{0}' is not a glyph in CHAR_MAP")]
    UnknownGlyph(String),
}

/// Index 0 is the empty string, index 1 is a space; everything after that
/// is punctuation, Latin letters, Cyrillic letters, digits, then symbols.
pub const CHAR_MAP: [&str; 86] = [
    "", " ", ":", "!", "?", "*", "-", "+", "/", ",", ".", "A", "B", "C", "D", "E", "F", "G", "H",
    "I", "J", "K", "L", "M", "N", "O", "P", "Q", "R", "S", "T", "U", "V", "W", "X", "Y", "Z", "Б",
    "Г", "Д", "Ж", "З", "И", "Л", "П", "Ф", "Ц", "Ч", "Ш", "Щ", "Ъ", "Ы", "Ь", "Э", "Ю", "Я", "0",
    "1", "2", "3", "4", "5", "6", "7", "8", "9", "=", "(", ")", "_", "&", "@", "%", "$", "~", "|",
    "<", ">", ";", "✡", "^", "#", "[", "]", "{", "}",
];

/// Decodes a byte code to its glyph. Codes past the end of the table (there
/// is room for up to 256, only 86 are assigned) decode to the empty string,
/// the same as code 0 — there's nothing else sensible to render for a code
/// the table never defined.
pub fn code_to_glyph(code: u8) -> &'static str {
    CHAR_MAP.get(code as usize).copied().unwrap_or("")
}

/// Encodes a single glyph back to its byte code. `None` for codes 0/1 is
/// impossible (empty string and space are always present); any other glyph
/// absent from the table is rejected by the caller via `CharMapError`.
pub fn glyph_to_code(glyph: &str) -> Result<u8, CharMapError> {
    CHAR_MAP
        .iter()
        .position(|&g| g == glyph)
        .map(|i| i as u8)
        .ok_or_else(|| CharMapError::UnknownGlyph(glyph.to_string()))
}

/// Decodes the 16-byte text buffer into the string the console would show.
pub fn decode_text_buffer(buf: &[u8; 16]) -> String {
    buf.iter().map(|&b| code_to_glyph(b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_zero_is_empty_and_one_is_space() {
        assert_eq!(code_to_glyph(0), "");
        assert_eq!(code_to_glyph(1), " ");
    }

    #[test]
    fn every_table_glyph_round_trips() {
        for (code, glyph) in CHAR_MAP.iter().enumerate() {
            if code == 0 {
                // the empty string isn't a meaningful character literal
                continue;
            }
            assert_eq!(glyph_to_code(glyph).unwrap(), code as u8);
        }
    }

    #[test]
    fn unknown_glyph_is_rejected() {
        assert_eq!(glyph_to_code("\\"), Err(CharMapError::UnknownGlyph("\\".to_string())));
    }

    #[test]
    fn codes_past_the_table_decode_empty() {
        assert_eq!(code_to_glyph(200), "");
    }
}
