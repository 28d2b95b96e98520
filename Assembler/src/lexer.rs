/*
Copyright 2025 Connor Nolan

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

//! Line-oriented tokenizing helpers. The assembly language has no nested
//! structure, so a hand-written scan is simpler and safer here than pulling
//! in a grammar engine for three comment styles and five number formats.

/// Strips whichever of `;`, `#`, `//` comes first, and everything after it.
pub fn strip_comment(line: &str) -> &str {
    let mut cut = line.len();
    if let Some(i) = line.find(';') {
        cut = cut.min(i);
    }
    if let Some(i) = line.find('#') {
        cut = cut.min(i);
    }
    if let Some(i) = line.find("//") {
        cut = cut.min(i);
    }
    &line[..cut]
}

/// Splits a leading `label:` off the front of a line, if present.
pub fn split_label(line: &str) -> (Option<&str>, &str) {
    let trimmed = line.trim_start();
    if let Some(colon) = trimmed.find(':') {
        let candidate = &trimmed[..colon];
        if !candidate.is_empty() && candidate.chars().all(is_ident_char) {
            return (Some(candidate), trimmed[colon + 1..].trim_start());
        }
    }
    (None, trimmed)
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Splits operand tokens on commas and/or whitespace, dropping empties.
pub fn split_operands(rest: &str) -> Vec<String> {
    rest.split(|c: char| c == ',' || c.is_whitespace())
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
        .collect()
}

/// Parses a number literal: `0xNN`, `NNh`, `0bNN`, `NNb`, or decimal, with
/// an optional leading sign.
pub fn parse_number(token: &str) -> Option<i64> {
    let (sign, body) = match token.strip_prefix('-') {
        Some(rest) => (-1i64, rest),
        None => (1i64, token.strip_prefix('+').unwrap_or(token)),
    };
    if body.is_empty() {
        return None;
    }
    let value = if let Some(hex) = body.strip_prefix("0x").or_else(|| body.strip_prefix("0X")) {
        i64::from_str_radix(hex, 16).ok()?
    } else if let Some(hex) = body.strip_suffix('h').or_else(|| body.strip_suffix('H')) {
        i64::from_str_radix(hex, 16).ok()?
    } else if let Some(bin) = body.strip_prefix("0b").or_else(|| body.strip_prefix("0B")) {
        i64::from_str_radix(bin, 2).ok()?
    } else if let Some(bin) = body.strip_suffix('b').or_else(|| body.strip_suffix('B')) {
        i64::from_str_radix(bin, 2).ok()?
    } else {
        body.parse::<i64>().ok()?
    };
    Some(sign * value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_all_three_comment_styles() {
        assert_eq!(strip_comment("LDI A, 1 ; trailing"), "LDI A, 1 ");
        assert_eq!(strip_comment("LDI A, 1 # trailing"), "LDI A, 1 ");
        assert_eq!(strip_comment("LDI A, 1 // trailing"), "LDI A, 1 ");
    }

    #[test]
    fn parses_every_number_format() {
        assert_eq!(parse_number("0x1F"), Some(31));
        assert_eq!(parse_number("1Fh"), Some(31));
        assert_eq!(parse_number("0b101"), Some(5));
        assert_eq!(parse_number("101b"), Some(5));
        assert_eq!(parse_number("-5"), Some(-5));
        assert_eq!(parse_number("42"), Some(42));
    }

    #[test]
    fn splits_label_from_statement() {
        assert_eq!(split_label("LOOP: DEC A"), (Some("LOOP"), "DEC A"));
        assert_eq!(split_label("  DEC A"), (None, "DEC A"));
    }
}
