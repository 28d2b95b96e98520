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

//! The persisted byte-image text format: `[0b00000001, 0b00000010, ...]`,
//! a convenience format for pasting an assembled image somewhere else.

use anyhow::{bail, Context, Result};

pub fn to_text(bytes: &[u8]) -> String {
    let body = bytes.iter().map(|b| format!("0b{b:08b}")).collect::<Vec<_>>().join(", ");
    format!("[{body}]")
}

pub fn from_text(text: &str) -> Result<Vec<u8>> {
    let trimmed = text.trim();
    let Some(inner) = trimmed.strip_prefix('[').and_then(|s| s.strip_suffix(']')) else {
        bail!("byte image text must be enclosed in '[' and ']'");
    };
    inner
        .split(',')
        .map(str::trim)
        .filter(|tok| !tok.is_empty())
        .map(|tok| {
            let digits = tok
                .strip_prefix("0b")
                .or_else(|| tok.strip_prefix("0B"))
                .with_context(|| format!("byte literal '{tok}' is missing the 0b prefix"))?;
            u8::from_str_radix(digits, 2).with_context(|| format!("'{tok}' is not a valid 8-bit binary literal"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_text() {
        let bytes = vec![0x00, 0xFF, 0x2A];
        let text = to_text(&bytes);
        assert_eq!(text, "[0b00000000, 0b11111111, 0b00101010]");
        assert_eq!(from_text(&text).unwrap(), bytes);
    }
}
