//! Per-line content fingerprints and the `<line>:<fp>` reference grammar.
//!
//! A fingerprint is a 12-bit checksum of a line with trailing whitespace
//! stripped, rendered as three lowercase hex digits. It is intentionally
//! lossy: collisions between distinct lines are expected and the line number
//! in a [`LineRef`] disambiguates within a file.

use crate::resolve::ResolveError;
use std::fmt;
use std::str::FromStr;

const SEED: u32 = 5381;
const MASK: u32 = 0xfff;

/// Three lowercase hex characters derived from a line's trimmed content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(u16);

impl Fingerprint {
    /// Fingerprint a line of text.
    pub fn of(line: &str) -> Self {
        // Rolling hash over UTF-16 code units with 32-bit wraparound, so the
        // value agrees with hosts that hash JavaScript strings.
        let hash = line
            .trim_end()
            .encode_utf16()
            .fold(SEED, |hash, unit| {
                hash.wrapping_shl(5)
                    .wrapping_add(hash)
                    .wrapping_add(u32::from(unit))
            });
        Fingerprint((hash & MASK) as u16)
    }

    /// Parse exactly three lowercase hex digits.
    pub fn parse(text: &str) -> Option<Self> {
        if text.len() != 3
            || !text
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
        {
            return None;
        }
        u16::from_str_radix(text, 16).ok().map(Fingerprint)
    }

    pub fn value(self) -> u16 {
        self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03x}", self.0)
    }
}

/// Fingerprint a line and render it as its three-character form.
pub fn line_fingerprint(line: &str) -> String {
    Fingerprint::of(line).to_string()
}

/// A `(line number, fingerprint)` pair, serialized as `"<line>:<fp>"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineRef {
    /// 1-based line number
    pub line: usize,
    pub fingerprint: Fingerprint,
}

impl LineRef {
    pub fn new(line: usize, fingerprint: Fingerprint) -> Self {
        Self { line, fingerprint }
    }

    /// Reference for `content` sitting at `line`.
    pub fn for_line(line: usize, content: &str) -> Self {
        Self::new(line, Fingerprint::of(content))
    }
}

impl fmt::Display for LineRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.fingerprint)
    }
}

impl FromStr for LineRef {
    type Err = ResolveError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let invalid = || ResolveError::InvalidReference {
            input: input.to_string(),
        };

        let (line, fp) = input.trim().split_once(':').ok_or_else(invalid)?;
        if line.is_empty() || !line.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let line: usize = line.parse().map_err(|_| invalid())?;
        if line == 0 {
            return Err(invalid());
        }
        let fingerprint = Fingerprint::parse(fp).ok_or_else(invalid)?;

        Ok(LineRef { line, fingerprint })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn djb2_low_bits(text: &str) -> String {
        let mut hash: i32 = 5381;
        for unit in text.encode_utf16() {
            hash = (hash << 5).wrapping_add(hash).wrapping_add(i32::from(unit));
        }
        format!("{:03x}", (hash as u32) & 0xfff)
    }

    #[test]
    fn test_empty_line_is_seed() {
        // 5381 = 0x1505
        assert_eq!(line_fingerprint(""), "505");
    }

    #[test]
    fn test_matches_signed_32bit_reference() {
        for text in ["alpha", "beta", "gamma", "fn main() {", "    let x = 1;", "ünïcødé 🦀"] {
            assert_eq!(line_fingerprint(text), djb2_low_bits(text), "{text}");
        }
    }

    #[test]
    fn test_long_line_wraps_without_panic() {
        let text = "x".repeat(10_000);
        assert_eq!(line_fingerprint(&text).len(), 3);
    }

    #[test]
    fn test_trailing_whitespace_ignored_leading_kept() {
        assert_eq!(line_fingerprint("beta"), line_fingerprint("beta \t\r"));
        assert_ne!(line_fingerprint("beta"), line_fingerprint("  beta"));
    }

    #[test]
    fn test_line_ref_parse_and_display() {
        let reference: LineRef = "12:0af".parse().unwrap();
        assert_eq!(reference.line, 12);
        assert_eq!(reference.fingerprint.value(), 0x0af);
        assert_eq!(reference.to_string(), "12:0af");
    }

    #[test]
    fn test_line_ref_rejects_malformed() {
        for bad in ["", "12", "12:", ":abc", "0:abc", "12:ABC", "12:abcd", "12:ab", "x:abc", "-1:abc", "12:ag0"] {
            assert!(
                matches!(bad.parse::<LineRef>(), Err(ResolveError::InvalidReference { .. })),
                "{bad:?} should be rejected"
            );
        }
    }

    proptest! {
        #[test]
        fn prop_trailing_whitespace_insensitive(line in "[^\\n]{0,40}", pad in "[ \\t]{0,5}") {
            prop_assert_eq!(line_fingerprint(&line), line_fingerprint(&format!("{line}{pad}")));
        }

        #[test]
        fn prop_always_three_lowercase_hex(line in "\\PC{0,60}") {
            let fp = line_fingerprint(&line);
            prop_assert_eq!(fp.len(), 3);
            prop_assert!(fp.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b)));
            prop_assert_eq!(Fingerprint::parse(&fp), Some(Fingerprint::of(&line)));
        }
    }
}
