//! Rewriting numbered read listings with line references.
//!
//! The host renders a read as lines of `<n>: <content>`, the first of which
//! may carry an opening `<content>` marker. Each such line becomes
//! `<n>:<fp>| <content>`; everything else passes through untouched.

use crate::fingerprint::LineRef;

pub const CONTENT_OPEN: &str = "<content>";
pub const DIRECTORY_MARKER: &str = "<type>directory</type>";

/// A rewritten listing and the entries it exposed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotatedListing {
    pub text: String,
    pub entries: Vec<(LineRef, String)>,
}

pub fn is_directory_listing(output: &str) -> bool {
    output.contains(DIRECTORY_MARKER)
}

/// Annotate every numbered line of `output`.
pub fn annotate(output: &str) -> AnnotatedListing {
    let mut listing = AnnotatedListing::default();
    let mut rendered = Vec::new();

    for raw in output.split('\n') {
        let (prefix, rest) = match raw.strip_prefix(CONTENT_OPEN) {
            Some(rest) => (CONTENT_OPEN, rest),
            None => ("", raw),
        };

        match parse_numbered(rest) {
            Some((digits, line, content)) => {
                let reference = LineRef::for_line(line, content);
                rendered.push(format!(
                    "{prefix}{digits}:{}| {content}",
                    reference.fingerprint
                ));
                listing.entries.push((reference, content.to_string()));
            }
            None => rendered.push(raw.to_string()),
        }
    }

    listing.text = rendered.join("\n");
    listing
}

/// Split `"<digits>: <content>"` into its parts. A bare `"<digits>:"` is an
/// empty line.
fn parse_numbered(line: &str) -> Option<(&str, usize, &str)> {
    let digits_len = line.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }
    let (digits, rest) = line.split_at(digits_len);
    let content = match rest.strip_prefix(": ") {
        Some(content) => content,
        None if rest == ":" => "",
        None => return None,
    };
    let number: usize = digits.parse().ok()?;
    if number == 0 {
        return None;
    }
    Some((digits, number, content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::line_fingerprint;

    #[test]
    fn test_annotates_numbered_lines() {
        let listing = annotate("1: alpha\n2: beta\n3: gamma");
        let expected = format!(
            "1:{}| alpha\n2:{}| beta\n3:{}| gamma",
            line_fingerprint("alpha"),
            line_fingerprint("beta"),
            line_fingerprint("gamma")
        );
        assert_eq!(listing.text, expected);
        assert_eq!(listing.entries.len(), 3);
        assert_eq!(listing.entries[1], (LineRef::for_line(2, "beta"), "beta".to_string()));
    }

    #[test]
    fn test_content_marker_prefix_preserved() {
        let listing = annotate("<path>/w/a.txt</path>\n<content>1: fn main() {\n2: }\n</content>");
        let lines: Vec<_> = listing.text.lines().collect();
        assert_eq!(lines[0], "<path>/w/a.txt</path>");
        assert_eq!(
            lines[1],
            format!("<content>1:{}| fn main() {{", line_fingerprint("fn main() {"))
        );
        assert_eq!(lines[2], format!("2:{}| }}", line_fingerprint("}")));
        assert_eq!(lines[3], "</content>");
    }

    #[test]
    fn test_zero_padded_numbers_kept() {
        let listing = annotate("00042: value");
        assert_eq!(
            listing.text,
            format!("00042:{}| value", line_fingerprint("value"))
        );
        assert_eq!(listing.entries[0].0.line, 42);
    }

    #[test]
    fn test_empty_lines_and_indentation() {
        let listing = annotate("7: \n8:\n9:     indented  ");
        assert_eq!(listing.entries[0], (LineRef::for_line(7, ""), String::new()));
        assert_eq!(listing.entries[1], (LineRef::for_line(8, ""), String::new()));
        assert_eq!(listing.entries[2].1, "    indented  ");
    }

    #[test]
    fn test_non_listing_lines_pass_through() {
        let input = "(End of file - total 3 lines)\n12 items\n3:no space\n0: zero";
        let listing = annotate(input);
        assert_eq!(listing.text, input);
        assert!(listing.entries.is_empty());
    }

    #[test]
    fn test_directory_detection() {
        assert!(is_directory_listing("<type>directory</type>\nsrc/\nCargo.toml"));
        assert!(!is_directory_listing("1: <type>file</type>"));
    }
}
