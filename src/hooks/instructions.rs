/// Guidance appended to the caller's system prompt.
pub const GUIDANCE: &str = "\
File reads show every line as `<line>:<hash>| <content>`, for example `12:a3f| let x = 1;`.
Edit files by line reference, never by quoting text:
- Replace one line: set `startHash` to its reference (e.g. \"12:a3f\") and `content` to the new text.
- Replace a range: set `startHash` and `endHash` to the first and last line of the range.
- Insert after a line: set `afterHash` to its reference and `content` to the lines to insert.
- Several edits at once: pass an `edits` array of the same objects; each may name its own `filePath`.
Empty `content` deletes the referenced lines. References expire after every successful edit; \
if an edit reports a stale reference, read the file again and use the new references.";

/// Append `text` to the system prompt sections unless it is already there.
pub fn inject(system: &mut Vec<String>, text: &str) {
    if !system.iter().any(|section| section == text) {
        system.push(text.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inject_appends_once() {
        let mut system = vec!["You are a coding agent.".to_string()];
        inject(&mut system, GUIDANCE);
        inject(&mut system, GUIDANCE);
        assert_eq!(system.len(), 2);
        assert_eq!(system[1], GUIDANCE);
    }

    #[test]
    fn test_guidance_names_every_argument() {
        for arg in ["startHash", "endHash", "afterHash", "content", "edits", "filePath"] {
            assert!(GUIDANCE.contains(arg), "{arg}");
        }
    }
}
