//! Request and response shapes exchanged with the host edit tool.

use crate::fingerprint::LineRef;
use crate::patch::{EditRequest, EditTarget};
use crate::resolve::ResolveError;
use crate::workspace::Workspace;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Arguments the caller passed to the edit tool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditArgs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_string: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_string: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub edits: Vec<EditSpec>,
}

/// One entry of a batch `edits` array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditSpec {
    /// Defaults to the top-level `filePath`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// What kind of edit the arguments describe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditShape {
    /// `edits` array: resolved into a patch document
    Batch(Vec<EditRequest>),
    /// Top-level hash reference: resolved into an old/new text pair
    Single(EditRequest),
    /// Quoted `oldString` with no references
    Legacy { path: PathBuf },
    /// Nothing this engine handles
    Unrelated,
}

impl EditArgs {
    fn has_reference(&self) -> bool {
        self.start_hash.is_some() || self.end_hash.is_some() || self.after_hash.is_some()
    }

    /// Classify the arguments and turn any references into edit requests.
    pub fn shape(&self, workspace: &Workspace) -> Result<EditShape, ResolveError> {
        if !self.edits.is_empty() {
            if self.has_reference() {
                return Err(malformed(
                    "pass references either at the top level or inside edits, not both",
                ));
            }
            let requests = self
                .edits
                .iter()
                .map(|spec| {
                    let path = spec
                        .file_path
                        .as_deref()
                        .or(self.file_path.as_deref())
                        .ok_or_else(|| malformed("edit is missing filePath"))?;
                    build_request(
                        workspace,
                        path,
                        spec.start_hash.as_deref(),
                        spec.end_hash.as_deref(),
                        spec.after_hash.as_deref(),
                        spec.content.as_deref(),
                    )
                })
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(EditShape::Batch(requests));
        }

        let Some(path) = self.file_path.as_deref() else {
            return if self.has_reference() {
                Err(malformed("edit is missing filePath"))
            } else {
                Ok(EditShape::Unrelated)
            };
        };

        if self.has_reference() {
            return build_request(
                workspace,
                path,
                self.start_hash.as_deref(),
                self.end_hash.as_deref(),
                self.after_hash.as_deref(),
                self.content.as_deref(),
            )
            .map(EditShape::Single);
        }

        if self.old_string.is_some() {
            return Ok(EditShape::Legacy {
                path: workspace.resolve(path),
            });
        }

        Ok(EditShape::Unrelated)
    }
}

fn build_request(
    workspace: &Workspace,
    path: &str,
    start: Option<&str>,
    end: Option<&str>,
    after: Option<&str>,
    content: Option<&str>,
) -> Result<EditRequest, ResolveError> {
    let parse = |text: &str| text.parse::<LineRef>();

    let target = match (start, end, after) {
        (Some(_), _, Some(_)) => {
            return Err(malformed("startHash and afterHash cannot be combined"));
        }
        (None, Some(_), _) => return Err(malformed("endHash requires startHash")),
        (Some(start), Some(end), None) => EditTarget::ReplaceRange {
            start: parse(start)?,
            end: parse(end)?,
        },
        (Some(start), None, None) => EditTarget::ReplaceLine(parse(start)?),
        (None, None, Some(after)) => EditTarget::InsertAfter(parse(after)?),
        (None, None, None) => return Err(malformed("edit needs startHash or afterHash")),
    };
    let content = content.ok_or_else(|| malformed("edit is missing content"))?;

    Ok(EditRequest::new(workspace.resolve(path), target, content))
}

fn malformed(message: &str) -> ResolveError {
    ResolveError::MalformedEdit {
        message: message.to_string(),
    }
}

/// Arguments handed to the host's own edit mechanism.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NativeEdit {
    /// Run the host tool with the caller's arguments unchanged
    PassThrough,
    /// String replacement in one file
    #[serde(rename_all = "camelCase")]
    Replace {
        file_path: String,
        old_string: String,
        new_string: String,
    },
    /// Composite patch document
    #[serde(rename_all = "camelCase")]
    Patch { patch_text: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(json: &str) -> EditArgs {
        serde_json::from_str(json).unwrap()
    }

    fn ws() -> Workspace {
        Workspace::new("/w")
    }

    #[test]
    fn test_single_replace_line() {
        let shape = args(r#"{"filePath":"a.txt","startHash":"2:abc","content":"X"}"#)
            .shape(&ws())
            .unwrap();
        let EditShape::Single(request) = shape else {
            panic!("expected single edit, got {shape:?}");
        };
        assert_eq!(request.path, PathBuf::from("/w/a.txt"));
        assert_eq!(request.target, EditTarget::ReplaceLine("2:abc".parse().unwrap()));
        assert_eq!(request.content, "X");
    }

    #[test]
    fn test_single_range_and_insert() {
        let range = args(r#"{"filePath":"a","startHash":"2:abc","endHash":"4:def","content":""}"#)
            .shape(&ws())
            .unwrap();
        assert!(matches!(
            range,
            EditShape::Single(EditRequest { target: EditTarget::ReplaceRange { .. }, .. })
        ));

        let insert = args(r#"{"filePath":"a","afterHash":"3:0f0","content":"new"}"#)
            .shape(&ws())
            .unwrap();
        assert!(matches!(
            insert,
            EditShape::Single(EditRequest { target: EditTarget::InsertAfter(_), .. })
        ));
    }

    #[test]
    fn test_batch_inherits_file_path() {
        let shape = args(
            r#"{"filePath":"a.txt","edits":[
                {"startHash":"3:abc","content":"x"},
                {"filePath":"/abs/b.txt","afterHash":"1:def","content":"y"}
            ]}"#,
        )
        .shape(&ws())
        .unwrap();
        let EditShape::Batch(requests) = shape else {
            panic!("expected batch, got {shape:?}");
        };
        assert_eq!(requests[0].path, PathBuf::from("/w/a.txt"));
        assert_eq!(requests[1].path, PathBuf::from("/abs/b.txt"));
    }

    #[test]
    fn test_legacy_and_unrelated() {
        let legacy = args(r#"{"filePath":"a.txt","oldString":"x","newString":"y"}"#)
            .shape(&ws())
            .unwrap();
        assert_eq!(
            legacy,
            EditShape::Legacy {
                path: PathBuf::from("/w/a.txt")
            }
        );
        assert_eq!(args("{}").shape(&ws()).unwrap(), EditShape::Unrelated);
    }

    #[test]
    fn test_malformed_combinations() {
        for json in [
            r#"{"filePath":"a","startHash":"1:abc","afterHash":"1:abc","content":"x"}"#,
            r#"{"filePath":"a","endHash":"1:abc","content":"x"}"#,
            r#"{"filePath":"a","startHash":"1:abc"}"#,
            r#"{"startHash":"1:abc","content":"x"}"#,
            r#"{"startHash":"1:abc","edits":[{"filePath":"a","startHash":"1:abc","content":"x"}]}"#,
            r#"{"edits":[{"startHash":"1:abc","content":"x"}]}"#,
            r#"{"edits":[{"filePath":"a","content":"x"}]}"#,
        ] {
            assert!(
                matches!(args(json).shape(&ws()), Err(ResolveError::MalformedEdit { .. })),
                "{json}"
            );
        }
    }

    #[test]
    fn test_bad_reference_text() {
        let err = args(r#"{"filePath":"a","startHash":"two:abc","content":"x"}"#)
            .shape(&ws())
            .unwrap_err();
        assert!(matches!(err, ResolveError::InvalidReference { ref input } if input == "two:abc"));
    }

    #[test]
    fn test_native_edit_json() {
        let replace = NativeEdit::Replace {
            file_path: "/w/a.txt".to_string(),
            old_string: "beta".to_string(),
            new_string: "BETA".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&replace).unwrap(),
            serde_json::json!({
                "kind": "replace",
                "filePath": "/w/a.txt",
                "oldString": "beta",
                "newString": "BETA"
            })
        );
        assert_eq!(
            serde_json::to_value(NativeEdit::PassThrough).unwrap(),
            serde_json::json!({"kind": "pass_through"})
        );
    }
}
