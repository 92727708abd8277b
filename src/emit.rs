// ==============================================================================
// Schema Emitter: Render the Assembled Schema as proto3 Text
// ==============================================================================
//
// Output layout:
//
//     syntax = "proto3";
//     package proto;
//
//     message Label {
//       int64 id = 1;
//       string name = 2;
//     }
//
//     message User {
//       repeated Label list = 3;
//     }
//
// The document is rendered into a `String` first and written in a single
// call, so a failed run never leaves a half-written `output.proto` behind.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::model::{Field, Message, Schema};

/// File name of the generated schema inside the output directory.
pub const OUTPUT_FILE: &str = "output.proto";

/// Render a schema to proto3 text.
pub fn render(schema: &Schema) -> String {
    let mut out = String::new();
    writeln!(out, "syntax = \"proto3\";").expect("write to String is infallible");
    writeln!(out, "package {};", schema.package).expect("write to String is infallible");
    for message in &schema.messages {
        out.push('\n');
        render_message(&mut out, message);
    }
    out
}

fn render_message(out: &mut String, message: &Message) {
    writeln!(out, "message {} {{", message.name).expect("write to String is infallible");
    for field in &message.fields {
        render_field(out, field);
    }
    out.push_str("}\n");
}

fn render_field(out: &mut String, field: &Field) {
    let repeated = if field.is_repeated { "repeated " } else { "" };
    writeln!(
        out,
        "  {repeated}{} {} = {};",
        field.type_name, field.name, field.order
    )
    .expect("write to String is infallible");
}

/// Check that `dir` exists and is a directory.
pub fn check_output_dir(dir: &Path) -> Result<(), Error> {
    let metadata = fs::metadata(dir).map_err(|source| Error::OutputDir {
        path: dir.to_path_buf(),
        source,
    })?;
    if !metadata.is_dir() {
        return Err(Error::OutputDir {
            path: dir.to_path_buf(),
            source: std::io::Error::other("not a directory"),
        });
    }
    Ok(())
}

/// Render `schema` and write it to `dir/output.proto`, returning the path
/// written.
pub fn write_schema(schema: &Schema, dir: &Path) -> Result<PathBuf, Error> {
    check_output_dir(dir)?;
    let rendered = render(schema);
    let path = dir.join(OUTPUT_FILE);
    fs::write(&path, rendered).map_err(|source| Error::Write {
        path: path.clone(),
        source,
    })?;
    tracing::info!(path = %path.display(), messages = schema.messages.len(), "wrote schema");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn field(name: &str, type_name: &str, is_repeated: bool, order: usize) -> Field {
        Field {
            name: name.to_string(),
            type_name: type_name.to_string(),
            is_repeated,
            order,
        }
    }

    fn schema(messages: Vec<Message>) -> Schema {
        Schema {
            package: "proto".to_string(),
            messages,
        }
    }

    #[test]
    fn empty_schema_is_header_only() {
        assert_eq!(
            render(&schema(Vec::new())),
            "syntax = \"proto3\";\npackage proto;\n"
        );
    }

    #[test]
    fn messages_are_separated_by_blank_lines() {
        let label = Message {
            name: "Label".to_string(),
            source: "m.Label".to_string(),
            fields: vec![field("id", "int64", false, 1), field("name", "string", false, 2)],
        };
        let user = Message {
            name: "User".to_string(),
            source: "m.User".to_string(),
            fields: vec![field("list", "Label", true, 3)],
        };
        let expected = "\
syntax = \"proto3\";
package proto;

message Label {
  int64 id = 1;
  string name = 2;
}

message User {
  repeated Label list = 3;
}
";
        assert_eq!(render(&schema(vec![label, user])), expected);
    }

    #[test]
    fn message_without_fields_has_empty_body() {
        let empty = Message {
            name: "Empty".to_string(),
            source: "m.Empty".to_string(),
            fields: Vec::new(),
        };
        assert!(render(&schema(vec![empty])).ends_with("\nmessage Empty {\n}\n"));
    }

    #[test]
    fn custom_package_line() {
        let mut s = schema(Vec::new());
        s.package = "acme.model".to_string();
        assert!(render(&s).contains("\npackage acme.model;\n"));
    }

    #[test]
    fn write_schema_creates_output_file() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = write_schema(&schema(Vec::new()), dir.path()).expect("write succeeds");
        assert_eq!(path, dir.path().join(OUTPUT_FILE));
        let content = fs::read_to_string(&path).expect("read output");
        assert_eq!(content, "syntax = \"proto3\";\npackage proto;\n");
    }

    #[test]
    fn write_schema_requires_existing_directory() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let missing = dir.path().join("missing");
        let err = write_schema(&schema(Vec::new()), &missing).expect_err("missing dir");
        assert!(matches!(err, Error::OutputDir { .. }), "got: {err}");
        assert!(!missing.exists());
    }

    #[test]
    fn output_dir_must_be_a_directory() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let file = dir.path().join("file.txt");
        fs::write(&file, "not a directory").expect("write file");
        assert!(matches!(
            check_output_dir(&file),
            Err(Error::OutputDir { .. })
        ));
    }
}
