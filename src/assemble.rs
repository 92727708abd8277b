// ==============================================================================
// Schema Assembler: Sorting, Duplicate Names, Identifier Checks
// ==============================================================================
//
// Messages arrive in no particular order. Sorting by name (byte order, with
// the source type string as tie-breaker) is the only thing that makes the
// generated document reproducible, so every run ends here.
//
// Deduplication already happened in the filter, keyed on the qualified type
// string. Two *different* types can still share a display name (`a.User` and
// `b.User`). By default both are emitted and the user gets a warning; with
// `DuplicatePolicy::Reject` the run fails instead.
//
// Proto identifiers are ASCII `[A-Za-z_][A-Za-z0-9_]*`. Names that don't fit
// (sub-package names like `inner.Inner`, legacy-trimmed names like `.Item`)
// are still emitted verbatim, but flagged.

use crate::error::{Error, Warning};
use crate::model::{Message, Schema};

/// What to do when two distinct types map to the same message name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Emit every message and report a warning per duplicated name.
    #[default]
    Allow,
    /// Fail assembly.
    Reject,
}

/// Sort messages into a schema, applying the duplicate-name policy.
///
/// Returns the schema plus any warnings found along the way.
pub fn assemble(
    mut messages: Vec<Message>,
    package: &str,
    policy: DuplicatePolicy,
) -> Result<(Schema, Vec<Warning>), Error> {
    messages.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.source.cmp(&b.source)));

    let mut warnings = Vec::new();
    for group in messages.chunk_by(|a, b| a.name == b.name) {
        if let [first, second, ..] = group {
            if policy == DuplicatePolicy::Reject {
                return Err(Error::DuplicateMessage {
                    name: first.name.clone(),
                    first: first.source.clone(),
                    second: second.source.clone(),
                });
            }
            let sources: Vec<&str> = group.iter().map(|m| m.source.as_str()).collect();
            tracing::warn!(name = %first.name, ?sources, "duplicate message name");
            warnings.push(
                Warning::new(format!(
                    "message name `{}` is produced by {} types: {}",
                    first.name,
                    group.len(),
                    sources.join(", ")
                ))
                .with_help("the generated schema will not compile until one of them is renamed"),
            );
        }
    }

    for message in &messages {
        warnings.extend(check_identifiers(message));
    }

    Ok((
        Schema {
            package: package.to_string(),
            messages,
        },
        warnings,
    ))
}

fn check_identifiers(message: &Message) -> Vec<Warning> {
    let mut warnings = Vec::new();
    if !is_valid_proto_ident(&message.name) {
        tracing::warn!(name = %message.name, source = %message.source, "invalid message name");
        warnings.push(Warning::new(format!(
            "message name `{}` (from `{}`) is not a valid proto identifier",
            message.name, message.source
        )));
    }
    for field in &message.fields {
        if !is_valid_proto_ident(&field.name) {
            warnings.push(Warning::new(format!(
                "field `{}` of message `{}` is not a valid proto identifier",
                field.name, message.name
            )));
        }
        if !field.type_name.split('.').all(is_valid_proto_ident) {
            warnings.push(Warning::new(format!(
                "field `{}` of message `{}` has type `{}`, which is not a proto type name",
                field.name, message.name, field.type_name
            )));
        }
    }
    warnings
}

/// Whether `name` matches `[A-Za-z_][A-Za-z0-9_]*`.
pub(crate) fn is_valid_proto_ident(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
