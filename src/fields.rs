// ==============================================================================
// Field Mapper: Struct Fields to Proto Field Lines
// ==============================================================================
//
// Ordinals come from the position in the *full* declared field list, so
// skipping an unexported field leaves a gap instead of shifting every later
// field.

use crate::model::{Field, Shape, StructField, Type};
use crate::normalize::normalize_type;

/// Map a struct's declared fields to proto fields, dropping unexported ones.
pub fn map_fields(fields: &[StructField]) -> Vec<Field> {
    fields
        .iter()
        .enumerate()
        .filter(|(_, f)| f.is_exported())
        .map(|(i, f)| Field {
            name: field_name(&f.name),
            type_name: field_type_name(&f.ty),
            is_repeated: f.ty.sequence_elem().is_some(),
            order: i + 1,
        })
        .collect()
}

/// Lower-case the leading character of a field name.
///
/// Names of exactly two characters are lower-cased as a whole, so `ID`
/// becomes `id` rather than `iD`. Downstream consumers depend on this
/// spelling, so it must not change.
pub fn field_name(name: &str) -> String {
    if name.chars().count() == 2 {
        return name.to_lowercase();
    }
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Resolve the proto type name for a field type.
pub fn field_type_name(ty: &Type) -> String {
    match &ty.shape {
        Shape::Basic | Shape::Pointer { .. } | Shape::Struct { .. } => {
            normalize_type(bare_name(&ty.name)).to_string()
        }
        Shape::Slice { elem } | Shape::Array { elem, .. } => {
            normalize_type(bare_name(&elem.name)).to_string()
        }
        _ => ty.name.clone(),
    }
}

/// The display name of a qualified type string: the last `.`-separated
/// segment, without sequence brackets and without one pointer marker.
///
/// ```
/// use structproto::fields::bare_name;
///
/// assert_eq!(bare_name("example.com/app/model.Label"), "Label");
/// assert_eq!(bare_name("*example.com/app/model.Label"), "Label");
/// assert_eq!(bare_name("[]int"), "int");
/// ```
pub fn bare_name(qualified: &str) -> &str {
    let last = qualified.rsplit('.').next().unwrap_or(qualified);
    let last = last.trim_start_matches(|c: char| c == '[' || c == ']' || c.is_ascii_digit());
    last.strip_prefix('*').unwrap_or(last)
}
