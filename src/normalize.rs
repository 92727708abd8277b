/// Map a host type name to its proto3 spelling.
///
/// Timestamps become epoch integers. Unrecognized names pass through
/// unchanged.
pub fn normalize_type(name: &str) -> &str {
    match name {
        "int" => "int64",
        "float32" => "float",
        "float64" => "double",
        "Time" => "int64",
        other => other,
    }
}
