/// The proto package line used when none is configured.
pub const DEFAULT_PROTO_PACKAGE: &str = "proto";

/// A proto3 message derived from one struct type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Display name, the qualified type string minus its package path.
    pub name: String,
    /// The qualified type string this message was derived from.
    pub source: String,
    /// Exported fields in declaration order.
    pub fields: Vec<Field>,
}

/// One field line of a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub type_name: String,
    pub is_repeated: bool,
    /// 1-based position among all declared struct fields, exported or not.
    pub order: usize,
}

/// The assembled document: a package line and messages sorted by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    pub package: String,
    pub messages: Vec<Message>,
}
