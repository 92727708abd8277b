//! Data model: the package metadata the generator consumes, and the proto
//! schema it produces.

pub mod package;
pub mod proto;

pub use package::{DeclKind, Declaration, Package, Shape, StructField, Type};
pub use proto::{DEFAULT_PROTO_PACKAGE, Field, Message, Schema};
