// ==============================================================================
// Package Metadata: the Read-Only View of Type-Checked Packages
// ==============================================================================
//
// The generator never type-checks anything itself. Whatever produced these
// values (a compiler plugin, a metadata exporter, a hand-written manifest) has
// already resolved every declaration to its final type. The view is
// deliberately narrow: iterate declarations, ask whether something is
// exported, ask for a type's underlying shape, and walk a struct's fields.
//
// The same types double as the on-disk manifest format (see `loader`), so
// they derive `Deserialize`/`Serialize` with a JSON shape like:
//
//     {
//       "path": "example.com/app/model",
//       "declarations": [
//         { "name": "User", "kind": "type",
//           "type": { "name": "example.com/app/model.User", "kind": "struct",
//                     "fields": [ { "name": "Id", "type": { "name": "int64", "kind": "basic" } } ] } }
//       ]
//     }

use serde::{Deserialize, Serialize};

/// One type-checked package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    /// The package's own import path, e.g. `example.com/app/model`.
    pub path: String,
    #[serde(default)]
    pub declarations: Vec<Declaration>,
}

impl Package {
    pub fn new(path: impl Into<String>) -> Self {
        Package {
            path: path.into(),
            declarations: Vec::new(),
        }
    }

    /// Append a declaration, returning `self` for chaining.
    #[must_use]
    pub fn with(mut self, decl: Declaration) -> Self {
        self.declarations.push(decl);
        self
    }
}

/// What a top-level declaration introduces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclKind {
    Type,
    Var,
    Const,
    Func,
    #[serde(other)]
    Other,
}

/// A declaration together with its resolved type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    pub name: String,
    pub kind: DeclKind,
    /// Explicit visibility. When absent, the leading-uppercase convention
    /// decides (see [`is_exported_name`]).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exported: Option<bool>,
    #[serde(rename = "type")]
    pub ty: Type,
}

impl Declaration {
    /// A top-level type declaration.
    pub fn type_decl(name: impl Into<String>, ty: Type) -> Self {
        Declaration {
            name: name.into(),
            kind: DeclKind::Type,
            exported: None,
            ty,
        }
    }

    pub fn is_exported(&self) -> bool {
        self.exported.unwrap_or_else(|| is_exported_name(&self.name))
    }
}

/// A resolved type: its qualified type string plus its underlying shape.
///
/// `name` is the type as the source toolchain prints it. For named types it
/// is `<package path>.<Name>` (`example.com/app/model.User`, `time.Time`),
/// for unnamed ones the composite spelling (`[]int`, `*example.com/app/model.Label`,
/// `map[string]int`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Type {
    pub name: String,
    #[serde(flatten)]
    pub shape: Shape,
}

/// The underlying shape of a type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Shape {
    Basic,
    Slice {
        elem: Box<Type>,
    },
    Array {
        elem: Box<Type>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        len: Option<u64>,
    },
    Pointer {
        elem: Box<Type>,
    },
    Struct {
        #[serde(default)]
        fields: Vec<StructField>,
    },
    Map,
    Interface,
    Func,
    Chan,
    #[serde(other)]
    Other,
}

impl Type {
    pub fn basic(name: impl Into<String>) -> Self {
        Type {
            name: name.into(),
            shape: Shape::Basic,
        }
    }

    /// A struct type with the given qualified name.
    pub fn structure(name: impl Into<String>, fields: Vec<StructField>) -> Self {
        Type {
            name: name.into(),
            shape: Shape::Struct { fields },
        }
    }

    /// `[]elem`
    pub fn slice(elem: Type) -> Self {
        Type {
            name: format!("[]{}", elem.name),
            shape: Shape::Slice {
                elem: Box::new(elem),
            },
        }
    }

    /// `*elem`
    pub fn pointer(elem: Type) -> Self {
        Type {
            name: format!("*{}", elem.name),
            shape: Shape::Pointer {
                elem: Box::new(elem),
            },
        }
    }

    /// Any other shape that carries no structure we care about.
    pub fn opaque(name: impl Into<String>, shape: Shape) -> Self {
        Type {
            name: name.into(),
            shape,
        }
    }

    /// The element type of a slice or array.
    pub fn sequence_elem(&self) -> Option<&Type> {
        match &self.shape {
            Shape::Slice { elem } | Shape::Array { elem, .. } => Some(elem),
            _ => None,
        }
    }

    pub fn struct_fields(&self) -> Option<&[StructField]> {
        match &self.shape {
            Shape::Struct { fields } => Some(fields),
            _ => None,
        }
    }
}

/// One member of a struct, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructField {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exported: Option<bool>,
    #[serde(rename = "type")]
    pub ty: Type,
}

impl StructField {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        StructField {
            name: name.into(),
            exported: None,
            ty,
        }
    }

    pub fn is_exported(&self) -> bool {
        self.exported.unwrap_or_else(|| is_exported_name(&self.name))
    }
}

/// A name is exported when it starts with an uppercase letter.
pub fn is_exported_name(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}
