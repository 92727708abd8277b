//! Derive proto3 message definitions from the exported struct declarations of
//! type-checked packages.
//!
//! The crate consumes package metadata (declarations with fully resolved
//! types) and produces a deterministic `output.proto`: one message per
//! exported struct type, one field per exported struct field, numbered by
//! declaration position.
//!
//! - [`ProtoGen`]: the builder that runs the derivation pipeline.
//! - [`PackageLoader`]: the seam for obtaining package metadata;
//!   [`ManifestLoader`] reads it from `*.pkg.json` manifests.
//!
//! # Generating a schema
//!
//! ```no_run
//! use structproto::{ManifestLoader, ProtoGen};
//!
//! let output = ProtoGen::new().load_and_generate(
//!     &ManifestLoader::new(),
//!     ".",
//!     &["example.com/app/...".to_string()],
//! )?;
//! print!("{}", output.render());
//! # Ok::<(), miette::Report>(())
//! ```
//!
//! # From in-memory metadata
//!
//! ```
//! use structproto::ProtoGen;
//! use structproto::model::{Declaration, Package, StructField, Type};
//!
//! let user = Type::structure(
//!     "example.com/app/model.User",
//!     vec![StructField::new("Name", Type::basic("string"))],
//! );
//! let pkg = Package::new("example.com/app/model").with(Declaration::type_decl("User", user));
//!
//! let output = ProtoGen::new().generate(&[pkg])?;
//! assert!(output.render().contains("message User {\n  string name = 1;\n}\n"));
//! # Ok::<(), miette::Report>(())
//! ```
//!
//! # Error handling
//!
//! All fallible methods return [`miette::Result`], which provides rich
//! diagnostic output (including source spans into malformed manifests) when
//! printed with `{:?}`.

pub mod assemble;
pub mod emit;
pub mod error;
pub mod fields;
pub mod filter;
pub mod generator;
pub mod loader;
pub mod model;
pub mod normalize;
pub(crate) mod suggest;

// Re-export the small public API at the crate root.
pub use assemble::DuplicatePolicy;
pub use filter::NameStrategy;
pub use generator::{ProtoGen, ProtoOutput};
pub use loader::{ManifestLoader, PackageLoader};
