// ==============================================================================
// Library API: The `ProtoGen` Builder
// ==============================================================================
//
// `ProtoGen` holds the run configuration (name filter, naming strategy,
// duplicate policy, proto package) and drives the pipeline:
//
//   packages -> filter -> fields -> assemble -> ProtoOutput
//
// It follows the non-consuming `&mut self` builder pattern, so one builder
// can be configured once and reused across runs. All mutable derivation state
// (the seen-set, the message list) is created fresh per call.

use std::path::{Path, PathBuf};

use crate::assemble::{DuplicatePolicy, assemble};
use crate::emit;
use crate::fields::map_fields;
use crate::filter::{NameStrategy, eligible_types};
use crate::loader::PackageLoader;
use crate::model::{DEFAULT_PROTO_PACKAGE, Message, Package, Schema};

/// Builder for deriving a proto3 schema from package metadata.
///
/// # Examples
///
/// ```no_run
/// use structproto::{ManifestLoader, ProtoGen};
///
/// let mut loader = ManifestLoader::new();
/// loader.search_dir("vendor/manifests");
///
/// let output = ProtoGen::new()
///     .filter("User")
///     .load_and_generate(&loader, ".", &["example.com/app/model".to_string()])?;
/// for warning in &output.warnings {
///     eprintln!("{warning:?}");
/// }
/// output.write("out")?;
/// # Ok::<(), miette::Report>(())
/// ```
#[derive(Debug, Clone)]
pub struct ProtoGen {
    filter: String,
    name_strategy: NameStrategy,
    duplicate_policy: DuplicatePolicy,
    proto_package: String,
}

/// Result of a successful derivation.
pub struct ProtoOutput {
    /// The assembled schema, messages sorted by name.
    pub schema: Schema,
    /// Non-fatal findings: duplicate display names, names that are not
    /// valid proto identifiers.
    ///
    /// Each warning is a [`miette::Report`] with `Severity::Warning` set.
    /// Print with `eprintln!("{report:?}")`.
    pub warnings: Vec<miette::Report>,
}

impl std::fmt::Debug for ProtoOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProtoOutput")
            .field("schema", &self.schema)
            .field(
                "warnings",
                &format_args!("[{} warnings]", self.warnings.len()),
            )
            .finish()
    }
}

impl ProtoOutput {
    /// The rendered proto3 document.
    pub fn render(&self) -> String {
        emit::render(&self.schema)
    }

    /// Write the rendered document to `dir/output.proto`. The directory must
    /// already exist. Returns the path written.
    pub fn write(&self, dir: impl AsRef<Path>) -> miette::Result<PathBuf> {
        Ok(emit::write_schema(&self.schema, dir.as_ref())?)
    }
}

impl Default for ProtoGen {
    fn default() -> Self {
        Self::new()
    }
}

impl ProtoGen {
    /// A builder with no filter, path-prefix naming, duplicates allowed and
    /// package `proto`.
    pub fn new() -> Self {
        ProtoGen {
            filter: String::new(),
            name_strategy: NameStrategy::default(),
            duplicate_policy: DuplicatePolicy::default(),
            proto_package: DEFAULT_PROTO_PACKAGE.to_string(),
        }
    }

    /// Only keep types whose name contains `filter` (case-sensitive). An
    /// empty string removes the restriction.
    pub fn filter(&mut self, filter: impl Into<String>) -> &mut Self {
        self.filter = filter.into();
        self
    }

    pub fn name_strategy(&mut self, strategy: NameStrategy) -> &mut Self {
        self.name_strategy = strategy;
        self
    }

    pub fn duplicate_policy(&mut self, policy: DuplicatePolicy) -> &mut Self {
        self.duplicate_policy = policy;
        self
    }

    /// Set the `package` line of the generated document.
    pub fn proto_package(&mut self, package: impl Into<String>) -> &mut Self {
        self.proto_package = package.into();
        self
    }

    /// Derive a schema from already-loaded packages.
    pub fn generate(&mut self, packages: &[Package]) -> miette::Result<ProtoOutput> {
        let messages: Vec<Message> = eligible_types(packages, &self.filter, self.name_strategy)
            .into_iter()
            .map(|ty| Message {
                fields: map_fields(ty.fields),
                source: ty.qualified.to_string(),
                name: ty.name,
            })
            .collect();
        tracing::info!(messages = messages.len(), "derived messages");

        let (schema, warnings) = assemble(messages, &self.proto_package, self.duplicate_policy)?;
        Ok(ProtoOutput {
            schema,
            warnings: warnings.into_iter().map(miette::Report::new).collect(),
        })
    }

    /// Load `patterns` with `loader`, resolved against `working_dir`, then
    /// derive a schema from the result.
    pub fn load_and_generate<L: PackageLoader + ?Sized>(
        &mut self,
        loader: &L,
        working_dir: impl AsRef<Path>,
        patterns: &[String],
    ) -> miette::Result<ProtoOutput> {
        let packages = loader.load(working_dir.as_ref(), patterns)?;
        self.generate(&packages)
    }
}
