// ==============================================================================
// Error Types
// ==============================================================================
//
// Every fallible public API returns `miette::Result`. The concrete diagnostics
// behind those reports live here: `Error` covers the run-level failure
// taxonomy (configuration, environment, load, assembly), and
// `ManifestDiagnostic` carries a source span into a malformed manifest so the
// user sees exactly where the JSON went wrong.

use std::fmt;
use std::io;
use std::path::PathBuf;

use miette::{Diagnostic, LabeledSpan, NamedSource, SourceSpan};

/// Run-level failures.
#[derive(Debug)]
pub enum Error {
    /// No package identifiers were supplied.
    NoPackages,
    /// The output directory does not exist or cannot be inspected.
    OutputDir { path: PathBuf, source: io::Error },
    /// The output file could not be created or written.
    Write { path: PathBuf, source: io::Error },
    /// A manifest file could not be read.
    ManifestRead { path: PathBuf, source: io::Error },
    /// A package identifier matched no known package.
    PackageNotFound {
        pattern: String,
        suggestion: Option<String>,
    },
    /// Two distinct types produced the same message name and duplicates are
    /// rejected.
    DuplicateMessage {
        name: String,
        first: String,
        second: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NoPackages => write!(f, "no source packages given"),
            Error::OutputDir { path, .. } => {
                write!(f, "output directory `{}` is not usable", path.display())
            }
            Error::Write { path, .. } => write!(f, "write {}", path.display()),
            Error::ManifestRead { path, .. } => write!(f, "read manifest {}", path.display()),
            Error::PackageNotFound { pattern, .. } => {
                write!(f, "package not found: `{pattern}`")
            }
            Error::DuplicateMessage { name, .. } => {
                write!(f, "duplicate message name `{name}`")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::OutputDir { source, .. }
            | Error::Write { source, .. }
            | Error::ManifestRead { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl Diagnostic for Error {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match self {
            Error::NoPackages => "structproto::no_packages",
            Error::OutputDir { .. } => "structproto::output_dir",
            Error::Write { .. } => "structproto::write",
            Error::ManifestRead { .. } => "structproto::manifest_read",
            Error::PackageNotFound { .. } => "structproto::package_not_found",
            Error::DuplicateMessage { .. } => "structproto::duplicate_message",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Error::NoPackages => Some(Box::new("pass at least one `-p <package>`")),
            Error::OutputDir { .. } => Some(Box::new("the output directory must already exist")),
            Error::PackageNotFound {
                suggestion: Some(s),
                ..
            } => Some(Box::new(format!("did you mean `{s}`?"))),
            Error::PackageNotFound {
                suggestion: None, ..
            } => Some(Box::new(
                "export the package to a `*.pkg.json` manifest or add its directory with `-I`",
            )),
            Error::DuplicateMessage { first, second, .. } => Some(Box::new(format!(
                "both `{first}` and `{second}` map to this name; rename one of them or drop `-strict`"
            ))),
            _ => None,
        }
    }
}

// ==============================================================================
// Manifest Diagnostics
// ==============================================================================

/// A malformed manifest, with the manifest source attached for rich output.
#[derive(Debug)]
pub struct ManifestDiagnostic {
    pub src: NamedSource<String>,
    pub span: SourceSpan,
    pub message: String,
}

impl ManifestDiagnostic {
    /// Build a diagnostic from a `serde_json` error, translating its 1-based
    /// line/column into a byte offset into `source`.
    pub fn from_json(name: &str, source: String, err: &serde_json::Error) -> Self {
        let offset = line_col_to_offset(&source, err.line(), err.column());
        let len = usize::from(offset < source.len());
        ManifestDiagnostic {
            message: strip_position_suffix(&err.to_string()),
            span: (offset, len).into(),
            src: NamedSource::new(name, source),
        }
    }
}

impl fmt::Display for ManifestDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid manifest: {}", self.message)
    }
}

impl std::error::Error for ManifestDiagnostic {}

impl Diagnostic for ManifestDiagnostic {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new("structproto::manifest_parse"))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.src)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        Some(Box::new(std::iter::once(LabeledSpan::new_with_span(
            Some(self.message.clone()),
            self.span,
        ))))
    }
}

/// `serde_json` reports 1-based lines and columns; line 0 means the error has
/// no position (e.g. an I/O error), which we point at the start.
fn line_col_to_offset(source: &str, line: usize, column: usize) -> usize {
    if line == 0 {
        return 0;
    }
    let line_start: usize = source
        .split_inclusive('\n')
        .take(line - 1)
        .map(str::len)
        .sum();
    (line_start + column.saturating_sub(1)).min(source.len())
}

/// `serde_json` appends " at line L column C" to its messages. The span
/// already carries that, so drop it from the label.
fn strip_position_suffix(message: &str) -> String {
    match message.rfind(" at line ") {
        Some(idx) => message[..idx].to_string(),
        None => message.to_string(),
    }
}

// ==============================================================================
// Warnings
// ==============================================================================

/// A non-fatal finding reported alongside a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub message: String,
    pub help: Option<String>,
}

impl Warning {
    pub fn new(message: impl Into<String>) -> Self {
        Warning {
            message: message.into(),
            help: None,
        }
    }

    #[must_use]
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for Warning {}

impl Diagnostic for Warning {
    fn severity(&self) -> Option<miette::Severity> {
        Some(miette::Severity::Warning)
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.help
            .as_deref()
            .map(|h| Box::new(h) as Box<dyn fmt::Display + 'a>)
    }
}
