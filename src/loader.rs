// ==============================================================================
// Package Loading
// ==============================================================================
//
// The generator works on already type-checked package metadata and does not
// care where it came from. `PackageLoader` is the seam: hand it package
// identifiers and a working directory, get back packages or a fatal error.
//
// `ManifestLoader` is the loader the CLI uses. It reads packages exported as
// JSON manifests (the format of `model::package`). Identifiers are resolved
// as follows:
//   1. `something.json`  -- a manifest path, relative to the working directory.
//   2. `a/b/...`         -- package `a/b` and every package beneath it.
//   3. anything else     -- exactly the package with that import path.
// Import-path identifiers are looked up in an index of every `*.pkg.json`
// file under the working directory and the extra search directories.
//
// Manifests may contain C-style comments, and hold either a single package
// object or an array of them.

use std::fs;
use std::io::Read as _;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use miette::{Result, WrapErr};
use walkdir::{DirEntry, WalkDir};

use crate::error::{Error, ManifestDiagnostic};
use crate::model::Package;
use crate::suggest::closest;

/// File-name suffix of manifests picked up by directory indexing.
pub const MANIFEST_SUFFIX: &str = ".pkg.json";

/// Produces type-checked package metadata for a set of package identifiers.
pub trait PackageLoader {
    /// Load every package named by `patterns`, resolved against
    /// `working_dir`. Fails on the first identifier that cannot be loaded.
    fn load(&self, working_dir: &Path, patterns: &[String]) -> Result<Vec<Package>>;
}

/// Already-loaded packages, e.g. metadata produced in-process.
impl PackageLoader for [Package] {
    fn load(&self, _working_dir: &Path, patterns: &[String]) -> Result<Vec<Package>> {
        if patterns.is_empty() {
            return Err(Error::NoPackages.into());
        }
        let index: IndexMap<String, Package> = self
            .iter()
            .map(|p| (p.path.clone(), p.clone()))
            .collect();
        let mut out = Vec::new();
        for pattern in patterns {
            out.extend(select(&index, pattern)?);
        }
        Ok(out)
    }
}

// ==============================================================================
// Manifest Loader
// ==============================================================================

/// Loads packages from JSON manifests on disk.
#[derive(Debug, Clone, Default)]
pub struct ManifestLoader {
    search_dirs: Vec<PathBuf>,
}

impl ManifestLoader {
    pub fn new() -> Self {
        ManifestLoader::default()
    }

    /// Also index manifests under `dir`. Relative directories are resolved
    /// against the working directory at load time.
    pub fn search_dir(&mut self, dir: impl Into<PathBuf>) -> &mut Self {
        self.search_dirs.push(dir.into());
        self
    }

    /// Build the import-path index: every `*.pkg.json` under the working
    /// directory and each search directory, first definition of a path wins.
    fn index(&self, working_dir: &Path) -> Result<IndexMap<String, Package>> {
        let mut index = IndexMap::new();
        let roots = std::iter::once(working_dir.to_path_buf())
            .chain(self.search_dirs.iter().map(|d| working_dir.join(d)));

        for root in roots {
            for path in manifest_paths(&root) {
                for pkg in read_manifest(&path)? {
                    if index.contains_key(&pkg.path) {
                        tracing::debug!(
                            package = %pkg.path,
                            manifest = %path.display(),
                            "package already indexed, ignoring later definition"
                        );
                        continue;
                    }
                    index.insert(pkg.path.clone(), pkg);
                }
            }
        }

        tracing::debug!(packages = index.len(), "indexed manifests");
        Ok(index)
    }
}

impl PackageLoader for ManifestLoader {
    fn load(&self, working_dir: &Path, patterns: &[String]) -> Result<Vec<Package>> {
        if patterns.is_empty() {
            return Err(Error::NoPackages.into());
        }

        let is_file = |p: &String| p.ends_with(".json");
        let index = if patterns.iter().all(is_file) {
            IndexMap::new()
        } else {
            self.index(working_dir)?
        };

        let mut out = Vec::new();
        for pattern in patterns {
            if is_file(pattern) {
                out.extend(read_manifest(&working_dir.join(pattern))?);
            } else {
                out.extend(select(&index, pattern)?);
            }
        }

        tracing::info!(packages = out.len(), "loaded packages");
        Ok(out)
    }
}

/// Pick the packages named by an import-path pattern.
fn select(index: &IndexMap<String, Package>, pattern: &str) -> Result<Vec<Package>> {
    let matched: Vec<Package> = match pattern.strip_suffix("...") {
        Some(prefix) => {
            let base = prefix.trim_end_matches('/');
            index
                .values()
                .filter(|p| {
                    base.is_empty()
                        || p.path == base
                        || p.path
                            .strip_prefix(base)
                            .is_some_and(|rest| rest.starts_with('/'))
                })
                .cloned()
                .collect()
        }
        None => index.get(pattern).cloned().into_iter().collect(),
    };

    if matched.is_empty() {
        let target = pattern.trim_end_matches("/...");
        return Err(Error::PackageNotFound {
            pattern: pattern.to_string(),
            suggestion: closest(target, index.keys().map(String::as_str)).map(str::to_string),
        }
        .into());
    }
    Ok(matched)
}

/// Every manifest file under `root`, in sorted file-name order. Hidden
/// directories and `target/` are not descended into.
fn manifest_paths(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_skipped_dir(e))
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.file_name().to_string_lossy().ends_with(MANIFEST_SUFFIX))
        .map(DirEntry::into_path)
        .collect()
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    let name = entry.file_name().to_string_lossy();
    entry.file_type().is_dir() && (name.starts_with('.') || name == "target")
}

/// Read one manifest file.
pub fn read_manifest(path: &Path) -> Result<Vec<Package>> {
    let source = fs::read_to_string(path).map_err(|source| Error::ManifestRead {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(manifest = %path.display(), "reading manifest");
    parse_manifest(&source, &path.display().to_string())
        .wrap_err_with(|| format!("load {}", path.display()))
}

/// Parse manifest text. `name` labels the source in diagnostics.
pub fn parse_manifest(source: &str, name: &str) -> Result<Vec<Package>> {
    // Comments are blanked out rather than removed, so line/column positions
    // in the stripped text still point into `source`.
    let mut stripped = String::with_capacity(source.len());
    json_comments::CommentSettings::c_style()
        .strip_comments(source.as_bytes())
        .read_to_string(&mut stripped)
        .map_err(|e| miette::miette!("strip comments from {name}: {e}"))?;

    let parsed = if stripped.trim_start().starts_with('[') {
        serde_json::from_str::<Vec<Package>>(&stripped)
    } else {
        serde_json::from_str::<Package>(&stripped).map(|p| vec![p])
    };

    parsed.map_err(|e| ManifestDiagnostic::from_json(name, source.to_string(), &e).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Declaration, StructField, Type};

    fn manifest(path: &str, types: &[&str]) -> String {
        let mut pkg = Package::new(path);
        for name in types {
            pkg = pkg.with(Declaration::type_decl(
                *name,
                Type::structure(
                    format!("{path}.{name}"),
                    vec![StructField::new("Id", Type::basic("int64"))],
                ),
            ));
        }
        serde_json::to_string_pretty(&pkg).expect("serialize manifest")
    }

    fn paths(pkgs: &[Package]) -> Vec<&str> {
        pkgs.iter().map(|p| p.path.as_str()).collect()
    }

    fn patterns(p: &[&str]) -> Vec<String> {
        p.iter().map(|s| s.to_string()).collect()
    }

    // =========================================================================
    // Manifest parsing
    // =========================================================================

    #[test]
    fn parse_single_package() {
        let pkgs = parse_manifest(&manifest("example.com/app/model", &["User"]), "<test>")
            .expect("valid manifest");
        assert_eq!(paths(&pkgs), ["example.com/app/model"]);
        assert_eq!(pkgs[0].declarations.len(), 1);
    }

    #[test]
    fn parse_package_array() {
        let src = format!(
            "[{}, {}]",
            manifest("example.com/a", &[]),
            manifest("example.com/b", &[])
        );
        let pkgs = parse_manifest(&src, "<test>").expect("valid manifest");
        assert_eq!(paths(&pkgs), ["example.com/a", "example.com/b"]);
    }

    #[test]
    fn comments_are_allowed() {
        let src = r#"
            // exported by hand
            {
                "path": "example.com/app/model", /* no declarations yet */
                "declarations": []
            }
        "#;
        let pkgs = parse_manifest(src, "<test>").expect("comments are stripped");
        assert_eq!(paths(&pkgs), ["example.com/app/model"]);
    }

    #[test]
    fn syntax_error_points_at_offending_token() {
        let src = "// header\n{\n  \"path\": ,\n}";
        let err = parse_manifest(src, "bad.pkg.json").expect_err("invalid JSON");
        let diag = err
            .downcast_ref::<ManifestDiagnostic>()
            .expect("manifest diagnostic");
        assert_eq!(diag.span.offset(), src.find(',').expect("has a comma"));
    }

    #[test]
    fn missing_field_is_reported() {
        let err = parse_manifest(r#"{ "declarations": [] }"#, "<test>").expect_err("no path");
        assert!(
            format!("{err}").contains("missing field `path`"),
            "got: {err}"
        );
    }

    // =========================================================================
    // Identifier resolution
    // =========================================================================

    #[test]
    fn json_identifier_loads_the_file() {
        let dir = tempfile::tempdir().expect("create temp dir");
        fs::write(
            dir.path().join("model.json"),
            manifest("example.com/app/model", &["User"]),
        )
        .expect("write manifest");

        let pkgs = ManifestLoader::new()
            .load(dir.path(), &patterns(&["model.json"]))
            .expect("load by file");
        assert_eq!(paths(&pkgs), ["example.com/app/model"]);
    }

    #[test]
    fn import_path_is_found_by_indexing() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let sub = dir.path().join("nested");
        fs::create_dir(&sub).expect("create subdir");
        fs::write(
            sub.join("model.pkg.json"),
            manifest("example.com/app/model", &["User"]),
        )
        .expect("write manifest");
        fs::write(
            dir.path().join("view.pkg.json"),
            manifest("example.com/app/view", &[]),
        )
        .expect("write manifest");

        let pkgs = ManifestLoader::new()
            .load(dir.path(), &patterns(&["example.com/app/model"]))
            .expect("load by import path");
        assert_eq!(paths(&pkgs), ["example.com/app/model"]);
    }

    #[test]
    fn ellipsis_matches_sub_packages_only_at_path_boundaries() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let src = format!(
            "[{}, {}, {}]",
            manifest("example.com/app", &[]),
            manifest("example.com/app/model", &[]),
            manifest("example.com/apparel", &[]),
        );
        fs::write(dir.path().join("all.pkg.json"), src).expect("write manifest");

        let pkgs = ManifestLoader::new()
            .load(dir.path(), &patterns(&["example.com/app/..."]))
            .expect("load pattern");
        assert_eq!(paths(&pkgs), ["example.com/app", "example.com/app/model"]);
    }

    #[test]
    fn search_dirs_are_indexed() {
        let work = tempfile::tempdir().expect("create temp dir");
        let extra = tempfile::tempdir().expect("create temp dir");
        fs::write(
            extra.path().join("dep.pkg.json"),
            manifest("example.com/dep", &[]),
        )
        .expect("write manifest");

        let pkgs = ManifestLoader::new()
            .search_dir(extra.path())
            .load(work.path(), &patterns(&["example.com/dep"]))
            .expect("found via search dir");
        assert_eq!(paths(&pkgs), ["example.com/dep"]);
    }

    #[test]
    fn hidden_and_target_dirs_are_not_indexed() {
        let dir = tempfile::tempdir().expect("create temp dir");
        for skipped in [".cache", "target"] {
            let sub = dir.path().join(skipped);
            fs::create_dir(&sub).expect("create subdir");
            fs::write(sub.join("x.pkg.json"), manifest("example.com/hidden", &[]))
                .expect("write manifest");
        }
        let err = ManifestLoader::new()
            .load(dir.path(), &patterns(&["example.com/hidden"]))
            .expect_err("hidden manifests are ignored");
        assert!(format!("{err}").contains("package not found"), "got: {err}");
    }

    #[test]
    fn first_definition_of_a_path_wins() {
        let dir = tempfile::tempdir().expect("create temp dir");
        fs::write(
            dir.path().join("a.pkg.json"),
            manifest("example.com/app/model", &["First"]),
        )
        .expect("write manifest");
        fs::write(
            dir.path().join("b.pkg.json"),
            manifest("example.com/app/model", &["Second"]),
        )
        .expect("write manifest");

        let pkgs = ManifestLoader::new()
            .load(dir.path(), &patterns(&["example.com/app/model"]))
            .expect("load");
        assert_eq!(pkgs.len(), 1);
        assert_eq!(pkgs[0].declarations[0].name, "First");
    }

    // =========================================================================
    // Failures
    // =========================================================================

    #[test]
    fn no_patterns_is_a_configuration_error() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let err = ManifestLoader::new()
            .load(dir.path(), &[])
            .expect_err("no packages");
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::NoPackages)
        ));
    }

    #[test]
    fn unknown_package_suggests_a_close_match() {
        let dir = tempfile::tempdir().expect("create temp dir");
        fs::write(
            dir.path().join("model.pkg.json"),
            manifest("example.com/app/model", &[]),
        )
        .expect("write manifest");

        let err = ManifestLoader::new()
            .load(dir.path(), &patterns(&["example.com/app/modle"]))
            .expect_err("unknown package");
        match err.downcast_ref::<Error>() {
            Some(Error::PackageNotFound {
                pattern,
                suggestion,
            }) => {
                assert_eq!(pattern, "example.com/app/modle");
                assert_eq!(suggestion.as_deref(), Some("example.com/app/model"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_manifest_file_is_a_load_error() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let err = ManifestLoader::new()
            .load(dir.path(), &patterns(&["missing.json"]))
            .expect_err("missing file");
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::ManifestRead { .. })
        ));
    }

    #[test]
    fn malformed_manifest_in_index_fails_the_load() {
        let dir = tempfile::tempdir().expect("create temp dir");
        fs::write(dir.path().join("broken.pkg.json"), "{ nope").expect("write manifest");
        let err = ManifestLoader::new()
            .load(dir.path(), &patterns(&["example.com/app/model"]))
            .expect_err("broken manifest");
        let rendered = format!("{err:?}");
        assert!(rendered.contains("broken.pkg.json"), "got: {rendered}");
    }

    // =========================================================================
    // In-memory packages
    // =========================================================================

    #[test]
    fn slices_of_packages_are_loaders() {
        let pkgs = vec![
            Package::new("example.com/app/model"),
            Package::new("example.com/app/view"),
        ];
        let loaded = pkgs
            .as_slice()
            .load(Path::new("."), &patterns(&["example.com/app/view"]))
            .expect("select from memory");
        assert_eq!(paths(&loaded), ["example.com/app/view"]);
    }
}
