// ==============================================================================
// Type Filter: Which Declarations Become Messages
// ==============================================================================
//
// A declaration becomes a message when it is an exported, top-level type
// declaration whose underlying shape is a struct and whose qualified type
// string lives in (or under) the package being scanned. Types are deduplicated
// on the full qualified string, first seen wins, and the optional name filter
// is applied last.
//
// Nothing here promises an order. Declarations arrive in whatever order the
// loader produced them; the assembler's sort is what makes output stable.

use std::collections::HashSet;

use crate::model::{DeclKind, Declaration, Package, StructField};

/// How a message's display name is derived from its qualified type string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NameStrategy {
    /// Remove the declaring package path as a whole prefix, plus the
    /// separator that follows it.
    #[default]
    PathPrefix,
    /// Left-trim every character that occurs anywhere in the package path.
    ///
    /// This over-strips names whose leading characters also appear in the
    /// path (in package `github.com/Acme/Models`, type `Account` becomes
    /// `nt`), but it is what earlier generators emitted, so it is kept for
    /// byte-compatible output.
    LegacyTrim,
}

impl NameStrategy {
    /// Derive the display name of `qualified`, declared in package `pkg_path`.
    pub fn message_name(self, qualified: &str, pkg_path: &str) -> String {
        match self {
            NameStrategy::PathPrefix => qualified
                .strip_prefix(pkg_path)
                .and_then(|rest| rest.strip_prefix(['.', '/']))
                .unwrap_or(qualified)
                .to_string(),
            NameStrategy::LegacyTrim => qualified
                .trim_start_matches(|c: char| pkg_path.contains(c))
                .to_string(),
        }
    }
}

/// A declaration that passed every eligibility rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EligibleType<'a> {
    /// Display name for the message.
    pub name: String,
    /// The full qualified type string.
    pub qualified: &'a str,
    pub fields: &'a [StructField],
}

/// Why a declaration was not turned into a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Skip {
    NotTypeDecl,
    Unexported,
    NotStruct,
    ForeignPackage,
    AlreadySeen,
    Filtered,
}

impl Skip {
    fn reason(self) -> &'static str {
        match self {
            Skip::NotTypeDecl => "not a type declaration",
            Skip::Unexported => "not exported",
            Skip::NotStruct => "underlying type is not a struct",
            Skip::ForeignPackage => "type is not defined in this package",
            Skip::AlreadySeen => "type already seen",
            Skip::Filtered => "name does not match filter",
        }
    }
}

/// Collect every eligible struct type across `packages`.
///
/// `filter` is a case-sensitive substring of the declaration name; an empty
/// filter accepts everything.
pub fn eligible_types<'a>(
    packages: &'a [Package],
    filter: &str,
    strategy: NameStrategy,
) -> Vec<EligibleType<'a>> {
    let mut seen: HashSet<&'a str> = HashSet::new();
    let mut out = Vec::new();

    for pkg in packages {
        for decl in &pkg.declarations {
            match check(pkg, decl, filter, &mut seen) {
                Ok(fields) => out.push(EligibleType {
                    name: strategy.message_name(&decl.ty.name, &pkg.path),
                    qualified: &decl.ty.name,
                    fields,
                }),
                Err(skip) => tracing::debug!(
                    package = %pkg.path,
                    declaration = %decl.name,
                    reason = skip.reason(),
                    "skipping declaration"
                ),
            }
        }
    }

    out
}

/// Apply the eligibility rules to one declaration, recording it in `seen`
/// once it is known to be a struct type of this package.
fn check<'a>(
    pkg: &Package,
    decl: &'a Declaration,
    filter: &str,
    seen: &mut HashSet<&'a str>,
) -> Result<&'a [StructField], Skip> {
    if decl.kind != DeclKind::Type {
        return Err(Skip::NotTypeDecl);
    }
    if !decl.is_exported() {
        return Err(Skip::Unexported);
    }
    let fields = decl.ty.struct_fields().ok_or(Skip::NotStruct)?;
    if !defined_in(&decl.ty.name, &pkg.path) {
        return Err(Skip::ForeignPackage);
    }
    if !seen.insert(&decl.ty.name) {
        return Err(Skip::AlreadySeen);
    }
    if !filter.is_empty() && !decl.name.contains(filter) {
        return Err(Skip::Filtered);
    }
    Ok(fields)
}

/// Whether the package component of `qualified` (everything before the last
/// `.`) is `pkg_path` or a sub-path of it. `example.com/apparel` is not under
/// `example.com/app`. Unqualified strings never match.
fn defined_in(qualified: &str, pkg_path: &str) -> bool {
    match qualified.rsplit_once('.') {
        Some((type_pkg, _)) => {
            type_pkg == pkg_path
                || type_pkg
                    .strip_prefix(pkg_path)
                    .is_some_and(|rest| rest.starts_with('/'))
        }
        None => false,
    }
}
