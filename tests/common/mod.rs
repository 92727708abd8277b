// ==============================================================================
// Shared Test Helpers
// ==============================================================================
//
// Common utility functions used across multiple integration test files.
//
// Each test file that imports this module compiles its own copy, so not every
// function is used in every binary. Suppress the resulting dead_code warnings.
#![allow(dead_code)]
// Import this module in each test file with:
//
//     mod common;
//     use common::{fixtures_dir, render_diagnostic};

use std::fmt::Write;
use std::path::PathBuf;

use miette::{GraphicalReportHandler, GraphicalTheme};

pub const MODEL: &str = "example.com/app/model";
pub const VIEW: &str = "example.com/app/view";
pub const ACME: &str = "github.com/Acme/Models";

/// Absolute path of `tests/fixtures`, independent of the test's working
/// directory.
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

/// Package identifiers as the loader expects them.
pub fn patterns(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|s| s.to_string()).collect()
}

/// Render a single diagnostic to a deterministic string for snapshot tests.
/// Uses non-unicode theme at 80 columns.
pub fn render_diagnostic(report: &miette::Report) -> String {
    let handler = GraphicalReportHandler::new_themed(GraphicalTheme::none()).with_width(80);
    let mut buf = String::new();
    handler
        .render_report(&mut buf, report.as_ref())
        .expect("render to String is infallible");
    buf
}

/// Render multiple diagnostics, separated by blank lines.
pub fn render_diagnostics(reports: &[miette::Report]) -> String {
    let mut buf = String::new();
    for (i, r) in reports.iter().enumerate() {
        if i > 0 {
            writeln!(buf).expect("write to String is infallible");
        }
        buf.push_str(&render_diagnostic(r));
    }
    buf
}
