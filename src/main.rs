// ==============================================================================
// CLI for the Proto Schema Generator
// ==============================================================================
//
//   structproto -p <package> [-p <package>...] -f <dir> [options]
//
// Loads the named packages from JSON manifests, derives one message per
// exported struct type, and writes `<dir>/output.proto`. Long flags are
// spelled with a single dash (`-filter`); the double-dash forms work too.

use std::ffi::OsString;
use std::path::PathBuf;

use miette::WrapErr;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use structproto::emit::check_output_dir;
use structproto::{DuplicatePolicy, ManifestLoader, NameStrategy, ProtoGen};

const USAGE: &str = "\
Usage: structproto -p <package> [-p <package>...] -f <dir> [options]

Derive proto3 messages from exported struct types and write <dir>/output.proto.

Options:
  -p <package>       Package to scan; repeatable. `path/...` includes
                     sub-packages, `file.json` reads a manifest directly.
  -f <dir>           Output directory; must already exist.
  -filter <text>     Only types whose name contains <text>.
  -I <dir>           Extra directory to search for *.pkg.json manifests;
                     repeatable.
  -package <name>    Proto package name [default: proto].
  -legacy-names      Trim type names the way earlier generators did.
  -strict            Fail when two types map to the same message name.
  -h, -help          Print this help.
  -V, -version       Print the version.

Set RUST_LOG (e.g. RUST_LOG=debug) for log output on stderr.
";

/// Long flags that may be written with a single dash.
const LONG_FLAGS: &[&str] = &[
    "filter",
    "package",
    "legacy-names",
    "strict",
    "help",
    "version",
];

/// Flags whose next argument is their value.
const VALUE_FLAGS: &[&str] = &["p", "f", "I", "filter", "package"];

// ==============================================================================
// Argument Parsing
// ==============================================================================

#[derive(Debug, Default, PartialEq, Eq)]
struct Args {
    packages: Vec<String>,
    out_dir: PathBuf,
    filter: String,
    search_dirs: Vec<PathBuf>,
    proto_package: Option<String>,
    legacy_names: bool,
    strict: bool,
}

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Run(Args),
    Help,
    Version,
}

/// Rewrite `-filter` style arguments to `--filter` so lexopt sees them as
/// long options. Values of value-taking flags are passed through untouched.
fn normalize_args(args: impl IntoIterator<Item = OsString>) -> Vec<OsString> {
    let mut out = Vec::new();
    let mut pending_value = false;
    let mut positional = false;

    for arg in args {
        if pending_value || positional {
            pending_value = false;
            out.push(arg);
            continue;
        }
        let Some(s) = arg.to_str() else {
            out.push(arg);
            continue;
        };
        if s == "--" {
            positional = true;
            out.push(arg);
            continue;
        }

        let (flag, has_inline_value) = match s.split_once('=') {
            Some((flag, _)) => (flag, true),
            None => (s, false),
        };
        let name = flag
            .strip_prefix("--")
            .or_else(|| flag.strip_prefix('-'))
            .unwrap_or("");
        pending_value = !has_inline_value && VALUE_FLAGS.contains(&name);

        if !flag.starts_with("--") && LONG_FLAGS.contains(&name) {
            out.push(format!("-{s}").into());
        } else {
            out.push(arg);
        }
    }
    out
}

fn parse_args(args: impl IntoIterator<Item = OsString>) -> Result<Command, lexopt::Error> {
    use lexopt::prelude::*;

    let mut parsed = Args::default();
    let mut out_dir = None;
    let mut parser = lexopt::Parser::from_args(normalize_args(args));

    while let Some(arg) = parser.next()? {
        match arg {
            Short('p') => parsed.packages.push(parser.value()?.string()?),
            Short('f') => out_dir = Some(PathBuf::from(parser.value()?)),
            Short('I') => parsed.search_dirs.push(PathBuf::from(parser.value()?)),
            Long("filter") => parsed.filter = parser.value()?.string()?,
            Long("package") => parsed.proto_package = Some(parser.value()?.string()?),
            Long("legacy-names") => parsed.legacy_names = true,
            Long("strict") => parsed.strict = true,
            Short('h') | Long("help") => return Ok(Command::Help),
            Short('V') | Long("version") => return Ok(Command::Version),
            _ => return Err(arg.unexpected()),
        }
    }

    if parsed.packages.is_empty() {
        return Err("no source packages given (-p)".into());
    }
    parsed.out_dir = out_dir.ok_or("no output directory given (-f)")?;
    Ok(Command::Run(parsed))
}

// ==============================================================================
// Entry Point
// ==============================================================================

fn main() -> miette::Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(miette::MietteHandlerOpts::new().build())
    }))?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args = match parse_args(std::env::args_os().skip(1)) {
        Ok(Command::Run(args)) => args,
        Ok(Command::Help) => {
            print!("{USAGE}");
            return Ok(());
        }
        Ok(Command::Version) => {
            println!("structproto {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Err(e) => {
            eprintln!("error: {e}\n");
            eprint!("{USAGE}");
            std::process::exit(1);
        }
    };

    run(args)
}

fn run(args: Args) -> miette::Result<()> {
    let working_dir = std::env::current_dir()
        .map_err(|e| miette::miette!("{e}"))
        .wrap_err("determine current directory")?;

    // Fail on a bad output directory before doing any loading work.
    check_output_dir(&args.out_dir)?;

    let mut loader = ManifestLoader::new();
    for dir in args.search_dirs {
        loader.search_dir(dir);
    }

    let mut generator = ProtoGen::new();
    generator.filter(args.filter);
    if args.legacy_names {
        generator.name_strategy(NameStrategy::LegacyTrim);
    }
    if args.strict {
        generator.duplicate_policy(DuplicatePolicy::Reject);
    }
    if let Some(package) = args.proto_package {
        generator.proto_package(package);
    }

    let output = generator.load_and_generate(&loader, &working_dir, &args.packages)?;
    for warning in &output.warnings {
        eprintln!("{warning:?}");
    }
    output.write(&args.out_dir)?;
    Ok(())
}
