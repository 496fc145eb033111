//! tsvclean - truncate and deduplicate TSV datasets against a per-kind schema
//!
//! Usage:
//!   tsvclean <kind> <in.tsv> <out.tsv>
//!   tsvclean --schema extra.json --lenient <kind> - -
//!
//! A lone `-` for either path reads stdin / writes stdout.

use std::path::{Path, PathBuf};
use std::process::{self, ExitCode};

use anyhow::{Context, Result};
use argh::FromArgs;
use tracing_subscriber::EnvFilter;

use tsvclean::{clean_file, CleanError, SchemaRegistry, ShapePolicy, STDIO_PATH};

/// Exit status for an unknown kind, distinct from other failures.
const EXIT_UNKNOWN_KIND: u8 = 2;

/// Options that take the next argument as their value.
const VALUE_OPTIONS: &[&str] = &["--schema", "-s"];

/// tsvclean - truncate columns to byte limits and drop duplicate rows
#[derive(FromArgs)]
struct Args {
    /// dataset kind selecting the column limits (movies, people, workedon, ...)
    #[argh(positional)]
    kind: String,

    /// input TSV file, or - for stdin
    #[argh(positional)]
    input: PathBuf,

    /// output TSV file, or - for stdout
    #[argh(positional)]
    output: PathBuf,

    /// JSON file of additional kinds, merged over the built-in schema
    #[argh(option, short = 's')]
    schema: Option<PathBuf>,

    /// pad short rows and drop surplus fields instead of failing
    #[argh(switch)]
    lenient: bool,

    /// do not print the summary statistics
    #[argh(switch, short = 'q')]
    quiet: bool,
}

fn main() -> ExitCode {
    init_tracing();
    let args = parse_args();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            match e.downcast_ref::<CleanError>() {
                Some(CleanError::UnknownKind { .. }) => ExitCode::from(EXIT_UNKNOWN_KIND),
                _ => ExitCode::FAILURE,
            }
        }
    }
}

/// Parse the process arguments the way `argh::from_env` does, after moving
/// positionals behind `--` so a lone `-` is not taken for a flag.
fn parse_args() -> Args {
    let strings: Vec<String> = std::env::args_os()
        .map(|s| s.into_string())
        .collect::<Result<Vec<_>, _>>()
        .unwrap_or_else(|arg| {
            eprintln!("Invalid utf8: {}", arg.to_string_lossy());
            process::exit(1)
        });

    let cmd = strings
        .first()
        .and_then(|s| Path::new(s).file_name())
        .and_then(|s| s.to_str())
        .unwrap_or("tsvclean");
    let argv = separate_stdio_positionals(strings.get(1..).unwrap_or_default());
    let argv: Vec<&str> = argv.iter().map(String::as_str).collect();

    Args::from_args(&[cmd], &argv).unwrap_or_else(|early_exit| match early_exit.status {
        Ok(()) => {
            println!("{}", early_exit.output);
            process::exit(0)
        }
        Err(()) => {
            eprintln!(
                "{}\nRun {} --help for more information.",
                early_exit.output, cmd
            );
            process::exit(1)
        }
    })
}

/// argh rejects a lone `-` as an unrecognized flag. When one is present,
/// rebuild the arguments as `<options> -- <positionals>`.
fn separate_stdio_positionals(args: &[String]) -> Vec<String> {
    if !args.iter().any(|a| a == STDIO_PATH) {
        return args.to_vec();
    }

    let mut options = Vec::new();
    let mut positionals = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--" {
            positionals.extend(iter.by_ref().cloned());
            break;
        }
        if arg.starts_with('-') && arg != STDIO_PATH {
            options.push(arg.clone());
            if VALUE_OPTIONS.contains(&arg.as_str()) {
                options.extend(iter.next().cloned());
            }
        } else {
            positionals.push(arg.clone());
        }
    }

    options.push("--".to_string());
    options.extend(positionals);
    options
}

/// Log to stderr, filtered by `RUST_LOG` (default: warnings only).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run(args: &Args) -> Result<()> {
    let mut registry = SchemaRegistry::builtin();
    if let Some(ref path) = args.schema {
        let extra = SchemaRegistry::load(path)
            .with_context(|| format!("Failed to load schema: {}", path.display()))?;
        registry = registry.merge(extra);
    }

    // Resolve the kind before touching either stream.
    let limits = registry.limits_for(&args.kind)?;

    let policy = if args.lenient {
        ShapePolicy::Lenient
    } else {
        ShapePolicy::Strict
    };

    let summary = clean_file(limits, &args.input, &args.output, policy)
        .with_context(|| {
            format!(
                "Failed to clean {} → {} as '{}'",
                args.input.display(),
                args.output.display(),
                args.kind
            )
        })?;

    let done = format!(
        "Cleaned {}: {} → {}",
        args.kind,
        args.input.display(),
        args.output.display()
    );
    if args.output.as_os_str() == STDIO_PATH {
        eprintln!("{}", done);
    } else {
        println!("{}", done);
    }

    if !args.quiet {
        eprintln!("\n📊 Clean Summary:");
        eprintln!("   Rows read:          {}", summary.rows_read);
        eprintln!("   Rows written:       {}", summary.rows_written);
        eprintln!(
            "   Duplicates dropped: {} ({:.1}%)",
            summary.duplicates_dropped,
            summary.dedup_ratio() * 100.0
        );
        eprintln!("   Fields truncated:   {}", summary.fields_truncated);
        if summary.rows_repaired > 0 {
            eprintln!("   Rows repaired:      {}", summary.rows_repaired);
        }
    }

    Ok(())
}
