//! Page
//!
//! Full-screen terminal pager.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use page::app::Config;
use page::core::Document;
use page::tty::{self, Tty, TtyInput, TtyOutput};
use page::{ErrorKind, PagerError, PagerSession};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Exit status for terminal I/O failures
const EXIT_TERMINAL: u8 = 1;
/// Exit status when the document cannot be read
const EXIT_DOCUMENT: u8 = 2;
/// Exit status for bad command lines (EX_USAGE)
const EXIT_USAGE: u8 = 64;

/// Command-line arguments
#[derive(Default)]
struct Args {
    file: Option<PathBuf>,
    config: Option<PathBuf>,
    tab_width: Option<usize>,
    line_numbers: bool,
    spacing: Option<usize>,
    help: bool,
}

fn parse_args() -> Result<Args, String> {
    let argv: Vec<String> = std::env::args().skip(1).collect();
    let mut args = Args::default();

    let mut i = 0;
    while i < argv.len() {
        match argv[i].as_str() {
            "-h" | "--help" => {
                args.help = true;
            }
            "-n" | "--line-numbers" => {
                args.line_numbers = true;
            }
            "-t" | "--tab-width" => {
                i += 1;
                args.tab_width = Some(parse_number(&argv, i, "--tab-width")?);
            }
            "-s" | "--spacing" => {
                i += 1;
                args.spacing = Some(parse_number(&argv, i, "--spacing")?);
            }
            "-c" | "--config" => {
                i += 1;
                let path = argv.get(i).ok_or("--config needs a path")?;
                args.config = Some(PathBuf::from(path));
            }
            other if other.starts_with('-') && other != "-" => {
                return Err(format!("unknown option '{}'", other));
            }
            other => {
                if args.file.is_some() {
                    return Err("only one file can be paged".to_string());
                }
                args.file = Some(PathBuf::from(other));
            }
        }
        i += 1;
    }

    Ok(args)
}

fn parse_number(argv: &[String], i: usize, flag: &str) -> Result<usize, String> {
    argv.get(i)
        .and_then(|value| value.parse().ok())
        .ok_or_else(|| format!("{} needs a number", flag))
}

fn print_help() {
    println!("Page - full-screen terminal pager");
    println!();
    println!("Usage: page [OPTIONS] FILE");
    println!();
    println!("Options:");
    println!("  -t, --tab-width <N>   Tab stop interval (default: 4)");
    println!("  -n, --line-numbers    Number each line");
    println!("  -s, --spacing <N>     Rows per source line (default: 1)");
    println!("  -c, --config <PATH>   Read configuration from PATH");
    println!("  -h, --help            Show this help message");
    println!();
    println!("Keys: arrows move, Home/End, PgUp/PgDn, q / Ctrl-Q / Enter quit.");
}

fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(message) => {
            eprintln!("page: {}", message);
            eprintln!("Try 'page --help' for more information.");
            return ExitCode::from(EXIT_USAGE);
        }
    };

    if args.help {
        print_help();
        return ExitCode::SUCCESS;
    }

    let mut config = match &args.config {
        Some(path) => match Config::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("page: {}: {}", path.display(), e);
                return ExitCode::from(EXIT_USAGE);
            }
        },
        None => Config::load_or_default(),
    };
    if let Some(tab_width) = args.tab_width {
        config.load.tab_width = tab_width;
    }
    if let Some(spacing) = args.spacing {
        config.load.line_spacing = spacing;
    }
    config.load.line_numbers |= args.line_numbers;

    let Some(file) = args.file else {
        eprintln!("page: no file given");
        eprintln!("Try 'page --help' for more information.");
        return ExitCode::from(EXIT_USAGE);
    };

    match run(&file, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("page: {}", e);
            match e.kind() {
                ErrorKind::TerminalIo => ExitCode::from(EXIT_TERMINAL),
                ErrorKind::Document => ExitCode::from(EXIT_DOCUMENT),
            }
        }
    }
}

fn run(file: &Path, config: &Config) -> Result<(), PagerError> {
    let document = Document::load(file, &config.load)?;

    if !Tty::is_terminal() {
        return dump(&document);
    }

    let _cleanup = tty::install_cleanup_handlers()?;
    let resized = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(signal_hook::consts::SIGWINCH, Arc::clone(&resized))
        .map_err(PagerError::Signals)?;

    let mut session = PagerSession::new(
        Tty::new(config.read_timeout_ds),
        TtyInput,
        TtyOutput,
        config,
    )
    .with_resize_flag(resized);
    session.run(&document)
}

/// Print the prepared document when stdout is not a terminal
fn dump(document: &Document) -> Result<(), PagerError> {
    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    for line in document.lines() {
        writeln!(out, "{}", line).map_err(PagerError::Write)?;
    }
    out.flush().map_err(PagerError::Write)
}
