use clap::{Parser, ValueEnum};
use klog_core::*;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "klog")]
#[command(about = "Write a leveled log record to the console, a file or a store", long_about = None)]
struct Cli {
    /// Where records go
    #[arg(long, value_enum, default_value_t = BackendArg::Console)]
    backend: BackendArg,

    /// File path for the file backend, address for the store backend
    #[arg(long, required_if_eq_any([("backend", "file"), ("backend", "store")]))]
    target: Option<String>,

    /// Store password
    #[arg(long, requires = "target")]
    password: Option<String>,

    /// Store database index
    #[arg(long, default_value_t = 0)]
    db: i64,

    /// Minimum severity that is written
    #[arg(long, default_value = "info", value_parser = parse_severity)]
    level: Severity,

    /// Preset (standard, verbose, none) or list of shortfile,date,time,color
    #[arg(long, default_value = "standard", value_parser = parse_flags)]
    flags: FormatFlags,

    /// Text written before every record
    #[arg(long, default_value = "")]
    prefix: String,

    /// Never color output
    #[arg(long)]
    no_color: bool,

    /// Severity of the record (debug, info, warn, error, fatal)
    #[arg(value_parser = parse_severity)]
    severity: Severity,

    /// Message words, joined by spaces
    #[arg(required = true)]
    message: Vec<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum BackendArg {
    Console,
    File,
    Store,
}

fn parse_severity(s: &str) -> std::result::Result<Severity, String> {
    s.parse().map_err(|e: Error| e.to_string())
}

fn parse_flags(s: &str) -> std::result::Result<FormatFlags, String> {
    s.parse().map_err(|e: Error| e.to_string())
}

fn main() -> ExitCode {
    // Initialize diagnostics
    klog_core::diagnostics::init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let log = logger();
    let target = cli.target.as_deref().unwrap_or_default();

    match cli.backend {
        BackendArg::Console => {}
        BackendArg::File => log.set_backend(BackendKind::File, target)?,
        BackendArg::Store => log.set_remote_store(target, cli.password.as_deref(), cli.db)?,
    }
    tracing::debug!("Logging to {} backend", log.backend_kind());

    log.set_level(cli.level)
        .set_flags(cli.flags)
        .set_prefix(cli.prefix);
    if cli.no_color {
        log.set_color_enabled(false);
    }

    let words: Vec<&dyn std::fmt::Display> = cli
        .message
        .iter()
        .map(|word| word as &dyn std::fmt::Display)
        .collect();

    match cli.severity {
        Severity::Fatal => log.fatal(&words),
        severity => {
            log.log(severity, Message::Values(&words))?;
        }
    }
    Ok(())
}
