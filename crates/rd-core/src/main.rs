//! reqdump - replay recorded exchanges through the request dumper
//!
//! Commands:
//! - `replay`: dump recorded request/response exchanges
//! - `check-config`: validate the resolved configuration and print the
//!   effective filters

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use rd_config::{load_config, ConfigOptions, DumperConfig, LoadedConfig};
use rd_core::logging::{init_logging, LogConfig, LogFormat, LogLevel};
use rd_core::{
    load_exchanges, replay, CoreError, ExitCode, LogSink, RequestDumper, TracingSink, WriterSink,
};
use rd_redact::FieldClass;
use tracing::{debug, info};

/// Request/response attribute dumper with field-level redaction
#[derive(Parser)]
#[command(name = "reqdump")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Config file (TOML, or JSON with a .json extension)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Regex for parameter names to mask ("" disables)
    #[arg(long, global = true)]
    param_filter: Option<String>,

    /// Regex for cookie names to mask ("" disables)
    #[arg(long, global = true)]
    cookie_filter: Option<String>,

    /// Regex for request header names to mask ("" disables)
    #[arg(long, global = true)]
    request_header_filter: Option<String>,

    /// Regex for response header names to mask ("" disables)
    #[arg(long, global = true)]
    response_header_filter: Option<String>,

    /// Log level for diagnostics
    #[arg(long, global = true)]
    log_level: Option<LogLevel>,

    /// Log format for diagnostics (human, jsonl)
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,
}

#[derive(Subcommand)]
enum Commands {
    /// Dump recorded exchanges from a JSON file
    Replay(ReplayArgs),

    /// Validate configuration and print the effective filters
    CheckConfig,
}

#[derive(Args, Debug)]
struct ReplayArgs {
    /// JSON file holding an array of recorded exchanges
    file: PathBuf,

    /// Number of worker threads
    #[arg(long, default_value_t = 1)]
    workers: usize,

    /// Write dump lines through the logger instead of stdout
    #[arg(long)]
    via_log: bool,
}

fn main() {
    let cli = Cli::parse();

    let log_config = LogConfig::from_env(cli.global.log_level, cli.global.log_format);
    init_logging(&log_config);

    let exit_code = match cli.command {
        Commands::Replay(ref args) => run_replay(&cli.global, args),
        Commands::CheckConfig => run_check_config(&cli.global),
    };

    std::process::exit(exit_code.as_i32());
}

impl GlobalOpts {
    fn overrides(&self) -> DumperConfig {
        let mut overrides = DumperConfig::new();
        let flags = [
            (FieldClass::Parameter, &self.param_filter),
            (FieldClass::Cookie, &self.cookie_filter),
            (FieldClass::RequestHeader, &self.request_header_filter),
            (FieldClass::ResponseHeader, &self.response_header_filter),
        ];
        for (class, value) in flags {
            if let Some(pattern) = value {
                overrides.set_filter(class, pattern.as_str());
            }
        }
        overrides
    }

    fn load(&self) -> Result<LoadedConfig, CoreError> {
        let options = ConfigOptions {
            config_path: self.config.clone(),
            overrides: self.overrides(),
            no_discovery: false,
        };
        Ok(load_config(&options)?)
    }
}

fn report(error: &CoreError) -> ExitCode {
    match error {
        CoreError::Config(e) => match e.key() {
            Some(key) => eprintln!("reqdump: {} (error {}): {}", key, e.code(), e),
            None => eprintln!("reqdump: {} (error {})", e, e.code()),
        },
        _ => eprintln!("reqdump: {}", error),
    }
    error.exit_code()
}

fn run_replay(global: &GlobalOpts, args: &ReplayArgs) -> ExitCode {
    if args.workers == 0 {
        eprintln!("reqdump: --workers must be at least 1");
        return ExitCode::ArgsError;
    }

    let loaded = match global.load() {
        Ok(loaded) => loaded,
        Err(e) => return report(&e),
    };
    let exchanges = match load_exchanges(&args.file) {
        Ok(exchanges) => exchanges,
        Err(e) => return report(&e),
    };
    debug!(
        file = %args.file.display(),
        exchanges = exchanges.len(),
        workers = args.workers,
        "replaying exchanges"
    );

    let outcome = if args.via_log {
        replay_with(&loaded.config, TracingSink, &exchanges, args.workers)
    } else {
        replay_with(&loaded.config, WriterSink::stdout(), &exchanges, args.workers)
    };

    match outcome {
        Ok(summary) => {
            info!(
                completed = summary.completed,
                failed = summary.failed,
                panicked = summary.panicked,
                "replay finished"
            );
            if !summary.is_complete() {
                eprintln!(
                    "reqdump: {} replay worker(s) panicked; {} exchange(s) not dumped",
                    summary.panicked, summary.lost
                );
                ExitCode::InternalError
            } else if summary.failed > 0 {
                ExitCode::PipelineFailed
            } else {
                ExitCode::Clean
            }
        }
        Err(e) => report(&e),
    }
}

fn replay_with<S: LogSink>(
    config: &DumperConfig,
    sink: S,
    exchanges: &[rd_core::RecordedExchange],
    workers: usize,
) -> Result<rd_core::ReplaySummary, CoreError> {
    let dumper = RequestDumper::from_config(config, sink)?;
    Ok(replay(&dumper, exchanges, workers))
}

fn run_check_config(global: &GlobalOpts) -> ExitCode {
    let loaded = match global.load() {
        Ok(loaded) => loaded,
        Err(e) => return report(&e),
    };
    let policy = match loaded.config.build_policy() {
        Ok(policy) => policy,
        Err(e) => return report(&CoreError::from(e)),
    };

    match loaded.path {
        Some(ref path) => println!("source: {} ({})", loaded.source, path.display()),
        None => println!("source: {}", loaded.source),
    }
    for class in FieldClass::ALL {
        println!(
            "{}={}",
            class.config_key(),
            policy.pattern(class).unwrap_or_default()
        );
    }
    println!("timestampZone={}", loaded.config.zone());
    println!("extendedResponse={}", loaded.config.extended());
    ExitCode::Clean
}
