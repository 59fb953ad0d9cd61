use std::{path::PathBuf, process::ExitCode};

use clap::{Args, Parser, Subcommand};
use staticbundle_cli::{Command, ConfigFormat, load_bundle_config, render_text, run, select_source_sets};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    commands: Commands,

    /// Increase log verbosity (-v debug, -vv trace); `RUST_LOG` takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

/// Supported subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Check resources and configuration without writing anything.
    Validate(SourceSetArgs),

    /// Validate, then write one Rust source file per source set.
    Generate(SourceSetArgs),
}

#[derive(Args, Debug)]
struct SourceSetArgs {
    /// Bundle config file (.toml, .yaml, .yml or .json)
    #[arg(short, long)]
    config: PathBuf,

    /// Force the config format instead of inferring it from the extension
    #[arg(long, value_enum)]
    config_format: Option<ConfigFormat>,

    /// Directory holding one resource subdirectory per source set
    #[arg(short, long)]
    input: PathBuf,

    /// Directory receiving one artifact subdirectory per source set
    #[arg(short, long)]
    output: PathBuf,

    /// Only process these source sets (repeatable); all when omitted
    #[arg(short, long = "source-set")]
    source_set: Vec<String>,

    /// Print reports as JSON on stdout
    #[arg(long)]
    json: bool,
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "staticbundle=info,staticbundle_cli=info",
        1 => "staticbundle=debug,staticbundle_cli=debug",
        _ => "staticbundle=trace,staticbundle_cli=trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let (command, args) = match cli.commands {
        Commands::Validate(args) => (Command::Validate, args),
        Commands::Generate(args) => (Command::Generate, args),
    };

    let source_sets = match load_bundle_config(&args.config, args.config_format)
        .and_then(|config| select_source_sets(config, &args.source_set))
    {
        Ok(source_sets) => source_sets,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    debug!(count = source_sets.len(), ?command, "processing source sets");

    let reports = run(command, source_sets, &args.input, &args.output);

    if args.json {
        match serde_json::to_string_pretty(&reports) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        print!("{}", render_text(&reports));
    }

    if reports.iter().all(|r| r.is_success()) {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
