//! cstruct
//!
//! Builds a declaration model (structs, unions, enums and their members) from
//! C source files, the input stage for struct relationship diagrams.

mod fields;
mod frontend;
mod model;
mod utils;

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use log::{debug, info, warn};

use frontend::lexer::tokenize;
use model::{AnonymousProcessor, FileModel};

/// C declaration extractor
#[derive(Parser, Debug)]
#[command(name = "cstruct")]
#[command(version)]
#[command(about = "Extract struct, union and enum declarations from C sources")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input source file (.c/.h)
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Text, global = true)]
    format: Format,

    /// Keep anonymous members as encoded payloads instead of lifting them
    #[arg(long, global = true)]
    no_anonymous: bool,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Extract structs, unions and enums with their members
    Fields {
        /// Input source file
        input: PathBuf,
    },
    /// Print the significant tokens of a file
    Tokens {
        /// Input source file
        input: PathBuf,
    },
    /// Print enum definitions only
    Enums {
        /// Input source file
        input: PathBuf,
    },
    /// Print version information
    Version,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    if let Err(e) = run(&cli) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Some(Commands::Fields { input }) => print_model(input, cli),
        Some(Commands::Tokens { input }) => print_tokens(input, cli.format),
        Some(Commands::Enums { input }) => print_enums(input, cli.format),
        Some(Commands::Version) => {
            println!("cstruct {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        None => match &cli.input {
            Some(input) => print_model(input, cli),
            None => anyhow::bail!("no input file specified\nUsage: cstruct <FILE> or cstruct fields <FILE>"),
        },
    }
}

/// Read a source file. Bytes that are not UTF-8 are replaced rather than
/// rejected, since only declarations matter here.
fn read_source(path: &Path) -> anyhow::Result<String> {
    let bytes = fs::read(path)
        .map_err(utils::Error::from)
        .with_context(|| format!("reading {}", path.display()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn build_model(input: &Path, lift_anonymous: bool) -> anyhow::Result<FileModel> {
    let source = read_source(input)?;
    let (mut model, problems) = FileModel::from_source(input.display().to_string(), &source);
    if !problems.is_empty() {
        warn!("{}: skipped {} malformed declarations", input.display(), problems.len());
    }
    for problem in &problems {
        debug!("{}:{}: {}", input.display(), problem.line().unwrap_or(0), problem);
    }

    if lift_anonymous {
        let problems = AnonymousProcessor::new().process(&mut model);
        if !problems.is_empty() {
            warn!("{}: {} anonymous members left encoded", input.display(), problems.len());
        }
    } else {
        debug!("{}: {} anonymous members kept encoded", input.display(), model.anonymous_member_count());
    }

    info!("{}: model built", input.display());
    Ok(model)
}

fn print_model(input: &Path, cli: &Cli) -> anyhow::Result<()> {
    let model = build_model(input, !cli.no_anonymous)?;
    match cli.format {
        Format::Text => print!("{}", model),
        Format::Json => println!("{}", to_json(&model)?),
    }
    Ok(())
}

fn print_enums(input: &Path, format: Format) -> anyhow::Result<()> {
    let model = build_model(input, false)?;
    match format {
        Format::Text => model.enums.iter().for_each(|decl| print!("{}", decl)),
        Format::Json => println!("{}", to_json(&model.enums)?),
    }
    Ok(())
}

fn print_tokens(input: &Path, format: Format) -> anyhow::Result<()> {
    let source = read_source(input)?;
    let tokens: Vec<_> = tokenize(&source)
        .into_iter()
        .filter(|t| !t.is_trivia())
        .collect();

    match format {
        Format::Text => {
            for token in &tokens {
                println!("{:>5}:{:<4} {:<14} {}", token.line, token.column, format!("{:?}", token.category), token.text);
            }
        }
        Format::Json => println!("{}", to_json(&tokens)?),
    }
    Ok(())
}

fn to_json<T: serde::Serialize>(value: &T) -> anyhow::Result<String> {
    let json = serde_json::to_string_pretty(value)
        .map_err(utils::Error::from)
        .context("serializing output")?;
    Ok(json)
}
