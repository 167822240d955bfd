//! Command-line front end for the host I/O operators.
//!
//! Arguments are JSON documents: arrays become tuples, objects records, and
//! strings, booleans, and integers map to the matching scalar.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use ioutils::io::config::{DEFAULT_CONFIG_PATH, IoConfig, load_config, write_config};
use ioutils::operators::OPERATORS;
use ioutils::{IoUtils, Value, exit_codes, logging};

#[derive(Parser)]
#[command(
    name = "ioutils",
    version,
    about = "Run evaluator I/O operators from the command line"
)]
struct Cli {
    /// Config file (missing file means defaults).
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Log debug diagnostics to stderr when `RUST_LOG` is unset.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Invoke an operator, e.g. `call IOExec '["echo","hi"]'`.
    Call {
        /// Operator identifier (see `operators`).
        operator: String,
        /// One JSON document per operator argument.
        args: Vec<String>,
        /// Print the result as JSON instead of surface syntax.
        #[arg(long)]
        json: bool,
    },
    /// List operator identifiers and their arity.
    Operators,
    /// List registered serializer backends in lookup order.
    Backends,
    /// Write the default config to `--config`.
    Init {
        /// Replace an existing file.
        #[arg(long)]
        force: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init(if cli.verbose {
        logging::VERBOSE_FILTER
    } else {
        logging::DEFAULT_FILTER
    });
    if let Err(err) = run(cli) {
        eprintln!("{:#}", err);
        std::process::exit(exit_codes::INVALID);
    }
    std::process::exit(exit_codes::OK);
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Call {
            operator,
            args,
            json,
        } => {
            let io = context(&cli.config)?;
            cmd_call(&io, &operator, &args, json)
        }
        Command::Operators => {
            for (name, arity) in OPERATORS {
                println!("{name}/{arity}");
            }
            Ok(())
        }
        Command::Backends => {
            let io = context(&cli.config)?;
            for type_name in io.registry().types() {
                println!("{type_name}");
            }
            Ok(())
        }
        Command::Init { force } => cmd_init(&cli.config, force),
    }
}

fn cmd_init(path: &std::path::Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "{} already exists (pass --force to replace it)",
            path.display()
        );
    }
    write_config(path, &IoConfig::default())
        .with_context(|| format!("initialize {}", path.display()))?;
    println!("{}", path.display());
    Ok(())
}

fn context(config_path: &std::path::Path) -> Result<IoUtils> {
    let cfg = load_config(config_path)?;
    IoUtils::new(&cfg).context("initialize operators")
}

fn cmd_call(io: &IoUtils, operator: &str, raw_args: &[String], json: bool) -> Result<()> {
    let args = raw_args
        .iter()
        .enumerate()
        .map(|(i, raw)| parse_arg(raw).with_context(|| format!("argument {}", i + 1)))
        .collect::<Result<Vec<_>>>()?;
    let result = io.call(operator, &args)?;
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&result.to_json()).context("serialize result")?
        );
    } else {
        println!("{result}");
    }
    Ok(())
}

fn parse_arg(raw: &str) -> Result<Value> {
    let json: serde_json::Value = serde_json::from_str(raw).context("parse json")?;
    Ok(Value::from_json(&json)?)
}
