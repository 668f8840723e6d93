//! tapejit CLI - command-line interface for the tapejit translator

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

use tapejit_core::config::CONFIG_FILE_NAME;
use tapejit_core::jit::Translator;
use tapejit_core::{Backend, Config, StdIo};

mod dump;
mod logging;

#[derive(Parser)]
#[command(name = "tapejit")]
#[command(version = tapejit_core::VERSION)]
#[command(about = "Just-in-time translator for the eight-symbol tape language", long_about = None)]
struct Cli {
    /// Configuration file (defaults to ./tapejit.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Translate and run a program file
    Run {
        /// Path to the source file ("-" reads stdin)
        file: PathBuf,

        #[command(flatten)]
        overrides: Overrides,
    },

    /// Translate and run an inline program
    Eval {
        /// Program text
        source: String,

        #[command(flatten)]
        overrides: Overrides,
    },

    /// Print the generated machine code as hex without running it
    Dump {
        /// Path to the source file ("-" reads stdin)
        file: PathBuf,
    },

    /// Check bracket structure without translating
    Check {
        /// Path to the source file ("-" reads stdin)
        file: PathBuf,
    },
}

/// Per-invocation settings that take precedence over the config file
#[derive(Args, Debug, Default)]
struct Overrides {
    /// Tape length in bytes
    #[arg(long)]
    tape_size: Option<usize>,

    /// Byte stored by ',' at end of input
    #[arg(long)]
    eof_byte: Option<u8>,

    /// Use the reference interpreter instead of native code
    #[arg(long)]
    interpret: bool,
}

impl Overrides {
    fn apply(&self, mut config: Config) -> Config {
        if let Some(tape_size) = self.tape_size {
            config = config.with_tape_size(tape_size);
        }
        if let Some(eof_byte) = self.eof_byte {
            config = config.with_eof_byte(eof_byte);
        }
        if self.interpret {
            config = config.with_backend(Backend::Interpreter);
        }
        config
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match &cli.command {
        Commands::Run { file, overrides } => {
            let source = read_source(file)?;
            let config = overrides.apply(load_config(cli.config.as_deref())?);
            run(&source, &config)?;
        }

        Commands::Eval { source, overrides } => {
            let config = overrides.apply(load_config(cli.config.as_deref())?);
            run(source, &config)?;
        }

        Commands::Dump { file } => {
            let source = read_source(file)?;
            let code = Translator::new()
                .translate(&source)
                .with_context(|| format!("failed to translate {}", file.display()))?;
            print!("{}", dump::hex_dump(code.bytes()));
        }

        Commands::Check { file } => {
            let source = read_source(file)?;
            let program = tapejit_core::interp::Program::parse(&source)
                .with_context(|| format!("{} is not well formed", file.display()))?;
            println!("{}: ok ({} instructions)", file.display(), program.len());
        }
    }

    Ok(())
}

fn run(source: &str, config: &Config) -> Result<()> {
    debug!(
        source_bytes = source.len(),
        tape_size = config.tape_size,
        eof_byte = config.eof_byte,
        backend = ?config.backend,
        "running program"
    );
    let mut io = StdIo::new();
    tapejit_core::run_source(source, config, &mut io).context("program failed")
}

/// Read a program from a file, or from stdin for "-"
fn read_source(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read program from stdin")?;
        return Ok(buf);
    }
    debug!(path = %path.display(), "reading program");
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Load the explicit config file, or `./tapejit.toml` if it exists
fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let path = explicit.unwrap_or(Path::new(CONFIG_FILE_NAME));
    let config = match explicit {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => Config::load_or_default(path)
            .with_context(|| format!("failed to load {CONFIG_FILE_NAME}"))?,
    };
    debug!(
        path = %path.display(),
        tape_size = config.tape_size,
        eof_byte = config.eof_byte,
        backend = ?config.backend,
        "loaded configuration"
    );
    Ok(config)
}
