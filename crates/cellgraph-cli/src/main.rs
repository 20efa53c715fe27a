//! cellgraph CLI - run edit scripts against a sheet

mod script;

use anyhow::{Context, Result};
use cellgraph::Sheet;
use clap::{Parser, Subcommand};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::script::{parse_line, Command};

#[derive(Parser)]
#[command(name = "cellgraph")]
#[command(author, version, about = "Run spreadsheet edit scripts and print the result")]
struct Cli {
    /// Log every committed and rejected edit to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply a script and print the sheet
    Run {
        /// Script file, or '-' for stdin
        script: PathBuf,

        /// Print cell texts instead of values
        #[arg(short, long)]
        texts: bool,

        /// Report rejected edits and continue instead of stopping
        #[arg(short, long)]
        keep_going: bool,
    },

    /// Apply a script and print the printable size as ROWSxCOLS
    Size {
        /// Script file, or '-' for stdin
        script: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Run {
            script,
            texts,
            keep_going,
        } => run(&script, texts, keep_going),
        Commands::Size { script } => show_size(&script),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(script: &Path, texts: bool, keep_going: bool) -> Result<()> {
    let sheet = load_sheet(script, keep_going)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let written = if texts {
        sheet.print_texts(&mut out)
    } else {
        sheet.print_values(&mut out)
    };
    written.context("Failed to write to stdout")?;
    out.flush().context("Failed to write to stdout")?;

    Ok(())
}

fn show_size(script: &Path) -> Result<()> {
    let sheet = load_sheet(script, false)?;
    let size = sheet.printable_size();
    println!("{}x{}", size.rows, size.cols);
    Ok(())
}

fn load_sheet(script: &Path, keep_going: bool) -> Result<Sheet> {
    let reader: Box<dyn BufRead> = if script.as_os_str() == "-" {
        Box::new(BufReader::new(io::stdin()))
    } else {
        let file = std::fs::File::open(script)
            .with_context(|| format!("Failed to open '{}'", script.display()))?;
        Box::new(BufReader::new(file))
    };

    let mut sheet = Sheet::new();
    let mut rejected = 0usize;

    for (index, line) in reader.lines().enumerate() {
        let line_no = index + 1;
        let line = line.with_context(|| format!("Failed to read line {}", line_no))?;

        let outcome = parse_line(&line).and_then(|command| match command {
            Some(Command::Set { pos, text }) => Ok(sheet.set_cell(pos, &text)?),
            Some(Command::Clear { pos }) => Ok(sheet.clear_cell(pos)?),
            None => Ok(()),
        });

        if let Err(e) = outcome {
            if !keep_going {
                return Err(e.context(format!("line {}", line_no)));
            }
            warn!("line {}: {:#}", line_no, e);
            rejected += 1;
        }
    }

    if rejected > 0 {
        eprintln!("{} command(s) rejected", rejected);
    }
    info!(cells = sheet.len(), rejected, "script applied");

    Ok(sheet)
}
