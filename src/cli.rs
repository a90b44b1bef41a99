use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use shelf_library::import::Format;
use std::path::PathBuf;

/// Keep a small library catalog in sync with Open Library.
#[derive(Debug, Parser)]
#[command(name = "shelf", version, about)]
pub struct Cli {
    /// Catalog database, overriding the configured location.
    #[arg(short, long, global = true)]
    pub database: Option<PathBuf>,
    /// Configuration file (defaults to shelf.toml in the platform config directory).
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
    /// More output; repeat for even more. `RUST_LOG` takes precedence.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Command,
}
impl Cli {
    /// Default log directive for the requested verbosity.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create the catalog, or bring its schema up to date.
    Migrate,
    /// Look up and catalog every identifier in a file, one per line.
    Import {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long, value_enum, default_value_t = InputFormat::Isbn)]
        format: InputFormat,
        /// Write lines that could not be imported here, verbatim.
        #[arg(short, long)]
        exceptions: Option<PathBuf>,
        /// Do everything except commit to the catalog.
        #[arg(long)]
        dry_run: bool,
    },
    /// Look up a single ISBN and print the result without cataloguing it.
    Lookup { isbn: String },
    /// Write the catalog as CSV.
    Export {
        /// Destination file, or `-` for standard output.
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Print every catalogued book.
    List,
    /// Correct catalogued data.
    Update {
        #[command(subcommand)]
        target: UpdateCommand,
    },
    /// Remove a book from the catalog. Its authors are kept.
    Delete {
        #[arg(short, long)]
        olid: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum UpdateCommand {
    /// Rename an author everywhere they appear.
    Author {
        #[arg(short, long)]
        old: String,
        #[arg(short, long)]
        new: String,
    },
    /// Override the displayed title of a book.
    Title {
        #[arg(short, long)]
        olid: String,
        #[arg(short, long)]
        title: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InputFormat {
    Isbn,
    Olid,
}
impl From<InputFormat> for Format {
    fn from(format: InputFormat) -> Self {
        match format {
            InputFormat::Isbn => Self::Isbn,
            InputFormat::Olid => Self::Olid,
        }
    }
}
