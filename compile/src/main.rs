use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser;
use env_logger::Builder;
use kuromoji::SystemDictionaryBuilder;
use kuromoji::errors::KuromojiError;
use log::LevelFilter;

#[derive(Parser, Debug)]
#[clap(
    name = "compile",
    version,
    about = "A program to compile the system dictionary into a segment directory."
)]
struct Args {
    /// System lexicon file (lex.csv).
    #[clap(short = 'l', long)]
    lexicon_in: PathBuf,

    /// Matrix definition file (matrix.def).
    #[clap(short = 'm', long)]
    matrix_in: PathBuf,

    /// Unknown word definition file (unk.def).
    #[clap(short = 'u', long)]
    unk_in: PathBuf,

    /// Character definition file (char.def).
    #[clap(short = 'c', long)]
    char_in: PathBuf,

    /// Directory to which the compressed segments are output.
    #[clap(short = 'o', long)]
    out_dir: PathBuf,

    /// Fails when any source line is skipped.
    #[clap(long)]
    deny_diagnostics: bool,

    /// Increases the log verbosity (-v, -vv).
    #[clap(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, thiserror::Error)]
enum CompileError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Dictionary building failed: {0}")]
    Kuromoji(#[from] KuromojiError),

    #[error("{0} source lines were skipped")]
    Diagnostics(usize),
}

fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    Builder::new()
        .filter_level(level)
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .init();
}

fn main() -> Result<(), CompileError> {
    let args = Args::parse();
    init_logger(args.verbose);

    eprintln!("Compiling the system dictionary...");
    let (dict, diagnostics) = SystemDictionaryBuilder::from_readers_with_diagnostics(
        File::open(&args.lexicon_in)?,
        File::open(&args.matrix_in)?,
        File::open(&args.char_in)?,
        File::open(&args.unk_in)?,
    )?;
    if !diagnostics.is_empty() {
        eprintln!("Skipped {} source lines", diagnostics.len());
        if args.deny_diagnostics {
            return Err(CompileError::Diagnostics(diagnostics.len()));
        }
    }

    eprintln!("Writing the segments...");
    dict.write_segments(&args.out_dir)?;

    eprintln!(
        "Successfully compiled the dictionary to {}",
        args.out_dir.display()
    );
    Ok(())
}
