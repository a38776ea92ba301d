use std::error::Error;
use std::io::{BufRead, BufWriter, IsTerminal, Write};
use std::path::PathBuf;
use std::str::FromStr;

use clap::Parser;
use env_logger::Builder;
use kuromoji::{Dictionary, LoadPolicy, Tokenizer};
use log::LevelFilter;

#[derive(Clone, Debug)]
enum OutputMode {
    Mecab,
    Wakati,
    Detail,
}

impl FromStr for OutputMode {
    type Err = &'static str;
    fn from_str(mode: &str) -> Result<Self, Self::Err> {
        match mode {
            "mecab" => Ok(Self::Mecab),
            "wakati" => Ok(Self::Wakati),
            "detail" => Ok(Self::Detail),
            _ => Err("Could not parse a mode"),
        }
    }
}

#[derive(Parser, Debug)]
#[clap(name = "tokenize", version, about = "Predicts morphemes")]
struct Args {
    /// Directory of the compiled dictionary segments.
    #[clap(short = 'i', long)]
    dict_dir: PathBuf,

    /// Output mode. Choices are mecab, wakati, and detail.
    #[clap(short = 'O', long, default_value = "mecab")]
    output_mode: OutputMode,

    /// Maximum length of unknown words.
    #[clap(short = 'M', long)]
    max_grouping_len: Option<usize>,

    /// Fails instead of tokenizing with a degraded dictionary.
    #[clap(long)]
    strict: bool,

    /// Increases the log verbosity (-v, -vv).
    #[clap(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
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

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_logger(args.verbose);

    eprintln!("Loading the dictionary...");
    let policy = if args.strict {
        LoadPolicy::Strict
    } else {
        LoadPolicy::Lenient
    };
    let dict = Dictionary::load_segments(&args.dict_dir, policy)?;
    if !dict.is_complete() {
        log::warn!(
            "tokenizing with a degraded dictionary, missing {:?}",
            dict.degraded_segments()
        );
    }

    let tokenizer = Tokenizer::new(dict).max_grouping_len(args.max_grouping_len.unwrap_or(0));

    eprintln!("Ready to tokenize");

    let is_tty = std::io::stdout().is_terminal();

    let out = std::io::stdout();
    let mut out = BufWriter::new(out.lock());
    let lines = std::io::stdin().lock().lines();
    for line in lines {
        let line = line?;
        let tokens = tokenizer.tokenize(&line);
        match args.output_mode {
            OutputMode::Mecab => {
                for t in &tokens {
                    writeln!(&mut out, "{}", t.to_mecab_line())?;
                }
                out.write_all(b"EOS\n")?;
            }
            OutputMode::Wakati => {
                for (i, t) in tokens.iter().enumerate() {
                    if i != 0 {
                        out.write_all(b" ")?;
                    }
                    out.write_all(t.surface_form.as_bytes())?;
                }
                out.write_all(b"\n")?;
            }
            OutputMode::Detail => {
                for t in &tokens {
                    writeln!(
                        &mut out,
                        "{}\tposition={}\tword_type={:?}\tword_id={}\tleft_id={}\tright_id={}\tword_cost={}\ttotal_cost={}",
                        t.to_mecab_line(),
                        t.word_position,
                        t.word_type,
                        t.word_id,
                        t.left_id,
                        t.right_id,
                        t.word_cost,
                        t.total_cost,
                    )?;
                }
                out.write_all(b"EOS\n")?;
            }
        }
        if is_tty {
            out.flush()?;
        }
    }

    Ok(())
}
