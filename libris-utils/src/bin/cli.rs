use std::{
    io::{stdout, Write},
    path::PathBuf,
};
use structopt::StructOpt;
use tracing::Level;

use libris::{Classifier, Tally};
use libris_utils::{dump, Config};

pub type Result<T> = anyhow::Result<T>;

#[derive(StructOpt)]
#[structopt(about = "CLI to load book catalogs and compare name encodings")]
struct Opts {
    #[structopt(short, parse(from_occurrences = set_log_level), global = true)]
    #[allow(dead_code)] // log level will bet set in [`set_log_level`]
    /// Increase verbosity
    verbosity: u64,
    #[structopt(subcommand)]
    cmd: Command,
}

fn set_log_level(verbosity: u64) -> u64 {
    let level = match verbosity {
        0 => Level::ERROR,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
    verbosity
}

#[derive(StructOpt)]
enum Command {
    /// Load a books file, answer a search file and append the report
    Run {
        #[structopt(long)]
        /// Operations to build the catalog from [default: Ejemplo_lab01_books.csv]
        books: Option<PathBuf>,
        #[structopt(long)]
        /// Name queries [default: Ejemplo_lab01_search.csv]
        search: Option<PathBuf>,
        #[structopt(long)]
        /// Report file [default: output.txt]
        output: Option<PathBuf>,
        #[structopt(long)]
        /// Overwrite the report file instead of appending to it
        truncate: bool,
    },
    /// Load a books file and print the resulting tree
    Dump {
        #[structopt(long)]
        /// Operations to build the catalog from [default: Ejemplo_lab01_books.csv]
        books: Option<PathBuf>,
        #[structopt(long)]
        /// Print a graphviz graph instead of text
        dot: bool,
    },
    /// Print the size estimates for some names
    Estimate {
        /// The names to estimate
        names: Vec<String>,
    },
}

fn config(books: Option<PathBuf>) -> Config {
    let mut config = Config::default();
    if let Some(books) = books {
        config.books = books;
    }
    config
}

fn estimate(names: &[String]) -> Result<Tally> {
    let mut classifier = Classifier::new();
    let mut out = stdout();
    for name in names {
        let c = classifier.classify(name)?;
        let e = &c.estimate;
        writeln!(
            out,
            "{:?}: fixed {} bytes, huffman {} bits ({} bytes), arithmetic {} bytes, best {}{}",
            name,
            e.fixed,
            e.huffman_bits,
            e.huffman_bytes(),
            e.arithmetic,
            c.category
                .map(|category| category.to_string())
                .unwrap_or_else(|| "-".to_owned()),
            if c.tie { ", tie" } else { "" },
        )?;
    }
    Ok(*classifier.tally())
}

fn main() -> Result<()> {
    let opts = Opts::from_args();
    match opts.cmd {
        Command::Run {
            books,
            search,
            output,
            truncate,
        } => {
            let mut config = config(books);
            if let Some(search) = search {
                config.search = search;
            }
            if let Some(output) = output {
                config.output = output;
            }
            config.truncate = truncate;
            let tally = config.run()?;
            print!("{}", tally);
        }
        Command::Dump { books, dot } => {
            let config = config(books);
            let (catalog, stats) = config.load_catalog()?;
            eprintln!("{} books, {:?}", catalog.len(), stats);
            if dot {
                dump::graph(catalog.tree(), stdout())?;
            } else {
                dump::text(catalog.tree(), stdout())?;
            }
        }
        Command::Estimate { names } => {
            let tally = estimate(&names)?;
            print!("{}", tally);
        }
    }
    Ok(())
}
