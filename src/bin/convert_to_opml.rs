use std::path::PathBuf;

use clap::Parser;

use feedmark::cli::{self, EXIT_FAILURE};
use feedmark::config::{ConvertOptions, OPML_TITLE};
use feedmark::convert::{convert, ConvertError};

#[derive(Parser, Debug)]
#[command(
    name = "convert_to_opml",
    version,
    about = "Convert a markdown feed list into an OPML subscription file"
)]
struct Args {
    /// Markdown feed list to read
    #[arg(value_name = "INPUT_MD_FILE")]
    input: PathBuf,

    /// OPML file to write
    #[arg(value_name = "OUTPUT_OPML_FILE")]
    output: PathBuf,

    /// Text of the OPML <head><title> element
    #[arg(long, value_name = "TEXT", default_value = OPML_TITLE)]
    title: String,
}

fn main() {
    cli::init_tracing();
    let args: Args = cli::parse_args();

    println!("Parsing {}...", args.input.display());

    let options = ConvertOptions { title: args.title };
    match convert(&args.input, &args.output, &options) {
        Ok(summary) => {
            println!(
                "Found {} categories, {} feeds",
                summary.category_count, summary.total_feeds
            );
            println!("Wrote {}", args.output.display());
            println!("Done!");
            for (name, count) in &summary.categories {
                println!("  {name}: {count} feeds");
            }
        }
        Err(ConvertError::NoFeeds { categories }) => {
            println!("Found {categories} categories, 0 feeds");
            println!("warning: no valid feed links found!");
            std::process::exit(EXIT_FAILURE);
        }
        Err(e) => {
            tracing::error!(error = %e, "Conversion failed");
            println!("error: {e}");
            std::process::exit(EXIT_FAILURE);
        }
    }
}
