use std::path::PathBuf;

use clap::Parser;

use feedmark::cli::{self, EXIT_FAILURE};
use feedmark::config::{ValidateOptions, MIN_LINKS};
use feedmark::validate::{outcome, validate};

#[derive(Parser, Debug)]
#[command(
    name = "validate_source",
    version,
    about = "Check a markdown feed list before converting it to OPML"
)]
struct Args {
    /// Markdown feed list to check
    #[arg(value_name = "MARKDOWN_FILE")]
    markdown_file: PathBuf,

    /// Reject the file when it has fewer valid feed links than this
    #[arg(long, value_name = "N", default_value_t = MIN_LINKS)]
    min_links: usize,
}

fn main() {
    cli::init_tracing();
    let args: Args = cli::parse_args();

    println!("Validating file: {}", args.markdown_file.display());

    let options = ValidateOptions {
        min_links: args.min_links,
    };
    let result = validate(&args.markdown_file, &options, |skipped| {
        println!(
            "warning: line {} has a non-feed link: {}",
            skipped.line, skipped.feed.url
        );
    });

    let (ok, message, link_count) = outcome(&result);
    tracing::debug!(ok, link_count, "Validation finished");
    println!("{message}");

    if ok {
        println!("✅ validation passed");
    } else {
        println!("❌ validation failed");
        std::process::exit(EXIT_FAILURE);
    }
}
