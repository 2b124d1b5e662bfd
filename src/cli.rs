//! Plumbing shared by the `validate_source` and `convert_to_opml` binaries.

use clap::error::ErrorKind;
use clap::Parser;

/// Exit code for every failure, usage errors included.
pub const EXIT_FAILURE: i32 = 1;

/// Initialize tracing for debug logging.
///
/// Verbosity comes from `RUST_LOG`. Logs go to stderr so stdout carries only
/// operator messages.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}

/// Parses command-line arguments.
///
/// Wrong arity and unknown flags print usage to stdout and exit with
/// [`EXIT_FAILURE`] instead of clap's default code 2. `--help` and
/// `--version` exit 0 as usual.
pub fn parse_args<T: Parser>() -> T {
    match T::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => {
            print!("{}", e.render());
            std::process::exit(EXIT_FAILURE);
        }
    }
}
