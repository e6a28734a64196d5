//! molc entry point
//!
//! Parses arguments and dispatches via `cli::run`. The command has already
//! written its JSON error to stdout; the error is repeated on stderr and the
//! process exits non-zero.

use molecule_codec::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
