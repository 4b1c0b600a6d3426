//! Reduce a given lambda calculus expression to normal form and print every
//! step to standard output.
//!
//! Example usage:
//!
//!     cargo run -- "+ 2 3"
//!     cargo run -- --src-filepath program.lc --max-steps 1000

use clap::Parser;
use lambda_calc_normalizer::end_to_end::{run_interpreter_on_large_stack, InterpreterConfig};
use tracing::Level;

fn main() {
    let interpreter_config = InterpreterConfig::parse();

    let log_level = match interpreter_config.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .init();

    match run_interpreter_on_large_stack(interpreter_config) {
        Ok(transcript) => {
            println!("{}", transcript);
        }

        Err(run_error) => {
            println!("{}", run_error);
            std::process::exit(1);
        }
    }
}
