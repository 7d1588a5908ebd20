//! Sums or multiplies integers given on the command line.
//!
//! ```text
//! accumulate 1 2 3 --sum     # Result: 6
//! accumulate 2 3 4 -m        # Result: 24
//! ```

mod logging;

use std::ffi::OsString;
use std::process::ExitCode;

use argparse_core::{ArgParser, Store};

fn build_parser(values: &Store<Vec<i32>>, sum: &Store<bool>, mult: &Store<bool>) -> ArgParser {
    let mut parser = ArgParser::new("Program");
    parser
        .add_int_argument("--N", "")
        .multi_value(1)
        .positional()
        .store_values(values.clone());
    parser
        .add_flag_with_short("-s", "--sum", "add args")
        .store_value(sum.clone());
    parser
        .add_flag_with_short("-m", "--mult", "multiply args")
        .store_value(mult.clone());
    parser.add_help("Program accumulate arguments");
    parser
}

fn product(values: &[i32]) -> Option<i64> {
    values
        .iter()
        .try_fold(1i64, |acc, &value| acc.checked_mul(i64::from(value)))
}

/// Collects arguments as text, rejecting the first one that is not UTF-8.
fn utf8_args(args: impl IntoIterator<Item = OsString>) -> Result<Vec<String>, OsString> {
    args.into_iter().map(OsString::into_string).collect()
}

fn main() -> ExitCode {
    logging::init();

    let values = Store::new(Vec::new());
    let sum = Store::new(false);
    let mult = Store::new(false);
    let mut parser = build_parser(&values, &sum, &mult);

    let Ok(args) = utf8_args(std::env::args_os()) else {
        eprintln!("error: argument is not valid UTF-8");
        return ExitCode::FAILURE;
    };

    if !parser.parse(args) {
        println!("{}", parser.help_description());
        return ExitCode::FAILURE;
    }

    if parser.help() {
        println!("{}", parser.help_description());
        return ExitCode::SUCCESS;
    }

    let values = values.take();
    if sum.get() {
        let total: i64 = values.iter().copied().map(i64::from).sum();
        println!("Result: {total}");
    } else if mult.get() {
        match product(&values) {
            Some(total) => println!("Result: {total}"),
            None => {
                eprintln!("error: product does not fit in a 64-bit integer");
                return ExitCode::FAILURE;
            }
        }
    } else {
        println!("No one options had chosen");
        print!("{}", parser.help_description());
    }

    ExitCode::SUCCESS
}
