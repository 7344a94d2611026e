//! Convert a benchmark CSV attribute file to the `key value` format.
//!
//! The input carries a header line followed by one integer value per line;
//! the output pairs each value with its 0-indexed position.

use clap::Parser;
use rangehnsw_core::{Error, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "convert-attrs", about = "Convert CSV attributes to 'key value' format")]
struct Args {
    /// Input CSV with a header line and one integer value per line
    input: PathBuf,

    /// Output attribute file of 'key value' pairs
    output: PathBuf,
}

fn run(args: &Args) -> Result<()> {
    let reader = BufReader::new(File::open(&args.input)?);
    let mut values: Vec<i32> = Vec::new();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line_no == 0 || line.is_empty() {
            continue; // header line
        }
        let value: i32 = line.parse().map_err(|_| {
            Error::input_shape(format!(
                "{}:{}: invalid integer '{line}'",
                args.input.display(),
                line_no + 1
            ))
        })?;
        values.push(value);
    }

    let mut writer = BufWriter::new(File::create(&args.output)?);
    for (key, value) in values.iter().enumerate() {
        writeln!(writer, "{key} {value}")?;
    }
    writer.flush()?;

    println!("CONVERTED: {}", values.len());
    Ok(())
}

fn main() {
    let args = Args::parse();
    if let Err(e) = run(&args) {
        eprintln!("ERROR: {e}");
        std::process::exit(1);
    }
}
