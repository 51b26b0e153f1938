use std::path::PathBuf;

use anyhow::{Context, Result, bail};

/// Moduli of the small catalog dataset when none are given.
const DEFAULT_MODULI: [i64; 4] = [3, 4, 5, 6];
const DEFAULT_ROWS: i64 = 1000;

struct Args {
    output: PathBuf,
    rows: i64,
    moduli: Vec<i64>,
}

fn parse_args() -> Result<Args> {
    let mut args = std::env::args().skip(1);
    let output = PathBuf::from(args.next().unwrap_or_else(|| "dataset_small.csv".to_string()));
    let rows = match args.next() {
        Some(raw) => raw
            .parse::<i64>()
            .with_context(|| format!("row count {raw:?} is not an integer"))?,
        None => DEFAULT_ROWS,
    };
    if rows < 0 {
        bail!("row count must not be negative, got {rows}");
    }

    let mut moduli = Vec::new();
    for raw in args {
        let modulus = raw
            .parse::<i64>()
            .with_context(|| format!("modulus {raw:?} is not an integer"))?;
        if modulus <= 0 {
            bail!("modulus must be positive, got {modulus}");
        }
        moduli.push(modulus);
    }
    if moduli.is_empty() {
        moduli = DEFAULT_MODULI.to_vec();
    }

    Ok(Args {
        output,
        rows,
        moduli,
    })
}

fn main() -> Result<()> {
    let args = parse_args().context("usage: generate_sample <output.csv> <rows> <modulus>...")?;

    let mut writer = csv::Writer::from_path(&args.output)
        .with_context(|| format!("Failed to create {}", args.output.display()))?;

    let mut header = vec!["number".to_string()];
    header.extend(args.moduli.iter().map(|m| format!("mod{m}")));
    writer.write_record(&header)?;

    for number in 1..=args.rows {
        let mut record = Vec::with_capacity(args.moduli.len() + 1);
        record.push(number.to_string());
        record.extend(args.moduli.iter().map(|m| (number % m).to_string()));
        writer.write_record(&record)?;
    }
    writer.flush()?;

    println!(
        "Wrote {} rows ({} filter columns) to {}",
        args.rows,
        args.moduli.len(),
        args.output.display()
    );
    Ok(())
}
