use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use polars::prelude::*;

/// Columns the analysis reads, in the published dataset's naming.
const COLUMNS_OF_INTEREST: [&str; 16] = [
    "공사규모",
    "발생형태",
    "기인물(대)",
    "기인물(중)",
    "기인물(소)",
    "소업종명",
    "규모",
    "직종",
    "연령",
    "성별",
    "근속기간",
    "재해요일",
    "재해시간",
    "재해개요",
    "시설물(대)",
    "근로자수",
];

/// Rows without these are useless to the graph and are dropped.
const REQUIRED_COLUMNS: [&str; 4] = ["공사규모", "발생형태", "기인물(대)", "소업종명"];

#[derive(Parser, Debug)]
#[command(about = "Select and clean the accident dataset columns")]
struct Args {
    /// Raw accident dataset.
    #[arg(default_value = "translated_file.csv")]
    input: PathBuf,

    /// Where to write the cleaned CSV.
    #[arg(default_value = "accidents_cleaned.csv")]
    output: PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let df = CsvReader::from_path(&args.input)
        .with_context(|| format!("opening {}", args.input.display()))?
        .infer_schema(None)
        .has_header(true)
        .finish()?;
    let total = df.height();

    let mut new_df = df
        .select(COLUMNS_OF_INTEREST)?
        .drop_nulls(Some(&REQUIRED_COLUMNS[..]))?;

    println!(
        "kept {} of {} rows ({} missing a required column)",
        new_df.height(),
        total,
        total - new_df.height()
    );
    println!("{:?}", new_df.head(Some(5)));

    let mut file = File::create(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;
    CsvWriter::new(&mut file).finish(&mut new_df)?;

    Ok(())
}
