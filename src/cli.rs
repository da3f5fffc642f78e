use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Reshape wide parcel exports into one row per parcel",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Melt numbered parcel column groups into one row per parcel
    Reshape(ReshapeArgs),
    /// Report which numbered column groups an input file contains
    Discover(DiscoverArgs),
    /// Write the parcel schema (attribute vocabulary) as YAML
    Schema(SchemaArgs),
}

#[derive(Debug, Args)]
pub struct ReshapeArgs {
    /// Input file with numbered parcel columns ('-' for stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Output file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Comma-separated columns kept unchanged on every parcel row
    #[arg(short = 'k', long = "fixed-columns", action = clap::ArgAction::Append)]
    pub fixed_columns: Vec<String>,
    /// YAML file overriding the default parcel schema
    #[arg(short, long)]
    pub schema: Option<PathBuf>,
    /// Field delimiter of the input (defaults to tab)
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Field delimiter of the output (defaults to ';')
    #[arg(long = "output-delimiter", value_parser = parse_delimiter)]
    pub output_delimiter: Option<u8>,
    /// Decimal separator for numbers in the output
    #[arg(long = "decimal-separator", default_value_t = ',', value_parser = parse_decimal_separator)]
    pub decimal_separator: char,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Render the first rows of the result as a table instead of writing it
    #[arg(long)]
    pub preview: bool,
    /// Number of rows shown by --preview
    #[arg(long, default_value_t = 5)]
    pub rows: usize,
}

#[derive(Debug, Args)]
pub struct DiscoverArgs {
    /// Input file to inspect ('-' for stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// YAML file overriding the default parcel schema
    #[arg(short, long)]
    pub schema: Option<PathBuf>,
    /// Field delimiter of the input (defaults to tab)
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Emit the report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct SchemaArgs {
    /// Destination YAML file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
}

/// Splits repeated, comma-separated column arguments into trimmed names.
pub fn split_column_list(values: &[String]) -> Vec<String> {
    values
        .iter()
        .flat_map(|s| s.split(','))
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" | "\\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}

pub fn parse_decimal_separator(value: &str) -> Result<char, String> {
    match value {
        "." | "dot" => Ok('.'),
        "," | "comma" => Ok(','),
        other => Err(format!("Decimal separator must be '.' or ',' (got '{other}')")),
    }
}
