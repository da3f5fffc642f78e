//! Delimited-text boundary around the reshape engine.
//!
//! - **Reading**: tab-separated input by default, decoded with `encoding_rs`
//!   (UTF-8 unless a label is given). Anything that cannot be read as a table
//!   surfaces as a [`ParseFailure`].
//! - **Writing**: `;`-separated output with `,` as the decimal separator by
//!   default. Nulls become empty fields.
//! - **stdin/stdout**: the `-` path convention routes through standard streams.

use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

use anyhow::{Context, Result, anyhow};
use encoding_rs::{Encoding, UTF_8};

use crate::{
    data::display_cell,
    error::ParseFailure,
    frame::{InputTable, OutputTable},
};

pub const DEFAULT_INPUT_DELIMITER: u8 = b'\t';
pub const DEFAULT_OUTPUT_DELIMITER: u8 = b';';
pub const DEFAULT_DECIMAL_SEPARATOR: char = ',';

pub fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    if let Some(value) = label {
        Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| anyhow!("Unknown encoding '{value}'"))
    } else {
        Ok(UTF_8)
    }
}

/// Output conventions for [`write_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputFormat {
    pub delimiter: u8,
    pub decimal: char,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_OUTPUT_DELIMITER,
            decimal: DEFAULT_DECIMAL_SEPARATOR,
        }
    }
}

fn decode_field(
    bytes: &[u8],
    encoding: &'static Encoding,
    row: usize,
) -> Result<String, ParseFailure> {
    let (text, had_errors) = encoding.decode_with_bom_removal(bytes);
    if had_errors {
        Err(ParseFailure::Decode {
            row,
            encoding: encoding.name(),
        })
    } else {
        Ok(text.into_owned())
    }
}

fn decode_record(
    record: &csv::ByteRecord,
    encoding: &'static Encoding,
    row: usize,
) -> Result<Vec<String>, ParseFailure> {
    record
        .iter()
        .map(|field| decode_field(field, encoding, row))
        .collect()
}

fn csv_failure(err: csv::Error) -> ParseFailure {
    let line = err.position().map(|p| p.line()).unwrap_or_default();
    ParseFailure::Csv { line, source: err }
}

/// Reads a delimited table with a header row.
///
/// Short records are padded with empty fields; records wider than the header
/// are rejected.
pub fn read_table<R: Read>(
    reader: R,
    delimiter: u8,
    encoding: &'static Encoding,
) -> Result<InputTable, ParseFailure> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(true)
        .from_reader(reader);

    let header_record = reader.byte_headers().map_err(csv_failure)?.clone();
    if header_record.is_empty() {
        return Err(ParseFailure::Empty);
    }
    let headers = decode_record(&header_record, encoding, 1)?;
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(ParseFailure::NoColumns);
    }

    let mut rows = Vec::new();
    for (idx, record) in reader.byte_records().enumerate() {
        let row = idx + 2;
        let record = record.map_err(csv_failure)?;
        if record.len() > headers.len() {
            return Err(ParseFailure::TooManyFields {
                row,
                expected: headers.len(),
                found: record.len(),
            });
        }
        rows.push(decode_record(&record, encoding, row)?);
    }
    Ok(InputTable::new(headers, rows))
}

pub fn read_table_from_str(input: &str, delimiter: u8) -> Result<InputTable, ParseFailure> {
    read_table(input.as_bytes(), delimiter, UTF_8)
}

pub fn read_table_from_path(
    path: &Path,
    delimiter: u8,
    encoding: &'static Encoding,
) -> Result<InputTable> {
    let reader: Box<dyn Read> = if is_dash(path) {
        Box::new(std::io::stdin().lock())
    } else {
        Box::new(BufReader::new(
            File::open(path).with_context(|| format!("Opening input file {path:?}"))?,
        ))
    };
    read_table(reader, delimiter, encoding)
        .with_context(|| format!("Reading table from {path:?}"))
}

pub fn open_writer(path: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(p) if !is_dash(p) => Box::new(BufWriter::new(
            File::create(p).with_context(|| format!("Creating output file {p:?}"))?,
        )),
        _ => Box::new(std::io::stdout()),
    })
}

/// Writes the header and every row of `table`.
pub fn write_table<W: Write>(
    writer: W,
    table: &OutputTable,
    format: OutputFormat,
) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(format.delimiter)
        .double_quote(true)
        .from_writer(writer);
    writer
        .write_record(table.columns())
        .context("Writing output headers")?;
    for (idx, row) in table.rows().iter().enumerate() {
        writer
            .write_record(row.iter().map(|cell| display_cell(cell, format.decimal)))
            .with_context(|| format!("Writing output row {}", idx + 2))?;
    }
    writer.flush().context("Flushing output writer")?;
    Ok(())
}

pub fn table_to_string(table: &OutputTable, format: OutputFormat) -> Result<String> {
    let mut buffer = Vec::new();
    write_table(&mut buffer, table, format)?;
    String::from_utf8(buffer).context("Output is not valid UTF-8")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Value;
    use encoding_rs::WINDOWS_1252;

    #[test]
    fn read_table_pads_short_rows() {
        let table = read_table_from_str("a\tb\tc\n1\t2\n", b'\t').expect("parse");
        assert_eq!(table.headers(), &["a", "b", "c"]);
        assert_eq!(table.rows()[0], vec!["1", "2", ""]);
    }

    #[test]
    fn read_table_keeps_header_whitespace() {
        let table =
            read_table_from_str(" ID_Project \tE_Tab_Opp_1\nA\t1\n", b'\t').expect("parse");
        assert_eq!(table.headers()[0], " ID_Project ");
    }

    #[test]
    fn read_table_rejects_wide_rows() {
        let err = read_table_from_str("a\tb\n1\t2\t3\n", b'\t').unwrap_err();
        assert!(matches!(
            err,
            ParseFailure::TooManyFields {
                row: 2,
                expected: 2,
                found: 3
            }
        ));
    }

    #[test]
    fn read_table_rejects_empty_input() {
        assert!(matches!(
            read_table_from_str("", b'\t').unwrap_err(),
            ParseFailure::Empty
        ));
    }

    #[test]
    fn read_table_rejects_invalid_utf8() {
        let bytes = b"a\tb\n\xc3\x28\t1\n";
        let err = read_table(&bytes[..], b'\t', UTF_8).unwrap_err();
        assert!(matches!(err, ParseFailure::Decode { row: 2, .. }));
    }

    #[test]
    fn read_table_decodes_legacy_encodings() {
        let (encoded, _, _) = WINDOWS_1252.encode("Gemeente\nM\u{e9}rida\n");
        let table = read_table(&encoded[..], b'\t', WINDOWS_1252).expect("parse");
        assert_eq!(table.rows()[0][0], "M\u{e9}rida");
    }

    #[test]
    fn write_table_uses_semicolon_and_decimal_comma() {
        let mut table = OutputTable::new(vec!["id".into(), "area".into(), "note".into()]);
        table.push_row(vec![Some("A1".into()), Some(Value::Number(10.0)), None]);
        table.push_row(vec![Some("A;2".into()), Some(Value::Number(2.75)), Some("x".into())]);
        let rendered = table_to_string(&table, OutputFormat::default()).expect("write");
        assert_eq!(rendered, "id;area;note\nA1;10,0;\n\"A;2\";2,75;x\n");
    }

    #[test]
    fn resolve_encoding_rejects_unknown_labels() {
        assert!(resolve_encoding(Some("klingon")).is_err());
        assert_eq!(resolve_encoding(None).unwrap(), UTF_8);
    }
}
