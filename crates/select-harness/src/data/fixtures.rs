use std::collections::BTreeMap;

use serde::Serialize;

use super::datasets::{Dataset, PositionalRow, Record, HEADER};
use super::encoding::{Conversion, Delimiter, InputEncoding, OutputEncoding, CANONICAL_DELIMITER};
use crate::error::{HarnessError, HarnessResult};

pub const DEFAULT_RECORD_COUNT: usize = 5;

/// Bytes uploaded to storage and the bytes a conforming select must return for them.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FixturePair {
    pub input: Vec<u8>,
    pub expected: Vec<u8>,
}

impl FixturePair {
    pub fn generate(rows: usize, conversion: &Conversion) -> HarnessResult<Self> {
        Self::from_dataset(&Dataset::generate(rows), conversion)
    }

    pub fn from_dataset(dataset: &Dataset, conversion: &Conversion) -> HarnessResult<Self> {
        let input = encode_input(dataset, conversion.input())?;
        let records = dataset.records();
        let expected = match (conversion.input(), conversion.output()) {
            (InputEncoding::StructuredLines, OutputEncoding::StructuredLines) => input.clone(),
            (InputEncoding::StructuredLines, OutputEncoding::DelimitedText) => {
                write_delimited(records.iter().map(Record::fields), CANONICAL_DELIMITER)?
            }
            // A document is returned verbatim; it cannot be split into rows.
            (InputEncoding::AggregateDocument, _) => input.clone(),
            (InputEncoding::DelimitedText(_), OutputEncoding::StructuredLines) => {
                write_json_lines(with_header(records).map(PositionalRow::from))?
            }
            (InputEncoding::DelimitedText(_), OutputEncoding::DelimitedText) => {
                write_delimited(with_header(records), CANONICAL_DELIMITER)?
            }
        };
        Ok(Self { input, expected })
    }
}

pub fn encode_input(dataset: &Dataset, encoding: InputEncoding) -> HarnessResult<Vec<u8>> {
    let records = dataset.records();
    match encoding {
        InputEncoding::StructuredLines => write_json_lines(records.iter()),
        InputEncoding::AggregateDocument => {
            let document = records
                .iter()
                .enumerate()
                .map(|(idx, record)| (format!("obj{idx}"), record))
                .collect::<BTreeMap<_, _>>();
            let mut out = serde_json::to_vec(&document)?;
            out.push(b'\n');
            Ok(out)
        }
        InputEncoding::DelimitedText(delimiter) => write_delimited(with_header(records), delimiter),
    }
}

fn with_header(records: &[Record]) -> impl Iterator<Item = [&str; 3]> {
    std::iter::once(HEADER).chain(records.iter().map(Record::fields))
}

fn write_json_lines<T, I>(rows: I) -> HarnessResult<Vec<u8>>
where
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    let mut out = Vec::new();
    for row in rows {
        serde_json::to_writer(&mut out, &row)?;
        out.push(b'\n');
    }
    Ok(out)
}

fn write_delimited<'a, I>(rows: I, delimiter: Delimiter) -> HarnessResult<Vec<u8>>
where
    I: IntoIterator<Item = [&'a str; 3]>,
{
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter.as_byte())
        .terminator(csv::Terminator::Any(b'\n'))
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(Vec::new());
    for row in rows {
        writer.write_record(row)?;
    }
    writer
        .into_inner()
        .map_err(|error| HarnessError::Io(error.into_error()))
}
