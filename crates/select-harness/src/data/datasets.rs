use serde::{Deserialize, Serialize};

use super::generator::generate_records;

pub const HEADER: [&str; 3] = ["line", "id", "data"];

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "line")]
    pub sequence: String,
    #[serde(rename = "id")]
    pub identifier: String,
    #[serde(rename = "data")]
    pub payload: String,
}

impl Record {
    pub fn fields(&self) -> [&str; 3] {
        [&self.sequence, &self.identifier, &self.payload]
    }
}

/// Row shape the service emits for delimited input when no header mapping is
/// requested: columns are keyed by 1-based position.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct PositionalRow<'a> {
    #[serde(rename = "_1")]
    pub first: &'a str,
    #[serde(rename = "_2")]
    pub second: &'a str,
    #[serde(rename = "_3")]
    pub third: &'a str,
}

impl<'a> From<[&'a str; 3]> for PositionalRow<'a> {
    fn from([first, second, third]: [&'a str; 3]) -> Self {
        Self {
            first,
            second,
            third,
        }
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    pub fn generate(rows: usize) -> Self {
        Self {
            records: generate_records(rows),
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }
}
