use std::collections::HashSet;

use crate::data::encoding::{Conversion, Delimiter, InputEncoding, OutputEncoding};
use crate::error::{HarnessError, HarnessResult};

pub const QUERY_SOURCE: &str = "s3object s";

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Scenario {
    pub name: String,
    pub conversion: Conversion,
    pub records: usize,
    limit: usize,
}

impl Scenario {
    pub fn new(name: impl Into<String>, conversion: Conversion, records: usize) -> Self {
        Self {
            name: name.into(),
            conversion,
            records,
            limit: records.saturating_add(1),
        }
    }

    /// Overrides the `LIMIT` clause; it may never cut rows the oracle expects.
    pub fn with_limit(mut self, limit: usize) -> HarnessResult<Self> {
        let minimum = self.minimum_limit();
        if limit < minimum {
            return Err(HarnessError::InvalidArgument(format!(
                "scenario '{}' limit {limit} would drop rows; expected at least {minimum}",
                self.name
            )));
        }
        self.limit = limit;
        Ok(self)
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Delimited input yields its header as an extra data row.
    pub fn minimum_limit(&self) -> usize {
        match self.conversion.input() {
            InputEncoding::StructuredLines | InputEncoding::AggregateDocument => self.records,
            InputEncoding::DelimitedText(_) => self.records.saturating_add(1),
        }
    }

    pub fn query(&self) -> String {
        format!("SELECT * FROM {QUERY_SOURCE} LIMIT {}", self.limit)
    }

    pub fn object_key(&self) -> String {
        self.conversion.input().object_key()
    }
}

pub fn builtin_scenarios(records: usize) -> HarnessResult<Vec<Scenario>> {
    let tab = Delimiter::new('\t')?;
    let comma = Delimiter::default();
    let catalog = [
        (
            "json-lines select with default input structure and output",
            InputEncoding::StructuredLines,
            OutputEncoding::StructuredLines,
        ),
        (
            "json-lines select with default input structure and csv output",
            InputEncoding::StructuredLines,
            OutputEncoding::DelimitedText,
        ),
        (
            "json-lines select with document input structure and output",
            InputEncoding::AggregateDocument,
            OutputEncoding::StructuredLines,
        ),
        (
            "csv select with default delimiter and output",
            InputEncoding::DelimitedText(comma),
            OutputEncoding::StructuredLines,
        ),
        (
            "csv select with default delimiter and csv output",
            InputEncoding::DelimitedText(comma),
            OutputEncoding::DelimitedText,
        ),
        (
            "csv select with custom delimiter and default output",
            InputEncoding::DelimitedText(tab),
            OutputEncoding::StructuredLines,
        ),
        (
            "csv select with custom delimiter and csv output",
            InputEncoding::DelimitedText(tab),
            OutputEncoding::DelimitedText,
        ),
    ];

    catalog
        .into_iter()
        .map(|(name, input, output)| {
            Ok(Scenario::new(name, Conversion::new(input, output)?, records))
        })
        .collect()
}

pub fn filter_scenarios(
    mut scenarios: Vec<Scenario>,
    filter: Option<&str>,
) -> HarnessResult<Vec<Scenario>> {
    reject_duplicate_scenario_names(&scenarios)?;
    if let Some(filter) = filter.map(str::trim).filter(|value| !value.is_empty()) {
        scenarios.retain(|scenario| scenario.name.contains(filter));
        if scenarios.is_empty() {
            return Err(HarnessError::InvalidArgument(format!(
                "scenario filter '{filter}' matched no scenarios"
            )));
        }
    }
    Ok(scenarios)
}

fn reject_duplicate_scenario_names(scenarios: &[Scenario]) -> HarnessResult<()> {
    let mut seen = HashSet::new();
    for scenario in scenarios {
        if !seen.insert(scenario.name.as_str()) {
            return Err(HarnessError::InvalidArgument(format!(
                "scenario list contains duplicate name '{}'",
                scenario.name
            )));
        }
    }
    Ok(())
}
