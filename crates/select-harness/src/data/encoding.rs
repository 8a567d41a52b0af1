use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{HarnessError, HarnessResult};

/// Delimiter the service writes for every delimited output, whatever the input used.
pub const CANONICAL_DELIMITER: Delimiter = Delimiter(b',');

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Delimiter(u8);

impl Delimiter {
    pub fn new(ch: char) -> HarnessResult<Self> {
        if !ch.is_ascii() {
            return Err(HarnessError::InvalidArgument(format!(
                "delimiter {ch:?} must be a single ASCII character"
            )));
        }
        if matches!(ch, '"' | '\r' | '\n') {
            return Err(HarnessError::InvalidArgument(format!(
                "delimiter {ch:?} is reserved by the delimited text format"
            )));
        }
        Ok(Self(ch as u8))
    }

    /// Accepts a literal character plus the `\t` and `tab` spellings shells make awkward.
    pub fn parse(value: &str) -> HarnessResult<Self> {
        match value {
            "\\t" | "tab" => return Self::new('\t'),
            _ => {}
        }
        let mut chars = value.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => Self::new(ch),
            _ => Err(HarnessError::InvalidArgument(format!(
                "delimiter '{value}' must be exactly one character"
            ))),
        }
    }

    pub const fn as_byte(self) -> u8 {
        self.0
    }

    pub const fn as_char(self) -> char {
        self.0 as char
    }

    pub const fn is_canonical(self) -> bool {
        self.0 == CANONICAL_DELIMITER.0
    }
}

impl Default for Delimiter {
    fn default() -> Self {
        CANONICAL_DELIMITER
    }
}

impl TryFrom<String> for Delimiter {
    type Error = HarnessError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Delimiter> for String {
    fn from(value: Delimiter) -> Self {
        value.as_char().to_string()
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum JsonStructure {
    #[default]
    Lines,
    Document,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum InputFormat {
    Json,
    Csv,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum InputEncoding {
    StructuredLines,
    AggregateDocument,
    DelimitedText(Delimiter),
}

impl InputEncoding {
    pub fn from_parts(
        format: InputFormat,
        structure: Option<JsonStructure>,
        delimiter: Option<Delimiter>,
    ) -> HarnessResult<Self> {
        match format {
            InputFormat::Json => {
                if delimiter.is_some() {
                    return Err(HarnessError::InvalidArgument(
                        "delimiter only applies to csv input".to_string(),
                    ));
                }
                Ok(match structure.unwrap_or_default() {
                    JsonStructure::Lines => Self::StructuredLines,
                    JsonStructure::Document => Self::AggregateDocument,
                })
            }
            InputFormat::Csv => {
                if structure.is_some() {
                    return Err(HarnessError::InvalidArgument(
                        "structure only applies to json input".to_string(),
                    ));
                }
                Ok(Self::DelimitedText(delimiter.unwrap_or_default()))
            }
        }
    }

    pub const fn format(self) -> InputFormat {
        match self {
            Self::StructuredLines | Self::AggregateDocument => InputFormat::Json,
            Self::DelimitedText(_) => InputFormat::Csv,
        }
    }

    /// Name the query tool expects as its first `select` argument.
    pub const fn format_name(self) -> &'static str {
        match self.format() {
            InputFormat::Json => "json",
            InputFormat::Csv => "csv",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::StructuredLines => "structured_lines",
            Self::AggregateDocument => "aggregate_document",
            Self::DelimitedText(_) => "delimited_text",
        }
    }

    pub fn object_key(self) -> String {
        format!("file.{}", self.format_name())
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum OutputEncoding {
    #[serde(rename = "json")]
    #[value(name = "json")]
    StructuredLines,
    #[serde(rename = "csv")]
    #[value(name = "csv")]
    DelimitedText,
}

impl OutputEncoding {
    pub const fn format_name(self) -> &'static str {
        match self {
            Self::StructuredLines => "json",
            Self::DelimitedText => "csv",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::StructuredLines => "structured_lines",
            Self::DelimitedText => "delimited_text",
        }
    }
}

/// An input/output pairing the modeled service defines a result for.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Conversion {
    input: InputEncoding,
    output: OutputEncoding,
}

impl Conversion {
    pub fn new(input: InputEncoding, output: OutputEncoding) -> HarnessResult<Self> {
        match (input, output) {
            // The service cannot flatten a single document into rows.
            (InputEncoding::AggregateDocument, OutputEncoding::DelimitedText) => {
                Err(HarnessError::UnsupportedConversion {
                    input: input.label(),
                    output: output.label(),
                })
            }
            (InputEncoding::StructuredLines, _)
            | (InputEncoding::AggregateDocument, OutputEncoding::StructuredLines)
            | (InputEncoding::DelimitedText(_), _) => Ok(Self { input, output }),
        }
    }

    pub const fn input(&self) -> InputEncoding {
        self.input
    }

    pub const fn output(&self) -> OutputEncoding {
        self.output
    }
}

impl fmt::Display for Conversion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.input.label(), self.output.label())
    }
}

#[cfg(test)]
mod tests {
    use super::{Conversion, Delimiter, InputEncoding, InputFormat, JsonStructure, OutputEncoding};

    #[test]
    fn delimiter_parse_accepts_tab_spellings() {
        for value in ["\t", "\\t", "tab"] {
            let delimiter = Delimiter::parse(value).expect("tab delimiter");
            assert_eq!(delimiter.as_byte(), b'\t', "spelling {value:?}");
        }
    }

    #[test]
    fn delimiter_rejects_reserved_and_multi_char_values() {
        for value in ["\"", "\n", "ab", "", "é"] {
            let err = Delimiter::parse(value).expect_err("delimiter should be rejected");
            assert!(
                err.to_string().contains("delimiter"),
                "unexpected error for {value:?}: {err}"
            );
        }
    }

    #[test]
    fn document_to_delimited_is_rejected_at_construction() {
        let err = Conversion::new(InputEncoding::AggregateDocument, OutputEncoding::DelimitedText)
            .expect_err("document input cannot produce csv");
        assert!(
            err.to_string().contains("aggregate_document"),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn from_parts_rejects_flags_for_the_other_format() {
        InputEncoding::from_parts(InputFormat::Json, None, Some(Delimiter::default()))
            .expect_err("json input takes no delimiter");
        InputEncoding::from_parts(InputFormat::Csv, Some(JsonStructure::Lines), None)
            .expect_err("csv input takes no structure");
        assert_eq!(
            InputEncoding::from_parts(InputFormat::Csv, None, None).expect("csv default"),
            InputEncoding::DelimitedText(Delimiter::default())
        );
    }
}
