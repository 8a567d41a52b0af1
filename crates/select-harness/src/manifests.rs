use std::path::Path;

use serde::Deserialize;

use crate::data::encoding::{Conversion, Delimiter, InputEncoding, JsonStructure, OutputEncoding};
use crate::error::{HarnessError, HarnessResult};
use crate::scenarios::{builtin_scenarios, Scenario};

pub const DEFAULT_MANIFEST_PATH: &str = "manifests/select.yaml";

#[derive(Clone, Debug, Deserialize)]
pub struct ScenarioManifest {
    pub id: String,
    pub description: String,
    #[serde(default)]
    pub scenarios: Vec<ManifestScenario>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ManifestScenario {
    pub name: String,
    pub input: ManifestInput,
    pub output: OutputEncoding,
    #[serde(default)]
    pub records: Option<usize>,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

const fn default_enabled() -> bool {
    true
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize)]
#[serde(tag = "format", rename_all = "snake_case")]
pub enum ManifestInput {
    Json {
        #[serde(default)]
        structure: JsonStructure,
    },
    Csv {
        #[serde(default)]
        delimiter: Delimiter,
    },
}

impl ManifestInput {
    pub fn to_input_encoding(self) -> InputEncoding {
        match self {
            Self::Json {
                structure: JsonStructure::Lines,
            } => InputEncoding::StructuredLines,
            Self::Json {
                structure: JsonStructure::Document,
            } => InputEncoding::AggregateDocument,
            Self::Csv { delimiter } => InputEncoding::DelimitedText(delimiter),
        }
    }
}

impl ScenarioManifest {
    /// Enabled scenarios in file order. `default_records` applies where a
    /// scenario does not pin its own record count.
    pub fn scenarios(&self, default_records: usize) -> HarnessResult<Vec<Scenario>> {
        let mut out = Vec::new();
        for entry in self.scenarios.iter().filter(|entry| entry.enabled) {
            let conversion = Conversion::new(entry.input.to_input_encoding(), entry.output)
                .map_err(|error| {
                    HarnessError::InvalidArgument(format!(
                        "manifest '{}' scenario '{}': {error}",
                        self.id, entry.name
                    ))
                })?;
            let scenario = Scenario::new(
                entry.name.clone(),
                conversion,
                entry.records.unwrap_or(default_records),
            );
            out.push(match entry.limit {
                Some(limit) => scenario.with_limit(limit)?,
                None => scenario,
            });
        }
        Ok(out)
    }
}

pub fn load_manifest(path: impl AsRef<Path>) -> HarnessResult<ScenarioManifest> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    serde_yaml::from_slice::<ScenarioManifest>(&bytes).map_err(|error| {
        HarnessError::InvalidArgument(format!("invalid manifest '{}': {error}", path.display()))
    })
}

/// Scenarios from `manifest` when given, otherwise the built-in catalog.
pub fn load_scenarios(manifest: Option<&Path>, records: usize) -> HarnessResult<Vec<Scenario>> {
    match manifest {
        Some(path) => load_manifest(path)?.scenarios(records),
        None => builtin_scenarios(records),
    }
}
