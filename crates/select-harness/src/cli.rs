use std::collections::HashMap;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::data::encoding::{InputFormat, JsonStructure, OutputEncoding};
use crate::data::fixtures::DEFAULT_RECORD_COUNT;
use crate::error::{HarnessError, HarnessResult};
use crate::query::{DEFAULT_QUERY_TOOL, DEFAULT_TIMEOUT_MS};
use crate::storage::{DEFAULT_ENDPOINT, DEFAULT_REGION};

#[derive(Debug, Parser)]
#[command(
    name = "select-harness",
    about = "byte-exact conformance harness for object-storage select"
)]
pub struct Args {
    #[arg(
        long,
        env = "SELECT_HARNESS_STORAGE_BACKEND",
        value_enum,
        default_value_t = StorageBackend::S3
    )]
    pub storage_backend: StorageBackend,
    #[arg(long, env = "SELECT_HARNESS_ENDPOINT_URL", default_value = DEFAULT_ENDPOINT)]
    pub endpoint_url: String,
    #[arg(long, env = "AWS_REGION", default_value = DEFAULT_REGION)]
    pub region: String,
    #[arg(long, env = "AWS_ACCESS_KEY_ID", default_value = "minioadmin")]
    pub access_key_id: String,
    #[arg(
        long,
        env = "AWS_SECRET_ACCESS_KEY",
        default_value = "minioadmin",
        hide_env_values = true
    )]
    pub secret_access_key: String,
    #[arg(long, env = "SELECT_HARNESS_LOCAL_ROOT", default_value = "buckets")]
    pub local_root: PathBuf,
    #[arg(long = "storage-option")]
    pub storage_options: Vec<String>,
    #[arg(long, env = "SELECT_HARNESS_QUERY_TOOL", default_value = DEFAULT_QUERY_TOOL)]
    pub query_tool: String,
    /// Arguments placed before `select`; defaults to `--endpoint-url <url>` for s3.
    #[arg(long = "query-tool-arg", allow_hyphen_values = true)]
    pub query_tool_args: Vec<String>,
    #[arg(long, env = "SELECT_HARNESS_TIMEOUT_MS", default_value_t = DEFAULT_TIMEOUT_MS)]
    pub timeout_ms: u64,
    #[arg(long, env = "SELECT_HARNESS_RESULTS", default_value = "results")]
    pub results_dir: PathBuf,
    #[arg(long, env = "SELECT_HARNESS_LABEL", default_value = "local")]
    pub label: String,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageBackend {
    Local,
    S3,
}

impl StorageBackend {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::S3 => "s3",
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the scenario catalog.
    List {
        #[arg(long)]
        manifest: Option<PathBuf>,
    },
    /// Print the oracle's input or expected bytes for one conversion.
    Fixture {
        #[arg(long, value_enum)]
        input: InputFormat,
        #[arg(long, value_enum)]
        structure: Option<JsonStructure>,
        #[arg(long)]
        delimiter: Option<String>,
        #[arg(long, value_enum, default_value = "json")]
        output: OutputEncoding,
        #[arg(long, default_value_t = DEFAULT_RECORD_COUNT)]
        records: usize,
        #[arg(long, value_enum, default_value_t = FixtureSide::Expected)]
        show: FixtureSide,
    },
    /// Run scenarios against the configured storage and query tool.
    Run {
        #[arg(long)]
        manifest: Option<PathBuf>,
        #[arg(long)]
        filter: Option<String>,
        #[arg(long, default_value_t = DEFAULT_RECORD_COUNT)]
        records: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FixtureSide {
    Input,
    Expected,
}

pub fn validate_label(label: &str) -> HarnessResult<()> {
    if label.is_empty() {
        return Err(HarnessError::InvalidArgument(
            "label must not be empty".to_string(),
        ));
    }
    if matches!(label, "." | "..") {
        return Err(HarnessError::InvalidArgument(format!(
            "label '{label}' is not allowed"
        )));
    }
    if !label
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'-' | b'_'))
    {
        return Err(HarnessError::InvalidArgument(
            "label contains invalid characters; allowed: [A-Za-z0-9._-]".to_string(),
        ));
    }
    Ok(())
}

pub fn parse_storage_options(entries: &[String]) -> HarnessResult<HashMap<String, String>> {
    let mut options = HashMap::new();
    for entry in entries {
        let Some((key, value)) = entry.split_once('=') else {
            return Err(HarnessError::InvalidArgument(format!(
                "invalid storage option '{entry}'; expected KEY=VALUE"
            )));
        };
        if key.trim().is_empty() {
            return Err(HarnessError::InvalidArgument(format!(
                "invalid storage option '{entry}'; key must not be empty"
            )));
        }
        options.insert(key.trim().to_string(), value.to_string());
    }
    Ok(options)
}

/// Global arguments for the query tool: explicit ones win, otherwise the s3
/// backend points the tool at the configured endpoint.
pub fn resolve_query_tool_args(
    explicit: &[String],
    backend: StorageBackend,
    endpoint_url: &str,
) -> Vec<String> {
    if !explicit.is_empty() {
        return explicit.to_vec();
    }
    match backend {
        StorageBackend::S3 => vec!["--endpoint-url".to_string(), endpoint_url.to_string()],
        StorageBackend::Local => Vec::new(),
    }
}
