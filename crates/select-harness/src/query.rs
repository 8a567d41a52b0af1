use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tracing::debug;

use crate::data::encoding::{Conversion, InputEncoding, OutputEncoding};
use crate::error::{HarnessError, HarnessResult};
use crate::storage::Credentials;

pub const DEFAULT_QUERY_TOOL: &str = "s5cmd";
pub const DEFAULT_TIMEOUT_MS: u64 = 120_000;

#[derive(Clone, Debug)]
pub struct QueryToolConfig {
    program: String,
    global_args: Vec<String>,
    timeout: Duration,
}

impl QueryToolConfig {
    pub fn new(
        program: impl Into<String>,
        global_args: Vec<String>,
        timeout_ms: u64,
    ) -> HarnessResult<Self> {
        let program = program.into();
        if program.trim().is_empty() {
            return Err(HarnessError::InvalidArgument(
                "query tool must not be empty".to_string(),
            ));
        }
        if timeout_ms == 0 {
            return Err(HarnessError::InvalidArgument(
                "query timeout must be > 0 ms".to_string(),
            ));
        }
        Ok(Self {
            program,
            global_args,
            timeout: Duration::from_millis(timeout_ms),
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Arguments of one `select` call, after the tool's global arguments.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct QueryInvocation {
    args: Vec<String>,
}

impl QueryInvocation {
    /// Flags are only passed when they differ from the tool defaults
    /// (`lines` structure, comma delimiter, json output).
    pub fn select(conversion: &Conversion, query: &str, source_uri: &str) -> Self {
        let input = conversion.input();
        let mut args = vec!["select".to_string(), input.format_name().to_string()];
        match input {
            InputEncoding::StructuredLines => {}
            InputEncoding::AggregateDocument => {
                args.extend(["--structure".to_string(), "document".to_string()]);
            }
            InputEncoding::DelimitedText(delimiter) => {
                if !delimiter.is_canonical() {
                    args.extend(["--delimiter".to_string(), delimiter.as_char().to_string()]);
                }
            }
        }
        match conversion.output() {
            OutputEncoding::StructuredLines => {}
            OutputEncoding::DelimitedText => {
                args.extend(["--output-format".to_string(), "csv".to_string()]);
            }
        }
        args.extend([
            "--query".to_string(),
            query.to_string(),
            source_uri.to_string(),
        ]);
        Self { args }
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

#[derive(Clone, Debug)]
pub struct QueryOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub status: ExitStatus,
}

impl QueryOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).trim().to_string()
    }
}

/// Runs the tool once and waits for it to exit or time out. The exit status is
/// returned to the caller rather than turned into an error.
pub async fn run_query(
    tool: &QueryToolConfig,
    invocation: &QueryInvocation,
    credentials: &Credentials,
) -> HarnessResult<QueryOutput> {
    let mut command = tokio::process::Command::new(&tool.program);
    command.kill_on_drop(true);
    command
        .args(&tool.global_args)
        .args(invocation.args())
        .envs(credentials.env_vars())
        .stdin(Stdio::null());
    debug!(program = %tool.program, args = ?invocation.args(), "invoking query tool");

    let output = match tokio::time::timeout(tool.timeout, command.output()).await {
        Ok(result) => result.map_err(|error| {
            HarnessError::Query(format!("failed to run '{}': {error}", tool.program))
        })?,
        Err(_) => {
            return Err(HarnessError::Query(format!(
                "'{}' timed out after {} ms",
                tool.program,
                tool.timeout.as_millis()
            )));
        }
    };

    Ok(QueryOutput {
        stdout: output.stdout,
        stderr: output.stderr,
        status: output.status,
    })
}
