use std::fs;
use std::io::Write;
use std::sync::Arc;

use chrono::Utc;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use select_harness::cli::{
    parse_storage_options, resolve_query_tool_args, validate_label, Args, Command, FixtureSide,
};
use select_harness::data::encoding::{Conversion, Delimiter, InputEncoding};
use select_harness::data::fixtures::{FixturePair, DEFAULT_RECORD_COUNT};
use select_harness::error::{HarnessError, HarnessResult};
use select_harness::manifests::load_scenarios;
use select_harness::query::QueryToolConfig;
use select_harness::results::{host_name, RunContext, RunReport, REPORT_SCHEMA_VERSION};
use select_harness::runner::{run_scenarios, HarnessConfig};
use select_harness::scenarios::filter_scenarios;
use select_harness::storage::{Credentials, StorageConfig};

#[tokio::main]
async fn main() -> HarnessResult<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();

    let args = Args::parse();

    match args.command {
        Command::List { manifest } => {
            for scenario in load_scenarios(manifest.as_deref(), DEFAULT_RECORD_COUNT)? {
                println!("{}\t{}", scenario.name, scenario.conversion);
            }
        }
        Command::Fixture {
            input,
            structure,
            delimiter,
            output,
            records,
            show,
        } => {
            let delimiter = delimiter.as_deref().map(Delimiter::parse).transpose()?;
            let conversion = Conversion::new(
                InputEncoding::from_parts(input, structure, delimiter)?,
                output,
            )?;
            let fixture = FixturePair::generate(records, &conversion)?;
            let bytes = match show {
                FixtureSide::Input => fixture.input,
                FixtureSide::Expected => fixture.expected,
            };
            std::io::stdout().write_all(&bytes)?;
        }
        Command::Run {
            manifest,
            filter,
            records,
        } => {
            validate_label(&args.label)?;
            let scenarios = filter_scenarios(
                load_scenarios(manifest.as_deref(), records)?,
                filter.as_deref(),
            )?;
            let storage = StorageConfig::new(
                args.storage_backend,
                &args.endpoint_url,
                args.local_root.clone(),
                parse_storage_options(&args.storage_options)?,
            )?;
            let query_tool = QueryToolConfig::new(
                args.query_tool.clone(),
                resolve_query_tool_args(
                    &args.query_tool_args,
                    args.storage_backend,
                    &args.endpoint_url,
                ),
                args.timeout_ms,
            )?;
            let credentials =
                Credentials::new(args.region, args.access_key_id, args.secret_access_key);

            info!(
                scenarios = scenarios.len(),
                backend = args.storage_backend.as_str(),
                query_tool = %args.query_tool,
                "starting select run"
            );
            let config = Arc::new(HarnessConfig {
                storage,
                credentials,
                query_tool,
            });
            let results = run_scenarios(scenarios, config).await;

            let report = RunReport {
                schema_version: REPORT_SCHEMA_VERSION,
                context: RunContext {
                    label: args.label.clone(),
                    created_at: Utc::now(),
                    host: host_name(),
                    backend: args.storage_backend.as_str().to_string(),
                    query_tool: args.query_tool.clone(),
                    manifest: manifest.map(|path| path.display().to_string()),
                },
                scenarios: results,
            };

            let out_dir = args.results_dir.join(&args.label);
            fs::create_dir_all(&out_dir)?;
            let out_file = out_dir.join("select.json");
            fs::write(&out_file, serde_json::to_vec_pretty(&report)?)?;

            for result in &report.scenarios {
                let status = if result.success { "PASS" } else { "FAIL" };
                println!("{status} {} ({})", result.scenario, result.conversion);
            }
            println!("wrote result: {}", out_file.display());

            let failed = report.failed();
            if failed > 0 {
                return Err(HarnessError::ScenariosFailed {
                    failed,
                    total: report.scenarios.len(),
                });
            }
        }
    }

    Ok(())
}
