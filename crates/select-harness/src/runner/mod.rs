use std::fmt::Display;
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use futures::future::join_all;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::assertions::assert_exact_output;
use crate::data::fixtures::FixturePair;
use crate::query::{run_query, QueryInvocation, QueryToolConfig};
use crate::results::{FailureKind, ScenarioFailure, ScenarioResult};
use crate::scenarios::Scenario;
use crate::storage::{bucket_name_for, Credentials, ObjectStorage, StorageConfig};

/// Everything a scenario needs from the outside world, shared read-only.
#[derive(Clone, Debug)]
pub struct HarnessConfig {
    pub storage: StorageConfig,
    pub credentials: Credentials,
    pub query_tool: QueryToolConfig,
}

impl HarnessConfig {
    pub fn object_storage(&self) -> ObjectStorage {
        ObjectStorage::new(self.storage.clone(), self.credentials.clone())
    }
}

pub async fn run_scenario(
    scenario: &Scenario,
    config: &HarnessConfig,
    storage: &ObjectStorage,
) -> ScenarioResult {
    let started = Instant::now();
    let bucket = bucket_name_for(&scenario.name);
    let outcome = execute_scenario(scenario, &bucket, config, storage).await;
    let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

    match &outcome {
        Ok(()) => info!(bucket = %bucket, elapsed_ms, "scenario passed"),
        Err(failure) => warn!(
            bucket = %bucket,
            kind = ?failure.kind,
            elapsed_ms,
            "scenario failed: {}",
            failure.message
        ),
    }

    ScenarioResult {
        scenario: scenario.name.clone(),
        conversion: scenario.conversion.to_string(),
        success: outcome.is_ok(),
        elapsed_ms,
        bucket: Some(bucket),
        failure: outcome.err(),
    }
}

/// Runs every scenario as its own task. Results come back in input order and a
/// failing or panicking scenario never affects its siblings.
pub async fn run_scenarios(
    scenarios: Vec<Scenario>,
    config: Arc<HarnessConfig>,
) -> Vec<ScenarioResult> {
    let storage = Arc::new(config.object_storage());
    let mut labels = Vec::with_capacity(scenarios.len());
    let mut handles = Vec::with_capacity(scenarios.len());
    for scenario in scenarios {
        labels.push((scenario.name.clone(), scenario.conversion.to_string()));
        let span = info_span!("scenario", name = %scenario.name);
        let config = Arc::clone(&config);
        let storage = Arc::clone(&storage);
        handles.push(tokio::spawn(
            async move { run_scenario(&scenario, &config, &storage).await }.instrument(span),
        ));
    }

    join_all(handles)
        .await
        .into_iter()
        .zip(labels)
        .map(|(joined, (scenario, conversion))| match joined {
            Ok(result) => result,
            Err(error) => ScenarioResult {
                scenario,
                conversion,
                success: false,
                elapsed_ms: 0.0,
                bucket: None,
                failure: Some(ScenarioFailure::new(
                    FailureKind::Aborted,
                    format!("scenario task did not complete: {error}"),
                )),
            },
        })
        .collect()
}

async fn execute_scenario(
    scenario: &Scenario,
    bucket: &str,
    config: &HarnessConfig,
    storage: &ObjectStorage,
) -> Result<(), ScenarioFailure> {
    let fixture = FixturePair::generate(scenario.records, &scenario.conversion)
        .map_err(fail(FailureKind::Construction, "fixture generation failed"))?;
    let key = scenario.object_key();

    storage
        .create_container(bucket)
        .await
        .map_err(fail(FailureKind::Storage, "create bucket failed"))?;
    storage
        .put_object(bucket, &key, Bytes::from(fixture.input))
        .await
        .map_err(fail(FailureKind::Storage, "upload failed"))?;
    let source = storage
        .source_uri(bucket, &key)
        .map_err(fail(FailureKind::Storage, "source uri failed"))?;

    let invocation = QueryInvocation::select(&scenario.conversion, &scenario.query(), &source);
    debug!(
        source = %source,
        timeout = ?config.query_tool.timeout(),
        "querying uploaded object"
    );
    let output = run_query(&config.query_tool, &invocation, &config.credentials)
        .await
        .map_err(fail(FailureKind::Query, "query tool failed"))?;
    if !output.success() {
        let mut failure = ScenarioFailure::new(
            FailureKind::Query,
            format!(
                "query tool exited with {}: {}",
                output.status,
                output.stderr_lossy()
            ),
        );
        failure.actual = Some(String::from_utf8_lossy(&output.stdout).into_owned());
        return Err(failure);
    }

    assert_exact_output(&fixture.expected, &output.stdout)
}

fn fail<E: Display>(kind: FailureKind, context: &'static str) -> impl Fn(E) -> ScenarioFailure {
    move |error| ScenarioFailure::new(kind, format!("{context}: {error}"))
}
