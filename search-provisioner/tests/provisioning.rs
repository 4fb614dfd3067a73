//! End-to-end driver runs against an in-memory search service.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use search_provisioner::{Dependencies, ProvisionerConfig};
use search_provisioner_pipeline::StepStatus;
use search_provisioner_repository::{ProvisionError, SearchServiceTransport, TransportResponse};
use search_provisioner_shared::ResourceKind;

/// Keeps the last payload per resource and answers from a status script.
#[derive(Default)]
struct MockSearchService {
    script: Mutex<VecDeque<u16>>,
    calls: Mutex<Vec<(ResourceKind, String, Value)>>,
    resources: Mutex<BTreeMap<(ResourceKind, String), Value>>,
    put_count: AtomicUsize,
}

impl MockSearchService {
    fn scripted(statuses: impl IntoIterator<Item = u16>) -> Self {
        Self {
            script: Mutex::new(statuses.into_iter().collect()),
            ..Default::default()
        }
    }

    async fn kinds(&self) -> Vec<ResourceKind> {
        self.calls.lock().await.iter().map(|c| c.0).collect()
    }

    async fn payload(&self, kind: ResourceKind) -> Value {
        self.calls
            .lock()
            .await
            .iter()
            .rev()
            .find(|c| c.0 == kind)
            .map(|c| c.2.clone())
            .unwrap_or(Value::Null)
    }
}

#[async_trait]
impl SearchServiceTransport for MockSearchService {
    async fn put(
        &self,
        kind: ResourceKind,
        name: &str,
        body: &Value,
    ) -> Result<TransportResponse, ProvisionError> {
        self.put_count.fetch_add(1, Ordering::SeqCst);
        self.calls
            .lock()
            .await
            .push((kind, name.to_string(), body.clone()));

        let scripted = self.script.lock().await.pop_front();
        let mut resources = self.resources.lock().await;
        let key = (kind, name.to_string());
        let status = scripted.unwrap_or(if resources.contains_key(&key) { 204 } else { 201 });

        if (200..300).contains(&status) {
            resources.insert(key, body.clone());
            Ok(TransportResponse::new(status, ""))
        } else {
            Ok(TransportResponse::new(status, r#"{"error":{"message":"rejected"}}"#))
        }
    }
}

fn config(overrides: &[(&'static str, &'static str)]) -> ProvisionerConfig {
    let mut vars: HashMap<&str, &str> = HashMap::from([
        ("AZURE_SEARCH_ENDPOINT", "https://svc.search.windows.net"),
        ("AZURE_SEARCH_KEY", "admin-key"),
        ("AZURE_STORAGE_CONNECTION_STRING", "conn"),
        ("AZURE_STORAGE_CONTAINER_NAME", "docs"),
        ("AZURE_OPENAI_ENDPOINT", "https://aoai.openai.azure.com"),
        ("AZURE_OPENAI_KEY", "aoai-key"),
        ("AZURE_OPENAI_EMBEDDING_MODEL", "text-embedding-3-large"),
        ("AZURE_AISERVICES_KEY", "cog-key"),
        ("DATASOURCE_NAME", "ds1"),
        ("INDEX_NAME", "idx1"),
        ("SKILL_SET_NAME", "skill1"),
        ("INDEXER_NAME", "job1"),
        ("IS_DATASOURCE_SETUP", "false"),
        ("IS_DOC_INDEX_SETUP", "false"),
        ("IS_SKILLSET_SETUP", "false"),
        ("IS_INDEXER_SETUP", "false"),
    ]);
    vars.extend(overrides.iter().copied());

    ProvisionerConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()))
        .expect("test configuration is complete")
}

fn wire(config: &ProvisionerConfig, service: Arc<MockSearchService>) -> Dependencies {
    Dependencies::with_transport(config, service)
}

#[tokio::test]
async fn test_full_run_declares_four_resources_in_order() {
    let service = Arc::new(MockSearchService::default());
    let deps = wire(&config(&[]), service.clone());

    let report = deps.orchestrator.run(&deps.plan).await;

    assert_eq!(service.put_count.load(Ordering::SeqCst), 4);
    assert_eq!(
        service.kinds().await,
        vec![
            ResourceKind::DataSource,
            ResourceKind::Index,
            ResourceKind::Skillset,
            ResourceKind::Indexer,
        ]
    );
    assert!(report.steps.iter().all(|s| s.status == StepStatus::Created));

    let skillset = service.payload(ResourceKind::Skillset).await;
    assert_eq!(skillset["name"], "skill1");
    assert_eq!(
        skillset["indexProjections"]["selectors"][0]["targetIndexName"],
        "idx1"
    );

    let job = service.payload(ResourceKind::Indexer).await;
    assert_eq!(job["targetIndexName"], "idx1");
    assert_eq!(job["dataSourceName"], "ds1");
    assert_eq!(job["skillsetName"], "skill1");

    let index = service.payload(ResourceKind::Index).await;
    let vector = index["fields"]
        .as_array()
        .and_then(|fields| fields.iter().find(|f| f["name"] == "vector"))
        .cloned()
        .unwrap_or(Value::Null);
    assert_eq!(vector["dimensions"], 3072);
}

#[tokio::test]
async fn test_setup_flags_skip_calls() {
    let service = Arc::new(MockSearchService::default());
    let deps = wire(
        &config(&[("IS_DATASOURCE_SETUP", "true"), ("IS_SKILLSET_SETUP", "True")]),
        service.clone(),
    );

    let report = deps.orchestrator.run(&deps.plan).await;

    assert_eq!(
        service.kinds().await,
        vec![ResourceKind::Index, ResourceKind::Indexer]
    );
    assert_eq!(
        report.step(ResourceKind::DataSource).map(|s| s.status.clone()),
        Some(StepStatus::Skipped)
    );
    assert_eq!(
        report.step(ResourceKind::Skillset).map(|s| s.status.clone()),
        Some(StepStatus::Skipped)
    );
}

#[tokio::test]
async fn test_rejection_does_not_stop_the_run() {
    let service = Arc::new(MockSearchService::scripted([400, 201]));
    let deps = wire(&config(&[]), service.clone());

    let report = deps.orchestrator.run(&deps.plan).await;

    assert_eq!(service.put_count.load(Ordering::SeqCst), 4);
    let failed: Vec<ResourceKind> = report.failures().map(|s| s.kind).collect();
    assert_eq!(failed, vec![ResourceKind::DataSource]);
    assert_eq!(
        report.step(ResourceKind::Index).map(|s| s.status.clone()),
        Some(StepStatus::Created)
    );
    assert!(report
        .to_string()
        .contains("Datasource 'ds1': failed with status code 400"));
}

#[tokio::test]
async fn test_rerun_replaces_with_identical_state() {
    let service = Arc::new(MockSearchService::default());
    let deps = wire(&config(&[]), service.clone());

    deps.orchestrator.run(&deps.plan).await;
    let first = service.resources.lock().await.clone();

    let report = deps.orchestrator.run(&deps.plan).await;
    let second = service.resources.lock().await.clone();

    assert_eq!(first, second);
    assert_eq!(first.len(), 4);
    assert!(report.steps.iter().all(|s| s.status == StepStatus::Replaced));
    assert!(report.steps.iter().all(|s| s.http_status == Some(204)));
}

#[tokio::test]
async fn test_invalid_endpoint_fails_setup() {
    let mut config = config(&[]);
    config.search_endpoint = "not a url".to_string();

    assert!(Dependencies::new(&config).is_err());
}
