//! Pinecone-style REST vector store client.
//!
//! The store's API: `GET /indexes/{name}` (describe), `POST /indexes`
//! (create), `POST /vectors/upsert`, and `POST /query`. Readiness after
//! creation is polled with a bounded wait; timing out is an operational
//! error, not an infinite stall.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, warn};

use siteqa_shared::{ChunkRecord, IndexConfig, Result, RetrievedChunk, SiteQaError};

use crate::VectorIndex;

const USER_AGENT: &str = concat!("siteqa/", env!("CARGO_PKG_VERSION"));

/// `reqwest` client for the vector-store REST API.
pub struct RestVectorIndex {
    client: reqwest::Client,
    base_url: String,
    index_name: String,
    dimension: usize,
    metric: String,
    ready_poll: Duration,
    ready_timeout: Duration,
    api_key: String,
}

#[derive(Serialize)]
struct UpsertVector<'a> {
    id: &'a str,
    values: &'a [f32],
    metadata: VectorMetadata<'a>,
}

#[derive(Serialize)]
struct VectorMetadata<'a> {
    page_id: &'a str,
    source_url: &'a str,
    text: &'a str,
}

#[derive(Deserialize)]
struct DescribeResponse {
    status: IndexStatus,
}

#[derive(Deserialize)]
struct IndexStatus {
    ready: bool,
}

#[derive(Deserialize)]
struct QueryResponse {
    matches: Vec<QueryMatch>,
}

#[derive(Deserialize)]
struct QueryMatch {
    id: String,
    score: f32,
    #[serde(default)]
    metadata: Option<MatchMetadata>,
}

#[derive(Deserialize, Default)]
struct MatchMetadata {
    #[serde(default)]
    page_id: String,
    #[serde(default)]
    source_url: String,
    #[serde(default)]
    text: String,
}

impl RestVectorIndex {
    /// Build a client from config. `base_url` must be set; the API key is
    /// resolved by the caller and injected.
    pub fn new(config: &IndexConfig, api_key: String) -> Result<Self> {
        if config.base_url.is_empty() {
            return Err(SiteQaError::config(
                "index.base_url is not set; point it at your vector store",
            ));
        }

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| SiteQaError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            index_name: config.name.clone(),
            dimension: config.dimension,
            metric: config.metric.clone(),
            ready_poll: Duration::from_secs(config.ready_poll_secs),
            ready_timeout: Duration::from_secs(config.ready_timeout_secs),
            api_key,
        })
    }

    /// Describe the index. `Ok(None)` means it does not exist yet.
    async fn describe(&self) -> Result<Option<bool>> {
        let response = self
            .client
            .get(format!("{}/indexes/{}", self.base_url, self.index_name))
            .header("Api-Key", &self.api_key)
            .send()
            .await
            .map_err(|e| SiteQaError::Network(format!("describe index: {e}")))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SiteQaError::VectorStore(format!(
                "describe index returned {status}: {body}"
            )));
        }

        let parsed: DescribeResponse = response
            .json()
            .await
            .map_err(|e| SiteQaError::VectorStore(format!("malformed describe response: {e}")))?;

        Ok(Some(parsed.status.ready))
    }

    async fn create(&self) -> Result<()> {
        info!(
            index = %self.index_name,
            dimension = self.dimension,
            metric = %self.metric,
            "creating vector index"
        );

        let response = self
            .client
            .post(format!("{}/indexes", self.base_url))
            .header("Api-Key", &self.api_key)
            .json(&json!({
                "name": self.index_name,
                "dimension": self.dimension,
                "metric": self.metric,
            }))
            .send()
            .await
            .map_err(|e| SiteQaError::Network(format!("create index: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SiteQaError::VectorStore(format!(
                "create index returned {status}: {body}"
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl VectorIndex for RestVectorIndex {
    async fn ensure_ready(&self) -> Result<()> {
        if self.describe().await?.is_none() {
            self.create().await?;
        }

        let start = Instant::now();
        loop {
            match self.describe().await? {
                Some(true) => return Ok(()),
                Some(false) | None => {}
            }

            if start.elapsed() >= self.ready_timeout {
                return Err(SiteQaError::IndexNotReady {
                    waited_secs: start.elapsed().as_secs(),
                });
            }

            warn!(index = %self.index_name, "index not ready yet, waiting");
            tokio::time::sleep(self.ready_poll).await;
        }
    }

    async fn upsert(&self, records: &[ChunkRecord], vectors: &[Vec<f32>]) -> Result<()> {
        if records.len() != vectors.len() {
            return Err(SiteQaError::validation(format!(
                "upsert batch shape: {} records vs {} vectors",
                records.len(),
                vectors.len()
            )));
        }

        let payload: Vec<UpsertVector<'_>> = records
            .iter()
            .zip(vectors)
            .map(|(record, values)| UpsertVector {
                id: &record.id,
                values,
                metadata: VectorMetadata {
                    page_id: &record.page_id,
                    source_url: &record.source_url,
                    text: &record.text,
                },
            })
            .collect();

        debug!(batch = payload.len(), "upserting vectors");

        let response = self
            .client
            .post(format!("{}/vectors/upsert", self.base_url))
            .header("Api-Key", &self.api_key)
            .json(&json!({ "vectors": payload }))
            .send()
            .await
            .map_err(|e| SiteQaError::Network(format!("upsert: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SiteQaError::VectorStore(format!(
                "upsert returned {status}: {body}"
            )));
        }

        Ok(())
    }

    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<RetrievedChunk>> {
        let response = self
            .client
            .post(format!("{}/query", self.base_url))
            .header("Api-Key", &self.api_key)
            .json(&json!({
                "vector": vector,
                "topK": top_k,
                "includeMetadata": true,
            }))
            .send()
            .await
            .map_err(|e| SiteQaError::Network(format!("query: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SiteQaError::VectorStore(format!(
                "query returned {status}: {body}"
            )));
        }

        let parsed: QueryResponse = response
            .json()
            .await
            .map_err(|e| SiteQaError::VectorStore(format!("malformed query response: {e}")))?;

        Ok(parsed
            .matches
            .into_iter()
            .map(|m| {
                let meta = m.metadata.unwrap_or_default();
                RetrievedChunk {
                    id: m.id,
                    score: m.score,
                    text: meta.text,
                    page_id: meta.page_id,
                    source_url: meta.source_url,
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(base_url: &str, ready_timeout_secs: u64) -> IndexConfig {
        IndexConfig {
            name: "siteqa-test".into(),
            base_url: base_url.into(),
            dimension: 3,
            metric: "cosine".into(),
            batch_size: 100,
            ready_poll_secs: 0,
            ready_timeout_secs,
            ..IndexConfig::default()
        }
    }

    fn record(id: &str) -> ChunkRecord {
        ChunkRecord {
            id: id.into(),
            page_id: "Home".into(),
            source_url: "https://example.com/".into(),
            text: "chunk text".into(),
        }
    }

    #[tokio::test]
    async fn ensure_ready_returns_when_index_reports_ready() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/indexes/siteqa-test"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"status": {"ready": true}})),
            )
            .mount(&server)
            .await;

        let index = RestVectorIndex::new(&config(&server.uri(), 10), "key".into()).expect("client");
        index.ensure_ready().await.expect("ready");
    }

    #[tokio::test]
    async fn ensure_ready_creates_missing_index() {
        let server = MockServer::start().await;
        // The first describe sees no index; after that single use expires,
        // later describes hit the "ready" mock mounted below.
        Mock::given(method("GET"))
            .and(path("/indexes/siteqa-test"))
            .respond_with(ResponseTemplate::new(404))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/indexes"))
            .and(body_partial_json(
                serde_json::json!({"name": "siteqa-test", "dimension": 3, "metric": "cosine"}),
            ))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/indexes/siteqa-test"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"status": {"ready": true}})),
            )
            .mount(&server)
            .await;

        let index = RestVectorIndex::new(&config(&server.uri(), 10), "key".into()).expect("client");
        index.ensure_ready().await.expect("created and ready");
    }

    #[tokio::test]
    async fn ensure_ready_times_out_with_operational_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/indexes/siteqa-test"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"status": {"ready": false}})),
            )
            .mount(&server)
            .await;

        let index = RestVectorIndex::new(&config(&server.uri(), 0), "key".into()).expect("client");
        let err = index.ensure_ready().await.unwrap_err();
        assert!(matches!(err, SiteQaError::IndexNotReady { .. }));
    }

    #[tokio::test]
    async fn upsert_sends_ids_values_and_metadata() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/vectors/upsert"))
            .and(body_partial_json(serde_json::json!({
                "vectors": [{
                    "id": "vec_0",
                    "values": [1.0, 0.0, 0.5],
                    "metadata": {
                        "page_id": "Home",
                        "source_url": "https://example.com/",
                        "text": "chunk text",
                    },
                }]
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let index = RestVectorIndex::new(&config(&server.uri(), 10), "key".into()).expect("client");
        index
            .upsert(&[record("vec_0")], &[vec![1.0, 0.0, 0.5]])
            .await
            .expect("upsert");
    }

    #[tokio::test]
    async fn upsert_rejects_mismatched_batch() {
        let server = MockServer::start().await;
        let index = RestVectorIndex::new(&config(&server.uri(), 10), "key".into()).expect("client");
        let err = index.upsert(&[record("vec_0")], &[]).await.unwrap_err();
        assert!(matches!(err, SiteQaError::Validation { .. }));
    }

    #[tokio::test]
    async fn query_maps_matches_to_chunks() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/query"))
            .and(body_partial_json(serde_json::json!({
                "topK": 2,
                "includeMetadata": true,
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "matches": [
                    {
                        "id": "vec_4",
                        "score": 0.93,
                        "metadata": {
                            "page_id": "Dining",
                            "source_url": "https://example.com/dining",
                            "text": "Restaurants on every level.",
                        },
                    },
                    {"id": "vec_9", "score": 0.5},
                ]
            })))
            .mount(&server)
            .await;

        let index = RestVectorIndex::new(&config(&server.uri(), 10), "key".into()).expect("client");
        let chunks = index.query(&[0.1, 0.2, 0.3], 2).await.expect("query");

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].page_id, "Dining");
        assert_eq!(chunks[0].text, "Restaurants on every level.");
        // Matches without metadata still come back, with empty fields.
        assert!(chunks[1].text.is_empty());
    }

    #[tokio::test]
    async fn missing_base_url_is_a_config_error() {
        let mut cfg = config("", 10);
        cfg.base_url = String::new();
        let err = RestVectorIndex::new(&cfg, "key".into()).err();
        assert!(matches!(err, Some(SiteQaError::Config { .. })));
    }
}
