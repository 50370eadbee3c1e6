
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use url::Url;

use super::{IndexEntry, ScoredEntry, VectorIndex};
use crate::FindasoError;
use crate::config::Config;
use crate::http::{JsonReply, build_agent, read_reply};

const API_KEY_HEADER: &str = "Api-Key";
const API_VERSION_HEADER: &str = "X-Pinecone-API-Version";
const HTTP_CONFLICT: u16 = 409;

/// Shape of the index the pipeline writes to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSpec {
    pub name: String,
    pub dimension: usize,
    pub metric: String,
    pub cloud: String,
    pub region: String,
}

impl IndexSpec {
    #[inline]
    pub fn from_config(config: &Config) -> Self {
        Self {
            name: config.pinecone.index_name.clone(),
            dimension: config.openai.dimension,
            metric: config.pinecone.metric.clone(),
            cloud: config.pinecone.cloud.clone(),
            region: config.pinecone.region.clone(),
        }
    }
}

/// Whether `ensure_index` had to create the index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexSetup {
    Created,
    Existing,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IndexDescription {
    pub name: String,
    #[serde(default)]
    pub dimension: Option<usize>,
    #[serde(default)]
    pub metric: Option<String>,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub status: IndexStatus,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct IndexStatus {
    #[serde(default)]
    pub ready: bool,
    #[serde(default)]
    pub state: String,
}

/// Result of a create request that did not fail outright
#[derive(Debug)]
enum CreateOutcome {
    Created(IndexDescription),
    AlreadyExists,
}

#[derive(Debug, Deserialize)]
struct IndexList {
    #[serde(default)]
    indexes: Vec<IndexDescription>,
}

#[derive(Debug, Serialize)]
struct CreateIndexRequest<'a> {
    name: &'a str,
    dimension: usize,
    metric: &'a str,
    spec: ServerlessSpec<'a>,
}

#[derive(Debug, Serialize)]
struct ServerlessSpec<'a> {
    serverless: CloudRegion<'a>,
}

#[derive(Debug, Serialize)]
struct CloudRegion<'a> {
    cloud: &'a str,
    region: &'a str,
}

#[derive(Debug, Serialize)]
struct UpsertRequest<'a> {
    vectors: &'a [IndexEntry],
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpsertResponse {
    #[serde(default)]
    upserted_count: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
    include_values: bool,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<ScoredEntry>,
}

/// Authentication and transport shared by control and data plane calls
#[derive(Clone)]
struct Session {
    api_key: String,
    api_version: String,
    agent: ureq::Agent,
}

impl Session {
    fn get(&self, url: &Url, what: &str) -> Result<JsonReply> {
        debug!("GET {}", url);
        read_reply(
            self.agent
                .get(url.as_str())
                .header(API_KEY_HEADER, &self.api_key)
                .header(API_VERSION_HEADER, &self.api_version)
                .call(),
            what,
        )
    }

    fn post(&self, url: &Url, body: &str, what: &str) -> Result<JsonReply> {
        debug!("POST {}", url);
        read_reply(
            self.agent
                .post(url.as_str())
                .header(API_KEY_HEADER, &self.api_key)
                .header(API_VERSION_HEADER, &self.api_version)
                .header("Content-Type", "application/json")
                .send(body),
            what,
        )
    }
}

fn ensure_success(reply: &JsonReply, what: &str) -> Result<(), FindasoError> {
    if reply.is_success() {
        return Ok(());
    }
    Err(FindasoError::VectorStore(format!(
        "{} failed with HTTP {}: {}",
        what,
        reply.status,
        reply.error_message()
    )))
}

fn endpoint(base: &Url, path: &str) -> Result<Url> {
    let raw = format!("{}/{}", base.as_str().trim_end_matches('/'), path);
    Url::parse(&raw).with_context(|| format!("Failed to build URL {}", raw))
}

/// Control plane client: lists, describes and creates indexes
#[derive(Clone)]
pub struct PineconeClient {
    control_plane: Url,
    session: Session,
    poll_interval: Duration,
    ready_timeout: Duration,
}

impl PineconeClient {
    #[inline]
    pub fn new(config: &Config) -> Result<Self> {
        let control_plane = config
            .pinecone
            .control_plane_url()
            .context("Failed to read Pinecone control plane URL from config")?;

        let api_key = config.secrets.pinecone_api_key.trim().to_string();
        anyhow::ensure!(!api_key.is_empty(), "missing Pinecone API key");

        Ok(Self {
            control_plane,
            session: Session {
                api_key,
                api_version: config.pinecone.api_version.clone(),
                agent: build_agent(None),
            },
            poll_interval: Duration::from_secs(config.pinecone.ready_poll_interval_secs),
            ready_timeout: Duration::from_secs(config.pinecone.ready_timeout_secs),
        })
    }

    #[inline]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.session.agent = build_agent(Some(timeout));
        self
    }

    #[inline]
    pub fn with_ready_polling(mut self, interval: Duration, timeout: Duration) -> Self {
        self.poll_interval = interval;
        self.ready_timeout = timeout;
        self
    }

    pub fn list_indexes(&self) -> Result<Vec<IndexDescription>> {
        let url = endpoint(&self.control_plane, "indexes")?;
        let reply = self.session.get(&url, "list indexes request")?;
        ensure_success(&reply, "Listing indexes")?;

        let list: IndexList =
            serde_json::from_str(&reply.body).context("Failed to parse index list")?;
        debug!("Found {} indexes", list.indexes.len());
        Ok(list.indexes)
    }

    pub fn describe_index(&self, name: &str) -> Result<IndexDescription> {
        let url = endpoint(&self.control_plane, &format!("indexes/{}", name))?;
        let reply = self.session.get(&url, "describe index request")?;
        ensure_success(&reply, &format!("Describing index '{}'", name))?;

        serde_json::from_str(&reply.body).context("Failed to parse index description")
    }

    pub fn create_index(&self, spec: &IndexSpec) -> Result<IndexDescription> {
        match self.request_create(spec)? {
            CreateOutcome::Created(description) => Ok(description),
            CreateOutcome::AlreadyExists => Err(FindasoError::VectorStore(format!(
                "Creating index '{}' failed: index already exists",
                spec.name
            ))
            .into()),
        }
    }

    /// POST the create request, telling a conflict apart by its status code
    fn request_create(&self, spec: &IndexSpec) -> Result<CreateOutcome> {
        let url = endpoint(&self.control_plane, "indexes")?;
        let request = CreateIndexRequest {
            name: &spec.name,
            dimension: spec.dimension,
            metric: &spec.metric,
            spec: ServerlessSpec {
                serverless: CloudRegion {
                    cloud: &spec.cloud,
                    region: &spec.region,
                },
            },
        };
        let body =
            serde_json::to_string(&request).context("Failed to serialize create index request")?;

        let reply = self.session.post(&url, &body, "create index request")?;
        if reply.status == HTTP_CONFLICT {
            return Ok(CreateOutcome::AlreadyExists);
        }
        ensure_success(&reply, &format!("Creating index '{}'", spec.name))?;

        let description = serde_json::from_str(&reply.body)
            .context("Failed to parse created index description")?;
        Ok(CreateOutcome::Created(description))
    }

    /// Open the index named in `spec`, creating it first when it is missing.
    ///
    /// Safe to call on every run: an existing index is never recreated.
    pub fn ensure_index(&self, spec: &IndexSpec) -> Result<(PineconeIndex, IndexSetup)> {
        let existing = self
            .list_indexes()
            .context("Failed to check for existing index")?
            .into_iter()
            .find(|index| index.name == spec.name);

        if let Some(description) = existing {
            check_dimension(&description, spec)?;
            info!("Using existing index '{}'", spec.name);
            let description = self.wait_until_ready(description)?;
            return Ok((self.index_handle(&description)?, IndexSetup::Existing));
        }

        info!(
            "Creating index '{}' ({} dimensions, {} {} {})",
            spec.name, spec.dimension, spec.metric, spec.cloud, spec.region
        );

        let (description, setup) = match self.request_create(spec)? {
            CreateOutcome::Created(description) => (description, IndexSetup::Created),
            CreateOutcome::AlreadyExists => {
                warn!("Index '{}' appeared while creating it; reusing it", spec.name);
                let description = self.describe_index(&spec.name)?;
                check_dimension(&description, spec)?;
                (description, IndexSetup::Existing)
            }
        };

        let description = self.wait_until_ready(description)?;
        Ok((self.index_handle(&description)?, setup))
    }

    /// Open an index that is expected to exist already
    pub fn open_index(&self, name: &str) -> Result<PineconeIndex> {
        let description = self
            .describe_index(name)
            .with_context(|| format!("Failed to open index '{}'", name))?;
        self.index_handle(&description)
    }

    fn wait_until_ready(&self, mut description: IndexDescription) -> Result<IndexDescription> {
        let deadline = Instant::now() + self.ready_timeout;

        while !description.status.ready {
            if Instant::now() >= deadline {
                return Err(FindasoError::VectorStore(format!(
                    "Index '{}' not ready after {:?} (state: {})",
                    description.name, self.ready_timeout, description.status.state
                ))
                .into());
            }

            debug!(
                "Index '{}' is {}, checking again in {:?}",
                description.name, description.status.state, self.poll_interval
            );
            std::thread::sleep(self.poll_interval);
            description = self.describe_index(&description.name)?;
        }

        Ok(description)
    }

    fn index_handle(&self, description: &IndexDescription) -> Result<PineconeIndex> {
        anyhow::ensure!(
            !description.host.trim().is_empty(),
            "Index '{}' has no host",
            description.name
        );

        let raw_host = if description.host.contains("://") {
            description.host.clone()
        } else {
            format!("https://{}", description.host)
        };
        let host = Url::parse(&raw_host)
            .with_context(|| format!("Invalid index host: {}", description.host))?;

        Ok(PineconeIndex {
            name: description.name.clone(),
            host,
            dimension: description.dimension,
            session: self.session.clone(),
        })
    }
}

fn check_dimension(description: &IndexDescription, spec: &IndexSpec) -> Result<()> {
    match description.dimension {
        Some(dimension) if dimension != spec.dimension => Err(FindasoError::VectorStore(format!(
            "Index '{}' has dimension {} but embeddings have {}",
            spec.name, dimension, spec.dimension
        ))
        .into()),
        _ => Ok(()),
    }
}

/// Data plane handle for one index
#[derive(Clone)]
pub struct PineconeIndex {
    name: String,
    host: Url,
    dimension: Option<usize>,
    session: Session,
}

impl PineconeIndex {
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn host(&self) -> &Url {
        &self.host
    }

    fn check_vector(&self, vector: &[f32]) -> Result<(), FindasoError> {
        match self.dimension {
            Some(dimension) if dimension != vector.len() => Err(FindasoError::VectorStore(
                format!(
                    "Vector has {} dimensions but index '{}' expects {}",
                    vector.len(),
                    self.name,
                    dimension
                ),
            )),
            _ => Ok(()),
        }
    }
}

impl VectorIndex for PineconeIndex {
    fn upsert(&self, entry: &IndexEntry) -> Result<()> {
        self.check_vector(&entry.values)?;

        let url = endpoint(&self.host, "vectors/upsert")?;
        let request = UpsertRequest {
            vectors: std::slice::from_ref(entry),
        };
        let body = serde_json::to_string(&request).context("Failed to serialize upsert request")?;

        let reply = self.session.post(&url, &body, "upsert request")?;
        ensure_success(&reply, &format!("Upserting '{}'", entry.id))?;

        let response: UpsertResponse =
            serde_json::from_str(&reply.body).context("Failed to parse upsert response")?;
        debug!(
            "Upserted '{}' into '{}' ({} written)",
            entry.id, self.name, response.upserted_count
        );
        Ok(())
    }

    fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<ScoredEntry>> {
        self.check_vector(vector)?;

        let url = endpoint(&self.host, "query")?;
        let request = QueryRequest {
            vector,
            top_k,
            include_metadata: true,
            include_values: false,
        };
        let body = serde_json::to_string(&request).context("Failed to serialize query request")?;

        let reply = self.session.post(&url, &body, "query request")?;
        ensure_success(&reply, &format!("Querying '{}'", self.name))?;

        let response: QueryResponse =
            serde_json::from_str(&reply.body).context("Failed to parse query response")?;
        debug!("Query returned {} matches", response.matches.len());
        Ok(response.matches)
    }

    #[inline]
    fn dimension(&self) -> Option<usize> {
        self.dimension
    }
}
