//! HTTP client for the search engine. One core per tenant; the core name is
//! derived from the tenant id, so selecting the right core is what isolates
//! tenants from each other.

pub mod document;

use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

use crate::config;

pub use document::{
    decode, encode, to_atomic_update, CodecError, Education, HrProfile, HrProfileUpdate, Project,
    WorkExperience,
};

/// Query parameters with paging meaning, excluded from clause translation.
const RESERVED_PARAMS: &[&str] = &["q", "rows", "start"];

#[derive(Debug, Error)]
pub enum SearchError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("Search engine returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error(transparent)]
    Codec(#[from] CodecError),
}

#[derive(Debug, Deserialize)]
struct SelectResponse {
    response: SelectBody,
}

#[derive(Debug, Deserialize)]
struct SelectBody {
    #[serde(rename = "numFound", default)]
    #[allow(dead_code)]
    num_found: i64,
    #[serde(default)]
    docs: Vec<Value>,
}

pub struct SearchClient {
    http: reqwest::Client,
    base_url: String,
    core_prefix: String,
}

impl SearchClient {
    /// Shared client built from configuration on first use
    pub fn global() -> &'static SearchClient {
        use std::sync::OnceLock;
        static INSTANCE: OnceLock<SearchClient> = OnceLock::new();
        INSTANCE.get_or_init(|| {
            let search = &config::config().search;
            SearchClient::new(
                search.base_url.clone(),
                search.core_prefix.clone(),
                search.request_timeout_secs,
            )
        })
    }

    pub fn new(base_url: String, core_prefix: String, timeout_secs: u64) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            base_url,
            core_prefix,
        }
    }

    /// Deterministic core name for a tenant
    pub fn core_name(&self, tenant_id: i64) -> String {
        format!("{}{}", self.core_prefix, tenant_id)
    }

    /// Run a select query against a core and return the raw documents
    pub async fn select(
        &self,
        core: &str,
        query: &str,
        start: Option<u32>,
        rows: Option<u32>,
    ) -> Result<Vec<Value>, SearchError> {
        let url = format!("{}/{}/select", self.base_url, core);
        debug!("Search select on {}: {}", core, query);

        let mut params: Vec<(&str, String)> = vec![("q", query.to_string()), ("wt", "json".to_string())];
        if let Some(start) = start {
            params.push(("start", start.to_string()));
        }
        if let Some(rows) = rows {
            params.push(("rows", rows.to_string()));
        }

        let response = self.http.get(&url).query(&params).send().await?;
        let response = Self::check_status(response).await?;
        let body: SelectResponse = response.json().await?;
        Ok(body.response.docs)
    }

    /// Add a document to a core and commit
    pub async fn add_document(&self, core: &str, doc: &Value) -> Result<(), SearchError> {
        self.update(core, &json!({ "add": { "doc": doc } })).await
    }

    /// Apply an atomic update document (per-field `{"set": ..}` map)
    pub async fn atomic_update(&self, core: &str, doc: &Value) -> Result<(), SearchError> {
        self.update(core, &json!({ "add": { "doc": doc } })).await
    }

    /// Delete a document by id and commit
    pub async fn delete_document(&self, core: &str, id: &str) -> Result<(), SearchError> {
        self.update(core, &json!({ "delete": { "id": id } })).await
    }

    async fn update(&self, core: &str, body: &Value) -> Result<(), SearchError> {
        let url = format!("{}/{}/update", self.base_url, core);
        let response = self
            .http
            .post(&url)
            .query(&[("commit", "true")])
            .json(body)
            .send()
            .await?;
        Self::check_status(response).await?;
        Ok(())
    }

    /// Provision a new core for a tenant
    pub async fn create_core(&self, core: &str) -> Result<(), SearchError> {
        let url = format!("{}/admin/cores", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[
                ("action", "CREATE"),
                ("name", core),
                ("configSet", "_default"),
            ])
            .send()
            .await?;
        Self::check_status(response).await?;
        info!("Created search core: {}", core);
        Ok(())
    }

    /// Unload a tenant's core, dropping its index
    pub async fn unload_core(&self, core: &str) -> Result<(), SearchError> {
        let url = format!("{}/admin/cores", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[
                ("action", "UNLOAD"),
                ("core", core),
                ("deleteIndex", "true"),
            ])
            .send()
            .await?;
        Self::check_status(response).await?;
        info!("Unloaded search core: {}", core);
        Ok(())
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, SearchError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(SearchError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

/// Translate free-text query parameters into the engine's query syntax:
/// `field:"value"` clauses joined with AND, defaulting to match-all.
/// Paging parameters are passed through separately, not translated.
pub fn build_query<'a, I>(params: I) -> String
where
    I: IntoIterator<Item = (&'a String, &'a String)>,
{
    // BTreeMap gives a stable clause order regardless of input ordering
    let clauses: BTreeMap<&str, &str> = params
        .into_iter()
        .filter(|(key, _)| !RESERVED_PARAMS.contains(&key.as_str()))
        .map(|(key, value)| (key.as_str(), value.as_str()))
        .collect();

    if clauses.is_empty() {
        return "*:*".to_string();
    }

    clauses
        .iter()
        .map(|(field, value)| format!("{}:\"{}\"", field, escape_query_value(value)))
        .collect::<Vec<_>>()
        .join(" AND ")
}

fn escape_query_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn core_name_is_prefix_plus_tenant_id() {
        let client = SearchClient::new(
            "http://localhost:8983/solr".to_string(),
            "hrprofile_".to_string(),
            5,
        );
        assert_eq!(client.core_name(42), "hrprofile_42");
    }

    #[test]
    fn empty_params_build_match_all() {
        let params: HashMap<String, String> = HashMap::new();
        assert_eq!(build_query(&params), "*:*");
    }

    #[test]
    fn params_become_and_joined_clauses() {
        let mut params = HashMap::new();
        params.insert("first_name".to_string(), "Asha".to_string());
        params.insert("current_location".to_string(), "Pune".to_string());
        assert_eq!(
            build_query(&params),
            "current_location:\"Pune\" AND first_name:\"Asha\""
        );
    }

    #[test]
    fn paging_params_are_not_translated() {
        let mut params = HashMap::new();
        params.insert("rows".to_string(), "10".to_string());
        params.insert("start".to_string(), "20".to_string());
        assert_eq!(build_query(&params), "*:*");
    }

    #[test]
    fn query_values_are_escaped() {
        let mut params = HashMap::new();
        params.insert("about_me".to_string(), "said \"hi\"".to_string());
        assert_eq!(build_query(&params), "about_me:\"said \\\"hi\\\"\"");
    }
}
