use std::collections::HashMap;

use uuid::Uuid;

use crate::search::{
    build_query, decode, encode, to_atomic_update, HrProfile, HrProfileUpdate, SearchClient,
    SearchError,
};
use crate::services::non_empty;

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    #[error("HR profile {0} not found")]
    NotFound(String),
    #[error(transparent)]
    Search(#[from] SearchError),
}

/// HR profile CRUD against the caller's tenant core. Every operation derives
/// the core name from the tenant id, which is what keeps tenants isolated.
pub struct ProfileService {
    search: &'static SearchClient,
}

impl ProfileService {
    pub fn new() -> Self {
        Self {
            search: SearchClient::global(),
        }
    }

    pub async fn list(
        &self,
        tenant_id: i64,
        params: &HashMap<String, String>,
    ) -> Result<Vec<HrProfile>, ProfileError> {
        let core = self.search.core_name(tenant_id);

        // An explicit q wins; otherwise translate field params, default match-all
        let query = match params.get("q") {
            Some(q) if !q.trim().is_empty() => q.clone(),
            _ => build_query(params),
        };
        let start = params.get("start").and_then(|v| v.parse().ok());
        let rows = params.get("rows").and_then(|v| v.parse().ok());

        let docs = self.search.select(&core, &query, start, rows).await?;
        let profiles = docs
            .iter()
            .map(decode)
            .collect::<Result<Vec<_>, _>>()
            .map_err(SearchError::from)?;
        Ok(profiles)
    }

    /// Add a profile; the document id is assigned here and returned
    pub async fn add(&self, tenant_id: i64, mut profile: HrProfile) -> Result<String, ProfileError> {
        non_empty(&profile.first_name).ok_or(ProfileError::MissingField("first_name"))?;
        non_empty(&profile.email_id).ok_or(ProfileError::MissingField("email_id"))?;

        let id = Uuid::new_v4().to_string();
        profile.id = Some(id.clone());
        profile.tenant_id = Some(tenant_id);

        let core = self.search.core_name(tenant_id);
        let doc = encode(&profile).map_err(SearchError::from)?;
        self.search.add_document(&core, &doc).await?;

        Ok(id)
    }

    pub async fn view(&self, tenant_id: i64, id: &str) -> Result<HrProfile, ProfileError> {
        self.fetch_by_id(tenant_id, id)
            .await?
            .ok_or_else(|| ProfileError::NotFound(id.to_string()))
    }

    /// Partial update: only supplied fields are written; everything else,
    /// nested sections included, is left as stored.
    pub async fn update(
        &self,
        tenant_id: i64,
        id: &str,
        update: HrProfileUpdate,
    ) -> Result<(), ProfileError> {
        // Existence check first so an unknown id is a clean 404, not a Solr upsert
        if self.fetch_by_id(tenant_id, id).await?.is_none() {
            return Err(ProfileError::NotFound(id.to_string()));
        }

        let core = self.search.core_name(tenant_id);
        let doc = to_atomic_update(id, &update).map_err(SearchError::from)?;
        self.search.atomic_update(&core, &doc).await?;
        Ok(())
    }

    pub async fn delete(&self, tenant_id: i64, id: &str) -> Result<(), ProfileError> {
        if self.fetch_by_id(tenant_id, id).await?.is_none() {
            return Err(ProfileError::NotFound(id.to_string()));
        }

        let core = self.search.core_name(tenant_id);
        self.search.delete_document(&core, id).await?;
        Ok(())
    }

    async fn fetch_by_id(
        &self,
        tenant_id: i64,
        id: &str,
    ) -> Result<Option<HrProfile>, ProfileError> {
        let core = self.search.core_name(tenant_id);
        let query = format!("id:\"{}\"", id.replace('"', "\\\""));
        let docs = self.search.select(&core, &query, None, Some(1)).await?;

        match docs.first() {
            Some(doc) => Ok(Some(decode(doc).map_err(SearchError::from)?)),
            None => Ok(None),
        }
    }
}

impl Default for ProfileService {
    fn default() -> Self {
        Self::new()
    }
}
