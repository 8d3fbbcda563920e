//! Authenticated CRUD against one entity collection endpoint.
//!
//! Every answer comes straight from the server: no caching, no local
//! validation. Duplicate names (400) and missing/invalid tokens (401) are
//! surfaced as statuses, not errors.

use super::{entity_code, EntityRecord};
use crate::auth::TokenManager;
use crate::error::{ApiError, ApiResult};
use crate::transport::{ApiRequest, ApiResponse};
use reqwest::StatusCode;
use serde_json::json;
use tracing::{debug, info, warn};

/// Client for one collection, borrowing the token of a [`TokenManager`].
///
/// Requests carry `Authorization: Bearer <token>` when the manager holds a
/// token and go out without it otherwise.
pub struct EntityClient<'a> {
    tokens: &'a TokenManager,
    collection_url: String,
}

impl<'a> EntityClient<'a> {
    pub fn new(tokens: &'a TokenManager, collection_url: impl Into<String>) -> Self {
        Self {
            tokens,
            collection_url: collection_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn collection_url(&self) -> &str {
        &self.collection_url
    }

    /// `prefix` followed by a fresh entity code, e.g. `test8812093`.
    pub fn unique_name(prefix: &str) -> String {
        format!("{}{}", prefix, entity_code())
    }

    fn item_url(&self, id: i64) -> String {
        format!("{}/id/{}", self.collection_url, id)
    }

    fn send(&self, request: ApiRequest) -> ApiResult<ApiResponse> {
        let request = request.bearer(self.tokens.current_token());
        self.tokens.transport().send(request)
    }

    // ========================================================================
    // Primitives
    // ========================================================================

    /// POST (base). 200 on success, 400 on duplicate name, 401 without a
    /// valid token.
    pub fn create(&self, name: &str) -> ApiResult<StatusCode> {
        let request = ApiRequest::post(&self.collection_url).json(json!({ "Name": name }));
        let response = self.send(request)?;
        debug!("Create {:?} -> {}", name, response.status);
        Ok(response.status)
    }

    /// GET (base). Never mutates the collection.
    pub fn list_all(&self) -> ApiResult<ApiResponse> {
        self.send(ApiRequest::get(&self.collection_url))
    }

    /// GET (base)/id/{id}. Not-found behavior is whatever the server does.
    pub fn get_by_id(&self, id: i64) -> ApiResult<ApiResponse> {
        self.send(ApiRequest::get(self.item_url(id)))
    }

    /// DELETE (base)/id/{id}. Deleting an id that doesn't exist is up to
    /// the server.
    pub fn delete_by_id(&self, id: i64) -> ApiResult<ApiResponse> {
        self.send(ApiRequest::delete(self.item_url(id)))
    }

    pub fn parse_entities(response: &ApiResponse) -> ApiResult<Vec<EntityRecord>> {
        response.json()
    }

    // ========================================================================
    // Parsed views
    // ========================================================================

    /// Current listing, in server order.
    pub fn list_records(&self) -> ApiResult<Vec<EntityRecord>> {
        Self::parse_entities(&self.list_all()?)
    }

    pub fn get_record(&self, id: i64) -> ApiResult<EntityRecord> {
        let response = self.get_by_id(id)?;
        if !response.is_success() {
            return Err(ApiError::UnexpectedStatus {
                operation: format!("GET {}", self.item_url(id)),
                status: response.status,
            });
        }
        response.json()
    }

    pub fn count(&self) -> ApiResult<usize> {
        Ok(self.list_records()?.len())
    }

    pub fn actual_ids(&self) -> ApiResult<Vec<i64>> {
        Ok(self.list_records()?.into_iter().map(|e| e.id).collect())
    }

    pub fn actual_names(&self) -> ApiResult<Vec<String>> {
        Ok(self.list_records()?.into_iter().map(|e| e.name).collect())
    }

    /// Id at `position` in the current listing.
    pub fn id_at(&self, position: usize) -> ApiResult<i64> {
        let ids = self.actual_ids()?;
        ids.get(position)
            .copied()
            .ok_or(ApiError::IndexOutOfRange {
                index: position,
                len: ids.len(),
            })
    }

    // ========================================================================
    // Composite operations
    // ========================================================================

    /// Cheap "is anything there" check on the raw listing body.
    ///
    /// An empty or whitespace-only body, or an empty JSON array, is `false`.
    /// A body that isn't a JSON array at all (an error page, a 401 message)
    /// still counts as `true`, so check the status first when it matters.
    pub fn exists(&self) -> ApiResult<bool> {
        let response = self.list_all()?;
        if !response.has_body() {
            return Ok(false);
        }
        match response.json::<Vec<serde_json::Value>>() {
            Ok(items) => Ok(!items.is_empty()),
            Err(e) => {
                warn!(
                    "Listing of {} is not a JSON array ({}), treating as non-empty",
                    self.collection_url, e
                );
                Ok(true)
            }
        }
    }

    /// Deletes every listed entity, one by one. Returns how many were deleted.
    ///
    /// An empty or unparseable listing is a no-op. Not transactional: the
    /// first failing delete aborts the rest and leaves the collection
    /// partially cleared.
    pub fn delete_all(&self) -> ApiResult<usize> {
        let listing = self.list_all()?;
        let records = match Self::parse_entities(&listing) {
            Ok(records) => records,
            Err(e) => {
                debug!(
                    "Nothing to delete in {} (status {}, {})",
                    self.collection_url, listing.status, e
                );
                return Ok(0);
            }
        };

        for record in &records {
            let response = self.delete_by_id(record.id)?;
            if !response.is_success() {
                warn!(
                    "Deleting {} {:?} failed with status {}, aborting",
                    record.id, record.name, response.status
                );
                return Err(ApiError::UnexpectedStatus {
                    operation: format!("DELETE {}", self.item_url(record.id)),
                    status: response.status,
                });
            }
        }

        if !records.is_empty() {
            info!(
                "Deleted {} entities from {}",
                records.len(),
                self.collection_url
            );
        }
        Ok(records.len())
    }
}
