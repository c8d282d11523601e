//! API Handlers
//!
//! HTTP request handlers for each cache server endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use tracing::warn;

use crate::cache::{ExpirationTracker, ShardedCacheService};
use crate::error::{CacheError, Result};
use crate::models::{
    validate_key, CountResponse, DeleteResponse, DumpQuery, DumpResponse, ExistsResponse,
    GetResponse, HealthResponse, SetRequest, SetResponse,
};

/// Application state shared across all handlers.
///
/// The sharded service synchronizes internally, so handlers share it through
/// a plain `Arc` with no outer lock.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Sharded cache service
    pub cache: Arc<ShardedCacheService>,
    /// Expiration registrations shared with the cleanup task
    pub tracker: Arc<ExpirationTracker>,
}

impl AppState {
    /// Creates a new AppState around an existing service and its tracker.
    pub fn new(cache: ShardedCacheService, tracker: Arc<ExpirationTracker>) -> Self {
        Self {
            cache: Arc::new(cache),
            tracker,
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Fails when the configured shard count is zero.
    pub fn from_config(config: &crate::config::Config) -> Result<Self> {
        let tracker = Arc::new(ExpirationTracker::new());
        let cache = ShardedCacheService::from_config(config, Arc::clone(&tracker))?;
        Ok(Self::new(cache, tracker))
    }
}

/// Handler for PUT /set
///
/// Stores a key-value pair in the cache with optional TTL.
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let key = req.key.clone();
    if let Err(err) = state.cache.set(req.key, req.value, req.ttl) {
        warn!(key = %key, error = %err, "Rejected cache write");
        return Err(err);
    }

    Ok(Json(SetResponse::new(key)))
}

/// Handler for GET /get/:key
///
/// Retrieves a value from the cache by key; misses map to 404.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    if let Some(error_msg) = validate_key(&key) {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let lookup = state.cache.get(&key);
    if !lookup.found() {
        return Err(CacheError::NotFound(key));
    }

    Ok(Json(GetResponse::from(lookup)))
}

/// Handler for GET /exists/:key
pub async fn exists_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<ExistsResponse>> {
    if let Some(error_msg) = validate_key(&key) {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let exists = state.cache.exists(&key);
    Ok(Json(ExistsResponse { key, exists }))
}

/// Handler for DELETE /del/:key
///
/// Deletes a key from the cache. Deleting an absent key is not an error.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    if let Some(error_msg) = validate_key(&key) {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let removed = state.cache.remove(&key);
    Ok(Json(DeleteResponse { key, removed }))
}

/// Handler for GET /count
pub async fn count_handler(State(state): State<AppState>) -> Result<Json<CountResponse>> {
    let count = state.cache.count().await?;

    Ok(Json(CountResponse {
        count,
        shards: state.cache.shard_count(),
    }))
}

/// Handler for GET /dump
///
/// Diagnostic snapshot of every shard; scans the whole key space.
pub async fn dump_handler(
    State(state): State<AppState>,
    Query(query): Query<DumpQuery>,
) -> Result<Json<DumpResponse>> {
    let entries = state.cache.dump(query.include_expired).await?;
    Ok(Json(DumpResponse { entries }))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
