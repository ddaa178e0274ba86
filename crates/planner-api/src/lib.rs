//! In-process API facade with request validation, the SQLite item query, and the HTTP server.

pub mod config;
mod persistence;
mod server;
pub mod validation;

use std::path::Path;

use contracts::{
    ApiError, ErrorCode, ScorableItem, SimulationParameters, SimulationRequest, SimulationResult,
    StoredItem, TopItemsResponse, DEFAULT_TOP_ITEMS,
};
use planner_core::{simulate, top_items, verify_result};
pub use persistence::{CandidateFilter, PersistenceError, SqliteItemStore};
pub use server::{router, serve, ServerError};
use validation::{validate_candidates, validate_request};

pub const MAX_TOP_ITEMS: usize = 50;

#[derive(Debug, Default)]
pub struct PlannerApi {
    store: Option<SqliteItemStore>,
}

impl PlannerApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_store(store: SqliteItemStore) -> Self {
        Self { store: Some(store) }
    }

    pub fn attach_sqlite_store(&mut self, path: impl AsRef<Path>) -> Result<(), PersistenceError> {
        self.store = Some(SqliteItemStore::open(path)?);
        Ok(())
    }

    pub fn has_store(&self) -> bool {
        self.store.is_some()
    }

    pub fn import_items(
        &mut self,
        user_id: &str,
        items: &[StoredItem],
    ) -> Result<usize, PersistenceError> {
        let Some(store) = self.store.as_mut() else {
            return Err(PersistenceError::NotAttached);
        };

        store.upsert_items(user_id, items)
    }

    /// Runs a simulation over caller-supplied candidates.
    ///
    /// `groupIds` has nothing to select from here and is ignored.
    pub fn simulate(
        &self,
        candidates: &[ScorableItem],
        request: &SimulationRequest,
    ) -> Result<SimulationResult, ApiError> {
        let validated = validate_request(request)?;
        validate_candidates(candidates)?;
        if !validated.group_ids.is_empty() {
            tracing::debug!(
                groups = validated.group_ids.len(),
                "ignoring groupIds for inline candidates"
            );
        }

        run_checked(candidates, &validated.params)
    }

    /// Loads the user's unacquired items (narrowed by groups and price
    /// threshold) from the store and simulates over them.
    pub fn simulate_for_user(
        &self,
        user_id: &str,
        request: &SimulationRequest,
    ) -> Result<SimulationResult, ApiError> {
        let validated = validate_request(request)?;
        let store = self.require_store()?;
        require_user(store, user_id)?;

        let filter = CandidateFilter {
            group_ids: validated.group_ids,
            max_price: validated.params.max_price_threshold,
        };
        let candidates = store
            .load_candidates(user_id, &filter)
            .map_err(|err| persistence_failure("item query failed", err))?;
        tracing::debug!(
            user_id,
            candidates = candidates.len(),
            groups = filter.group_ids.len(),
            "loaded simulation candidates"
        );

        run_checked(&candidates, &validated.params)
    }

    /// Dashboard ranking: best finite scores first.
    pub fn top_items_for_user(
        &self,
        user_id: &str,
        limit: Option<usize>,
    ) -> Result<TopItemsResponse, ApiError> {
        let store = self.require_store()?;
        require_user(store, user_id)?;

        let items = store
            .load_all_unacquired(user_id)
            .map_err(|err| persistence_failure("item query failed", err))?;
        let limit = limit.unwrap_or(DEFAULT_TOP_ITEMS).clamp(1, MAX_TOP_ITEMS);

        Ok(TopItemsResponse {
            user_id: user_id.to_string(),
            items: top_items(&items, limit),
        })
    }

    fn require_store(&self) -> Result<&SqliteItemStore, ApiError> {
        self.store.as_ref().ok_or_else(|| {
            ApiError::new(
                ErrorCode::StoreUnavailable,
                "item store is not attached",
                None,
            )
        })
    }
}

fn require_user(store: &SqliteItemStore, user_id: &str) -> Result<(), ApiError> {
    let exists = store
        .user_exists(user_id)
        .map_err(|err| persistence_failure("user lookup failed", err))?;
    if exists {
        return Ok(());
    }

    Err(ApiError::new(
        ErrorCode::UserNotFound,
        "user has no items",
        Some(format!("user_id={user_id}")),
    ))
}

fn run_checked(
    candidates: &[ScorableItem],
    params: &SimulationParameters,
) -> Result<SimulationResult, ApiError> {
    let result = simulate(candidates, params);

    if let Err(violation) = verify_result(candidates, params, &result) {
        tracing::error!(%violation, "simulation ledger check failed");
        return Err(ApiError::new(
            ErrorCode::InternalError,
            "simulation produced an inconsistent plan",
            Some(violation.to_string()),
        ));
    }

    Ok(result)
}

fn persistence_failure(message: &str, err: PersistenceError) -> ApiError {
    match err {
        PersistenceError::NotAttached => ApiError::new(
            ErrorCode::StoreUnavailable,
            "item store is not attached",
            None,
        ),
        other => ApiError::new(ErrorCode::InternalError, message, Some(other.to_string())),
    }
}
