//! v1 cross-boundary contracts shared by the planner core, API, item store and CLI.

use std::fmt;

use serde::{Deserialize, Serialize};

pub mod serde_score;

pub const SCHEMA_VERSION_V1: &str = "1.0";

/// Hard ceiling on simulated months, applied with or without a deadline.
pub const MAX_SIMULATION_MONTHS: u32 = 120;

/// Size of the dashboard "top items" view.
pub const DEFAULT_TOP_ITEMS: usize = 5;

/// A purchasable item as handed to the simulator by the item query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScorableItem {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub priority: f64,
}

impl ScorableItem {
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: f64, priority: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            priority,
        }
    }
}

/// A [`ScorableItem`] with its derived, never persisted score.
///
/// `score` is `f64::INFINITY` for items priced at or below zero.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScoredItem {
    #[serde(flatten)]
    pub item: ScorableItem,
    #[serde(with = "serde_score")]
    pub score: f64,
}

impl ScoredItem {
    pub fn id(&self) -> &str {
        &self.item.id
    }

    pub fn price(&self) -> f64 {
        self.item.price
    }

    pub fn into_item(self) -> ScorableItem {
        self.item
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SimulationParameters {
    pub initial_budget: f64,
    pub monthly_income: f64,
    #[serde(default)]
    pub deadline_months: Option<u32>,
    #[serde(default)]
    pub max_price_threshold: Option<f64>,
}

impl SimulationParameters {
    pub fn new(initial_budget: f64, monthly_income: f64) -> Self {
        Self {
            initial_budget,
            monthly_income,
            deadline_months: None,
            max_price_threshold: None,
        }
    }

    pub fn with_deadline(mut self, months: u32) -> Self {
        self.deadline_months = Some(months);
        self
    }

    pub fn with_max_price(mut self, threshold: f64) -> Self {
        self.max_price_threshold = Some(threshold);
        self
    }

    /// Months the simulator may run: the deadline, never above the ceiling.
    pub fn horizon_months(&self) -> u32 {
        self.deadline_months
            .map_or(MAX_SIMULATION_MONTHS, |months| {
                months.min(MAX_SIMULATION_MONTHS)
            })
    }

    pub fn admits_price(&self, price: f64) -> bool {
        self.max_price_threshold
            .map_or(true, |threshold| price <= threshold)
    }
}

/// Request body for a simulation, before validation.
///
/// `deadline_months` is signed so zero and negative values reach validation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SimulationRequest {
    pub initial_budget: f64,
    pub monthly_income: f64,
    #[serde(default)]
    pub deadline_months: Option<i64>,
    #[serde(default)]
    pub max_price_threshold: Option<f64>,
    #[serde(default)]
    pub group_ids: Vec<String>,
}

impl SimulationRequest {
    pub fn new(initial_budget: f64, monthly_income: f64) -> Self {
        Self {
            initial_budget,
            monthly_income,
            deadline_months: None,
            max_price_threshold: None,
            group_ids: Vec::new(),
        }
    }
}

/// Stateless simulation: the caller ships the candidate list with the request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InlineSimulationRequest {
    #[serde(default)]
    pub items: Vec<ScorableItem>,
    #[serde(flatten)]
    pub request: SimulationRequest,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyPurchase {
    pub month: u32,
    pub items: Vec<ScoredItem>,
    pub spent: f64,
    pub remaining: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub total_months: u32,
    pub monthly_purchases: Vec<MonthlyPurchase>,
    pub total_spent: f64,
    pub unpurchased: Vec<ScorableItem>,
}

impl SimulationResult {
    pub fn purchased_items(&self) -> impl Iterator<Item = &ScoredItem> {
        self.monthly_purchases
            .iter()
            .flat_map(|record| record.items.iter())
    }

    pub fn purchased_count(&self) -> usize {
        self.monthly_purchases
            .iter()
            .map(|record| record.items.len())
            .sum()
    }

    pub fn is_fully_purchased(&self) -> bool {
        self.unpurchased.is_empty()
    }
}

impl fmt::Display for SimulationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "months={} purchased={} spent={:.2} unpurchased={}",
            self.total_months,
            self.purchased_count(),
            self.total_spent,
            self.unpurchased.len()
        )
    }
}

/// Row shape of the item query collaborator, also the `import` file format.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoredItem {
    #[serde(flatten)]
    pub item: ScorableItem,
    #[serde(default)]
    pub acquired: bool,
    #[serde(default)]
    pub group_ids: Vec<String>,
}

impl StoredItem {
    pub fn new(item: ScorableItem) -> Self {
        Self {
            item,
            acquired: false,
            group_ids: Vec::new(),
        }
    }

    pub fn in_groups<I, S>(mut self, group_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.group_ids = group_ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn acquired(mut self) -> Self {
        self.acquired = true;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TopItemsResponse {
    pub user_id: String,
    pub items: Vec<ScoredItem>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidRequest,
    UserNotFound,
    StoreUnavailable,
    InternalError,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    pub schema_version: String,
    pub error_code: ErrorCode,
    pub message: String,
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(error_code: ErrorCode, message: impl Into<String>, details: Option<String>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            error_code,
            message: message.into(),
            details,
        }
    }

    pub fn invalid_request(message: impl Into<String>, details: Option<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message, details)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.error_code, self.message)?;
        if let Some(details) = &self.details {
            write!(f, " ({details})")?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn horizon_is_capped_by_ceiling() {
        let params = SimulationParameters::new(0.0, 10.0);
        assert_eq!(params.horizon_months(), MAX_SIMULATION_MONTHS);
        assert_eq!(params.with_deadline(6).horizon_months(), 6);
        assert_eq!(params.with_deadline(500).horizon_months(), MAX_SIMULATION_MONTHS);
    }

    #[test]
    fn result_serializes_with_camel_case_fields() {
        let result = SimulationResult {
            total_months: 1,
            monthly_purchases: vec![MonthlyPurchase {
                month: 1,
                items: vec![ScoredItem {
                    item: ScorableItem::new("a", "Desk", 50.0, 3.0),
                    score: 4.86,
                }],
                spent: 50.0,
                remaining: 50.0,
            }],
            total_spent: 50.0,
            unpurchased: Vec::new(),
        };

        let value = serde_json::to_value(&result).expect("serialize result");
        assert_eq!(value["totalMonths"], 1);
        assert_eq!(value["totalSpent"], 50.0);
        let first = &value["monthlyPurchases"][0]["items"][0];
        assert_eq!(first["id"], "a");
        assert_eq!(first["score"], 4.86);
        assert!(first.get("item").is_none());
    }

    #[test]
    fn fully_purchased_means_nothing_left_over() {
        let mut result = SimulationResult::default();
        assert!(result.is_fully_purchased());
        assert_eq!(result.purchased_count(), 0);

        result.unpurchased.push(ScorableItem::new("tv", "TV", 1200.0, 3.0));
        assert!(!result.is_fully_purchased());
    }

    #[test]
    fn inline_request_reads_flattened_parameters() {
        let parsed: InlineSimulationRequest = serde_json::from_str(
            r#"{"items":[{"id":"x","name":"Lamp","price":20,"priority":2}],
                "initialBudget":100,"monthlyIncome":0,"deadlineMonths":3}"#,
        )
        .expect("inline request");

        assert_eq!(parsed.items.len(), 1);
        assert_eq!(parsed.request.initial_budget, 100.0);
        assert_eq!(parsed.request.deadline_months, Some(3));
        assert!(parsed.request.group_ids.is_empty());
    }

    #[test]
    fn api_error_uses_screaming_codes() {
        let error = ApiError::invalid_request("initialBudget must be >= 0", None);
        let value = serde_json::to_value(&error).expect("serialize error");
        assert_eq!(value["errorCode"], "INVALID_REQUEST");
        assert_eq!(value["schemaVersion"], SCHEMA_VERSION_V1);
    }
}
