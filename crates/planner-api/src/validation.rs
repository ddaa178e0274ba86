//! Request validation in front of the simulator.
//!
//! The simulator trusts its inputs; everything a caller can get wrong is
//! rejected here with an `INVALID_REQUEST` error naming the field.

use std::collections::BTreeSet;

use contracts::{ApiError, ScorableItem, SimulationParameters, SimulationRequest};

#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRequest {
    pub params: SimulationParameters,
    /// Trimmed and de-duplicated, in first-seen order.
    pub group_ids: Vec<String>,
}

pub fn validate_request(request: &SimulationRequest) -> Result<ValidatedRequest, ApiError> {
    require_non_negative("initialBudget", request.initial_budget)?;
    require_non_negative("monthlyIncome", request.monthly_income)?;

    let deadline_months = match request.deadline_months {
        None => None,
        // Anything past the ceiling is capped by `horizon_months`.
        Some(months) if months >= 1 => Some(u32::try_from(months).unwrap_or(u32::MAX)),
        Some(months) => {
            return Err(ApiError::invalid_request(
                "deadlineMonths must be a positive integer",
                Some(format!("got={months}")),
            ))
        }
    };

    if let Some(threshold) = request.max_price_threshold {
        require_non_negative("maxPriceThreshold", threshold)?;
    }

    let mut seen = BTreeSet::new();
    let mut group_ids = Vec::new();
    for raw in &request.group_ids {
        let group_id = raw.trim();
        if group_id.is_empty() {
            return Err(ApiError::invalid_request(
                "groupIds must not contain blank identifiers",
                None,
            ));
        }
        if seen.insert(group_id.to_string()) {
            group_ids.push(group_id.to_string());
        }
    }

    Ok(ValidatedRequest {
        params: SimulationParameters {
            initial_budget: request.initial_budget,
            monthly_income: request.monthly_income,
            deadline_months,
            max_price_threshold: request.max_price_threshold,
        },
        group_ids,
    })
}

/// Checks an inline candidate list the way the item store guarantees its own.
pub fn validate_candidates(items: &[ScorableItem]) -> Result<(), ApiError> {
    let mut ids = BTreeSet::new();

    for (index, item) in items.iter().enumerate() {
        if item.id.trim().is_empty() {
            return Err(ApiError::invalid_request(
                "item id must not be blank",
                Some(format!("index={index}")),
            ));
        }
        if !ids.insert(item.id.as_str()) {
            return Err(ApiError::invalid_request(
                "item ids must be unique",
                Some(format!("id={}", item.id)),
            ));
        }
        if item.name.trim().is_empty() {
            return Err(ApiError::invalid_request(
                "item name must not be blank",
                Some(format!("id={}", item.id)),
            ));
        }
        if !item.price.is_finite() || item.price <= 0.0 {
            return Err(ApiError::invalid_request(
                "item price must be > 0",
                Some(format!("id={} got={}", item.id, item.price)),
            ));
        }
        if !item.priority.is_finite() || item.priority < 0.0 {
            return Err(ApiError::invalid_request(
                "item priority must be >= 0",
                Some(format!("id={} got={}", item.id, item.priority)),
            ));
        }
    }

    Ok(())
}

fn require_non_negative(field: &str, value: f64) -> Result<(), ApiError> {
    if value.is_finite() && value >= 0.0 {
        return Ok(());
    }

    Err(ApiError::invalid_request(
        format!("{field} must be a finite number >= 0"),
        Some(format!("got={value}")),
    ))
}
