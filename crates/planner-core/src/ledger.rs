//! Consistency checks over a finished [`SimulationResult`].

use std::collections::BTreeMap;

use contracts::{ScorableItem, SimulationParameters, SimulationResult};

const RELATIVE_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LedgerError {
    #[error("candidate {0} is neither purchased nor unpurchased")]
    MissingItem(String),
    #[error("item {0} appears more than once in the result")]
    DuplicateItem(String),
    #[error("item {0} is not an admitted candidate")]
    UnexpectedItem(String),
    #[error("month {month:?} records spent={recorded} but its items cost {expected}")]
    SpendMismatch {
        month: Option<u32>,
        recorded: f64,
        expected: f64,
    },
    #[error("month {month} ends with a negative balance {remaining}")]
    NegativeBalance { month: u32, remaining: f64 },
    #[error("month {0} is out of order or outside the simulated range")]
    MonthOutOfOrder(u32),
    #[error("month {0} is recorded without purchases")]
    EmptyMonth(u32),
    #[error("simulated {total_months} months but the horizon is {horizon}")]
    HorizonExceeded { total_months: u32, horizon: u32 },
}

/// Checks that `result` partitions the admitted candidates and that every
/// recorded amount adds up.
pub fn verify_result(
    candidates: &[ScorableItem],
    params: &SimulationParameters,
    result: &SimulationResult,
) -> Result<(), LedgerError> {
    let horizon = params.horizon_months();
    if result.total_months > horizon {
        return Err(LedgerError::HorizonExceeded {
            total_months: result.total_months,
            horizon,
        });
    }

    verify_partition(candidates, params, result)?;

    let mut previous_month = 0_u32;
    for record in &result.monthly_purchases {
        if record.month <= previous_month || record.month > result.total_months {
            return Err(LedgerError::MonthOutOfOrder(record.month));
        }
        previous_month = record.month;

        if record.items.is_empty() {
            return Err(LedgerError::EmptyMonth(record.month));
        }

        let expected = record
            .items
            .iter()
            .fold(0.0, |total, scored| total + scored.price());
        if !approx_eq(record.spent, expected) {
            return Err(LedgerError::SpendMismatch {
                month: Some(record.month),
                recorded: record.spent,
                expected,
            });
        }

        if record.remaining < -tolerance(record.spent) {
            return Err(LedgerError::NegativeBalance {
                month: record.month,
                remaining: record.remaining,
            });
        }
    }

    let expected_total = result
        .monthly_purchases
        .iter()
        .fold(0.0, |total, record| total + record.spent);
    if !approx_eq(result.total_spent, expected_total) {
        return Err(LedgerError::SpendMismatch {
            month: None,
            recorded: result.total_spent,
            expected: expected_total,
        });
    }

    Ok(())
}

fn verify_partition(
    candidates: &[ScorableItem],
    params: &SimulationParameters,
    result: &SimulationResult,
) -> Result<(), LedgerError> {
    let mut outstanding = BTreeMap::<&str, i64>::new();
    for item in candidates
        .iter()
        .filter(|item| params.admits_price(item.price))
    {
        *outstanding.entry(item.id.as_str()).or_insert(0) += 1;
    }

    let seen = result
        .purchased_items()
        .map(|scored| scored.id())
        .chain(result.unpurchased.iter().map(|item| item.id.as_str()));

    for id in seen {
        match outstanding.get_mut(id) {
            None => return Err(LedgerError::UnexpectedItem(id.to_string())),
            Some(count) if *count <= 0 => {
                return Err(LedgerError::DuplicateItem(id.to_string()))
            }
            Some(count) => *count -= 1,
        }
    }

    match outstanding.into_iter().find(|(_, count)| *count > 0) {
        Some((id, _)) => Err(LedgerError::MissingItem(id.to_string())),
        None => Ok(()),
    }
}

fn tolerance(magnitude: f64) -> f64 {
    RELATIVE_TOLERANCE * magnitude.abs().max(1.0)
}

fn approx_eq(recorded: f64, expected: f64) -> bool {
    (recorded - expected).abs() <= tolerance(expected)
}
