//! Month-by-month greedy purchase allocation.

use contracts::{
    MonthlyPurchase, ScorableItem, ScoredItem, SimulationParameters, SimulationResult,
};

use crate::scoring::rank_items;

/// Simulates purchases month by month until every candidate is bought, the
/// horizon is reached, or nothing can ever become affordable.
///
/// Each month runs one pass over the remaining items in score order and buys
/// every item whose price fits the current budget. An unaffordable item does
/// not stop the pass; cheaper items ranked below it can still be bought.
/// Items priced above `max_price_threshold` are dropped before month one and
/// are reported nowhere.
pub fn simulate(candidates: &[ScorableItem], params: &SimulationParameters) -> SimulationResult {
    let admitted = candidates
        .iter()
        .filter(|item| params.admits_price(item.price))
        .cloned()
        .collect::<Vec<_>>();

    let horizon = params.horizon_months();
    let mut remaining = rank_items(&admitted);
    let mut budget = params.initial_budget;
    let mut month = 0_u32;
    let mut monthly_purchases = Vec::new();

    while !remaining.is_empty() && month < horizon {
        if month > 0 {
            budget += params.monthly_income;
        }
        month += 1;

        let (purchased, carried, budget_after) = purchase_pass(remaining, budget);
        budget = budget_after;
        let bought_any = !purchased.is_empty();

        if bought_any {
            let spent = purchased
                .iter()
                .fold(0.0, |total, scored| total + scored.price());
            monthly_purchases.push(MonthlyPurchase {
                month,
                items: purchased,
                spent,
                remaining: budget,
            });
        }

        remaining = carried;

        // Budget can never grow again, so later months would be identical.
        if !bought_any && params.monthly_income <= 0.0 {
            break;
        }
    }

    let total_spent = monthly_purchases
        .iter()
        .fold(0.0, |total, record| total + record.spent);

    SimulationResult {
        total_months: month,
        monthly_purchases,
        total_spent,
        unpurchased: remaining.into_iter().map(ScoredItem::into_item).collect(),
    }
}

/// One greedy pass in rank order. Returns (purchased, carried, budget left).
fn purchase_pass(
    ranked: Vec<ScoredItem>,
    mut budget: f64,
) -> (Vec<ScoredItem>, Vec<ScoredItem>, f64) {
    let mut purchased = Vec::new();
    let mut carried = Vec::new();

    for scored in ranked {
        if scored.price() <= budget {
            budget -= scored.price();
            purchased.push(scored);
        } else {
            carried.push(scored);
        }
    }

    (purchased, carried, budget)
}
