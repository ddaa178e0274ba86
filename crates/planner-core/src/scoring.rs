//! Value-density scoring shared by the simulator and the dashboard ranking.

use contracts::{ScorableItem, ScoredItem};

const PRIORITY_EXPONENT: i32 = 5;

/// `priority^5 / price`, or `+∞` when `price <= 0`.
///
/// The infinity is a sentinel that callers rely on: such items sort first and
/// are dropped by `is_finite` filters such as [`top_items`].
pub fn score(priority: f64, price: f64) -> f64 {
    if price <= 0.0 {
        return f64::INFINITY;
    }

    priority.powi(PRIORITY_EXPONENT) / price
}

pub fn score_item(item: &ScorableItem) -> ScoredItem {
    ScoredItem {
        item: item.clone(),
        score: score(item.priority, item.price),
    }
}

/// Scores and sorts descending. Equal scores keep their input order.
pub fn rank_items(items: &[ScorableItem]) -> Vec<ScoredItem> {
    let mut ranked = items.iter().map(score_item).collect::<Vec<_>>();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked
}

pub fn top_items(items: &[ScorableItem], limit: usize) -> Vec<ScoredItem> {
    rank_items(items)
        .into_iter()
        .filter(|scored| scored.score.is_finite())
        .take(limit)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, price: f64, priority: f64) -> ScorableItem {
        ScorableItem::new(id, format!("item {id}"), price, priority)
    }

    #[test]
    fn zero_and_negative_prices_score_infinite() {
        assert_eq!(score(4.0, 0.0), f64::INFINITY);
        assert_eq!(score(4.0, -5.0), f64::INFINITY);
        assert_eq!(score(0.0, 0.0), f64::INFINITY);
    }

    #[test]
    fn positive_price_uses_fifth_power() {
        assert_eq!(score(4.0, 10.0), 102.4);
        assert_eq!(score(0.0, 10.0), 0.0);
        assert_eq!(score(1.0, 4.0), 0.25);
    }

    #[test]
    fn priority_dominates_small_price_gaps() {
        let cheap_average = score(3.0, 20.0);
        let pricier_favourite = score(5.0, 100.0);
        assert!(pricier_favourite > cheap_average);
    }

    #[test]
    fn rank_puts_infinite_first_and_keeps_tie_order() {
        let ranked = rank_items(&[
            item("a", 10.0, 2.0),
            item("b", 10.0, 2.0),
            item("free", 0.0, 1.0),
            item("c", 5.0, 4.0),
        ]);

        let ids = ranked.iter().map(ScoredItem::id).collect::<Vec<_>>();
        assert_eq!(ids, vec!["free", "c", "a", "b"]);
    }

    #[test]
    fn top_items_skips_infinite_scores() {
        let items = (1..=7)
            .map(|n| item(&format!("i{n}"), 10.0 * n as f64, 3.0))
            .chain(std::iter::once(item("broken", 0.0, 5.0)))
            .collect::<Vec<_>>();

        let top = top_items(&items, 5);
        assert_eq!(top.len(), 5);
        assert!(top.iter().all(|scored| scored.score.is_finite()));
        assert_eq!(top[0].id(), "i1");
        assert_eq!(top[4].id(), "i5");
    }
}
