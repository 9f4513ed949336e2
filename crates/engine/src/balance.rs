//! Per-person balance aggregation.
//!
//! Everything here is a pure computation over a snapshot of unsettled
//! expenses, so the balances stay trivially testable without a live store.
//! The store is re-read on every call; the population is small and
//! correctness matters more than incremental-update complexity.

use std::collections::HashMap;

use uuid::Uuid;

use crate::expenses::Expense;

/// Gross and net balances for one viewpoint user.
///
/// `owed_by_me` and `owed_to_me` carry only strictly positive totals; a
/// counterparty with no unsettled activity is absent, never present with
/// zero. `net` merges both views per counterparty: positive means the
/// counterparty owes the viewpoint user.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DashboardBalances {
    pub owed_by_me: HashMap<Uuid, f64>,
    pub owed_to_me: HashMap<Uuid, f64>,
    pub net: HashMap<Uuid, f64>,
}

/// Amounts the viewpoint user must pay, keyed by payer.
///
/// Covers every unsettled expense where the user owns a split but is not
/// the payer.
pub fn owed_by_me(user_id: Uuid, expenses: &[Expense]) -> HashMap<Uuid, f64> {
    let mut owed = HashMap::new();
    for expense in expenses.iter().filter(|e| !e.settled) {
        if expense.payer_id == user_id {
            continue;
        }
        for split in expense.splits.iter().filter(|s| s.user_id == user_id) {
            *owed.entry(expense.payer_id).or_insert(0.0) += split.amount_owed;
        }
    }
    owed
}

/// Amounts owed to the viewpoint user, keyed by the owing counterparty.
///
/// Covers every unsettled expense the user paid, skipping the payer's own
/// split.
pub fn owed_to_me(user_id: Uuid, expenses: &[Expense]) -> HashMap<Uuid, f64> {
    let mut owed = HashMap::new();
    for expense in expenses.iter().filter(|e| !e.settled) {
        if expense.payer_id != user_id {
            continue;
        }
        for split in expense.splits.iter().filter(|s| s.user_id != user_id) {
            *owed.entry(split.user_id).or_insert(0.0) += split.amount_owed;
        }
    }
    owed
}

/// Computes the full dashboard view for one user over an unsettled snapshot.
pub fn compute_dashboard(user_id: Uuid, expenses: &[Expense]) -> DashboardBalances {
    let owed_by = owed_by_me(user_id, expenses);
    let owed_to = owed_to_me(user_id, expenses);

    let mut net: HashMap<Uuid, f64> = HashMap::new();
    for (counterparty, amount) in &owed_by {
        *net.entry(*counterparty).or_insert(0.0) -= amount;
    }
    for (counterparty, amount) in &owed_to {
        *net.entry(*counterparty).or_insert(0.0) += amount;
    }

    DashboardBalances {
        owed_by_me: owed_by,
        owed_to_me: owed_to,
        net,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::expense_splits::ExpenseSplit;

    fn expense(amount: f64, payer: Uuid, shares: &[(Uuid, f64)]) -> Expense {
        let mut expense = Expense::new(amount, "test".to_string(), payer, Utc::now())
            .expect("valid expense");
        expense.splits = shares
            .iter()
            .map(|(user, owed)| ExpenseSplit::new(expense.id, *user, *owed))
            .collect();
        expense
    }

    #[test]
    fn three_way_split_seen_from_payer_and_ower() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let expenses = vec![expense(90.0, a, &[(a, 30.0), (b, 30.0), (c, 30.0)])];

        let for_a = compute_dashboard(a, &expenses);
        assert!(for_a.owed_by_me.is_empty());
        assert_eq!(for_a.owed_to_me.len(), 2);
        assert_eq!(for_a.owed_to_me[&b], 30.0);
        assert_eq!(for_a.owed_to_me[&c], 30.0);
        assert_eq!(for_a.net[&b], 30.0);

        let for_b = compute_dashboard(b, &expenses);
        assert!(for_b.owed_to_me.is_empty());
        assert_eq!(for_b.owed_by_me.len(), 1);
        assert_eq!(for_b.owed_by_me[&a], 30.0);
        assert_eq!(for_b.net[&a], -30.0);
    }

    #[test]
    fn opposing_expenses_net_per_counterparty() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let expenses = vec![
            expense(100.0, a, &[(a, 50.0), (b, 50.0)]),
            expense(60.0, b, &[(b, 30.0), (a, 30.0)]),
        ];

        let for_a = compute_dashboard(a, &expenses);
        assert_eq!(for_a.owed_to_me[&b], 50.0);
        assert_eq!(for_a.owed_by_me[&b], 30.0);
        assert_eq!(for_a.net[&b], 20.0);

        let for_b = compute_dashboard(b, &expenses);
        assert_eq!(for_b.net[&a], -20.0);
    }

    #[test]
    fn uninvolved_counterparties_are_absent_not_zero() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let expenses = vec![expense(40.0, a, &[(a, 20.0), (b, 20.0)])];

        let for_a = compute_dashboard(a, &expenses);
        assert!(!for_a.owed_to_me.contains_key(&c));
        assert!(!for_a.net.contains_key(&c));

        let for_c = compute_dashboard(c, &expenses);
        assert_eq!(for_c, DashboardBalances::default());
    }

    #[test]
    fn settled_expenses_are_ignored() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let mut closed = expense(80.0, a, &[(a, 40.0), (b, 40.0)]);
        closed.settled = true;
        closed.settled_at = Some(Utc::now());

        let for_a = compute_dashboard(a, &[closed]);
        assert_eq!(for_a, DashboardBalances::default());
    }

    #[test]
    fn recomputing_over_the_same_snapshot_is_identical() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let expenses = vec![
            expense(90.0, a, &[(a, 30.0), (b, 30.0), (c, 30.0)]),
            expense(10.0, b, &[(a, 5.0), (b, 5.0)]),
        ];

        assert_eq!(
            compute_dashboard(a, &expenses),
            compute_dashboard(a, &expenses)
        );
    }
}
