//! Global settlement planning.
//!
//! Reduces the net balances of every user across all unsettled expenses to
//! a short list of directed payments by greedily pairing the largest
//! creditor with the largest debtor. The pairing is a heuristic: it bounds
//! the number of payments by `creditors + debtors - 1` but does not chase
//! the theoretical minimum, and it is deterministic for a fixed snapshot.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    expenses::Expense,
    money::{CENT_EPSILON, round_to_cents},
};

/// One directed payment of a settlement plan.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlannedPayment {
    pub from: Uuid,
    pub to: Uuid,
    pub amount: f64,
}

/// The outcome of one planning pass: the payments to create and the
/// expenses the pass closes. Both are consistent snapshots of the same
/// unsettled population and must be committed together.
#[derive(Clone, Debug, PartialEq)]
pub struct SettlementPlan {
    pub payments: Vec<PlannedPayment>,
    pub expense_ids: Vec<Uuid>,
}

/// One signed net balance per user over the snapshot.
///
/// The payer is credited the full expense amount and every split owner is
/// debited their share. A payer who also owns a split nets out their own
/// share here; that double entry is intended, excluding it would change the
/// settlement outcome.
pub fn net_balances(expenses: &[Expense]) -> HashMap<Uuid, f64> {
    let mut balances: HashMap<Uuid, f64> = HashMap::new();
    for expense in expenses.iter().filter(|e| !e.settled) {
        *balances.entry(expense.payer_id).or_insert(0.0) += expense.amount;
        for split in &expense.splits {
            *balances.entry(split.user_id).or_insert(0.0) -= split.amount_owed;
        }
    }
    balances
}

/// Plans the settlement of everything currently unsettled.
///
/// Returns `None` when there is nothing to settle. A plan with zero
/// payments is different: balances can already net out while the snapshot
/// still has expenses to close.
pub fn plan_settlement(expenses: &[Expense]) -> Option<SettlementPlan> {
    let unsettled: Vec<&Expense> = expenses.iter().filter(|e| !e.settled).collect();
    if unsettled.is_empty() {
        return None;
    }

    let balances = net_balances(expenses);

    let mut creditors: Vec<(Uuid, f64)> = Vec::new();
    let mut debtors: Vec<(Uuid, f64)> = Vec::new();
    for (user_id, balance) in balances {
        if balance > CENT_EPSILON {
            creditors.push((user_id, balance));
        } else if balance < -CENT_EPSILON {
            debtors.push((user_id, -balance));
        }
    }

    // Largest against largest; ties broken by id so the plan is stable for
    // a fixed snapshot.
    creditors.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    debtors.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let mut payments = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < creditors.len() && j < debtors.len() {
        let settle = creditors[i].1.min(debtors[j].1);

        if settle > CENT_EPSILON {
            payments.push(PlannedPayment {
                from: debtors[j].0,
                to: creditors[i].0,
                amount: round_to_cents(settle),
            });
        }

        creditors[i].1 -= settle;
        debtors[j].1 -= settle;

        if creditors[i].1 < CENT_EPSILON {
            i += 1;
        }
        if debtors[j].1 < CENT_EPSILON {
            j += 1;
        }
    }

    Some(SettlementPlan {
        payments,
        expense_ids: unsettled.iter().map(|e| e.id).collect(),
    })
}
