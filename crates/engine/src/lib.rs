//! Ledger and settlement engine for shared expenses.
//!
//! The engine aggregates unsettled expense/split records into per-person
//! balances, plans a short list of directed payments out of the global net
//! balances, and atomically commits a plan while closing the expenses it
//! covers. All state lives in the database; the engine is a stateless
//! handle that recomputes from a fresh snapshot on every call.

use sea_orm::DatabaseConnection;

pub use balance::{DashboardBalances, compute_dashboard, owed_by_me, owed_to_me};
pub use error::EngineError;
pub use expense_splits::ExpenseSplit;
pub use expenses::Expense;
pub use money::{CENT_EPSILON, near_zero, round_to_cents};
pub use ops::SettleOutcome;
pub use planner::{PlannedPayment, SettlementPlan, net_balances, plan_settlement};
pub use settlements::Settlement;
pub use users::User;

mod balance;
mod error;
mod expense_splits;
mod expenses;
mod money;
mod ops;
mod planner;
mod settlements;
mod users;

pub type ResultEngine<T> = Result<T, EngineError>;

/// Stateless handle over the ledger store.
#[derive(Clone, Debug)]
pub struct Engine {
    database: DatabaseConnection,
}

impl Engine {
    /// Return a builder for `Engine`.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub fn build(self) -> Engine {
        Engine {
            database: self.database,
        }
    }
}
