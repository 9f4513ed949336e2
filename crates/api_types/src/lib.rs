//! Request and response types shared between the server and its clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod user {
    use super::*;

    /// Public view of a user account.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct UserView {
        pub id: Uuid,
        pub name: String,
        pub email: String,
        pub avatar_url: Option<String>,
    }

    /// Sign-in hook payload: resolves to the existing account for the
    /// email or creates one.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct SignIn {
        pub name: String,
        pub email: String,
        pub avatar_url: Option<String>,
    }
}

pub mod expense {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseNew {
        pub amount: f64,
        pub description: String,
        pub involved_user_ids: Vec<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseUpdate {
        pub amount: f64,
        pub description: String,
        pub involved_user_ids: Vec<Uuid>,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct SplitView {
        pub user: super::user::UserView,
        pub amount_owed: f64,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct ExpenseView {
        pub id: Uuid,
        pub amount: f64,
        pub description: String,
        pub payer: super::user::UserView,
        pub settled: bool,
        pub created_at: DateTime<Utc>,
        pub splits: Vec<SplitView>,
    }
}

pub mod dashboard {
    use super::*;

    /// One counterparty with an accumulated amount. The sign convention of
    /// `amount` depends on the list it appears in.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct CounterpartyBalance {
        pub user: super::user::UserView,
        pub amount: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DashboardResponse {
        pub i_owe: Vec<CounterpartyBalance>,
        pub others_owe: Vec<CounterpartyBalance>,
        pub net_balances: Vec<CounterpartyBalance>,
    }
}

pub mod settlement {
    use super::*;

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct SettlementView {
        pub id: Uuid,
        pub from_user: super::user::UserView,
        pub to_user: super::user::UserView,
        pub amount: f64,
        pub created_at: DateTime<Utc>,
        pub completed: bool,
        pub completed_at: Option<DateTime<Utc>>,
    }

    /// One payment of a freshly committed settlement run.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct PaymentView {
        pub from_user_id: Uuid,
        pub to_user_id: Uuid,
        pub amount: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SettleResponse {
        pub message: String,
        pub payments: Vec<PaymentView>,
        pub expenses_settled: usize,
    }
}
