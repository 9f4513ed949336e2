mod expenses;
mod settlements;
mod users;

pub use settlements::SettleOutcome;
