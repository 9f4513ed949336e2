pub use sea_orm_migration::prelude::*;

mod m20260110_000001_users;
mod m20260110_000002_expenses;
mod m20260118_090000_settlements;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260110_000001_users::Migration),
            Box::new(m20260110_000002_expenses::Migration),
            Box::new(m20260118_090000_settlements::Migration),
        ]
    }
}
