use sea_orm_migration::prelude::*;

mod m20260401_000001_create_orders;
mod m20260401_000002_create_mpesa_payments;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260401_000001_create_orders::Migration),
            Box::new(m20260401_000002_create_mpesa_payments::Migration),
        ]
    }
}
