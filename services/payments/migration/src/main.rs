use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    cli::run_cli(soko_payments_migration::Migrator).await;
}
