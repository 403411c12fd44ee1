use sea_orm::DatabaseConnection;

use crate::infra::db::{DbOrderPort, DbPaymentRepository};
use crate::infra::mpesa::MpesaClient;
use crate::usecase::callback::LookupRetry;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub gateway: MpesaClient,
    pub callback_lookup: LookupRetry,
}

impl AppState {
    pub fn payment_repo(&self) -> DbPaymentRepository {
        DbPaymentRepository {
            db: self.db.clone(),
        }
    }

    pub fn order_port(&self) -> DbOrderPort {
        DbOrderPort {
            db: self.db.clone(),
        }
    }

    pub fn gateway(&self) -> MpesaClient {
        self.gateway.clone()
    }
}
