#![allow(async_fn_in_trait)]

use uuid::Uuid;

use soko_domain::pagination::{PageRequest, Sort};

use crate::domain::types::{
    MpesaPayment, Order, SettleOutcome, Settlement, StkPushAccepted, StkPushRequest,
};
use crate::error::PaymentsServiceError;

/// Repository for M-Pesa payment attempts.
pub trait PaymentRepository: Send + Sync {
    async fn create(&self, payment: &MpesaPayment) -> Result<(), PaymentsServiceError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<MpesaPayment>, PaymentsServiceError>;

    /// Look up a payment by the identifier pair the provider echoes back.
    async fn find_by_correlation(
        &self,
        merchant_request_id: &str,
        checkout_request_id: &str,
    ) -> Result<Option<MpesaPayment>, PaymentsServiceError>;

    async fn list_by_order(
        &self,
        order_id: Uuid,
        sort: Sort,
        page: PageRequest,
    ) -> Result<Vec<MpesaPayment>, PaymentsServiceError>;

    /// Move `payment` out of `Pending` and, on success, mark its order paid.
    /// Both writes commit together or not at all; a payment that is no longer
    /// pending is left untouched.
    async fn settle(
        &self,
        payment: &MpesaPayment,
        settlement: &Settlement,
    ) -> Result<SettleOutcome, PaymentsServiceError>;
}

/// Read access to storefront orders.
pub trait OrderPort: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, PaymentsServiceError>;
}

/// The mobile-money provider.
pub trait PaymentGateway: Send + Sync {
    /// Obtain a short-lived bearer token.
    async fn fetch_access_token(&self) -> Result<String, PaymentsServiceError>;

    /// Send an STK push prompt to the payer's handset.
    async fn initiate_payment(
        &self,
        request: &StkPushRequest,
    ) -> Result<StkPushAccepted, PaymentsServiceError>;
}
