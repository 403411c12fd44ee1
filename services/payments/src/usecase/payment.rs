use chrono::Utc;
use uuid::Uuid;

use soko_domain::pagination::{PageRequest, Sort};
use soko_domain::phone::Msisdn;

use crate::domain::repository::{OrderPort, PaymentGateway, PaymentRepository};
use crate::domain::types::{MpesaPayment, PaymentSnapshot, PaymentStatus, StkPushRequest};
use crate::error::PaymentsServiceError;

// ── InitiatePayment ──────────────────────────────────────────────────────────

pub struct InitiatePaymentInput {
    pub order_id: Option<String>,
    pub phone_number: Option<String>,
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub struct InitiatedPayment {
    pub payment_id: Uuid,
    pub merchant_request_id: String,
    pub checkout_request_id: String,
    pub customer_message: String,
}

pub struct InitiatePaymentUseCase<R: PaymentRepository, O: OrderPort, G: PaymentGateway> {
    pub repo: R,
    pub orders: O,
    pub gateway: G,
}

impl<R: PaymentRepository, O: OrderPort, G: PaymentGateway> InitiatePaymentUseCase<R, O, G> {
    pub async fn execute(
        &self,
        input: InitiatePaymentInput,
    ) -> Result<InitiatedPayment, PaymentsServiceError> {
        let (Some(order_id), Some(phone_number)) = (
            input.order_id.filter(|s| !s.trim().is_empty()),
            input.phone_number.filter(|s| !s.trim().is_empty()),
        ) else {
            return Err(PaymentsServiceError::MissingData);
        };

        let phone_number =
            Msisdn::parse(&phone_number).map_err(|_| PaymentsServiceError::InvalidPhoneNumber)?;
        // A malformed id cannot name an existing order.
        let order_id: Uuid = order_id
            .trim()
            .parse()
            .map_err(|_| PaymentsServiceError::OrderNotFound)?;

        let order = self
            .orders
            .find_by_id(order_id)
            .await?
            .ok_or(PaymentsServiceError::OrderNotFound)?;
        if order.is_paid() {
            return Err(PaymentsServiceError::OrderAlreadyPaid);
        }

        let request = StkPushRequest::for_order(&order, phone_number);
        let accepted = self.gateway.initiate_payment(&request).await?;

        let now = Utc::now();
        let payment = MpesaPayment {
            id: Uuid::now_v7(),
            order_id: order.id,
            user_id: input.user_id,
            phone_number: request.phone_number.into_inner(),
            amount: request.amount,
            merchant_request_id: accepted.merchant_request_id,
            checkout_request_id: accepted.checkout_request_id,
            receipt_number: None,
            transaction_date: None,
            status: PaymentStatus::Pending,
            result_code: None,
            result_description: None,
            created_at: now,
            updated_at: now,
        };
        self.repo.create(&payment).await.inspect_err(|e| {
            // The payer has already been prompted; without this row the
            // callback for it can never be matched.
            tracing::error!(
                error = %e,
                order_id = %payment.order_id,
                checkout_request_id = %payment.checkout_request_id,
                "failed to record accepted payment"
            );
        })?;

        tracing::info!(
            payment_id = %payment.id,
            order_id = %payment.order_id,
            checkout_request_id = %payment.checkout_request_id,
            "payment initiated"
        );

        Ok(InitiatedPayment {
            payment_id: payment.id,
            merchant_request_id: payment.merchant_request_id,
            checkout_request_id: payment.checkout_request_id,
            customer_message: accepted.customer_message,
        })
    }
}

// ── GetPaymentStatus ─────────────────────────────────────────────────────────

pub struct GetPaymentStatusUseCase<R: PaymentRepository, O: OrderPort> {
    pub repo: R,
    pub orders: O,
}

impl<R: PaymentRepository, O: OrderPort> GetPaymentStatusUseCase<R, O> {
    pub async fn execute(&self, payment_id: Uuid) -> Result<PaymentSnapshot, PaymentsServiceError> {
        let payment = self
            .repo
            .find_by_id(payment_id)
            .await?
            .ok_or(PaymentsServiceError::PaymentNotFound)?;
        let order_total = self
            .orders
            .find_by_id(payment.order_id)
            .await?
            .map(|order| order.total_amount);
        Ok(PaymentSnapshot {
            payment,
            order_total,
        })
    }
}

// ── ListOrderPayments ────────────────────────────────────────────────────────

pub struct ListOrderPaymentsUseCase<R: PaymentRepository, O: OrderPort> {
    pub repo: R,
    pub orders: O,
}

impl<R: PaymentRepository, O: OrderPort> ListOrderPaymentsUseCase<R, O> {
    /// Newest attempt first.
    pub async fn execute(
        &self,
        order_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<PaymentSnapshot>, PaymentsServiceError> {
        let order = self
            .orders
            .find_by_id(order_id)
            .await?
            .ok_or(PaymentsServiceError::OrderNotFound)?;
        let payments = self
            .repo
            .list_by_order(order.id, Sort::Desc, page.clamped())
            .await?;
        Ok(payments
            .into_iter()
            .map(|payment| PaymentSnapshot {
                payment,
                order_total: Some(order.total_amount),
            })
            .collect())
    }
}
