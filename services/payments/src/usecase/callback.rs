use std::time::Duration;

use crate::domain::callback::StkCallbackEnvelope;
use crate::domain::repository::PaymentRepository;
use crate::domain::types::{MpesaPayment, PaymentStatus, SettleOutcome};
use crate::error::PaymentsServiceError;

/// Bounded wait for a payment row that the initiating request has not
/// committed yet. The provider can call back before initiation returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupRetry {
    /// Extra lookups after the first miss.
    pub retries: u32,
    /// Delay before retry `n` is `backoff * n`.
    pub backoff: Duration,
}

impl LookupRetry {
    /// Sleep before lookup `attempt`; saturates instead of overflowing.
    pub fn delay_before(&self, attempt: u32) -> Duration {
        self.backoff.saturating_mul(attempt)
    }
}

impl Default for LookupRetry {
    fn default() -> Self {
        Self {
            retries: 3,
            backoff: Duration::from_millis(250),
        }
    }
}

/// What a recognized callback did to its payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackOutcome {
    /// First delivery; the payment moved to this status.
    Settled(PaymentStatus),
    /// Re-delivery; the payment already sat in this status and was not touched.
    Duplicate(PaymentStatus),
}

// ── ReconcileCallback ────────────────────────────────────────────────────────

pub struct ReconcileCallbackUseCase<R: PaymentRepository> {
    pub repo: R,
    pub retry: LookupRetry,
}

impl<R: PaymentRepository> ReconcileCallbackUseCase<R> {
    pub async fn execute(&self, body: &[u8]) -> Result<CallbackOutcome, PaymentsServiceError> {
        let envelope = StkCallbackEnvelope::from_slice(body)?;
        let callback = envelope.callback();

        let payment = self
            .find_with_retry(&callback.merchant_request_id, &callback.checkout_request_id)
            .await?
            .ok_or(PaymentsServiceError::UnmatchedCallback)?;

        let settlement = callback.settlement();
        if payment.status.is_terminal() {
            log_duplicate(&payment, payment.status, settlement.status);
            return Ok(CallbackOutcome::Duplicate(payment.status));
        }

        match self.repo.settle(&payment, &settlement).await? {
            SettleOutcome::Applied => {
                tracing::info!(
                    payment_id = %payment.id,
                    order_id = %payment.order_id,
                    checkout_request_id = %payment.checkout_request_id,
                    result_code = settlement.result_code,
                    status = %settlement.status,
                    "payment settled"
                );
                Ok(CallbackOutcome::Settled(settlement.status))
            }
            SettleOutcome::AlreadySettled(current) => {
                log_duplicate(&payment, current, settlement.status);
                Ok(CallbackOutcome::Duplicate(current))
            }
        }
    }

    async fn find_with_retry(
        &self,
        merchant_request_id: &str,
        checkout_request_id: &str,
    ) -> Result<Option<MpesaPayment>, PaymentsServiceError> {
        for attempt in 0..=self.retry.retries {
            if attempt > 0 {
                tokio::time::sleep(self.retry.delay_before(attempt)).await;
            }
            if let Some(payment) = self
                .repo
                .find_by_correlation(merchant_request_id, checkout_request_id)
                .await?
            {
                return Ok(Some(payment));
            }
        }
        tracing::warn!(
            merchant_request_id,
            checkout_request_id,
            attempts = self.retry.retries.saturating_add(1),
            "no payment matches callback"
        );
        Ok(None)
    }
}

fn log_duplicate(payment: &MpesaPayment, current: PaymentStatus, reported: PaymentStatus) {
    if current == reported {
        tracing::info!(
            payment_id = %payment.id,
            checkout_request_id = %payment.checkout_request_id,
            status = %current,
            "duplicate callback delivery"
        );
    } else {
        tracing::warn!(
            payment_id = %payment.id,
            checkout_request_id = %payment.checkout_request_id,
            status = %current,
            reported = %reported,
            "callback conflicts with settled payment; keeping first result"
        );
    }
}
