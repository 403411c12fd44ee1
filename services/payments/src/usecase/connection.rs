use crate::domain::repository::PaymentGateway;
use crate::error::PaymentsServiceError;

// ── CheckGatewayConnection ───────────────────────────────────────────────────

/// Performs only the token exchange, to prove credentials and reachability.
pub struct CheckGatewayConnectionUseCase<G: PaymentGateway> {
    pub gateway: G,
}

impl<G: PaymentGateway> CheckGatewayConnectionUseCase<G> {
    pub async fn execute(&self) -> Result<(), PaymentsServiceError> {
        self.gateway.fetch_access_token().await?;
        tracing::info!("payment provider connection verified");
        Ok(())
    }
}
