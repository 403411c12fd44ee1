use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use soko_domain::pagination::{PageRequest, Sort};
use soko_payments::domain::repository::{OrderPort, PaymentGateway, PaymentRepository};
use soko_payments::domain::types::{
    MpesaPayment, Order, OrderStatus, PaymentStatus, SettleOutcome, Settlement, StkPushAccepted,
    StkPushRequest,
};
use soko_payments::error::PaymentsServiceError;

// ── Fixtures ─────────────────────────────────────────────────────────────────

pub fn test_order(total_amount: Decimal) -> Order {
    Order {
        id: Uuid::now_v7(),
        tenant_id: Uuid::now_v7(),
        total_amount,
        status: OrderStatus::Pending,
    }
}

pub fn pending_payment(order: &Order, merchant_request_id: &str, checkout_request_id: &str) -> MpesaPayment {
    let now = Utc::now();
    MpesaPayment {
        id: Uuid::now_v7(),
        order_id: order.id,
        user_id: None,
        phone_number: "254712345678".to_owned(),
        amount: order.total_amount,
        merchant_request_id: merchant_request_id.to_owned(),
        checkout_request_id: checkout_request_id.to_owned(),
        receipt_number: None,
        transaction_date: None,
        status: PaymentStatus::Pending,
        result_code: None,
        result_description: None,
        created_at: now,
        updated_at: now,
    }
}

/// `count` pending payments for `order`, the first one oldest.
pub fn payment_history(order: &Order, count: usize) -> Vec<MpesaPayment> {
    let start = Utc::now() - Duration::minutes(count as i64);
    (0..count)
        .map(|i| {
            let mut p = pending_payment(order, &format!("mr_{i}"), &format!("ws_CO_{i}"));
            p.created_at = start + Duration::minutes(i as i64);
            p.updated_at = p.created_at;
            p
        })
        .collect()
}

// ── MockOrderPort ────────────────────────────────────────────────────────────

pub struct MockOrderPort {
    pub orders: Arc<Mutex<Vec<Order>>>,
}

impl MockOrderPort {
    pub fn new(orders: Vec<Order>) -> Self {
        Self {
            orders: Arc::new(Mutex::new(orders)),
        }
    }

    pub fn empty() -> Self {
        Self::new(vec![])
    }

    /// Shared handle so a `MockPaymentRepo` can apply the paid cascade.
    pub fn orders_handle(&self) -> Arc<Mutex<Vec<Order>>> {
        Arc::clone(&self.orders)
    }
}

impl OrderPort for MockOrderPort {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, PaymentsServiceError> {
        Ok(self.orders.lock().unwrap().iter().find(|o| o.id == id).cloned())
    }
}

// ── MockPaymentRepo ──────────────────────────────────────────────────────────

/// Order cascade recorded by `settle`: `(order_id, receipt_number)`.
pub type Cascade = (Uuid, Option<String>);

pub struct MockPaymentRepo {
    pub payments: Arc<Mutex<Vec<MpesaPayment>>>,
    pub orders: Arc<Mutex<Vec<Order>>>,
    pub cascades: Arc<Mutex<Vec<Cascade>>>,
    /// Lookups by correlation that miss before the row becomes visible.
    pub hidden_lookups: Arc<AtomicU32>,
    pub lookups: Arc<AtomicU32>,
    /// When set, `settle` behaves as if a concurrent delivery won with this status.
    pub lost_race_to: Option<PaymentStatus>,
    pub fail_create: bool,
}

impl MockPaymentRepo {
    pub fn new(payments: Vec<MpesaPayment>) -> Self {
        Self {
            payments: Arc::new(Mutex::new(payments)),
            orders: Arc::new(Mutex::new(vec![])),
            cascades: Arc::new(Mutex::new(vec![])),
            hidden_lookups: Arc::new(AtomicU32::new(0)),
            lookups: Arc::new(AtomicU32::new(0)),
            lost_race_to: None,
            fail_create: false,
        }
    }

    pub fn empty() -> Self {
        Self::new(vec![])
    }

    /// Apply the paid cascade to the orders behind `port`.
    pub fn with_orders(mut self, port: &MockOrderPort) -> Self {
        self.orders = port.orders_handle();
        self
    }

    pub fn payments_handle(&self) -> Arc<Mutex<Vec<MpesaPayment>>> {
        Arc::clone(&self.payments)
    }

    pub fn cascades_handle(&self) -> Arc<Mutex<Vec<Cascade>>> {
        Arc::clone(&self.cascades)
    }

    pub fn lookups_handle(&self) -> Arc<AtomicU32> {
        Arc::clone(&self.lookups)
    }
}

impl PaymentRepository for MockPaymentRepo {
    async fn create(&self, payment: &MpesaPayment) -> Result<(), PaymentsServiceError> {
        if self.fail_create {
            return Err(anyhow::anyhow!("connection reset").into());
        }
        self.payments.lock().unwrap().push(payment.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<MpesaPayment>, PaymentsServiceError> {
        Ok(self.payments.lock().unwrap().iter().find(|p| p.id == id).cloned())
    }

    async fn find_by_correlation(
        &self,
        merchant_request_id: &str,
        checkout_request_id: &str,
    ) -> Result<Option<MpesaPayment>, PaymentsServiceError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        let hidden = self
            .hidden_lookups
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if hidden {
            return Ok(None);
        }
        Ok(self
            .payments
            .lock()
            .unwrap()
            .iter()
            .find(|p| {
                p.merchant_request_id == merchant_request_id
                    && p.checkout_request_id == checkout_request_id
            })
            .cloned())
    }

    async fn list_by_order(
        &self,
        order_id: Uuid,
        sort: Sort,
        page: PageRequest,
    ) -> Result<Vec<MpesaPayment>, PaymentsServiceError> {
        let mut matching: Vec<_> = self
            .payments
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.order_id == order_id)
            .cloned()
            .collect();
        matching.sort_by_key(|p| p.created_at);
        if sort == Sort::Desc {
            matching.reverse();
        }
        Ok(matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect())
    }

    async fn settle(
        &self,
        payment: &MpesaPayment,
        settlement: &Settlement,
    ) -> Result<SettleOutcome, PaymentsServiceError> {
        if let Some(winner) = self.lost_race_to {
            return Ok(SettleOutcome::AlreadySettled(winner));
        }

        let mut payments = self.payments.lock().unwrap();
        let stored = payments
            .iter_mut()
            .find(|p| p.id == payment.id)
            .ok_or_else(|| anyhow::anyhow!("payment {} vanished", payment.id))?;
        if stored.status != PaymentStatus::Pending {
            return Ok(SettleOutcome::AlreadySettled(stored.status));
        }

        stored.status = settlement.status;
        stored.result_code = Some(settlement.result_code);
        stored.result_description = settlement.result_description.clone();
        stored.receipt_number = settlement.receipt_number.clone();
        stored.transaction_date = settlement.transaction_date;
        if let Some(phone) = &settlement.phone_number {
            stored.phone_number = phone.clone();
        }
        stored.updated_at = Utc::now();

        if settlement.status == PaymentStatus::Successful {
            let mut orders = self.orders.lock().unwrap();
            let order = orders.iter_mut().find(|o| o.id == stored.order_id);
            if order.as_ref().is_some_and(|o| o.is_paid()) {
                return Ok(SettleOutcome::Applied);
            }
            if let Some(order) = order {
                order.status = OrderStatus::Paid;
            }
            self.cascades
                .lock()
                .unwrap()
                .push((stored.order_id, settlement.receipt_number.clone()));
        }
        Ok(SettleOutcome::Applied)
    }
}

// ── MockGateway ──────────────────────────────────────────────────────────────

pub enum GatewayBehavior {
    Accept,
    AuthFail,
    Reject(&'static str),
    Timeout,
}

pub struct MockGateway {
    pub behavior: GatewayBehavior,
    pub requests: Arc<Mutex<Vec<StkPushRequest>>>,
}

impl MockGateway {
    pub fn new(behavior: GatewayBehavior) -> Self {
        Self {
            behavior,
            requests: Arc::new(Mutex::new(vec![])),
        }
    }

    pub fn accepting() -> Self {
        Self::new(GatewayBehavior::Accept)
    }

    pub fn requests_handle(&self) -> Arc<Mutex<Vec<StkPushRequest>>> {
        Arc::clone(&self.requests)
    }
}

impl PaymentGateway for MockGateway {
    async fn fetch_access_token(&self) -> Result<String, PaymentsServiceError> {
        match self.behavior {
            GatewayBehavior::AuthFail => Err(PaymentsServiceError::GatewayAuth(
                "token endpoint answered 401 Unauthorized".to_owned(),
            )),
            _ => Ok("mock-token".to_owned()),
        }
    }

    async fn initiate_payment(
        &self,
        request: &StkPushRequest,
    ) -> Result<StkPushAccepted, PaymentsServiceError> {
        self.fetch_access_token().await?;
        self.requests.lock().unwrap().push(request.clone());
        match self.behavior {
            GatewayBehavior::Accept | GatewayBehavior::AuthFail => Ok(StkPushAccepted {
                merchant_request_id: "mr_1".to_owned(),
                checkout_request_id: "ws_CO_1".to_owned(),
                customer_message: "Success. Request accepted for processing".to_owned(),
            }),
            GatewayBehavior::Reject(reason) => {
                Err(PaymentsServiceError::GatewayRejected(reason.to_owned()))
            }
            GatewayBehavior::Timeout => Err(PaymentsServiceError::GatewayTimeout),
        }
    }
}
