use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use soko_domain::phone::Msisdn;

/// `ResultCode` / `ResponseCode` value the provider uses for success.
pub const SUCCESS_CODE: i32 = 0;

/// Lifecycle of a payment attempt. Only `Pending` may transition, and only once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Successful,
    Failed,
    Cancelled,
}

impl PaymentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Successful => "successful",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown status {0:?}")]
pub struct UnknownStatus(pub String);

impl FromStr for PaymentStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "successful" => Ok(Self::Successful),
            "failed" => Ok(Self::Failed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(UnknownStatus(other.to_owned())),
        }
    }
}

/// Storefront order status. The payment flow only ever writes `Paid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Paid,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Statuses that mean the order has already been paid for.
    pub const PAID_OR_LATER: [OrderStatus; 3] = [Self::Paid, Self::Shipped, Self::Delivered];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Paid => "paid",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }
}

impl FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "paid" => Ok(Self::Paid),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(UnknownStatus(other.to_owned())),
        }
    }
}

/// The slice of a storefront order the payment flow needs.
#[derive(Debug, Clone)]
pub struct Order {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub total_amount: Decimal,
    pub status: OrderStatus,
}

impl Order {
    /// Once paid, an order never needs another push.
    pub fn is_paid(&self) -> bool {
        OrderStatus::PAID_OR_LATER.contains(&self.status)
    }
}

/// A single STK-push attempt, persisted once the provider accepted it.
#[derive(Debug, Clone)]
pub struct MpesaPayment {
    pub id: Uuid,
    pub order_id: Uuid,
    pub user_id: Option<Uuid>,
    pub phone_number: String,
    pub amount: Decimal,
    pub merchant_request_id: String,
    pub checkout_request_id: String,
    pub receipt_number: Option<String>,
    pub transaction_date: Option<DateTime<Utc>>,
    pub status: PaymentStatus,
    pub result_code: Option<i32>,
    pub result_description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A payment as reported to clients, with the total of the order it pays for.
#[derive(Debug, Clone)]
pub struct PaymentSnapshot {
    pub payment: MpesaPayment,
    pub order_total: Option<Decimal>,
}

/// What the gateway needs to prompt a payer.
#[derive(Debug, Clone)]
pub struct StkPushRequest {
    pub phone_number: Msisdn,
    pub amount: Decimal,
    pub account_reference: String,
    pub description: String,
}

impl StkPushRequest {
    pub fn for_order(order: &Order, phone_number: Msisdn) -> Self {
        Self {
            phone_number,
            amount: order.total_amount,
            account_reference: format!("ORDER_{}", order.id),
            description: format!("Payment for order {}", order.id),
        }
    }
}

/// Correlation identifiers handed back when the provider accepts a push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StkPushAccepted {
    pub merchant_request_id: String,
    pub checkout_request_id: String,
    pub customer_message: String,
}

/// Terminal fields written by the callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    pub status: PaymentStatus,
    pub result_code: i32,
    pub result_description: Option<String>,
    pub receipt_number: Option<String>,
    pub transaction_date: Option<DateTime<Utc>>,
    pub phone_number: Option<String>,
}

/// Result of trying to move a payment out of `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettleOutcome {
    /// This call performed the transition (and the order cascade, on success).
    Applied,
    /// Another delivery got there first; carries the status it left behind.
    AlreadySettled(PaymentStatus),
}
