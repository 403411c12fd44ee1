//! The asynchronous result notification the provider posts after an STK push.

use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::domain::types::{PaymentStatus, SUCCESS_CODE, Settlement};
use crate::error::PaymentsServiceError;

/// Provider timestamps are wall-clock East Africa Time.
const EAT_OFFSET_SECS: i32 = 3 * 3600;
const TRANSACTION_DATE_FORMAT: &str = "%Y%m%d%H%M%S";

#[derive(Debug, Clone, Deserialize)]
pub struct StkCallbackEnvelope {
    #[serde(rename = "Body")]
    pub body: StkCallbackBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StkCallbackBody {
    #[serde(rename = "stkCallback")]
    pub stk_callback: StkCallback,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StkCallback {
    #[serde(rename = "MerchantRequestID")]
    pub merchant_request_id: String,
    #[serde(rename = "CheckoutRequestID")]
    pub checkout_request_id: String,
    #[serde(rename = "ResultCode")]
    pub result_code: i32,
    #[serde(rename = "ResultDesc", default)]
    pub result_desc: Option<String>,
    #[serde(rename = "CallbackMetadata", default)]
    pub metadata: Option<CallbackMetadata>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackMetadata {
    #[serde(rename = "Item", default)]
    pub items: Vec<CallbackItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackItem {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Value", default)]
    pub value: Option<Value>,
}

impl StkCallbackEnvelope {
    pub fn from_slice(body: &[u8]) -> Result<Self, PaymentsServiceError> {
        let envelope: Self = serde_json::from_slice(body)
            .map_err(|e| PaymentsServiceError::MalformedCallback(e.to_string()))?;
        let cb = &envelope.body.stk_callback;
        if cb.merchant_request_id.is_empty() || cb.checkout_request_id.is_empty() {
            return Err(PaymentsServiceError::MalformedCallback(
                "empty correlation identifiers".to_owned(),
            ));
        }
        Ok(envelope)
    }

    pub fn callback(&self) -> &StkCallback {
        &self.body.stk_callback
    }
}

impl StkCallback {
    pub fn is_success(&self) -> bool {
        self.result_code == SUCCESS_CODE
    }

    /// Metadata value by item name. Absent metadata reads as absent items.
    pub fn item(&self, name: &str) -> Option<&Value> {
        self.metadata
            .as_ref()?
            .items
            .iter()
            .find(|item| item.name == name)?
            .value
            .as_ref()
    }

    /// Terminal fields this callback writes. Metadata is read only on success;
    /// every non-zero code, cancellation included, settles as `Failed`.
    pub fn settlement(&self) -> Settlement {
        let result_description = self.result_desc.clone();
        if !self.is_success() {
            return Settlement {
                status: PaymentStatus::Failed,
                result_code: self.result_code,
                result_description,
                receipt_number: None,
                transaction_date: None,
                phone_number: None,
            };
        }

        Settlement {
            status: PaymentStatus::Successful,
            result_code: self.result_code,
            result_description,
            receipt_number: self.item("MpesaReceiptNumber").and_then(value_as_string),
            transaction_date: self
                .item("TransactionDate")
                .and_then(value_as_string)
                .and_then(|raw| parse_transaction_date(&raw)),
            phone_number: self.item("PhoneNumber").and_then(value_as_string),
        }
    }
}

/// Numbers and strings both show up in metadata; render either as text.
fn value_as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// `YYYYMMDDHHMMSS` in East Africa Time, as UTC.
pub fn parse_transaction_date(raw: &str) -> Option<DateTime<Utc>> {
    let naive = NaiveDateTime::parse_from_str(raw, TRANSACTION_DATE_FORMAT).ok()?;
    let eat = FixedOffset::east_opt(EAT_OFFSET_SECS)?;
    naive
        .and_local_timezone(eat)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}
