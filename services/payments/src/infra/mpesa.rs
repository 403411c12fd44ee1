use std::fmt;
use std::time::Duration;

use anyhow::Context as _;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, TimeDelta, Utc};
use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};

use soko_domain::money::to_whole_units;

use crate::domain::repository::PaymentGateway;
use crate::domain::types::{StkPushAccepted, StkPushRequest};
use crate::error::PaymentsServiceError;

const TOKEN_PATH: &str = "/oauth/v1/generate?grant_type=client_credentials";
const STK_PUSH_PATH: &str = "/mpesa/stkpush/v1/processrequest";
const TRANSACTION_TYPE: &str = "CustomerPayBillOnline";
const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";
const EAT_OFFSET_HOURS: i64 = 3;

/// Daraja credentials and endpoints.
#[derive(Clone)]
pub struct MpesaConfig {
    pub base_url: String,
    pub consumer_key: String,
    pub consumer_secret: String,
    /// Paybill / till number, used as `BusinessShortCode` and `PartyB`.
    pub shortcode: String,
    pub passkey: String,
    /// Public URL the provider posts results to.
    pub callback_url: String,
    pub timeout: Duration,
}

impl fmt::Debug for MpesaConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MpesaConfig")
            .field("base_url", &self.base_url)
            .field("consumer_key", &"<redacted>")
            .field("consumer_secret", &"<redacted>")
            .field("shortcode", &self.shortcode)
            .field("passkey", &"<redacted>")
            .field("callback_url", &self.callback_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// HTTP client implementing `PaymentGateway` against the Daraja API.
#[derive(Clone)]
pub struct MpesaClient {
    client: reqwest::Client,
    config: MpesaConfig,
}

impl MpesaClient {
    pub fn new(config: MpesaConfig) -> Result<Self, PaymentsServiceError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .context("build M-Pesa HTTP client")?;
        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn stk_push_payload(
        &self,
        request: &StkPushRequest,
        now: DateTime<Utc>,
    ) -> Result<StkPushPayload, PaymentsServiceError> {
        let amount =
            to_whole_units(request.amount).map_err(|_| PaymentsServiceError::InvalidAmount)?;
        let timestamp = timestamp(now);
        let phone = request.phone_number.as_str().to_owned();

        Ok(StkPushPayload {
            business_short_code: self.config.shortcode.clone(),
            password: stk_password(&self.config.shortcode, &self.config.passkey, &timestamp),
            timestamp,
            transaction_type: TRANSACTION_TYPE,
            amount,
            party_a: phone.clone(),
            party_b: self.config.shortcode.clone(),
            phone_number: phone,
            callback_url: self.config.callback_url.clone(),
            account_reference: request.account_reference.clone(),
            transaction_desc: request.description.clone(),
        })
    }
}

impl PaymentGateway for MpesaClient {
    async fn fetch_access_token(&self) -> Result<String, PaymentsServiceError> {
        let credentials = STANDARD.encode(format!(
            "{}:{}",
            self.config.consumer_key, self.config.consumer_secret
        ));
        let resp = self
            .client
            .get(self.url(TOKEN_PATH))
            .header(AUTHORIZATION, format!("Basic {credentials}"))
            .send()
            .await
            .map_err(|e| {
                PaymentsServiceError::GatewayAuth(format!("token endpoint unreachable: {e}"))
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(PaymentsServiceError::GatewayAuth(format!(
                "token endpoint answered {status}"
            )));
        }

        let body: TokenResponse = resp.json().await.map_err(|e| {
            PaymentsServiceError::GatewayAuth(format!("unreadable token response: {e}"))
        })?;
        body.access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| PaymentsServiceError::GatewayAuth("no access token in response".into()))
    }

    async fn initiate_payment(
        &self,
        request: &StkPushRequest,
    ) -> Result<StkPushAccepted, PaymentsServiceError> {
        let payload = self.stk_push_payload(request, Utc::now())?;
        let token = self.fetch_access_token().await?;

        let resp = self
            .client
            .post(self.url(STK_PUSH_PATH))
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .json(&payload)
            .send()
            .await
            .map_err(transport_error)?;

        let status = resp.status();
        let bytes = resp.bytes().await.map_err(transport_error)?;
        let body: StkPushResponse = match serde_json::from_slice(&bytes) {
            Ok(body) => body,
            Err(_) if status.is_server_error() => {
                return Err(PaymentsServiceError::GatewayUnavailable(format!(
                    "STK push answered {status}"
                )));
            }
            Err(e) => {
                return Err(PaymentsServiceError::GatewayRejected(format!(
                    "unreadable STK push response ({status}): {e}"
                )));
            }
        };

        let accepted = status.is_success() && body.response_code.as_deref() == Some("0");
        match (accepted, body.merchant_request_id, body.checkout_request_id) {
            (true, Some(merchant_request_id), Some(checkout_request_id)) => {
                tracing::info!(
                    merchant_request_id = %merchant_request_id,
                    checkout_request_id = %checkout_request_id,
                    "STK push accepted"
                );
                Ok(StkPushAccepted {
                    merchant_request_id,
                    checkout_request_id,
                    customer_message: body.customer_message.unwrap_or_default(),
                })
            }
            _ => {
                let reason = body
                    .error_message
                    .or(body.response_description)
                    .unwrap_or_else(|| format!("STK push answered {status}"));
                Err(PaymentsServiceError::GatewayRejected(reason))
            }
        }
    }
}

fn transport_error(e: reqwest::Error) -> PaymentsServiceError {
    if e.is_timeout() {
        PaymentsServiceError::GatewayTimeout
    } else {
        PaymentsServiceError::GatewayUnavailable(e.to_string())
    }
}

/// `YYYYMMDDHHMMSS` in East Africa Time.
fn timestamp(now: DateTime<Utc>) -> String {
    (now.naive_utc() + TimeDelta::hours(EAT_OFFSET_HOURS))
        .format(TIMESTAMP_FORMAT)
        .to_string()
}

/// `base64(shortcode + passkey + timestamp)`.
fn stk_password(shortcode: &str, passkey: &str, timestamp: &str) -> String {
    STANDARD.encode(format!("{shortcode}{passkey}{timestamp}"))
}

// ── Wire types ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct StkPushPayload {
    business_short_code: String,
    password: String,
    timestamp: String,
    transaction_type: &'static str,
    amount: u64,
    party_a: String,
    party_b: String,
    phone_number: String,
    #[serde(rename = "CallBackURL")]
    callback_url: String,
    account_reference: String,
    transaction_desc: String,
}

#[derive(Debug, Deserialize)]
struct StkPushResponse {
    #[serde(rename = "MerchantRequestID")]
    merchant_request_id: Option<String>,
    #[serde(rename = "CheckoutRequestID")]
    checkout_request_id: Option<String>,
    #[serde(rename = "ResponseCode")]
    response_code: Option<String>,
    #[serde(rename = "ResponseDescription")]
    response_description: Option<String>,
    #[serde(rename = "CustomerMessage")]
    customer_message: Option<String>,
    #[serde(rename = "errorMessage")]
    error_message: Option<String>,
}
