//! Fixed-fee payment intents (Stripe).

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

/// Consultation fee in minor units.
pub const CONSULTATION_AMOUNT: u64 = 1000;
pub const CONSULTATION_CURRENCY: &str = "inr";
const STRIPE_API_VERSION: &str = "2022-08-01";

#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("Payment provider unreachable: {0}")]
    Unreachable(String),

    #[error("Payment provider returned {status}: {body}")]
    Provider { status: u16, body: String },

    #[error("Malformed provider response: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: String,
}

#[async_trait]
pub trait PaymentProvider: Send + Sync {
    async fn create_intent(&self, amount: u64, currency: &str) -> Result<PaymentIntent, PaymentError>;
}

pub struct StripeClient {
    client: reqwest::Client,
    base_url: String,
    secret_key: String,
}

impl StripeClient {
    pub fn new(base_url: &str, secret_key: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            secret_key: secret_key.to_string(),
        }
    }
}

#[async_trait]
impl PaymentProvider for StripeClient {
    async fn create_intent(&self, amount: u64, currency: &str) -> Result<PaymentIntent, PaymentError> {
        let amount = amount.to_string();
        let form = [
            ("amount", amount.as_str()),
            ("currency", currency),
            ("automatic_payment_methods[enabled]", "true"),
        ];

        let response = self
            .client
            .post(format!("{}/v1/payment_intents", self.base_url))
            .basic_auth(&self.secret_key, None::<&str>)
            .header("Stripe-Version", STRIPE_API_VERSION)
            .form(&form)
            .send()
            .await
            .map_err(|e| PaymentError::Unreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PaymentError::Provider {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<PaymentIntent>()
            .await
            .map_err(|e| PaymentError::Malformed(e.to_string()))
    }
}

/// Provider returning a deterministic intent, or always failing.
pub struct MockPaymentProvider {
    fail: bool,
}

impl MockPaymentProvider {
    pub fn new() -> Self {
        Self { fail: false }
    }

    pub fn failing() -> Self {
        Self { fail: true }
    }
}

impl Default for MockPaymentProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PaymentProvider for MockPaymentProvider {
    async fn create_intent(&self, amount: u64, currency: &str) -> Result<PaymentIntent, PaymentError> {
        if self.fail {
            return Err(PaymentError::Provider {
                status: 402,
                body: "card_declined".into(),
            });
        }
        Ok(PaymentIntent {
            id: format!("pi_mock_{amount}_{currency}"),
            client_secret: format!("pi_mock_{amount}_{currency}_secret"),
        })
    }
}
