use async_trait::async_trait;
use serde::Serialize;

use super::client::ApiClient;
use crate::error::ConsoleError;

/// Payment channels that support cancellation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PayType {
    /// `pay_type` "1": card details keyed in by the merchant
    KeyIn,
    /// `pay_type` "4": 3-D Secure authenticated payment
    ThreeD,
}

impl PayType {
    /// `None` for channels that cannot be cancelled from the console
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "1" => Some(PayType::KeyIn),
            "4" => Some(PayType::ThreeD),
            _ => None,
        }
    }

    pub fn cancel_path(&self) -> &'static str {
        match self {
            PayType::KeyIn => "/api/kwon/payment/keyin/cancel",
            PayType::ThreeD => "/api/kwon/payment/3dPay/cancel",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CancelRequest {
    #[serde(rename = "trackId")]
    pub track_id: String,
}

#[async_trait]
pub trait PaymentApi: Send + Sync {
    async fn cancel_payment(&self, pay_type: PayType, request: &CancelRequest) -> Result<Option<String>, ConsoleError>;
}

#[async_trait]
impl PaymentApi for ApiClient {
    async fn cancel_payment(&self, pay_type: PayType, request: &CancelRequest) -> Result<Option<String>, ConsoleError> {
        let envelope = self.post::<_, serde_json::Value>(pay_type.cancel_path(), request).await?;
        Ok(envelope.message)
    }
}
