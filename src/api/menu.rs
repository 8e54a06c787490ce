use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use super::client::ApiClient;
use super::de::lenient_i64;
use crate::error::ConsoleError;
use crate::session::Session;

/// Left-menu badge counters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MenuCounts {
    #[serde(rename = "C_dupli", default, deserialize_with = "lenient_i64")]
    pub duplicate_payments: i64,
    #[serde(rename = "terminalCount", default, deserialize_with = "lenient_i64")]
    pub terminal_count: i64,
    #[serde(rename = "inactiveCount", default, deserialize_with = "lenient_i64")]
    pub inactive_count: i64,
    #[serde(rename = "realtimeState", default, deserialize_with = "lenient_i64")]
    pub realtime_state: i64,
    #[serde(rename = "t_realtimeState", default, deserialize_with = "lenient_i64")]
    pub terminal_realtime_state: i64,
    #[serde(rename = "commissionBalance", default, deserialize_with = "lenient_i64")]
    pub commission_balance: i64,
    #[serde(rename = "notifyRateMap", default)]
    pub notify_rate_map: BTreeMap<String, Value>,
    #[serde(rename = "pathNotifyCount", default, deserialize_with = "lenient_i64")]
    pub path_notify_count: i64,
}

impl MenuCounts {
    pub(crate) fn from_extra(extra: Map<String, Value>) -> Result<Self, ConsoleError> {
        serde_json::from_value(Value::Object(extra)).map_err(|e| ConsoleError::invalid_response(e.to_string()))
    }
}

#[async_trait]
pub trait MenuApi: Send + Sync {
    async fn load_menu(&self, session: &Session) -> Result<MenuCounts, ConsoleError>;
}

#[async_trait]
impl MenuApi for ApiClient {
    async fn load_menu(&self, session: &Session) -> Result<MenuCounts, ConsoleError> {
        let mut query = session.identity_params();
        query.push(("partner_code", session.user_code.clone().unwrap_or_default()));

        let envelope = self.get::<Value, _>("/api/LeftMenu", &query).await?;
        MenuCounts::from_extra(envelope.extra)
    }
}
