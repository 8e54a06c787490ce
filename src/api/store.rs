use async_trait::async_trait;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use super::client::ApiClient;
use super::de::{id_string, opt_decimal, opt_string};
use crate::error::ConsoleError;
use crate::listing::{ListQuery, Page};
use crate::session::Session;

const COMMISSION_TABLE: &str = "/api/store/storeCommissionTable";

/// Merchant row from the commission table endpoint.
///
/// Tier values arrive as loose `prime_AC`..`prime_MC` fields and are kept in
/// `extra` until mapped.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreCommissionRow {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(default)]
    pub store_name: String,
    #[serde(default, deserialize_with = "opt_string")]
    pub upper_path: Option<String>,
    #[serde(rename = "terminal_C", default, deserialize_with = "opt_decimal")]
    pub terminal_total: Option<Decimal>,
    #[serde(default)]
    pub store_wallet: Option<StoreWallet>,
    #[serde(default)]
    pub store_basic_info: Option<StoreBasicInfo>,
    #[serde(default)]
    pub store_commission_edit_logs: Option<Vec<CommissionEditLog>>,
    #[serde(default, deserialize_with = "opt_decimal")]
    pub settlement_commission: Option<Decimal>,
    #[serde(default, deserialize_with = "opt_string")]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreWallet {
    #[serde(default, deserialize_with = "opt_decimal")]
    pub terminal_commission: Option<Decimal>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreBasicInfo {
    #[serde(default, deserialize_with = "opt_string")]
    pub join_date: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommissionEditLog {
    #[serde(default, deserialize_with = "opt_string")]
    pub edit_date: Option<String>,
}

/// Audit stamp sent with every commission edit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditData {
    pub ip: String,
    pub browser: String,
    pub url: String,
}

/// Body of `POST .../commissionEdit/{id}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommissionEdit {
    pub classify: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "commissionData")]
    pub commission_data: Map<String, Value>,
    #[serde(rename = "editData")]
    pub edit_data: EditData,
}

impl CommissionEdit {
    /// `tiers` fills `store_settlement_AC` onward; codes past the merchant's
    /// depth are sent as zero
    pub fn new(
        session: &Session,
        merchant_id: &str,
        codes: &[&str],
        tiers: &[Decimal],
        terminal: Decimal,
        edit_data: EditData,
    ) -> Result<Self, ConsoleError> {
        let mut data = Map::new();
        data.insert("store_settlement_id".into(), id_value(merchant_id));
        for (index, code) in codes.iter().enumerate() {
            let value = tiers.get(index).copied().unwrap_or(Decimal::ZERO);
            data.insert(format!("store_settlement_{}", code), number(value));
        }
        data.insert("store_settlement_terminal".into(), number(terminal));

        Ok(Self {
            classify: session.require_classify()?.code().to_string(),
            user_id: session.require_user_id()?.to_string(),
            commission_data: data,
            edit_data,
        })
    }
}

fn number(value: Decimal) -> Value {
    value.to_f64().map(Value::from).unwrap_or(Value::from(0))
}

fn id_value(id: &str) -> Value {
    id.parse::<i64>().map(Value::from).unwrap_or_else(|_| Value::from(id))
}

/// Commission-table endpoints used by the commission board
#[async_trait]
pub trait CommissionApi: Send + Sync {
    async fn list_commissions(
        &self,
        session: &Session,
        query: &ListQuery,
    ) -> Result<Page<StoreCommissionRow>, ConsoleError>;

    async fn edit_commission(&self, merchant_id: &str, edit: &CommissionEdit) -> Result<Option<String>, ConsoleError>;

    /// Public address for the audit stamp; `"unknown"` when it cannot be found
    async fn client_ip(&self) -> String;

    fn edit_url(&self, merchant_id: &str) -> String {
        format!("{}/commissionEdit/{}", COMMISSION_TABLE, merchant_id)
    }
}

#[async_trait]
impl CommissionApi for ApiClient {
    async fn list_commissions(
        &self,
        session: &Session,
        query: &ListQuery,
    ) -> Result<Page<StoreCommissionRow>, ConsoleError> {
        let mut params: Vec<(String, String)> = session
            .identity_params()
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        params.extend([
            ("page".to_string(), query.page.to_string()),
            ("page_size".to_string(), query.page_size.to_string()),
            ("search_select".to_string(), query.search.select.clone()),
            ("search_text".to_string(), query.search.text.clone()),
        ]);

        let envelope = self.get::<Vec<StoreCommissionRow>, _>(COMMISSION_TABLE, &params).await?;
        Ok(envelope.into())
    }

    async fn edit_commission(&self, merchant_id: &str, edit: &CommissionEdit) -> Result<Option<String>, ConsoleError> {
        let path = format!("{}/commissionEdit/{}", COMMISSION_TABLE, merchant_id);
        let envelope = self.post::<_, Value>(&path, edit).await?;
        Ok(envelope.message)
    }

    async fn client_ip(&self) -> String {
        self.public_ip().await
    }

    fn edit_url(&self, merchant_id: &str) -> String {
        let path = format!("{}/commissionEdit/{}", COMMISSION_TABLE, merchant_id);
        self.endpoint(&path).map(|u| u.to_string()).unwrap_or(path)
    }
}
