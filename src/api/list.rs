use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::fmt;
use std::marker::PhantomData;

use super::client::ApiClient;
use super::envelope::Envelope;
use crate::error::ConsoleError;
use crate::listing::{ListQuery, ListSource, Page};
use crate::session::{Page as ScreenPage, Session};

impl<T> From<Envelope<Vec<T>>> for Page<T> {
    fn from(envelope: Envelope<Vec<T>>) -> Self {
        let total_count = envelope.total();
        Page {
            items: envelope.data.unwrap_or_default(),
            total_count,
            upper_rate: envelope.upper_rate.filter(|r| !r.is_empty()),
            stats: envelope.total_stats.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogKind {
    Login,
    Edit,
    StoreCommission,
    StoreSettlement,
}

impl LogKind {
    pub fn segment(&self) -> &'static str {
        match self {
            LogKind::Login => "LoginLog",
            LogKind::Edit => "EditLog",
            LogKind::StoreCommission => "StoreCommissionLog",
            LogKind::StoreSettlement => "StoreSettlementLog",
        }
    }
}

/// Paginated listing endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListEndpoint {
    Stores,
    Partners,
    Logs(LogKind),
    Payments,
    Sales,
}

impl ListEndpoint {
    pub fn path(&self) -> String {
        match self {
            ListEndpoint::Stores => "/api/store_list_view".to_string(),
            ListEndpoint::Partners => "/api/partner_list_view/partnerListAPI".to_string(),
            ListEndpoint::Logs(kind) => format!("/api/log/{}", kind.segment()),
            ListEndpoint::Payments => "/api/payment/terminal_pay_view".to_string(),
            ListEndpoint::Sales => "/api/payment/terminal_sales_list".to_string(),
        }
    }

    /// Screen whose access rule guards this endpoint
    pub fn page(&self) -> ScreenPage {
        match self {
            ListEndpoint::Stores => ScreenPage::StoreList,
            ListEndpoint::Partners => ScreenPage::PartnerList,
            ListEndpoint::Logs(_) => ScreenPage::AdminSetting,
            ListEndpoint::Payments | ListEndpoint::Sales => ScreenPage::TerminalPay,
        }
    }

    /// Search column selected when the screen opens
    pub fn default_select(&self) -> &'static str {
        match self {
            ListEndpoint::Payments | ListEndpoint::Sales => "",
            _ => "id",
        }
    }

    /// Identity parameters each endpoint family expects
    fn identity(&self, session: &Session) -> Vec<(String, String)> {
        let classify = session.classify.map(|c| c.code().to_string()).unwrap_or_default();
        match self {
            ListEndpoint::Stores | ListEndpoint::Partners => vec![
                ("classify".into(), classify),
                ("user_code".into(), session.user_code.clone().unwrap_or_default()),
                ("rate".into(), session.rate_code()),
            ],
            ListEndpoint::Payments => vec![
                ("classify".into(), classify),
                ("rate".into(), session.rate_code()),
                ("userId".into(), session.user_id.clone().unwrap_or_default()),
            ],
            ListEndpoint::Sales => vec![("classify".into(), classify), ("rate".into(), session.rate_code())],
            ListEndpoint::Logs(_) => Vec::new(),
        }
    }

    pub fn query_pairs(&self, session: &Session, query: &ListQuery) -> Vec<(String, String)> {
        let mut pairs = self.identity(session);
        pairs.extend(query.to_pairs());
        pairs
    }
}

impl fmt::Display for ListEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// [`ListSource`] backed by one backend endpoint; rows decode into `T`
pub struct EndpointSource<T> {
    client: ApiClient,
    endpoint: ListEndpoint,
    session: Session,
    _rows: PhantomData<fn() -> T>,
}

impl<T> EndpointSource<T> {
    pub fn new(client: ApiClient, endpoint: ListEndpoint, session: Session) -> Self {
        Self { client, endpoint, session, _rows: PhantomData }
    }

    pub fn endpoint(&self) -> ListEndpoint {
        self.endpoint
    }
}

#[async_trait]
impl<T: DeserializeOwned + Send + 'static> ListSource for EndpointSource<T> {
    type Item = T;

    async fn fetch(&self, query: &ListQuery) -> Result<Page<T>, ConsoleError> {
        self.session.require_access(self.endpoint.page())?;
        let pairs = self.endpoint.query_pairs(&self.session, query);
        let envelope = self.client.get::<Vec<T>, _>(&self.endpoint.path(), &pairs).await?;
        Ok(envelope.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::SearchParams;
    use crate::types::{Classify, Rate};
    use serde_json::Value;

    #[test]
    fn page_reads_upper_rate_and_stats() {
        let env: Envelope<Vec<Value>> = serde_json::from_str(
            r#"{"success":true,"data":[{"id":1}],"pagination":{"totalCount":31},"upper_rate":"p1","totalStats":{"amount":1200}}"#,
        )
        .unwrap();
        let page: Page<Value> = env.into();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.total_count, 31);
        assert_eq!(page.upper_rate.as_deref(), Some("p1"));
        assert!(page.stats.contains_key("amount"));
    }

    #[test]
    fn store_list_sends_partner_identity() {
        let session = Session::new(Classify::Partner, Rate::new(2), "u7", "Agency").with_user_code("AG-7");
        let query = ListQuery::new(1, 10, SearchParams::new("id"));
        let pairs = ListEndpoint::Stores.query_pairs(&session, &query);

        assert!(pairs.contains(&("user_code".into(), "AG-7".into())));
        assert!(pairs.contains(&("rate".into(), "p2".into())));
        assert!(!pairs.iter().any(|(k, _)| k == "userId"));
    }

    #[test]
    fn log_paths() {
        assert_eq!(ListEndpoint::Logs(LogKind::StoreSettlement).path(), "/api/log/StoreSettlementLog");
        assert!(ListEndpoint::Logs(LogKind::Login).query_pairs(&Session::default(), &ListQuery::new(1, 10, SearchParams::default()))
            .iter()
            .all(|(k, _)| k != "classify"));
    }
}
