use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use url::Url;

use super::client::ApiClient;
use super::de::flag;
use crate::error::ConsoleError;

/// Kind of account a registration or edit form describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Partner,
    Store,
}

impl Role {
    pub fn segment(&self) -> &'static str {
        match self {
            Role::Partner => "partner",
            Role::Store => "store",
        }
    }

    pub fn register_path(&self) -> &'static str {
        match self {
            Role::Partner => "/api/partner/writeOk/sr_23346",
            Role::Store => "/api/store/writeOk",
        }
    }

    pub fn edit_path(&self) -> String {
        format!("/api/{}/editOk/sr_23346", self.segment())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.segment())
    }
}

/// Store-registration values the backend checks for uniqueness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DuplicateField {
    UserId,
    TerminalTid,
    KeyinTid,
    KeyinPayKey,
}

impl DuplicateField {
    pub const ALL: [DuplicateField; 4] = [
        DuplicateField::UserId,
        DuplicateField::TerminalTid,
        DuplicateField::KeyinTid,
        DuplicateField::KeyinPayKey,
    ];

    /// Path segment and form key the backend uses
    pub fn code(&self) -> &'static str {
        match self {
            DuplicateField::UserId => "user_id",
            DuplicateField::TerminalTid => "terminalTid",
            DuplicateField::KeyinTid => "keyinTid",
            DuplicateField::KeyinPayKey => "keyin_paykey",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DuplicateField::UserId => "user ID",
            DuplicateField::TerminalTid => "terminal TID",
            DuplicateField::KeyinTid => "key-in TID",
            DuplicateField::KeyinPayKey => "key-in payment key",
        }
    }
}

impl fmt::Display for DuplicateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Deserialize)]
struct DuplicateReply {
    #[serde(rename = "isDuplicated", default, deserialize_with = "flag")]
    is_duplicated: bool,
}

/// Body of the password re-check that unlocks bank details
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PasswordCheck {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub password: String,
    pub classify: String,
}

/// Registration, duplicate checks and account edits
#[async_trait]
pub trait AccountApi: Send + Sync {
    async fn is_duplicated(&self, field: DuplicateField, value: &str) -> Result<bool, ConsoleError>;

    /// Partner sign-in IDs live in their own namespace
    async fn partner_id_taken(&self, user_id: &str) -> Result<bool, ConsoleError>;

    async fn register(&self, role: Role, form: &Map<String, Value>) -> Result<Option<String>, ConsoleError>;

    async fn edit_account(&self, role: Role, form: &Map<String, Value>) -> Result<Option<String>, ConsoleError>;

    /// True only when the backend answers `data: true`
    async fn check_password(&self, check: &PasswordCheck) -> Result<bool, ConsoleError>;
}

#[async_trait]
impl AccountApi for ApiClient {
    async fn is_duplicated(&self, field: DuplicateField, value: &str) -> Result<bool, ConsoleError> {
        let path = format!("/api/store/writeOk/duplicateCheck/{}/{}", field.code(), path_segment(value)?);
        let reply: DuplicateReply = self.get_raw(&path).await?;
        Ok(reply.is_duplicated)
    }

    async fn partner_id_taken(&self, user_id: &str) -> Result<bool, ConsoleError> {
        let path = format!("/api/partner/writeOk/partnerIdCheck/{}", path_segment(user_id)?);
        let reply: DuplicateReply = self.get_raw(&path).await?;
        Ok(reply.is_duplicated)
    }

    async fn register(&self, role: Role, form: &Map<String, Value>) -> Result<Option<String>, ConsoleError> {
        let envelope = self.post::<_, Value>(role.register_path(), form).await?;
        Ok(envelope.message)
    }

    async fn edit_account(&self, role: Role, form: &Map<String, Value>) -> Result<Option<String>, ConsoleError> {
        let envelope = self.post::<_, Value>(&role.edit_path(), form).await?;
        Ok(envelope.message)
    }

    async fn check_password(&self, check: &PasswordCheck) -> Result<bool, ConsoleError> {
        let reply: Value = self.post_raw("/api/store/editOk/passCheck", check).await?;
        Ok(reply.get("data") == Some(&Value::Bool(true)))
    }
}

/// Percent-encodes one path segment so user input cannot add path components
fn path_segment(value: &str) -> Result<String, ConsoleError> {
    let mut url = Url::parse("http://segment.local/")?;
    url.path_segments_mut()
        .map_err(|_| ConsoleError::invalid_response("cannot encode path segment"))?
        .push(value);
    Ok(url.path().trim_start_matches('/').to_string())
}
