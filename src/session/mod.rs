//! Single owner of the signed-in account's identity values.
//!
//! The backend issues `classify`, `user_rate`, `user_id`, `user_name` and
//! `user_code` at login and expects them echoed back as query parameters.
//! Everything that needs one of them reads it from [`Session`]; nothing else
//! keeps a copy of the storage keys.

use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::ConsoleError;
use crate::types::{Classify, Rate};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub classify: Option<Classify>,
    #[serde(
        rename = "user_rate",
        default,
        deserialize_with = "blank_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub rate: Option<Rate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_code: Option<String>,
    #[serde(rename = "currentPage", default, skip_serializing_if = "Option::is_none")]
    pub current_page: Option<String>,
}

/// Console screens guarded by role checks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    StoreList,
    StoreWrite,
    StoreEdit,
    PartnerList,
    TerminalPay,
    AdminSetting,
    StoreCommission,
    PartnerSetting,
}

impl Page {
    pub fn title(&self) -> &'static str {
        match self {
            Page::StoreList => "store list",
            Page::StoreWrite => "registration",
            Page::StoreEdit => "account edit",
            Page::PartnerList => "partner list",
            Page::TerminalPay => "payment history",
            Page::AdminSetting => "admin logs",
            Page::StoreCommission => "store commission",
            Page::PartnerSetting => "partner setting",
        }
    }
}

impl std::fmt::Display for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.title())
    }
}

impl Session {
    pub fn new(classify: Classify, rate: Option<Rate>, user_id: impl Into<String>, user_name: impl Into<String>) -> Self {
        Self {
            classify: Some(classify),
            rate,
            user_id: Some(user_id.into()),
            user_name: Some(user_name.into()),
            user_code: None,
            current_page: None,
        }
    }

    pub fn with_user_code(mut self, code: impl Into<String>) -> Self {
        self.user_code = Some(code.into());
        self
    }

    /// A session counts as signed in once role, id and name are all known
    pub fn is_authenticated(&self) -> bool {
        self.classify.is_some() && non_blank(&self.user_id) && non_blank(&self.user_name)
    }

    pub fn require_user_id(&self) -> Result<&str, ConsoleError> {
        self.user_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| ConsoleError::session("no signed-in user; run `paynet session login` first"))
    }

    pub fn require_classify(&self) -> Result<Classify, ConsoleError> {
        self.classify
            .ok_or_else(|| ConsoleError::session("session has no account classification"))
    }

    pub fn rate_code(&self) -> String {
        self.rate.map(|r| r.to_string()).unwrap_or_default()
    }

    /// `classify`, `rate`, `userId` as the list endpoints expect them
    pub fn identity_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("classify", self.classify.map(|c| c.code().to_string()).unwrap_or_default()),
            ("rate", self.rate_code()),
            ("userId", self.user_id.clone().unwrap_or_default()),
        ]
    }

    pub fn is_admin(&self) -> bool {
        self.classify == Some(Classify::Admin)
    }

    /// Administrators and any partner tier
    pub fn is_admin_or_partner(&self) -> bool {
        matches!(self.classify, Some(Classify::Admin) | Some(Classify::Partner))
    }

    pub fn can_access(&self, page: Page) -> bool {
        if self.classify.is_none() || self.rate.is_none() || !non_blank(&self.user_id) {
            return false;
        }

        match page {
            Page::StoreList
            | Page::StoreWrite
            | Page::StoreEdit
            | Page::PartnerList
            | Page::TerminalPay
            | Page::StoreCommission => self.is_admin_or_partner(),
            Page::AdminSetting | Page::PartnerSetting => self.is_admin(),
        }
    }

    /// Refuses locally, before any request, when the role may not open `page`
    pub fn require_access(&self, page: Page) -> Result<(), ConsoleError> {
        if self.can_access(page) {
            Ok(())
        } else {
            tracing::warn!("{} refused for classify={:?} rate={}", page, self.classify, self.rate_code());
            Err(ConsoleError::AccessDenied(page))
        }
    }
}

/// File-backed session storage for the CLI
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Session, ConsoleError> {
        if !self.path.exists() {
            return Ok(Session::default());
        }

        let content = fs::read_to_string(&self.path)
            .map_err(|e| ConsoleError::session(format!("cannot read {}: {}", self.path.display(), e)))?;
        serde_json::from_str(&content)
            .map_err(|e| ConsoleError::session(format!("corrupt session file {}: {}", self.path.display(), e)))
    }

    pub fn save(&self, session: &Session) -> Result<(), ConsoleError> {
        let content = serde_json::to_string_pretty(session)
            .map_err(|e| ConsoleError::session(e.to_string()))?;
        fs::write(&self.path, content)
            .map_err(|e| ConsoleError::session(format!("cannot write {}: {}", self.path.display(), e)))
    }

    /// Logout: drops every stored key including the remembered page
    pub fn clear(&self) -> Result<(), ConsoleError> {
        if self.path.exists() {
            fs::remove_file(&self.path)
                .map_err(|e| ConsoleError::session(format!("cannot remove {}: {}", self.path.display(), e)))?;
        }
        Ok(())
    }
}

fn non_blank(value: &Option<String>) -> bool {
    value.as_deref().map(|v| !v.trim().is_empty()).unwrap_or(false)
}

fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(serde::de::Error::custom),
    }
}
