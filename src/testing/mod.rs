//! In-memory backend and notifier shared by the library's unit tests.
//!
//! `FakeBackend` behaves like the real partner/commission endpoints closely
//! enough for editor tests: writes mutate its level table so the follow-up
//! re-fetch sees them, and every call is recorded for assertions.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::api::{
    AccountApi, CancelRequest, CommissionApi, CommissionEdit, DuplicateField, LevelInfoEdit, LevelInfoOutcome,
    MenuApi, MenuCounts, NewLevel, PartnerSettingApi, PasswordCheck, PayType, PaymentApi, Role,
    StoreCommissionRow,
};
use crate::error::ConsoleError;
use crate::hierarchy::{Level, LevelId};
use crate::listing::{ListQuery, Page};
use crate::notify::{Notice, Notifier};
use crate::session::Session;
use crate::types::{Classify, Rate};

#[derive(Default)]
struct BackendState {
    levels: Vec<Level>,
    commission_rows: Vec<Value>,
    rejection: Option<String>,
    fail_level_list: bool,
    affected_children: Vec<i64>,
    calls: Vec<String>,
    created: Vec<NewLevel>,
    info_edits: Vec<LevelInfoEdit>,
    commission_edits: Vec<(String, CommissionEdit)>,
    commission_queries: Vec<ListQuery>,
    menu_loads: usize,
    taken_values: Vec<String>,
    password: Option<String>,
}

#[derive(Clone, Default)]
pub struct FakeBackend {
    state: Arc<Mutex<BackendState>>,
}

impl FakeBackend {
    pub fn admin_session() -> Session {
        Session::new(Classify::Admin, Rate::new(0), "admin01", "Console Admin").with_user_code("ADM")
    }

    /// Levels `1..=n` named `L1`..`Ln`
    pub fn with_level_count(self, n: u32) -> Self {
        self.with_levels((1..=n).map(|i| Level::new(LevelId(i), format!("L{}", i))).collect())
    }

    pub fn with_levels(self, levels: Vec<Level>) -> Self {
        self.lock().levels = levels;
        self
    }

    pub fn with_commission_rows(self, rows: Vec<Value>) -> Self {
        self.lock().commission_rows = rows;
        self
    }

    pub fn with_affected_children(self, children: Vec<i64>) -> Self {
        self.lock().affected_children = children;
        self
    }

    /// Every write answers `success: false` with this message
    pub fn reject_writes(self, message: &str) -> Self {
        self.lock().rejection = Some(message.to_string());
        self
    }

    /// Duplicate and partner-id checks report this value as taken
    pub fn with_taken_value(self, value: &str) -> Self {
        self.lock().taken_values.push(value.to_string());
        self
    }

    /// Password accepted by the re-check endpoint
    pub fn with_password(self, password: &str) -> Self {
        self.lock().password = Some(password.to_string());
        self
    }

    pub fn fail_level_list(&self, fail: bool) {
        self.lock().fail_level_list = fail;
    }

    /// Calls in order, e.g. `"GET levels"`, `"DELETE level 3"`
    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    pub fn write_calls(&self) -> Vec<String> {
        self.calls().into_iter().filter(|c| !c.starts_with("GET")).collect()
    }

    pub fn created(&self) -> Vec<NewLevel> {
        self.lock().created.clone()
    }

    pub fn info_edits(&self) -> Vec<LevelInfoEdit> {
        self.lock().info_edits.clone()
    }

    pub fn commission_edits(&self) -> Vec<(String, CommissionEdit)> {
        self.lock().commission_edits.clone()
    }

    pub fn commission_queries(&self) -> Vec<ListQuery> {
        self.lock().commission_queries.clone()
    }

    pub fn menu_loads(&self) -> usize {
        self.lock().menu_loads
    }

    pub fn stored_levels(&self) -> Vec<Level> {
        self.lock().levels.clone()
    }

    fn lock(&self) -> MutexGuard<'_, BackendState> {
        self.state.lock().unwrap()
    }

    fn write(&self, call: String) -> Result<MutexGuard<'_, BackendState>, ConsoleError> {
        let mut state = self.lock();
        state.calls.push(call);
        match &state.rejection {
            Some(message) => Err(ConsoleError::rejected(message.clone())),
            None => Ok(state),
        }
    }
}

#[async_trait]
impl PartnerSettingApi for FakeBackend {
    async fn list_levels(&self) -> Result<Vec<Level>, ConsoleError> {
        let mut state = self.lock();
        state.calls.push("GET levels".to_string());
        if state.fail_level_list {
            return Err(ConsoleError::invalid_response("connection reset"));
        }
        Ok(state.levels.clone())
    }

    async fn create_level(&self, level: &NewLevel) -> Result<Option<String>, ConsoleError> {
        let mut state = self.write(format!("POST write {}", level.new_num))?;
        state.created.push(level.clone());
        state.levels.push(Level::new(LevelId(level.new_num), level.new_name.clone()));
        state.levels.sort_by_key(|l| l.id);
        Ok(Some("Level created".to_string()))
    }

    async fn rename_level(&self, id: LevelId, name: &str) -> Result<Option<String>, ConsoleError> {
        let mut state = self.write(format!("POST rename {}", id))?;
        if let Some(level) = state.levels.iter_mut().find(|l| l.id == id) {
            level.name = name.to_string();
        }
        Ok(None)
    }

    async fn delete_level(&self, id: LevelId) -> Result<Option<String>, ConsoleError> {
        let mut state = self.write(format!("DELETE level {}", id))?;
        state.levels.retain(|l| l.id != id);
        Ok(Some("Level deleted".to_string()))
    }

    async fn edit_level_info(&self, edit: &LevelInfoEdit) -> Result<LevelInfoOutcome, ConsoleError> {
        let mut state = self.write(format!("POST editInfo {}", edit.level_id))?;
        state.info_edits.push(edit.clone());
        if let Some(level) = state.levels.iter_mut().find(|l| l.id == LevelId(edit.level_id)) {
            level.permissions.view = edit.permission_data.view_permission;
            level.permissions.edit = edit.permission_data.edit_permission;
            level.permissions.commission = edit.permission_data.commission_permission;
            level.uses_special_path = edit.upper_level_id.is_some();
            level.upper_rate = edit.upper_level_id.and_then(|t| u8::try_from(t).ok()).and_then(Rate::new);
        }
        Ok(LevelInfoOutcome {
            message: Some("Permissions updated".to_string()),
            affected_children: state.affected_children.clone(),
        })
    }
}

#[async_trait]
impl CommissionApi for FakeBackend {
    async fn list_commissions(
        &self,
        _session: &Session,
        query: &ListQuery,
    ) -> Result<Page<StoreCommissionRow>, ConsoleError> {
        let mut state = self.lock();
        state.calls.push("GET commissions".to_string());
        state.commission_queries.push(query.clone());
        let items = state
            .commission_rows
            .iter()
            .map(|row| serde_json::from_value(row.clone()).map_err(|e| ConsoleError::invalid_response(e.to_string())))
            .collect::<Result<Vec<StoreCommissionRow>, _>>()?;
        Ok(Page { total_count: items.len() as u64, items, ..Page::default() })
    }

    async fn edit_commission(&self, merchant_id: &str, edit: &CommissionEdit) -> Result<Option<String>, ConsoleError> {
        let mut state = self.write(format!("POST commissionEdit {}", merchant_id))?;
        state.commission_edits.push((merchant_id.to_string(), edit.clone()));
        Ok(None)
    }

    async fn client_ip(&self) -> String {
        "unknown".to_string()
    }
}

#[async_trait]
impl MenuApi for FakeBackend {
    async fn load_menu(&self, _session: &Session) -> Result<MenuCounts, ConsoleError> {
        let mut state = self.lock();
        state.calls.push("GET menu".to_string());
        state.menu_loads += 1;
        Ok(MenuCounts { terminal_count: state.levels.len() as i64, ..MenuCounts::default() })
    }
}

#[async_trait]
impl AccountApi for FakeBackend {
    async fn is_duplicated(&self, field: DuplicateField, value: &str) -> Result<bool, ConsoleError> {
        let mut state = self.lock();
        state.calls.push(format!("GET duplicate {} {}", field.code(), value));
        Ok(state.taken_values.iter().any(|v| v == value))
    }

    async fn partner_id_taken(&self, user_id: &str) -> Result<bool, ConsoleError> {
        let mut state = self.lock();
        state.calls.push(format!("GET partner id {}", user_id));
        Ok(state.taken_values.iter().any(|v| v == user_id))
    }

    async fn register(&self, role: Role, _form: &Map<String, Value>) -> Result<Option<String>, ConsoleError> {
        self.write(format!("POST register {}", role))?;
        Ok(None)
    }

    async fn edit_account(&self, role: Role, _form: &Map<String, Value>) -> Result<Option<String>, ConsoleError> {
        self.write(format!("POST edit {}", role))?;
        Ok(None)
    }

    async fn check_password(&self, check: &PasswordCheck) -> Result<bool, ConsoleError> {
        let mut state = self.lock();
        state.calls.push("POST passCheck".to_string());
        Ok(state.password.as_deref() == Some(check.password.as_str()))
    }
}

#[async_trait]
impl PaymentApi for FakeBackend {
    async fn cancel_payment(&self, pay_type: PayType, request: &CancelRequest) -> Result<Option<String>, ConsoleError> {
        self.write(format!("POST {} {}", pay_type.cancel_path(), request.track_id))?;
        Ok(None)
    }
}

/// Keeps every notice for later inspection
#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn all(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<Notice> {
        self.notices.lock().unwrap().last().cloned()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}
