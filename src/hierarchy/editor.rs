use std::sync::Arc;

use super::error::HierarchyError;
use super::level::{Level, LevelId, Permissions, MAX_LEVELS};
use super::state::{validate_name, Hierarchy, LevelRow};
use crate::api::{LevelInfoEdit, MenuApi, MenuCounts, NewLevel, PartnerSettingApi};
use crate::confirm::Confirm;
use crate::error::ConsoleError;
use crate::notify::{Notice, Notifier};
use crate::session::{Page, Session};

/// Result of a delete request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted(Level),
    Cancelled,
}

/// The partner-setting screen: the level list plus every edit made to it.
///
/// Local state changes only after the backend accepts a write. Each accepted
/// write is followed by a re-fetch of the authoritative list; a failed
/// re-fetch is reported but does not undo the write. Only administrators may
/// use the screen; every operation is refused locally for anyone else.
pub struct LevelEditor<A> {
    api: A,
    session: Session,
    notifier: Arc<dyn Notifier>,
    hierarchy: Hierarchy,
    affected_children: Vec<i64>,
    menu: Option<MenuCounts>,
    max_levels: usize,
}

impl<A: PartnerSettingApi + MenuApi> LevelEditor<A> {
    pub fn new(api: A, session: Session, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            api,
            session,
            notifier,
            hierarchy: Hierarchy::default(),
            affected_children: Vec::new(),
            menu: None,
            max_levels: MAX_LEVELS,
        }
    }

    /// Lowers the level cap; values above the hard ceiling are clamped
    pub fn with_max_levels(mut self, max: usize) -> Self {
        self.max_levels = max.clamp(1, MAX_LEVELS);
        self
    }

    pub fn hierarchy(&self) -> &Hierarchy {
        &self.hierarchy
    }

    pub fn affected_children(&self) -> &[i64] {
        &self.affected_children
    }

    pub fn menu(&self) -> Option<&MenuCounts> {
        self.menu.as_ref()
    }

    pub fn rows(&self) -> Result<Vec<LevelRow>, ConsoleError> {
        Ok(self.hierarchy.rows()?)
    }

    pub fn path_options(&self, id: LevelId) -> Vec<&Level> {
        self.hierarchy.path_options(id)
    }

    /// Replaces local state with the backend's level list
    pub async fn refresh(&mut self) -> Result<(), ConsoleError> {
        self.authorize()?;
        let levels = self.api.list_levels().await?;
        tracing::debug!("Loaded {} partner levels", levels.len());
        self.hierarchy = Hierarchy::from_levels(levels);
        Ok(())
    }

    pub async fn refresh_menu(&mut self) {
        match self.api.load_menu(&self.session).await {
            Ok(counts) => self.menu = Some(counts),
            Err(e) => tracing::warn!("Menu count refresh failed: {}", e),
        }
    }

    /// Appends `Level {n}`; refused locally once the cap is reached
    pub async fn add_level(&mut self) -> Result<LevelId, ConsoleError> {
        self.authorize()?;
        let prepared = self.next_level_id().and_then(|id| {
            let admin_id = self.session.require_user_id()?.to_string();
            Ok(NewLevel { new_num: id.get(), new_name: Level::default_name(id), admin_id })
        });
        let request = self.report(prepared)?;
        let id = LevelId(request.new_num);

        let message = self.report(self.api.create_level(&request).await)?;

        let mut level = Level::new(id, request.new_name.clone());
        level.permissions = Permissions::none();
        self.hierarchy.insert(level);
        tracing::info!("Partner level {} ({}) created", id, request.new_name);
        self.notifier
            .notify(Notice::info(message.unwrap_or_else(|| "Level added".to_string())));

        self.refresh_after_write().await;
        Ok(id)
    }

    pub async fn rename_level(&mut self, id: LevelId, name: &str) -> Result<(), ConsoleError> {
        self.authorize()?;
        let prepared = validate_name(name).map_err(ConsoleError::from).and_then(|name| {
            if self.hierarchy.contains(id) {
                Ok(name)
            } else {
                Err(HierarchyError::UnknownLevel(id).into())
            }
        });
        let name = self.report(prepared)?;

        let message = self.report(self.api.rename_level(id, &name).await)?;

        self.hierarchy.rename(id, &name)?;
        tracing::info!("Partner level {} renamed to {}", id, name);
        self.notifier
            .notify(Notice::info(message.unwrap_or_else(|| "Partner name changed".to_string())));

        self.refresh_menu().await;
        self.refresh_after_write().await;
        Ok(())
    }

    /// Asks `confirm` first; nothing is sent when the answer is no
    pub async fn delete_level(&mut self, id: LevelId, confirm: &dyn Confirm) -> Result<DeleteOutcome, ConsoleError> {
        self.authorize()?;
        let checked: Result<(), ConsoleError> = if id.parent().is_none() {
            Err(HierarchyError::RootLevel.into())
        } else if !self.hierarchy.contains(id) {
            Err(HierarchyError::UnknownLevel(id).into())
        } else {
            Ok(())
        };
        self.report(checked)?;

        let name = self.hierarchy.level(id).map(|l| l.name.clone()).unwrap_or_default();
        if !confirm.confirm(&format!("Delete partner level '{}'?", name)).await {
            tracing::debug!("Deletion of level {} cancelled", id);
            return Ok(DeleteOutcome::Cancelled);
        }

        let message = self.report(self.api.delete_level(id).await)?;

        let removed = self.hierarchy.remove(id)?;
        tracing::info!("Partner level {} ({}) deleted", id, removed.name);
        self.notifier
            .notify(Notice::info(message.unwrap_or_else(|| "Level deleted".to_string())));

        self.refresh_after_write().await;
        Ok(DeleteOutcome::Deleted(removed))
    }

    /// Saves the three permission flags and the skip-level target in one request
    pub async fn save_permissions(
        &mut self,
        id: LevelId,
        permissions: Permissions,
        target: Option<LevelId>,
    ) -> Result<(), ConsoleError> {
        self.authorize()?;
        let prepared = self.prepare_info_edit(id, permissions, target);
        let edit = self.report(prepared)?;

        let outcome = self.report(self.api.edit_level_info(&edit).await)?;

        self.hierarchy.set_permissions(id, permissions)?;
        self.hierarchy.set_special_path(id, target)?;
        if !outcome.affected_children.is_empty() {
            tracing::info!("Special path change on level {} affects {:?}", id, outcome.affected_children);
            self.affected_children = outcome.affected_children;
        }
        self.notifier.notify(Notice::info(
            outcome.message.unwrap_or_else(|| "Permissions saved".to_string()),
        ));

        self.refresh_menu().await;
        self.refresh_after_write().await;
        Ok(())
    }

    fn authorize(&self) -> Result<(), ConsoleError> {
        self.report(self.session.require_access(Page::PartnerSetting))
    }

    fn next_level_id(&self) -> Result<LevelId, ConsoleError> {
        if self.hierarchy.len() >= self.max_levels {
            return Err(HierarchyError::LevelLimit { max: self.max_levels }.into());
        }
        Ok(self.hierarchy.next_level_id()?)
    }

    fn prepare_info_edit(
        &self,
        id: LevelId,
        permissions: Permissions,
        target: Option<LevelId>,
    ) -> Result<LevelInfoEdit, ConsoleError> {
        if !self.hierarchy.contains(id) {
            return Err(HierarchyError::UnknownLevel(id).into());
        }
        if let Some(target) = target {
            self.hierarchy.validate_path_target(id, target)?;
        }

        Ok(LevelInfoEdit {
            admin_id: self.session.require_user_id()?.to_string(),
            level_id: id.get(),
            permission_data: permissions.into(),
            upper_level_id: target.map(LevelId::get),
        })
    }

    async fn refresh_after_write(&mut self) {
        if let Err(e) = self.refresh().await {
            tracing::warn!("Level list refresh after write failed: {}", e);
            self.notifier.notify(Notice::warning(format!(
                "Saved, but the level list could not be reloaded: {}",
                e.user_message()
            )));
        }
    }

    /// Passes `result` through, sending failures to the notifier
    fn report<T>(&self, result: Result<T, ConsoleError>) -> Result<T, ConsoleError> {
        if let Err(e) = &result {
            self.notifier.notify(Notice::error(e.user_message()));
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::confirm::FixedAnswer;
    use crate::notify::NoticeLevel;
    use crate::testing::{FakeBackend, RecordingNotifier};
    use crate::types::{Classify, Rate};

    async fn editor(backend: FakeBackend) -> (LevelEditor<FakeBackend>, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::default());
        let mut editor = LevelEditor::new(backend, FakeBackend::admin_session(), notifier.clone());
        editor.refresh().await.unwrap();
        (editor, notifier)
    }

    #[tokio::test]
    async fn partner_session_is_refused_before_any_request() {
        let backend = FakeBackend::default().with_level_count(4);
        let notifier = Arc::new(RecordingNotifier::default());
        let session = Session::new(Classify::Partner, Rate::new(3), "agency3", "Agency Three");
        let mut editor = LevelEditor::new(backend.clone(), session, notifier.clone());

        assert!(matches!(editor.refresh().await, Err(ConsoleError::AccessDenied(Page::PartnerSetting))));
        assert!(matches!(editor.add_level().await, Err(ConsoleError::AccessDenied(_))));
        let deleted = editor.delete_level(LevelId(3), &FixedAnswer(true)).await;
        assert!(matches!(deleted, Err(ConsoleError::AccessDenied(_))));
        let saved = editor.save_permissions(LevelId(3), Permissions::none(), None).await;
        assert!(matches!(saved, Err(ConsoleError::AccessDenied(_))));

        assert!(backend.calls().is_empty());
        assert_eq!(backend.stored_levels().len(), 4);
        assert_eq!(notifier.last().map(|n| n.level), Some(NoticeLevel::Error));
    }

    #[tokio::test]
    async fn thirteenth_level_is_rejected_without_a_request() {
        let backend = FakeBackend::default().with_level_count(12);
        let (mut editor, notifier) = editor(backend.clone()).await;

        let err = editor.add_level().await.unwrap_err();
        assert!(matches!(err, ConsoleError::Hierarchy(HierarchyError::LevelLimit { max: 12 })));
        assert!(backend.write_calls().is_empty());
        assert_eq!(editor.hierarchy().len(), 12);
        assert_eq!(notifier.last().map(|n| n.level), Some(NoticeLevel::Error));
    }

    #[tokio::test]
    async fn add_sends_next_number_and_default_name() {
        let backend = FakeBackend::default().with_level_count(3);
        let (mut editor, _) = editor(backend.clone()).await;

        let id = editor.add_level().await.unwrap();
        assert_eq!(id, LevelId(4));

        let created = backend.created();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].new_num, 4);
        assert_eq!(created[0].new_name, "Level 4");
        assert_eq!(created[0].admin_id, "admin01");

        assert_eq!(editor.hierarchy().len(), 4);
        assert_eq!(editor.hierarchy().permissions_of(LevelId(4)), Permissions::none());
        assert_eq!(backend.calls().last().map(String::as_str), Some("GET levels"));
    }

    #[tokio::test]
    async fn configured_cap_is_honoured() {
        let backend = FakeBackend::default().with_level_count(4);
        let (editor, _) = editor(backend.clone()).await;
        let mut editor = editor.with_max_levels(4);

        assert!(editor.add_level().await.is_err());
        assert!(backend.write_calls().is_empty());
    }

    #[tokio::test]
    async fn delete_reorders_and_keeps_permission_keys() {
        let mut levels: Vec<Level> = (1..=3).map(|i| Level::new(LevelId(i), format!("L{}", i))).collect();
        levels[2].permissions = Permissions { view: true, edit: true, commission: false };
        let backend = FakeBackend::default().with_levels(levels);
        let (mut editor, _) = editor(backend.clone()).await;

        let outcome = editor.delete_level(LevelId(2), &FixedAnswer(true)).await.unwrap();
        assert!(matches!(outcome, DeleteOutcome::Deleted(ref l) if l.name == "L2"));

        let rows = editor.rows().unwrap();
        assert_eq!(rows.iter().map(|r| r.order).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(rows.iter().map(|r| r.id).collect::<Vec<_>>(), vec![LevelId(1), LevelId(3)]);
        assert!(editor.hierarchy().permissions_of(LevelId(3)).edit);
        assert!(!editor.hierarchy().permissions().contains_key(&LevelId(2)));
    }

    #[tokio::test]
    async fn declined_delete_sends_nothing() {
        let backend = FakeBackend::default().with_level_count(3);
        let (mut editor, _) = editor(backend.clone()).await;

        let outcome = editor.delete_level(LevelId(3), &FixedAnswer(false)).await.unwrap();
        assert_eq!(outcome, DeleteOutcome::Cancelled);
        assert!(backend.write_calls().is_empty());
        assert_eq!(editor.hierarchy().len(), 3);
    }

    #[tokio::test]
    async fn root_level_cannot_be_deleted() {
        let backend = FakeBackend::default().with_level_count(2);
        let (mut editor, _) = editor(backend.clone()).await;

        let err = editor.delete_level(LevelId(1), &FixedAnswer(true)).await.unwrap_err();
        assert!(matches!(err, ConsoleError::Hierarchy(HierarchyError::RootLevel)));
        assert!(backend.write_calls().is_empty());
    }

    #[tokio::test]
    async fn rejected_delete_changes_nothing() {
        let backend = FakeBackend::default()
            .with_level_count(3)
            .reject_writes("Level has partners attached");
        let (mut editor, notifier) = editor(backend.clone()).await;

        let err = editor.delete_level(LevelId(3), &FixedAnswer(true)).await.unwrap_err();
        assert_eq!(err.to_string(), "Level has partners attached");
        assert_eq!(editor.hierarchy().len(), 3);
        assert_eq!(
            notifier.last().map(|n| n.message),
            Some("Level has partners attached".to_string())
        );
    }

    #[tokio::test]
    async fn rename_updates_paths_and_refreshes_menu() {
        let backend = FakeBackend::default().with_level_count(3);
        let (mut editor, _) = editor(backend.clone()).await;

        editor.rename_level(LevelId(1), "  Head Office ").await.unwrap();
        assert_eq!(editor.hierarchy().display_path(LevelId(3)).unwrap(), "Head Office > L2 > L3");
        assert_eq!(backend.menu_loads(), 1);
        assert!(editor.menu().is_some());

        let err = editor.rename_level(LevelId(2), "   ").await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(backend.write_calls(), vec!["POST rename 1".to_string()]);
    }

    #[tokio::test]
    async fn save_permissions_sets_special_path_and_affected_children() {
        let backend = FakeBackend::default().with_level_count(5).with_affected_children(vec![41, 42]);
        let (mut editor, _) = editor(backend.clone()).await;

        let perms = Permissions { view: true, edit: false, commission: true };
        editor.save_permissions(LevelId(5), perms, Some(LevelId(2))).await.unwrap();

        let edit = &backend.info_edits()[0];
        assert_eq!(edit.upper_level_id, Some(2));
        assert!(edit.permission_data.commission_permission);
        assert_eq!(editor.affected_children(), &[41, 42]);
        assert_eq!(editor.hierarchy().special_path(LevelId(5)), Some(LevelId(2)));
        assert_eq!(editor.hierarchy().display_path(LevelId(5)).unwrap(), "L1 > L2 > L5");
        assert_eq!(editor.hierarchy().permissions_of(LevelId(5)), perms);
    }

    #[tokio::test]
    async fn invalid_path_target_never_reaches_the_backend() {
        let backend = FakeBackend::default().with_level_count(3);
        let (mut editor, _) = editor(backend.clone()).await;

        let err = editor
            .save_permissions(LevelId(2), Permissions::none(), Some(LevelId(3)))
            .await
            .unwrap_err();
        assert!(matches!(err, ConsoleError::Hierarchy(HierarchyError::InvalidPathTarget { .. })));
        assert!(backend.info_edits().is_empty());
    }

    #[tokio::test]
    async fn failed_refresh_after_write_keeps_the_local_change() {
        let backend = FakeBackend::default().with_level_count(2);
        let (mut editor, notifier) = editor(backend.clone()).await;
        backend.fail_level_list(true);

        editor.add_level().await.unwrap();
        assert_eq!(editor.hierarchy().len(), 3);
        assert_eq!(notifier.last().map(|n| n.level), Some(NoticeLevel::Warning));
    }
}
