use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::client::{ApiClient, NO_QUERY};
use super::de::{flag, lenient_i64, opt_string};
use crate::error::ConsoleError;
use crate::hierarchy::{Level, LevelId, Permissions};
use crate::types::Rate;

const PARTNER_SETTING: &str = "/api/partner/PartnerSetting";

/// Level row as `GET /api/partner/PartnerSetting` delivers it
#[derive(Debug, Clone, Deserialize)]
pub struct PartnerSettingRow {
    #[serde(deserialize_with = "lenient_i64")]
    pub idx: i64,
    #[serde(default)]
    pub partner_name: String,
    #[serde(default, deserialize_with = "opt_string")]
    pub partner_path: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub rate: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub upper_rate: Option<String>,
    #[serde(default, deserialize_with = "flag")]
    pub view_permission: bool,
    #[serde(default, deserialize_with = "flag")]
    pub edit_permission: bool,
    #[serde(default, deserialize_with = "flag")]
    pub commission_permission: bool,
    #[serde(default, deserialize_with = "flag")]
    pub use_special_path: bool,
    #[serde(default, deserialize_with = "opt_string")]
    pub create_date: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub edit_date: Option<String>,
}

impl PartnerSettingRow {
    /// `None` for rows whose identifier is outside 1..=u32::MAX
    pub fn into_level(self) -> Option<Level> {
        let id = u32::try_from(self.idx).ok().filter(|id| *id > 0)?;
        let parse_rate = |raw: Option<String>| raw.and_then(|r| r.parse::<Rate>().ok());

        Some(Level {
            id: LevelId(id),
            name: self.partner_name,
            rate: parse_rate(self.rate),
            upper_rate: parse_rate(self.upper_rate),
            permissions: Permissions {
                view: self.view_permission,
                edit: self.edit_permission,
                commission: self.commission_permission,
            },
            uses_special_path: self.use_special_path,
            stored_path: self.partner_path,
            created_at: self.create_date,
            edited_at: self.edit_date,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewLevel {
    #[serde(rename = "newNum")]
    pub new_num: u32,
    #[serde(rename = "newName")]
    pub new_name: String,
    #[serde(rename = "adminId")]
    pub admin_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PermissionData {
    pub view_permission: bool,
    pub edit_permission: bool,
    pub commission_permission: bool,
}

impl From<Permissions> for PermissionData {
    fn from(p: Permissions) -> Self {
        Self {
            view_permission: p.view,
            edit_permission: p.edit,
            commission_permission: p.commission,
        }
    }
}

/// Body of `POST .../editInfo`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LevelInfoEdit {
    #[serde(rename = "adminId")]
    pub admin_id: String,
    #[serde(rename = "EditLevelId")]
    pub level_id: u32,
    #[serde(rename = "permissionData")]
    pub permission_data: PermissionData,
    #[serde(rename = "upperLevelId")]
    pub upper_level_id: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LevelInfoOutcome {
    pub message: Option<String>,
    pub affected_children: Vec<i64>,
}

/// Partner-setting endpoints used by the level editor
#[async_trait]
pub trait PartnerSettingApi: Send + Sync {
    async fn list_levels(&self) -> Result<Vec<Level>, ConsoleError>;

    async fn create_level(&self, level: &NewLevel) -> Result<Option<String>, ConsoleError>;

    async fn rename_level(&self, id: LevelId, name: &str) -> Result<Option<String>, ConsoleError>;

    async fn delete_level(&self, id: LevelId) -> Result<Option<String>, ConsoleError>;

    async fn edit_level_info(&self, edit: &LevelInfoEdit) -> Result<LevelInfoOutcome, ConsoleError>;
}

#[async_trait]
impl PartnerSettingApi for ApiClient {
    async fn list_levels(&self) -> Result<Vec<Level>, ConsoleError> {
        let envelope = self.get::<Vec<PartnerSettingRow>, _>(PARTNER_SETTING, NO_QUERY).await?;
        let rows = envelope.data_or_default();
        let total = rows.len();

        let levels: Vec<Level> = rows.into_iter().filter_map(PartnerSettingRow::into_level).collect();
        if levels.len() != total {
            tracing::warn!("dropped {} partner level rows with invalid idx", total - levels.len());
        }
        Ok(levels)
    }

    async fn create_level(&self, level: &NewLevel) -> Result<Option<String>, ConsoleError> {
        let path = format!("{}/write", PARTNER_SETTING);
        let envelope = self.post::<_, serde_json::Value>(&path, level).await?;
        Ok(envelope.message)
    }

    async fn rename_level(&self, id: LevelId, name: &str) -> Result<Option<String>, ConsoleError> {
        let path = format!("{}/test/edit/{}", PARTNER_SETTING, id);
        let body = serde_json::json!({ "partner_name": name });
        let envelope = self.post::<_, serde_json::Value>(&path, &body).await?;
        Ok(envelope.message)
    }

    async fn delete_level(&self, id: LevelId) -> Result<Option<String>, ConsoleError> {
        let path = format!("{}/delete/{}", PARTNER_SETTING, id);
        let envelope = self.delete::<serde_json::Value>(&path).await?;
        Ok(envelope.message)
    }

    async fn edit_level_info(&self, edit: &LevelInfoEdit) -> Result<LevelInfoOutcome, ConsoleError> {
        let path = format!("{}/editInfo", PARTNER_SETTING);
        let envelope = self.post::<_, serde_json::Value>(&path, edit).await?;
        Ok(LevelInfoOutcome {
            message: envelope.message,
            affected_children: envelope.affected_children,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn row_maps_string_flags_and_rates() {
        let row: PartnerSettingRow = serde_json::from_value(json!({
            "idx": "4",
            "partner_name": "Branch",
            "partner_path": "HQ > Dist > Agency > Branch",
            "rate": "p4",
            "upper_rate": "p2",
            "view_permission": "1",
            "edit_permission": "0",
            "commission_permission": 1,
            "use_special_path": "1",
            "create_date": null
        }))
        .unwrap();

        let level = row.into_level().unwrap();
        assert_eq!(level.id, LevelId(4));
        assert_eq!(level.permissions, Permissions { view: true, edit: false, commission: true });
        assert_eq!(level.upper_rate, Rate::new(2));
        assert!(level.uses_special_path);
        assert_eq!(level.created_at, None);
    }

    #[test]
    fn zero_idx_is_dropped() {
        let row: PartnerSettingRow = serde_json::from_value(json!({ "idx": 0, "partner_name": "?" })).unwrap();
        assert!(row.into_level().is_none());
    }

    #[test]
    fn edit_info_body_uses_backend_keys() {
        let body = LevelInfoEdit {
            admin_id: "admin".into(),
            level_id: 5,
            permission_data: Permissions { view: true, edit: true, commission: false }.into(),
            upper_level_id: Some(2),
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "adminId": "admin",
                "EditLevelId": 5,
                "permissionData": {
                    "view_permission": true,
                    "edit_permission": true,
                    "commission_permission": false
                },
                "upperLevelId": 2
            })
        );
    }
}
