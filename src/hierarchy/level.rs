use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::types::Rate;

/// Hard ceiling on configured partner tiers
pub const MAX_LEVELS: usize = 12;

/// Stable identifier of a partner level (`idx` on the wire), 1-based
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LevelId(pub u32);

impl LevelId {
    /// The natural parent, or `None` once the walk reaches the root
    pub fn parent(self) -> Option<LevelId> {
        (self.0 > 1).then(|| LevelId(self.0 - 1))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for LevelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for LevelId {
    fn from(value: u32) -> Self {
        LevelId(value)
    }
}

/// The three independent per-level permission flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permissions {
    pub view: bool,
    pub edit: bool,
    pub commission: bool,
}

impl Permissions {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn badges(&self) -> Vec<Badge> {
        let mut badges = Vec::with_capacity(3);
        if self.view {
            badges.push(Badge::View);
        }
        if self.edit {
            badges.push(Badge::Edit);
        }
        if self.commission {
            badges.push(Badge::Commission);
        }
        badges
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Badge {
    View,
    Edit,
    Commission,
}

impl Badge {
    pub fn label(&self) -> &'static str {
        match self {
            Badge::View => "view",
            Badge::Edit => "edit",
            Badge::Commission => "commission",
        }
    }
}

impl fmt::Display for Badge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One rank in the distributor hierarchy.
///
/// Ordinal position is not stored; it is the level's index in the current list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Level {
    pub id: LevelId,
    pub name: String,
    pub rate: Option<Rate>,
    pub upper_rate: Option<Rate>,
    pub permissions: Permissions,
    pub uses_special_path: bool,
    /// Lineage text as delivered by the backend; only a display fallback
    pub stored_path: Option<String>,
    pub created_at: Option<String>,
    pub edited_at: Option<String>,
}

impl Level {
    pub fn new(id: LevelId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            rate: Rate::new(id.0.min(u8::MAX as u32) as u8),
            upper_rate: None,
            permissions: Permissions::none(),
            uses_special_path: false,
            stored_path: None,
            created_at: None,
            edited_at: None,
        }
    }

    pub fn default_name(id: LevelId) -> String {
        format!("Level {}", id)
    }
}

/// Skip-level overrides: level → the ancestor it reports to directly
pub type SpecialPaths = BTreeMap<LevelId, LevelId>;

/// Permission flags keyed by stable level identifier
pub type PermissionMap = BTreeMap<LevelId, Permissions>;
