use serde::Serialize;

use super::error::HierarchyError;
use super::level::{Badge, Level, LevelId, PermissionMap, Permissions, SpecialPaths, MAX_LEVELS};
use super::resolver::{render_path, resolve_ancestry_ids, resolve_ancestry_path};

/// Client-side view of the partner hierarchy.
///
/// All mutation goes through methods so the level list, the permission map and
/// the special-path table stay consistent with each other.
#[derive(Debug, Clone, Default)]
pub struct Hierarchy {
    levels: Vec<Level>,
    permissions: PermissionMap,
    special_paths: SpecialPaths,
}

/// One row of the level table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LevelRow {
    pub order: usize,
    pub id: LevelId,
    pub name: String,
    pub badges: Vec<Badge>,
    pub path: String,
}

impl Hierarchy {
    /// Builds the state from a freshly fetched list.
    ///
    /// Permissions come from each level's flags. A level flagged as using a special
    /// path reports to the level named by its `upper_rate` when that is a smaller,
    /// existing, non-adjacent identifier.
    pub fn from_levels(levels: Vec<Level>) -> Self {
        let permissions = levels.iter().map(|l| (l.id, l.permissions)).collect();

        let special_paths = levels
            .iter()
            .filter(|l| l.uses_special_path)
            .filter_map(|l| {
                let target = LevelId(u32::from(l.upper_rate?.tier()));
                let exists = levels.iter().any(|other| other.id == target);
                (exists && target < l.id && Some(target) != l.id.parent()).then_some((l.id, target))
            })
            .collect();

        Self { levels, permissions, special_paths }
    }

    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn level(&self, id: LevelId) -> Option<&Level> {
        self.levels.iter().find(|l| l.id == id)
    }

    pub fn contains(&self, id: LevelId) -> bool {
        self.level(id).is_some()
    }

    /// 1-based position in the current list
    pub fn ordinal(&self, id: LevelId) -> Option<usize> {
        self.levels.iter().position(|l| l.id == id).map(|i| i + 1)
    }

    pub fn permissions(&self) -> &PermissionMap {
        &self.permissions
    }

    pub fn permissions_of(&self, id: LevelId) -> Permissions {
        self.permissions.get(&id).copied().unwrap_or_default()
    }

    pub fn special_paths(&self) -> &SpecialPaths {
        &self.special_paths
    }

    pub fn special_path(&self, id: LevelId) -> Option<LevelId> {
        self.special_paths.get(&id).copied()
    }

    pub fn resolve_ancestry_path(&self, id: LevelId) -> Result<Vec<String>, HierarchyError> {
        resolve_ancestry_path(&self.levels, &self.special_paths, id)
    }

    pub fn resolve_ancestry_ids(&self, id: LevelId) -> Result<Vec<LevelId>, HierarchyError> {
        resolve_ancestry_ids(&self.levels, &self.special_paths, id)
    }

    pub fn display_path(&self, id: LevelId) -> Result<String, HierarchyError> {
        let ancestry = self.resolve_ancestry_path(id)?;
        Ok(render_path(self.level(id), &ancestry))
    }

    pub fn badges(&self, id: LevelId) -> Vec<Badge> {
        self.permissions_of(id).badges()
    }

    pub fn rows(&self) -> Result<Vec<LevelRow>, HierarchyError> {
        self.levels
            .iter()
            .enumerate()
            .map(|(index, level)| {
                Ok(LevelRow {
                    order: index + 1,
                    id: level.id,
                    name: level.name.clone(),
                    badges: self.badges(level.id),
                    path: self.display_path(level.id)?,
                })
            })
            .collect()
    }

    /// Levels that may serve as a skip-level target for `id`
    pub fn path_options(&self, id: LevelId) -> Vec<&Level> {
        self.levels.iter().filter(|l| l.id < id).collect()
    }

    /// Identifier for the next level: `count + 1` unless that one is taken,
    /// then the lowest free identifier within the cap.
    pub fn next_level_id(&self) -> Result<LevelId, HierarchyError> {
        if self.levels.len() >= MAX_LEVELS {
            return Err(HierarchyError::LevelLimit { max: MAX_LEVELS });
        }

        let preferred = LevelId(self.levels.len() as u32 + 1);
        if !self.contains(preferred) {
            return Ok(preferred);
        }

        (1..=MAX_LEVELS as u32)
            .map(LevelId)
            .find(|id| !self.contains(*id))
            .ok_or(HierarchyError::LevelLimit { max: MAX_LEVELS })
    }

    pub fn rename(&mut self, id: LevelId, name: &str) -> Result<(), HierarchyError> {
        let name = validate_name(name)?;
        let level = self
            .levels
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or(HierarchyError::UnknownLevel(id))?;
        level.name = name;
        Ok(())
    }

    /// Drops the level, its permission entry and every special path touching it.
    /// Remaining levels keep their identifiers; ordinals follow list position.
    pub fn remove(&mut self, id: LevelId) -> Result<Level, HierarchyError> {
        let index = self
            .levels
            .iter()
            .position(|l| l.id == id)
            .ok_or(HierarchyError::UnknownLevel(id))?;

        let removed = self.levels.remove(index);
        self.permissions.remove(&id);
        self.special_paths.retain(|from, to| *from != id && *to != id);
        Ok(removed)
    }

    pub fn insert(&mut self, level: Level) {
        self.permissions.insert(level.id, level.permissions);
        match self.levels.iter().position(|l| l.id > level.id) {
            Some(index) => self.levels.insert(index, level),
            None => self.levels.push(level),
        }
    }

    pub fn set_permissions(&mut self, id: LevelId, permissions: Permissions) -> Result<(), HierarchyError> {
        let level = self
            .levels
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or(HierarchyError::UnknownLevel(id))?;
        level.permissions = permissions;
        self.permissions.insert(id, permissions);
        Ok(())
    }

    /// Points `id` at `target`, or clears the override when `target` is `None`
    pub fn set_special_path(&mut self, id: LevelId, target: Option<LevelId>) -> Result<(), HierarchyError> {
        if !self.contains(id) {
            return Err(HierarchyError::UnknownLevel(id));
        }

        match target {
            None => {
                self.special_paths.remove(&id);
            }
            Some(target) => {
                self.validate_path_target(id, target)?;
                self.special_paths.insert(id, target);
            }
        }

        if let Some(level) = self.levels.iter_mut().find(|l| l.id == id) {
            level.uses_special_path = target.is_some();
        }
        Ok(())
    }

    pub fn validate_path_target(&self, id: LevelId, target: LevelId) -> Result<(), HierarchyError> {
        if target >= id || !self.contains(target) {
            return Err(HierarchyError::InvalidPathTarget { level: id, target });
        }
        Ok(())
    }
}

/// Trimmed, non-empty level name
pub fn validate_name(name: &str) -> Result<String, HierarchyError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(HierarchyError::EmptyName);
    }
    Ok(trimmed.to_string())
}
