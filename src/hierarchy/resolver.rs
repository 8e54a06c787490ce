use std::collections::{HashSet, VecDeque};

use super::error::HierarchyError;
use super::level::{Level, LevelId, SpecialPaths};

/// Separator used when an ancestry is rendered as one line
pub const PATH_SEPARATOR: &str = " > ";

/// Display names from the root down to `start`.
///
/// From each level the walk follows that level's special-path target when one is
/// set (and is not the level itself), otherwise the natural parent `id - 1`. It
/// stops at the root or at the first identifier with no matching level. An unknown
/// `start` yields an empty path. Revisiting an identifier is an error.
pub fn resolve_ancestry_path(
    levels: &[Level],
    special_paths: &SpecialPaths,
    start: LevelId,
) -> Result<Vec<String>, HierarchyError> {
    resolve_ancestry_ids(levels, special_paths, start).map(|ids| {
        ids.into_iter()
            .filter_map(|id| levels.iter().find(|l| l.id == id))
            .map(|l| l.name.clone())
            .collect()
    })
}

/// Same walk as [`resolve_ancestry_path`], returning identifiers instead of names
pub fn resolve_ancestry_ids(
    levels: &[Level],
    special_paths: &SpecialPaths,
    start: LevelId,
) -> Result<Vec<LevelId>, HierarchyError> {
    let mut path = VecDeque::new();
    let mut visited = HashSet::new();
    let mut current = Some(start);

    while let Some(id) = current {
        if !levels.iter().any(|l| l.id == id) {
            break;
        }
        if !visited.insert(id) {
            return Err(HierarchyError::CycleDetected { start, repeated: id });
        }

        path.push_front(id);

        current = match special_paths.get(&id) {
            Some(target) if *target != id => Some(*target),
            _ => id.parent(),
        };
    }

    Ok(path.into())
}

/// Line shown in the path column: the joined ancestry when it has more than one
/// step, otherwise the backend's stored lineage text, otherwise `-`.
pub fn render_path(level: Option<&Level>, ancestry: &[String]) -> String {
    if ancestry.len() > 1 {
        return ancestry.join(PATH_SEPARATOR);
    }

    level
        .and_then(|l| l.stored_path.as_deref())
        .filter(|p| !p.trim().is_empty())
        .unwrap_or("-")
        .to_string()
}
