use thiserror::Error;

use super::level::LevelId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HierarchyError {
    #[error("At most {max} partner levels can be configured")]
    LevelLimit { max: usize },

    #[error("Level name cannot be empty")]
    EmptyName,

    #[error("Level {0} does not exist")]
    UnknownLevel(LevelId),

    #[error("The top level cannot be deleted")]
    RootLevel,

    #[error("Level {target} cannot be a reporting target for level {level}")]
    InvalidPathTarget { level: LevelId, target: LevelId },

    #[error("Special paths loop back to level {repeated} while resolving level {start}")]
    CycleDetected { start: LevelId, repeated: LevelId },
}
