//! Partner hierarchy: level model, structural ancestry and the level editor

mod editor;
mod error;
mod level;
mod resolver;
mod state;

pub use editor::{DeleteOutcome, LevelEditor};
pub use error::HierarchyError;
pub use level::{Badge, Level, LevelId, PermissionMap, Permissions, SpecialPaths, MAX_LEVELS};
pub use resolver::{render_path, resolve_ancestry_ids, resolve_ancestry_path, PATH_SEPARATOR};
pub use state::{validate_name, Hierarchy, LevelRow};
