//! List/search state shared by every paginated screen

mod debounce;
mod error;
mod hook;
mod pagination;
mod query;

pub use debounce::{Debouncer, RequestSequence, Ticket};
pub use error::ListError;
pub use hook::{ListData, ListSource, ListState, LoadOutcome};
pub use pagination::{Page, PageWindow, Pagination};
pub use query::{ListQuery, SearchParams, SearchPatch};
