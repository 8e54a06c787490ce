//! Typed access to the console backend's REST/JSON endpoints

pub mod account;
pub mod client;
pub mod de;
pub mod envelope;
pub mod list;
pub mod menu;
pub mod partner;
pub mod payment;
pub mod store;

pub use account::{AccountApi, DuplicateField, PasswordCheck, Role};
pub use client::{ApiClient, NO_QUERY};
pub use envelope::Envelope;
pub use list::{EndpointSource, ListEndpoint, LogKind};
pub use menu::{MenuApi, MenuCounts};
pub use partner::{LevelInfoEdit, LevelInfoOutcome, NewLevel, PartnerSettingApi, PartnerSettingRow, PermissionData};
pub use payment::{CancelRequest, PayType, PaymentApi};
pub use store::{CommissionApi, CommissionEdit, EditData, StoreCommissionRow};
