//! Merchant commission cascade: parsing, validation and the editable board

mod board;
mod format;
mod merchant;
mod validator;

pub use board::{CommissionBoard, CommissionDraft, SaveState};
pub use format::{format_commission, parse_commission, round_commission};
pub use merchant::{MerchantCommission, MerchantStatus, Tier, TIER_CODES};
pub use validator::{validate_cascade, validate_terminal, CascadeCheck, CascadeStatus, CommissionError};
