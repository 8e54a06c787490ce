use rust_decimal::Decimal;
use thiserror::Error;

use crate::api::DuplicateField;
use crate::commission::format_commission;

/// Local refusals raised by registration and account edits
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccountError {
    #[error("Enter a {0}")]
    EmptyValue(DuplicateField),

    #[error("That {0} is already in use")]
    Duplicated(DuplicateField),

    #[error("That partner ID is already in use")]
    PartnerIdTaken,

    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("Enter the new password")]
    PasswordMissing,

    #[error("Confirm the new password")]
    PasswordConfirmMissing,

    #[error("The password and its confirmation differ")]
    PasswordMismatch,

    #[error("Enter the terminal registration date")]
    TerminalDateMissing,

    #[error("Enter the merchant commission")]
    CommissionMissing,

    #[error("Commission {}% cannot be lower than the headquarters commission {}%", format_commission(*.commission), format_commission(*.floor))]
    CommissionBelowFloor { commission: Decimal, floor: Decimal },

    #[error("The password is incorrect")]
    PasswordRejected,

    #[error("Re-enter the account password before changing bank details")]
    BankDetailsLocked,

    #[error("The form must be a JSON object")]
    NotAnObject,
}
