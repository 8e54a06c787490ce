use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Map, Value};
use std::str::FromStr;

use super::error::AccountError;
use crate::api::{DuplicateField, Role};

/// Radio value meaning "in use" for `keyin_state` and `terminal_state`
const IN_USE: &str = "0";

const BANK_FIELDS: [&str; 4] = ["bank_code", "bank_name", "account_num", "account_name"];

/// Registration or edit form, sent to the backend as-is.
///
/// Keys follow the backend's form names (`store_pass`, `keyin_Tid`, ...);
/// only the ones the local checks need are read here.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AccountForm(Map<String, Value>);

impl AccountForm {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn from_value(value: Value) -> Result<Self, AccountError> {
        match value {
            Value::Object(fields) => Ok(Self(fields)),
            _ => Err(AccountError::NotAnObject),
        }
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Trimmed text of a string or number field; blanks read as `None`
    pub fn text(&self, key: &str) -> Option<String> {
        let text = match self.0.get(key)? {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            _ => return None,
        };
        (!text.is_empty()).then_some(text)
    }

    /// Password fields compare untrimmed
    fn raw(&self, key: &str) -> &str {
        self.0.get(key).and_then(Value::as_str).unwrap_or("")
    }

    fn in_use(&self, key: &str) -> bool {
        self.text(key).as_deref() == Some(IN_USE)
    }

    fn require(&self, key: &str, label: &'static str) -> Result<String, AccountError> {
        self.text(key).ok_or(AccountError::MissingField(label))
    }

    pub fn touches_bank_details(&self) -> bool {
        BANK_FIELDS.iter().any(|key| self.0.contains_key(*key))
    }

    /// Values that must pass a duplicate check before the form is submitted
    pub fn required_checks(&self, role: Role) -> Vec<(DuplicateField, String)> {
        if role == Role::Partner {
            return Vec::new();
        }

        let mut checks = Vec::new();
        let mut push = |field: DuplicateField, key: &str| {
            if let Some(value) = self.text(key) {
                checks.push((field, value));
            }
        };
        push(DuplicateField::UserId, "user_id");
        if self.in_use("keyin_state") {
            push(DuplicateField::KeyinTid, "keyin_Tid");
            push(DuplicateField::KeyinPayKey, "keyin_paykey");
        }
        if self.in_use("terminal_state") {
            push(DuplicateField::TerminalTid, "terminal_Tid");
        }
        checks
    }

    /// Everything a registration needs that can be checked without the backend
    pub fn validate_registration(&self, role: Role) -> Result<(), AccountError> {
        match role {
            Role::Partner => {
                self.require("user_id", "Partner ID")?;
                self.require("partner_name", "Partner name")?;
                validate_new_password(self.raw("partner_pass"), self.raw("partner_pass_check"), true)
            }
            Role::Store => self.validate_store_registration(),
        }
    }

    fn validate_store_registration(&self) -> Result<(), AccountError> {
        self.require("upperPath", "Upper partner")?;
        self.require("upperId", "Upper partner ID")?;
        self.require("user_id", "Store ID")?;
        validate_new_password(self.raw("store_pass"), self.raw("store_pass_check"), true)?;
        self.require("store_name", "Store name")?;
        self.require("store_ceo_name", "Representative name")?;

        let keyin = self.in_use("keyin_state");
        let terminal = self.in_use("terminal_state");
        for (field, key) in [
            (DuplicateField::KeyinTid, "keyin_Tid"),
            (DuplicateField::KeyinPayKey, "keyin_paykey"),
        ] {
            if keyin && self.text(key).is_none() {
                return Err(AccountError::EmptyValue(field));
            }
        }
        if terminal {
            if self.text("terminal_Tid").is_none() {
                return Err(AccountError::EmptyValue(DuplicateField::TerminalTid));
            }
            if self.text("T_catId_date").is_none() {
                return Err(AccountError::TerminalDateMissing);
            }
        }

        if keyin || terminal {
            let commission = self
                .text("terminal_commission")
                .and_then(|v| Decimal::from_str(&v).ok())
                .ok_or(AccountError::CommissionMissing)?;
            let floor = self
                .text("settlementCommision")
                .and_then(|v| Decimal::from_str(&v).ok())
                .unwrap_or(Decimal::ZERO);
            if commission < floor {
                return Err(AccountError::CommissionBelowFloor { commission, floor });
            }
        }
        Ok(())
    }

    /// Edits may leave the password untouched; a half-filled pair is refused
    pub fn validate_edit(&self, role: Role) -> Result<(), AccountError> {
        let (pass, check) = match role {
            Role::Partner => ("partner_pass", "partner_pass_check"),
            Role::Store => ("store_pass", "store_pass_check"),
        };
        validate_new_password(self.raw(pass), self.raw(check), false)
    }
}

/// Password and confirmation must match; `required` refuses an empty pair
pub fn validate_new_password(password: &str, confirm: &str, required: bool) -> Result<(), AccountError> {
    match (password.is_empty(), confirm.is_empty()) {
        (true, true) if required => Err(AccountError::PasswordMissing),
        (true, true) => Ok(()),
        (false, true) => Err(AccountError::PasswordConfirmMissing),
        (true, false) => Err(AccountError::PasswordMissing),
        (false, false) if password != confirm => Err(AccountError::PasswordMismatch),
        (false, false) => Ok(()),
    }
}
