//! Partner and store registration, duplicate checks and account edits.
//!
//! A registration is submitted only after every uniqueness-checked value in
//! the form has passed its duplicate check with the exact value being sent.

mod error;
mod form;

use std::collections::HashMap;
use std::sync::Arc;

pub use error::AccountError;
pub use form::{validate_new_password, AccountForm};

use crate::api::{AccountApi, DuplicateField, PasswordCheck, Role};
use crate::error::ConsoleError;
use crate::notify::{Notice, Notifier};
use crate::session::{Page, Session};

pub struct Registrar<A> {
    api: A,
    session: Session,
    notifier: Arc<dyn Notifier>,
    confirmed: HashMap<DuplicateField, String>,
    confirmed_partner_id: Option<String>,
}

impl<A: AccountApi> Registrar<A> {
    pub fn new(api: A, session: Session, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            api,
            session,
            notifier,
            confirmed: HashMap::new(),
            confirmed_partner_id: None,
        }
    }

    /// Value last confirmed free for `field`
    pub fn confirmed(&self, field: DuplicateField) -> Option<&str> {
        self.confirmed.get(&field).map(String::as_str)
    }

    pub async fn check_duplicate(&mut self, field: DuplicateField, value: &str) -> Result<(), ConsoleError> {
        self.authorize()?;
        let value = value.trim();
        if value.is_empty() {
            return self.report(Err(AccountError::EmptyValue(field).into()));
        }

        let duplicated = self.report(self.api.is_duplicated(field, value).await)?;
        if duplicated {
            self.confirmed.remove(&field);
            return self.report(Err(AccountError::Duplicated(field).into()));
        }

        tracing::debug!("{} '{}' is available", field, value);
        self.confirmed.insert(field, value.to_string());
        self.notifier.notify(Notice::info(format!("The {} is available", field)));
        Ok(())
    }

    pub async fn check_partner_id(&mut self, user_id: &str) -> Result<(), ConsoleError> {
        self.authorize()?;
        let user_id = user_id.trim();
        if user_id.is_empty() {
            return self.report(Err(AccountError::EmptyValue(DuplicateField::UserId).into()));
        }

        if self.report(self.api.partner_id_taken(user_id).await)? {
            self.confirmed_partner_id = None;
            return self.report(Err(AccountError::PartnerIdTaken.into()));
        }

        self.confirmed_partner_id = Some(user_id.to_string());
        self.notifier.notify(Notice::info("The partner ID is available"));
        Ok(())
    }

    /// Validates the form, runs any duplicate check not yet passed for the
    /// submitted value, then posts the registration.
    pub async fn register(&mut self, role: Role, form: &AccountForm) -> Result<Option<String>, ConsoleError> {
        self.authorize()?;
        self.report(form.validate_registration(role).map_err(ConsoleError::from))?;

        match role {
            Role::Partner => {
                let user_id = form.text("user_id").unwrap_or_default();
                if self.confirmed_partner_id.as_deref() != Some(user_id.as_str()) {
                    self.check_partner_id(&user_id).await?;
                }
            }
            Role::Store => {
                for (field, value) in form.required_checks(role) {
                    if self.confirmed(field) != Some(value.as_str()) {
                        self.check_duplicate(field, &value).await?;
                    }
                }
            }
        }

        let message = self.report(self.api.register(role, form.fields()).await)?;
        tracing::info!("{} {} registered", role, form.text("user_id").unwrap_or_default());
        self.confirmed.clear();
        self.confirmed_partner_id = None;
        self.notifier.notify(Notice::info("Registration complete"));
        Ok(message)
    }

    fn authorize(&self) -> Result<(), ConsoleError> {
        self.report(self.session.require_access(Page::StoreWrite))
    }

    fn report<T>(&self, result: Result<T, ConsoleError>) -> Result<T, ConsoleError> {
        if let Err(e) = &result {
            self.notifier.notify(Notice::error(e.user_message()));
        }
        result
    }
}

/// Edits an existing partner or store account.
///
/// Bank details stay locked until the signed-in user's password has been
/// re-checked by the backend.
pub struct AccountEditor<A> {
    api: A,
    session: Session,
    notifier: Arc<dyn Notifier>,
    bank_unlocked: bool,
}

impl<A: AccountApi> AccountEditor<A> {
    pub fn new(api: A, session: Session, notifier: Arc<dyn Notifier>) -> Self {
        Self { api, session, notifier, bank_unlocked: false }
    }

    pub fn bank_unlocked(&self) -> bool {
        self.bank_unlocked
    }

    pub async fn verify_password(&mut self, password: &str) -> Result<(), ConsoleError> {
        self.authorize()?;
        let check = self.report(self.password_check(password))?;

        if !self.report(self.api.check_password(&check).await)? {
            return self.report(Err(AccountError::PasswordRejected.into()));
        }
        self.bank_unlocked = true;
        self.notifier.notify(Notice::info("Password confirmed"));
        Ok(())
    }

    pub async fn edit(&mut self, role: Role, form: &AccountForm) -> Result<Option<String>, ConsoleError> {
        self.authorize()?;
        self.report(form.validate_edit(role).map_err(ConsoleError::from))?;
        if form.touches_bank_details() && !self.bank_unlocked {
            return self.report(Err(AccountError::BankDetailsLocked.into()));
        }

        let message = self.report(self.api.edit_account(role, form.fields()).await)?;
        tracing::info!("{} account {} updated", role, form.text("user_id").unwrap_or_default());
        self.notifier.notify(Notice::info("Changes saved"));
        Ok(message)
    }

    fn password_check(&self, password: &str) -> Result<PasswordCheck, ConsoleError> {
        if password.is_empty() {
            return Err(AccountError::PasswordMissing.into());
        }
        Ok(PasswordCheck {
            user_id: self.session.require_user_id()?.to_string(),
            password: password.to_string(),
            classify: self.session.require_classify()?.code().to_string(),
        })
    }

    fn authorize(&self) -> Result<(), ConsoleError> {
        self.report(self.session.require_access(Page::StoreEdit))
    }

    fn report<T>(&self, result: Result<T, ConsoleError>) -> Result<T, ConsoleError> {
        if let Err(e) = &result {
            self.notifier.notify(Notice::error(e.user_message()));
        }
        result
    }
}
