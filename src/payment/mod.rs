//! Payment-history actions: cancelling an approved key-in or 3-D Secure payment.

use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

use crate::api::{CancelRequest, PayType, PaymentApi};
use crate::confirm::Confirm;
use crate::error::ConsoleError;
use crate::notify::{Notice, Notifier};
use crate::session::{Page, Session};

/// `cancelYN` value of a payment that is still approved
pub const APPROVED_STATE: &str = "N";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PaymentError {
    #[error("This payment cannot be cancelled")]
    NotCancellable,

    #[error("Payment type '{0}' cannot be cancelled from the console")]
    UnsupportedPayType(String),

    #[error("A track id is required")]
    MissingTrackId,
}

/// The payment-history row fields a cancellation needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CancelTarget {
    pub track_id: String,
    pub pay_type: String,
    pub cancel_state: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CancelOutcome {
    Cancelled(Option<String>),
    Declined,
}

pub struct PaymentCanceller<A> {
    api: A,
    session: Session,
    notifier: Arc<dyn Notifier>,
}

impl<A: PaymentApi> PaymentCanceller<A> {
    pub fn new(api: A, session: Session, notifier: Arc<dyn Notifier>) -> Self {
        Self { api, session, notifier }
    }

    /// Asks `confirm` first; an approved payment of a cancellable type is then
    /// sent to the channel's cancel endpoint.
    pub async fn cancel(&self, target: &CancelTarget, confirm: &dyn Confirm) -> Result<CancelOutcome, ConsoleError> {
        self.report(self.session.require_access(Page::TerminalPay))?;

        if !confirm.confirm("Cancel this payment?").await {
            tracing::debug!("cancellation of {} declined", target.track_id);
            return Ok(CancelOutcome::Declined);
        }

        let pay_type = self.report(check_target(target).map_err(ConsoleError::from))?;
        let request = CancelRequest { track_id: target.track_id.trim().to_string() };

        let message = self.report(self.api.cancel_payment(pay_type, &request).await)?;
        tracing::info!("payment {} cancelled", request.track_id);
        self.notifier.notify(Notice::info("Payment cancelled"));
        Ok(CancelOutcome::Cancelled(message))
    }

    fn report<T>(&self, result: Result<T, ConsoleError>) -> Result<T, ConsoleError> {
        if let Err(e) = &result {
            self.notifier.notify(Notice::error(e.user_message()));
        }
        result
    }
}

fn check_target(target: &CancelTarget) -> Result<PayType, PaymentError> {
    if target.track_id.trim().is_empty() {
        return Err(PaymentError::MissingTrackId);
    }
    if target.cancel_state.trim() != APPROVED_STATE {
        return Err(PaymentError::NotCancellable);
    }
    PayType::from_code(&target.pay_type).ok_or_else(|| PaymentError::UnsupportedPayType(target.pay_type.clone()))
}
