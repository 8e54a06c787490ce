// Console error taxonomy
use thiserror::Error;

use crate::account::AccountError;
use crate::commission::CommissionError;
use crate::hierarchy::HierarchyError;
use crate::listing::ListError;
use crate::payment::PaymentError;
use crate::session::Page;

/// Every failure a console operation can surface.
///
/// Three classes matter to callers: transport failures (generic message, logged),
/// application rejections (`success: false`, server message shown verbatim) and
/// local validation failures (raised before any request leaves the process).
#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{message}")]
    Rejected { message: String, status: Option<u16> },

    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),

    #[error(transparent)]
    Hierarchy(#[from] HierarchyError),

    #[error(transparent)]
    Commission(#[from] CommissionError),

    #[error(transparent)]
    List(#[from] ListError),

    #[error(transparent)]
    Payment(#[from] PaymentError),

    #[error(transparent)]
    Account(#[from] AccountError),

    #[error("Session error: {0}")]
    Session(String),

    #[error("This account cannot open the {0} screen")]
    AccessDenied(Page),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ConsoleError {
    pub fn rejected(message: impl Into<String>) -> Self {
        ConsoleError::Rejected { message: message.into(), status: None }
    }

    pub fn rejected_with_status(message: impl Into<String>, status: u16) -> Self {
        ConsoleError::Rejected { message: message.into(), status: Some(status) }
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        ConsoleError::InvalidResponse(message.into())
    }

    pub fn session(message: impl Into<String>) -> Self {
        ConsoleError::Session(message.into())
    }

    /// True for failures raised locally before any request was sent
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ConsoleError::Hierarchy(_)
                | ConsoleError::Commission(_)
                | ConsoleError::List(_)
                | ConsoleError::Payment(_)
        )
    }

    /// Error code for JSON output
    pub fn error_code(&self) -> &'static str {
        match self {
            ConsoleError::Transport(_) => "TRANSPORT_ERROR",
            ConsoleError::Rejected { .. } => "REJECTED",
            ConsoleError::InvalidResponse(_) => "INVALID_RESPONSE",
            ConsoleError::Hierarchy(_) => "HIERARCHY_VALIDATION",
            ConsoleError::Commission(_) => "COMMISSION_VALIDATION",
            ConsoleError::List(_) => "LIST_VALIDATION",
            ConsoleError::Payment(_) => "PAYMENT_VALIDATION",
            ConsoleError::Account(_) => "ACCOUNT_ERROR",
            ConsoleError::Session(_) => "SESSION_ERROR",
            ConsoleError::AccessDenied(_) => "ACCESS_DENIED",
            ConsoleError::Url(_) => "INVALID_URL",
        }
    }

    /// Message suitable for a notification.
    ///
    /// Transport and decoding details stay in the logs; the user sees a generic line.
    pub fn user_message(&self) -> String {
        match self {
            ConsoleError::Transport(e) => {
                tracing::error!("Backend transport failure: {}", e);
                "Could not reach the server. Please try again shortly.".to_string()
            }
            ConsoleError::InvalidResponse(msg) => {
                tracing::error!("Malformed backend response: {}", msg);
                "The server returned an unexpected response.".to_string()
            }
            other => other.to_string(),
        }
    }
}
