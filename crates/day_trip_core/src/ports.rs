//! crates/day_trip_core/src/ports.rs
//!
//! Defines the service contracts (traits) the core depends on.
//! These traits form the boundary of the hexagonal architecture: the backend
//! REST API, the persisted credential, the card tokenization widget and the
//! page view all live behind them, so the state machines can run headlessly.

use async_trait::async_trait;

use crate::domain::{
    AttractionDetail, Booking, BookingDraft, ContactInfo, Credential, Cursor, ListingPage,
    OrderReceipt, User,
};
use crate::render::{HeaderControl, LoginForm, ViewNode};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (HTTP, storage).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    /// The request never produced a response.
    #[error("Network failure: {0}")]
    Network(String),
    /// A response arrived but lacked the fields we expect.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
    /// The backend answered with an explicit, user-facing refusal.
    #[error("Request rejected: {0}")]
    Rejected(String),
    /// The credential was missing, invalid or expired.
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Item not found: {0}")]
    NotFound(String),
    /// A required form field is missing or invalid. No request was issued.
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

impl PortError {
    /// The message shown to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            PortError::Network(_) | PortError::MalformedResponse(_) | PortError::Unexpected(_) => {
                "Server error, please try again later".to_string()
            }
            PortError::Rejected(message) | PortError::Validation(message) => message.clone(),
            PortError::Unauthorized => "Please sign in first".to_string(),
            PortError::NotFound(what) => format!("{} not found", what),
        }
    }
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait BackendGateway: Send + Sync {
    // --- Listing ---
    async fn list_attractions(&self, keyword: &str, cursor: Cursor) -> PortResult<ListingPage>;

    async fn list_stations(&self) -> PortResult<Vec<String>>;

    async fn attraction(&self, id: u64) -> PortResult<AttractionDetail>;

    // --- Auth ---
    /// Checks the credential. Returns `Unauthorized` when the backend rejects it.
    async fn current_user(&self, credential: &Credential) -> PortResult<User>;

    async fn login(&self, email: &str, password: &str) -> PortResult<Credential>;

    async fn logout(&self, credential: &Credential) -> PortResult<()>;

    async fn signup(&self, name: &str, email: &str, password: &str) -> PortResult<()>;

    // --- Booking and Orders ---
    async fn current_booking(&self, credential: &Credential) -> PortResult<Option<Booking>>;

    async fn create_booking(&self, credential: &Credential, draft: &BookingDraft)
        -> PortResult<()>;

    async fn cancel_booking(&self, credential: &Credential) -> PortResult<()>;

    async fn create_order(
        &self,
        credential: &Credential,
        prime: &str,
        booking: &Booking,
        contact: &ContactInfo,
    ) -> PortResult<OrderReceipt>;
}

/// Persistent storage for the single session credential.
pub trait CredentialStore: Send + Sync {
    fn load(&self) -> PortResult<Option<Credential>>;
    fn save(&self, credential: &Credential) -> PortResult<()>;
    fn clear(&self) -> PortResult<()>;
}

#[async_trait]
pub trait CardTokenizer: Send + Sync {
    /// Exchanges the card currently entered in the payment widget for a one-time prime.
    async fn get_prime(&self) -> PortResult<String>;
}

/// The page view. Receives finished view trees and UI commands; makes no decisions.
pub trait RenderSink: Send + Sync {
    fn replace_listing(&self, cards: Vec<ViewNode>);
    fn append_listing(&self, cards: Vec<ViewNode>);
    fn show_stations(&self, view: ViewNode);
    fn set_header(&self, control: HeaderControl);
    fn open_login_prompt(&self);
    fn close_login_prompt(&self);
    /// Shows an inline message on one of the login prompt's forms, switching to it.
    fn show_form_message(&self, form: LoginForm, message: &str);
    fn show_alert(&self, message: &str);
    fn show_view(&self, view: ViewNode);
    fn navigate(&self, location: &str);
}
