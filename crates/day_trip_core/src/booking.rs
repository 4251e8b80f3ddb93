//! crates/day_trip_core/src/booking.rs
//!
//! The booking desk: creating a booking from the detail page, showing and
//! cancelling it on the booking page, and paying for it. Every action is
//! gated by the session; none is retried automatically on failure.

use chrono::NaiveDate;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info};

use crate::domain::{Booking, BookingDraft, ContactInfo, OrderReceipt, TimeSlot};
use crate::ports::{BackendGateway, CardTokenizer, PortError, PortResult, RenderSink};
use crate::render;
use crate::session::{SessionGate, SessionState};

pub const BOOKING_PAGE: &str = "/booking";
const HOME_PAGE: &str = "/";
const FALLBACK_USER_NAME: &str = "user";

/// Raw values from the detail page's booking form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingForm {
    pub attraction_id: u64,
    pub date: String,
    pub time_slot: String,
}

impl BookingForm {
    pub fn validate(&self) -> PortResult<BookingDraft> {
        let date = self.date.trim();
        if date.is_empty() {
            return Err(PortError::Validation("Please choose a date".to_string()));
        }
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|_| PortError::Validation(format!("'{}' is not a valid date", date)))?;
        let time_slot = TimeSlot::parse(&self.time_slot)
            .ok_or_else(|| PortError::Validation("Please choose a time slot".to_string()))?;
        Ok(BookingDraft::new(self.attraction_id, date, time_slot))
    }
}

impl ContactInfo {
    pub fn validate(&self) -> PortResult<ContactInfo> {
        let contact = ContactInfo {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
        };
        if contact.name.is_empty() || contact.email.is_empty() || contact.phone.is_empty() {
            return Err(PortError::Validation(
                "Please fill in the contact information".to_string(),
            ));
        }
        Ok(contact)
    }
}

/// What a gated action ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome<T> {
    Done(T),
    /// The session was anonymous; the login prompt was opened instead.
    Intercepted,
}

pub struct BookingDesk {
    gateway: Arc<dyn BackendGateway>,
    gate: Arc<SessionGate>,
    tokenizer: Arc<dyn CardTokenizer>,
    sink: Arc<dyn RenderSink>,
    current: Mutex<Option<Booking>>,
}

impl BookingDesk {
    pub fn new(
        gateway: Arc<dyn BackendGateway>,
        gate: Arc<SessionGate>,
        tokenizer: Arc<dyn CardTokenizer>,
        sink: Arc<dyn RenderSink>,
    ) -> Self {
        Self {
            gateway,
            gate,
            tokenizer,
            sink,
            current: Mutex::new(None),
        }
    }

    /// The header's "booking" link.
    pub async fn open_booking_page(&self) -> GateOutcome<()> {
        if self.gate.guard().await.is_none() {
            return GateOutcome::Intercepted;
        }
        self.sink.navigate(BOOKING_PAGE);
        GateOutcome::Done(())
    }

    /// Sends the detail page's booking form, then moves to the booking page.
    pub async fn submit(&self, form: &BookingForm) -> PortResult<GateOutcome<()>> {
        let Some(credential) = self.gate.guard().await else {
            return Ok(GateOutcome::Intercepted);
        };

        let draft = form.validate().inspect_err(|e| {
            self.sink.show_alert(&e.user_message());
        })?;

        match self.gateway.create_booking(&credential, &draft).await {
            Ok(()) => {
                info!(attraction_id = draft.attraction_id, "Booking created.");
                self.sink.navigate(BOOKING_PAGE);
                Ok(GateOutcome::Done(()))
            }
            Err(e) => Err(self.fail("create the booking", e).await),
        }
    }

    /// Renders the booking page for the signed-in user.
    ///
    /// Anonymous visitors are sent back to the home page.
    pub async fn load_summary(&self) -> PortResult<Option<Booking>> {
        let credential = match self.gate.state().await {
            SessionState::Authenticated(credential) => credential,
            SessionState::Anonymous => {
                self.sink.navigate(HOME_PAGE);
                return Ok(None);
            }
        };

        let (user_name, user_email) = match self.gate.profile().await {
            Some(user) => (user.name, user.email),
            None => (FALLBACK_USER_NAME.to_string(), String::new()),
        };

        let result = self.gateway.current_booking(&credential).await;
        let mut current = self.current.lock().await;
        match result {
            Ok(Some(booking)) => {
                self.sink
                    .show_view(render::booking_summary(&user_name, &user_email, &booking));
                *current = Some(booking.clone());
                Ok(Some(booking))
            }
            Ok(None) => {
                self.sink.show_view(render::empty_booking(&user_name));
                *current = None;
                Ok(None)
            }
            Err(PortError::Unauthorized) => {
                drop(current);
                self.gate.reject().await;
                Err(PortError::Unauthorized)
            }
            Err(e) => {
                error!("Failed to load the booking: {:?}", e);
                self.sink.show_view(render::empty_booking(&user_name));
                *current = None;
                Err(e)
            }
        }
    }

    /// Deletes the current booking and re-renders the page.
    pub async fn cancel(&self) -> PortResult<GateOutcome<()>> {
        let Some(credential) = self.gate.guard().await else {
            return Ok(GateOutcome::Intercepted);
        };

        match self.gateway.cancel_booking(&credential).await {
            Ok(()) => {
                info!("Booking cancelled.");
                self.current.lock().await.take();
                self.load_summary().await?;
                Ok(GateOutcome::Done(()))
            }
            Err(e) => Err(self.fail("cancel the booking", e).await),
        }
    }

    /// Pays for the current booking and moves to the thank-you page.
    pub async fn checkout(&self, contact: &ContactInfo) -> PortResult<GateOutcome<OrderReceipt>> {
        let Some(credential) = self.gate.guard().await else {
            return Ok(GateOutcome::Intercepted);
        };

        let contact = contact.validate().inspect_err(|e| {
            self.sink.show_alert(&e.user_message());
        })?;

        let Some(booking) = self.current.lock().await.clone() else {
            let e = PortError::Validation("There is no booking to pay for".to_string());
            self.sink.show_alert(&e.user_message());
            return Err(e);
        };

        let prime = match self.tokenizer.get_prime().await {
            Ok(prime) => prime,
            Err(e) => {
                error!("Card tokenization failed: {:?}", e);
                self.sink.show_alert("Please check the card details");
                return Err(e);
            }
        };

        match self
            .gateway
            .create_order(&credential, &prime, &booking, &contact)
            .await
        {
            Ok(receipt) => {
                info!(order = %receipt.number, "Order placed.");
                self.current.lock().await.take();
                self.sink
                    .navigate(&format!("/thankyou?number={}", receipt.number));
                Ok(GateOutcome::Done(receipt))
            }
            Err(e) => Err(self.fail("place the order", e).await),
        }
    }

    async fn fail(&self, action: &str, e: PortError) -> PortError {
        error!("Failed to {}: {:?}", action, e);
        if e == PortError::Unauthorized {
            self.gate.reject().await;
        } else {
            self.sink.show_alert(&e.user_message());
        }
        e
    }
}

/// Reads the order number from the thank-you page's query string.
pub fn order_number_from_query(query: &str) -> Option<String> {
    url::form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
        .find(|(key, _)| key == "number")
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
