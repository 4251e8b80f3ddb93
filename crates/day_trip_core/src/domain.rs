//! crates/day_trip_core/src/domain.rs
//!
//! Defines the pure, core data structures of the booking client.
//! These structs are independent of the backend's wire format.

use chrono::NaiveDate;
use std::fmt;

/// Opaque pagination token. The backend uses page numbers.
pub type Cursor = u32;

/// The cursor every fresh query starts from.
pub const INITIAL_CURSOR: Cursor = 0;

/// A single attraction as shown on the listing page. Identity is `id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttractionSummary {
    pub id: u64,
    pub name: String,
    pub category: String,
    pub mrt: Option<String>,
    pub thumbnail: Option<String>,
}

/// Everything the detail page needs for one attraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttractionDetail {
    pub id: u64,
    pub name: String,
    pub category: String,
    pub description: String,
    pub address: String,
    pub transport: String,
    pub mrt: Option<String>,
    pub images: Vec<String>,
}

/// One page of listing results. `next_cursor == None` marks exhaustion.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListingPage {
    pub items: Vec<AttractionSummary>,
    pub next_cursor: Option<Cursor>,
}

// The half-day tour slots offered on the detail page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeSlot {
    Morning,
    Afternoon,
}

impl TimeSlot {
    /// Tour price in TWD. Fixed per slot.
    pub fn price(self) -> u32 {
        match self {
            TimeSlot::Morning => 2000,
            TimeSlot::Afternoon => 2500,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TimeSlot::Morning => "morning",
            TimeSlot::Afternoon => "afternoon",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TimeSlot::Morning => "9 AM to 4 PM",
            TimeSlot::Afternoon => "2 PM to 9 PM",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "morning" => Some(TimeSlot::Morning),
            "afternoon" => Some(TimeSlot::Afternoon),
            _ => None,
        }
    }
}

/// A booking as composed on the detail page, before it is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingDraft {
    pub attraction_id: u64,
    pub date: NaiveDate,
    pub time_slot: TimeSlot,
    pub price: u32,
}

impl BookingDraft {
    pub fn new(attraction_id: u64, date: NaiveDate, time_slot: TimeSlot) -> Self {
        Self {
            attraction_id,
            date,
            time_slot,
            price: time_slot.price(),
        }
    }
}

/// The attraction part of a stored booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookedAttraction {
    pub id: u64,
    pub name: String,
    pub address: String,
    pub image: String,
}

/// The user's current booking, as held by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Booking {
    pub attraction: BookedAttraction,
    pub date: NaiveDate,
    pub time_slot: TimeSlot,
    pub price: u32,
}

// Represents the signed-in user - returned by the auth check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
}

/// The bearer token proving an authenticated session.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    // Tokens never reach the logs.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Contact details collected on the booking page before payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactInfo {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Confirmation of a paid order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderReceipt {
    pub number: String,
}
