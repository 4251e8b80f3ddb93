//! services/client/src/protocol.rs
//!
//! Defines the JSON-lines protocol between the host page and the client:
//! page events come in on stdin, view updates go out on stdout.

use day_trip_core::{render::ViewNode, HeaderControl, LoginForm, ScrollMetrics};
use serde::{Deserialize, Serialize};

//=========================================================================================
// Events Sent FROM the Host Page TO the Client
//=========================================================================================

/// Represents the user interactions the host page reports.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PageEvent {
    // --- Listing page ---
    Search { keyword: String },
    SelectStation { station: String },
    Scroll(ScrollMetrics),

    // --- Detail page ---
    OpenAttraction { id: u64 },
    NextImage,
    PrevImage,
    SelectImage { index: usize },
    /// `morning` or `afternoon`.
    SelectSlot { time_slot: String },
    Book { date: String },

    // --- Booking and thank-you pages ---
    OpenBookingPage,
    LoadBooking,
    CancelBooking,
    Checkout {
        name: String,
        email: String,
        phone: String,
    },
    ShowThankYou { query: String },

    // --- Header and login prompt ---
    LoginClicked,
    CloseLoginPrompt,
    Login { email: String, password: String },
    Signup {
        name: String,
        email: String,
        password: String,
    },
    Logout,
}

//=========================================================================================
// Updates Sent FROM the Client TO the Host Page
//=========================================================================================

/// Represents the view changes the host page should apply.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PageUpdate {
    ReplaceListing { cards: Vec<ViewNode> },
    AppendListing { cards: Vec<ViewNode> },
    Stations { view: ViewNode },
    Header { control: HeaderControl, view: ViewNode },
    LoginPrompt { open: bool },
    FormMessage { form: LoginForm, message: String },
    Alert { message: String },
    View { view: ViewNode },
    Navigate { location: String },
}
