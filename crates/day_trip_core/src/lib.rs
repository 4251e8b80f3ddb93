pub mod booking;
pub mod domain;
pub mod listing;
pub mod ports;
pub mod render;
pub mod scroll;
pub mod session;

#[cfg(test)]
mod testing;

pub use booking::{order_number_from_query, BookingDesk, BookingForm, GateOutcome};
pub use domain::{
    AttractionDetail, AttractionSummary, BookedAttraction, Booking, BookingDraft, ContactInfo,
    Credential, Cursor, ListingPage, OrderReceipt, TimeSlot, User, INITIAL_CURSOR,
};
pub use listing::{ListingQueryEngine, ListingSnapshot, LoadOutcome};
pub use ports::{
    BackendGateway, CardTokenizer, CredentialStore, PortError, PortResult, RenderSink,
};
pub use render::{Carousel, HeaderControl, LoginForm, ViewNode};
pub use scroll::{ScrollMetrics, ScrollTrigger, SCROLL_THRESHOLD};
pub use session::{SessionGate, SessionState};
