//! services/client/src/adapters/wire.rs
//!
//! The backend's JSON envelopes and the conversions between them and the
//! core domain. Nothing here performs I/O.

use chrono::NaiveDate;
use day_trip_core::domain::{
    AttractionDetail, AttractionSummary, BookedAttraction, Booking, BookingDraft, ContactInfo,
    Credential, ListingPage, OrderReceipt, TimeSlot, User,
};
use day_trip_core::ports::{PortError, PortResult};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

//=========================================================================================
// Envelope Checking
//=========================================================================================

/// Maps a raw response to its JSON body, or to the failure it reports.
///
/// The backend signals errors either with a non-2xx status or with
/// `{"error": true, "message": ...}` on a 200.
pub fn check(status: StatusCode, body: &[u8]) -> PortResult<Value> {
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(PortError::Unauthorized);
    }

    let value: Value = serde_json::from_slice(body).map_err(|e| {
        PortError::MalformedResponse(format!("status {} with non-JSON body: {}", status, e))
    })?;

    let flagged = value.get("error").and_then(Value::as_bool).unwrap_or(false);
    if flagged || !status.is_success() {
        let message = value
            .get("message")
            .or_else(|| value.get("detail"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("Request failed with status {}", status));
        if status == StatusCode::NOT_FOUND {
            return Err(PortError::NotFound(message));
        }
        if status.is_server_error() {
            return Err(PortError::Unexpected(message));
        }
        return Err(PortError::Rejected(message));
    }

    Ok(value)
}

fn decode<T: DeserializeOwned>(value: Value, what: &str) -> PortResult<T> {
    serde_json::from_value(value)
        .map_err(|e| PortError::MalformedResponse(format!("{}: {}", what, e)))
}

/// Reads `{"data": ...}`, which must be present (it may be null).
fn data_field(mut value: Value, what: &str) -> PortResult<Value> {
    value
        .get_mut("data")
        .map(Value::take)
        .ok_or_else(|| PortError::MalformedResponse(format!("{}: missing `data`", what)))
}

//=========================================================================================
// Attractions
//=========================================================================================

#[derive(Deserialize)]
struct AttractionRecord {
    id: u64,
    name: String,
    category: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    address: String,
    #[serde(default)]
    transport: String,
    mrt: Option<String>,
    #[serde(default)]
    images: Vec<String>,
}

impl AttractionRecord {
    fn into_summary(self) -> AttractionSummary {
        AttractionSummary {
            id: self.id,
            name: self.name,
            category: self.category,
            mrt: self.mrt.filter(|m| !m.is_empty()),
            thumbnail: self.images.into_iter().next(),
        }
    }

    fn into_detail(self) -> AttractionDetail {
        AttractionDetail {
            id: self.id,
            name: self.name,
            category: self.category,
            description: self.description,
            address: self.address,
            transport: self.transport,
            mrt: self.mrt.filter(|m| !m.is_empty()),
            images: self.images,
        }
    }
}

pub fn listing_page(value: Value) -> PortResult<ListingPage> {
    // `nextPage` must be present; null is the exhaustion marker.
    let next_cursor = match value.get("nextPage") {
        None => {
            return Err(PortError::MalformedResponse(
                "attractions: missing `nextPage`".to_string(),
            ))
        }
        Some(Value::Null) => None,
        Some(raw) => Some(decode::<u32>(raw.clone(), "attractions.nextPage")?),
    };
    let records: Vec<AttractionRecord> =
        decode(data_field(value, "attractions")?, "attractions.data")?;
    Ok(ListingPage {
        items: records.into_iter().map(AttractionRecord::into_summary).collect(),
        next_cursor,
    })
}

pub fn attraction(value: Value) -> PortResult<AttractionDetail> {
    let record: AttractionRecord = decode(data_field(value, "attraction")?, "attraction.data")?;
    Ok(record.into_detail())
}

pub fn stations(value: Value) -> PortResult<Vec<String>> {
    decode(data_field(value, "mrts")?, "mrts.data")
}

//=========================================================================================
// Auth
//=========================================================================================

#[derive(Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Serialize)]
pub struct SignupRequest<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Deserialize)]
struct UserRecord {
    id: u64,
    name: String,
    #[serde(default)]
    email: String,
}

/// `{"data": null}` means the credential was not accepted.
pub fn user(value: Value) -> PortResult<User> {
    let data = data_field(value, "user")?;
    if data.is_null() {
        return Err(PortError::Unauthorized);
    }
    let record: UserRecord = decode(data, "user.data")?;
    Ok(User {
        id: record.id,
        name: record.name,
        email: record.email,
    })
}

#[derive(Deserialize)]
struct TokenRecord {
    token: String,
}

pub fn token(value: Value) -> PortResult<Credential> {
    let record: TokenRecord = decode(data_field(value, "login")?, "login.data")?;
    if record.token.is_empty() {
        return Err(PortError::MalformedResponse("login: empty token".to_string()));
    }
    Ok(Credential::new(record.token))
}

/// Reads `{"ok": true}`. Anything else is a refusal.
pub fn ok(value: Value, what: &str) -> PortResult<()> {
    match value.get("ok").and_then(Value::as_bool) {
        Some(true) => Ok(()),
        Some(false) => Err(PortError::Rejected(
            value
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("Request was not accepted")
                .to_string(),
        )),
        None => Err(PortError::MalformedResponse(format!("{}: missing `ok`", what))),
    }
}

//=========================================================================================
// Booking and Orders
//=========================================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    attraction_id: u64,
    date: String,
    time: &'static str,
    price: u32,
}

impl From<&BookingDraft> for BookingRequest {
    fn from(draft: &BookingDraft) -> Self {
        Self {
            attraction_id: draft.attraction_id,
            date: draft.date.format("%Y-%m-%d").to_string(),
            time: draft.time_slot.as_str(),
            price: draft.price,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct BookedAttractionRecord {
    id: u64,
    name: String,
    address: String,
    image: String,
}

#[derive(Deserialize)]
struct BookingRecord {
    attraction: BookedAttractionRecord,
    date: String,
    time: String,
    price: u32,
}

impl BookingRecord {
    fn into_domain(self) -> PortResult<Booking> {
        let date = NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").map_err(|e| {
            PortError::MalformedResponse(format!("booking.date '{}': {}", self.date, e))
        })?;
        let time_slot = TimeSlot::parse(&self.time).ok_or_else(|| {
            PortError::MalformedResponse(format!("booking.time '{}'", self.time))
        })?;
        Ok(Booking {
            attraction: BookedAttraction {
                id: self.attraction.id,
                name: self.attraction.name,
                address: self.attraction.address,
                image: self.attraction.image,
            },
            date,
            time_slot,
            price: self.price,
        })
    }
}

/// `{"data": null}` means there is no current booking.
pub fn booking(value: Value) -> PortResult<Option<Booking>> {
    let data = data_field(value, "booking")?;
    if data.is_null() {
        return Ok(None);
    }
    let record: BookingRecord = decode(data, "booking.data")?;
    record.into_domain().map(Some)
}

#[derive(Serialize)]
pub struct OrderRequest<'a> {
    prime: &'a str,
    order: OrderDetail<'a>,
}

#[derive(Serialize)]
struct OrderDetail<'a> {
    price: u32,
    trip: Trip,
    contact: &'a ContactRecord,
}

#[derive(Serialize)]
struct Trip {
    attraction: BookedAttractionRecord,
    date: String,
    time: &'static str,
}

#[derive(Serialize)]
pub struct ContactRecord {
    name: String,
    email: String,
    phone: String,
}

impl From<&ContactInfo> for ContactRecord {
    fn from(contact: &ContactInfo) -> Self {
        Self {
            name: contact.name.clone(),
            email: contact.email.clone(),
            phone: contact.phone.clone(),
        }
    }
}

impl<'a> OrderRequest<'a> {
    pub fn new(prime: &'a str, booking: &Booking, contact: &'a ContactRecord) -> Self {
        Self {
            prime,
            order: OrderDetail {
                price: booking.price,
                trip: Trip {
                    attraction: BookedAttractionRecord {
                        id: booking.attraction.id,
                        name: booking.attraction.name.clone(),
                        address: booking.attraction.address.clone(),
                        image: booking.attraction.image.clone(),
                    },
                    date: booking.date.format("%Y-%m-%d").to_string(),
                    time: booking.time_slot.as_str(),
                },
                contact,
            },
        }
    }
}

#[derive(Deserialize)]
struct OrderRecord {
    number: String,
}

pub fn order(value: Value) -> PortResult<OrderReceipt> {
    let record: OrderRecord = decode(data_field(value, "order")?, "order.data")?;
    Ok(OrderReceipt {
        number: record.number,
    })
}
