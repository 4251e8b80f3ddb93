//! In-memory fakes of the ports, shared by the unit tests of every module.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use crate::domain::{
    AttractionDetail, AttractionSummary, BookedAttraction, Booking, BookingDraft, ContactInfo,
    Credential, Cursor, ListingPage, OrderReceipt, TimeSlot, User,
};
use crate::ports::{
    BackendGateway, CardTokenizer, CredentialStore, PortError, PortResult, RenderSink,
};
use crate::render::{HeaderControl, LoginForm, ViewNode};

pub const VALID_TOKEN: &str = "token-ok";
pub const GOOD_PASSWORD: &str = "correct horse";

pub fn attraction(id: u64) -> AttractionSummary {
    AttractionSummary {
        id,
        name: format!("Attraction {}", id),
        category: "Sights".to_string(),
        mrt: Some("Zhongshan".to_string()),
        thumbnail: Some(format!("{}.jpg", id)),
    }
}

pub fn page(ids: &[u64], next_cursor: Option<Cursor>) -> ListingPage {
    ListingPage {
        items: ids.iter().copied().map(attraction).collect(),
        next_cursor,
    }
}

pub fn booking() -> Booking {
    Booking {
        attraction: BookedAttraction {
            id: 10,
            name: "Attraction 10".to_string(),
            address: "No. 1, Section 1".to_string(),
            image: "10.jpg".to_string(),
        },
        date: chrono::NaiveDate::from_ymd_opt(2026, 11, 20).unwrap(),
        time_slot: TimeSlot::Afternoon,
        price: 2500,
    }
}

//=========================================================================================
// Backend Gateway
//=========================================================================================

#[derive(Default)]
pub struct FakeGateway {
    pub listing_responses: Mutex<VecDeque<PortResult<ListingPage>>>,
    pub listing_calls: Mutex<Vec<(String, Cursor)>>,
    /// When set, listing calls park on `release` after signalling `entered`.
    pub hold: Option<(Arc<Notify>, Arc<Notify>)>,
    /// Number of listing calls that pass before `hold` applies.
    pub hold_after: usize,
    pub stations: Mutex<Option<PortResult<Vec<String>>>>,
    pub auth_failure: Mutex<Option<PortError>>,
    pub booking: Mutex<Option<Booking>>,
    pub booking_failure: Mutex<Option<PortError>>,
    pub calls: Mutex<Vec<&'static str>>,
    pub drafts: Mutex<Vec<BookingDraft>>,
    pub primes: Mutex<Vec<String>>,
}

impl FakeGateway {
    pub fn with_pages(pages: Vec<PortResult<ListingPage>>) -> Self {
        Self {
            listing_responses: Mutex::new(pages.into()),
            ..Default::default()
        }
    }

    /// A gateway whose listing calls block until `release` is notified.
    pub fn holding(
        pages: Vec<PortResult<ListingPage>>,
        entered: Arc<Notify>,
        release: Arc<Notify>,
    ) -> Self {
        Self {
            listing_responses: Mutex::new(pages.into()),
            hold: Some((entered, release)),
            ..Default::default()
        }
    }

    pub fn hold_after(mut self, calls: usize) -> Self {
        self.hold_after = calls;
        self
    }

    pub fn listing_call_count(&self) -> usize {
        self.listing_calls.lock().unwrap().len()
    }

    pub fn calls_to(&self, name: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| **c == name).count()
    }

    fn record(&self, name: &'static str) {
        self.calls.lock().unwrap().push(name);
    }

    fn check(&self, credential: &Credential) -> PortResult<()> {
        if credential.as_str() == VALID_TOKEN {
            Ok(())
        } else {
            Err(PortError::Unauthorized)
        }
    }
}

#[async_trait]
impl BackendGateway for FakeGateway {
    async fn list_attractions(&self, keyword: &str, cursor: Cursor) -> PortResult<ListingPage> {
        let call_index = {
            let mut calls = self.listing_calls.lock().unwrap();
            calls.push((keyword.to_string(), cursor));
            calls.len() - 1
        };
        let response = self
            .listing_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(ListingPage::default()));
        if let Some((entered, release)) = self.hold.as_ref().filter(|_| call_index >= self.hold_after) {
            // Register as a waiter before announcing, so no release is lost.
            let released = release.notified();
            tokio::pin!(released);
            released.as_mut().enable();
            entered.notify_one();
            released.await;
        }
        response
    }

    async fn list_stations(&self) -> PortResult<Vec<String>> {
        self.record("list_stations");
        self.stations
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Ok(vec!["Zhongshan".to_string(), "Beitou".to_string()]))
    }

    async fn attraction(&self, id: u64) -> PortResult<AttractionDetail> {
        self.record("attraction");
        if id == 0 {
            return Err(PortError::NotFound("Attraction".to_string()));
        }
        Ok(AttractionDetail {
            id,
            name: format!("Attraction {}", id),
            category: "Sights".to_string(),
            description: "A fine place.".to_string(),
            address: "Taipei".to_string(),
            transport: "Walk".to_string(),
            mrt: None,
            images: vec!["a.jpg".to_string(), "b.jpg".to_string()],
        })
    }

    async fn current_user(&self, credential: &Credential) -> PortResult<User> {
        self.record("current_user");
        if let Some(err) = self.auth_failure.lock().unwrap().clone() {
            return Err(err);
        }
        self.check(credential)?;
        Ok(User {
            id: 1,
            name: "Mei".to_string(),
            email: "mei@example.com".to_string(),
        })
    }

    async fn login(&self, _email: &str, password: &str) -> PortResult<Credential> {
        self.record("login");
        if let Some(err) = self.auth_failure.lock().unwrap().clone() {
            return Err(err);
        }
        if password == GOOD_PASSWORD {
            Ok(Credential::new(VALID_TOKEN))
        } else {
            Err(PortError::Rejected("Wrong email or password".to_string()))
        }
    }

    async fn logout(&self, _credential: &Credential) -> PortResult<()> {
        self.record("logout");
        Ok(())
    }

    async fn signup(&self, _name: &str, email: &str, _password: &str) -> PortResult<()> {
        self.record("signup");
        if email == "taken@example.com" {
            Err(PortError::Rejected("Email already registered".to_string()))
        } else {
            Ok(())
        }
    }

    async fn current_booking(&self, credential: &Credential) -> PortResult<Option<Booking>> {
        self.record("current_booking");
        self.check(credential)?;
        Ok(self.booking.lock().unwrap().clone())
    }

    async fn create_booking(
        &self,
        credential: &Credential,
        draft: &BookingDraft,
    ) -> PortResult<()> {
        self.record("create_booking");
        if let Some(err) = self.booking_failure.lock().unwrap().clone() {
            return Err(err);
        }
        self.check(credential)?;
        self.drafts.lock().unwrap().push(draft.clone());
        Ok(())
    }

    async fn cancel_booking(&self, credential: &Credential) -> PortResult<()> {
        self.record("cancel_booking");
        self.check(credential)?;
        self.booking.lock().unwrap().take();
        Ok(())
    }

    async fn create_order(
        &self,
        credential: &Credential,
        prime: &str,
        _booking: &Booking,
        _contact: &ContactInfo,
    ) -> PortResult<OrderReceipt> {
        self.record("create_order");
        self.check(credential)?;
        self.primes.lock().unwrap().push(prime.to_string());
        Ok(OrderReceipt {
            number: "20261019000001".to_string(),
        })
    }
}

//=========================================================================================
// Credential Store, Tokenizer, Render Sink
//=========================================================================================

#[derive(Default)]
pub struct MemoryStore {
    pub credential: Mutex<Option<Credential>>,
}

impl MemoryStore {
    pub fn holding(token: &str) -> Self {
        Self {
            credential: Mutex::new(Some(Credential::new(token))),
        }
    }

    pub fn current(&self) -> Option<Credential> {
        self.credential.lock().unwrap().clone()
    }
}

impl CredentialStore for MemoryStore {
    fn load(&self) -> PortResult<Option<Credential>> {
        Ok(self.current())
    }

    fn save(&self, credential: &Credential) -> PortResult<()> {
        *self.credential.lock().unwrap() = Some(credential.clone());
        Ok(())
    }

    fn clear(&self) -> PortResult<()> {
        self.credential.lock().unwrap().take();
        Ok(())
    }
}

pub struct FixedTokenizer(pub PortResult<String>);

#[async_trait]
impl CardTokenizer for FixedTokenizer {
    async fn get_prime(&self) -> PortResult<String> {
        self.0.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkEvent {
    ReplaceListing(Vec<ViewNode>),
    AppendListing(Vec<ViewNode>),
    Stations(ViewNode),
    Header(HeaderControl),
    OpenLogin,
    CloseLogin,
    FormMessage(LoginForm, String),
    Alert(String),
    View(ViewNode),
    Navigate(String),
}

#[derive(Default)]
pub struct RecordingSink {
    pub events: Mutex<Vec<SinkEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<SinkEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn headers(&self) -> Vec<HeaderControl> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                SinkEvent::Header(h) => Some(h),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, wanted: &SinkEvent) -> usize {
        self.events().iter().filter(|e| *e == wanted).count()
    }

    pub fn navigations(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                SinkEvent::Navigate(to) => Some(to),
                _ => None,
            })
            .collect()
    }

    pub fn alerts(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                SinkEvent::Alert(message) => Some(message),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: SinkEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl RenderSink for RecordingSink {
    fn replace_listing(&self, cards: Vec<ViewNode>) {
        self.push(SinkEvent::ReplaceListing(cards));
    }
    fn append_listing(&self, cards: Vec<ViewNode>) {
        self.push(SinkEvent::AppendListing(cards));
    }
    fn show_stations(&self, view: ViewNode) {
        self.push(SinkEvent::Stations(view));
    }
    fn set_header(&self, control: HeaderControl) {
        self.push(SinkEvent::Header(control));
    }
    fn open_login_prompt(&self) {
        self.push(SinkEvent::OpenLogin);
    }
    fn close_login_prompt(&self) {
        self.push(SinkEvent::CloseLogin);
    }
    fn show_form_message(&self, form: LoginForm, message: &str) {
        self.push(SinkEvent::FormMessage(form, message.to_string()));
    }
    fn show_alert(&self, message: &str) {
        self.push(SinkEvent::Alert(message.to_string()));
    }
    fn show_view(&self, view: ViewNode) {
        self.push(SinkEvent::View(view));
    }
    fn navigate(&self, location: &str) {
        self.push(SinkEvent::Navigate(location.to_string()));
    }
}
