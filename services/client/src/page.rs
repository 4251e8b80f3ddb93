//! services/client/src/page.rs
//!
//! The main control loop of the client. It owns the core components for one
//! page session and routes every `PageEvent` to them.

use day_trip_core::{
    booking::{order_number_from_query, BookingDesk, BookingForm},
    domain::{AttractionDetail, ContactInfo, TimeSlot},
    listing::ListingQueryEngine,
    ports::{BackendGateway, CardTokenizer, CredentialStore, PortError, PortResult, RenderSink},
    render::{self, Carousel},
    scroll::ScrollTrigger,
    session::SessionGate,
};
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use tokio::io::AsyncRead;
use tokio::sync::Mutex;
use tokio_util::codec::{FramedRead, LinesCodec};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::error::ClientError;
use crate::protocol::PageEvent;

/// Longest accepted event line, in bytes.
const MAX_EVENT_LINE: usize = 64 * 1024;

/// The attraction currently open on the detail page.
struct DetailState {
    detail: AttractionDetail,
    carousel: Carousel,
    slot: TimeSlot,
}

pub struct Page {
    gateway: Arc<dyn BackendGateway>,
    sink: Arc<dyn RenderSink>,
    listing: Arc<ListingQueryEngine>,
    scroll: ScrollTrigger,
    session: Arc<SessionGate>,
    desk: BookingDesk,
    detail: Mutex<Option<DetailState>>,
}

impl Page {
    pub fn new(
        gateway: Arc<dyn BackendGateway>,
        store: Arc<dyn CredentialStore>,
        tokenizer: Arc<dyn CardTokenizer>,
        sink: Arc<dyn RenderSink>,
    ) -> Self {
        let listing = Arc::new(ListingQueryEngine::new(gateway.clone(), sink.clone()));
        let session = Arc::new(SessionGate::new(gateway.clone(), store, sink.clone()));
        let desk = BookingDesk::new(gateway.clone(), session.clone(), tokenizer, sink.clone());
        Self {
            gateway,
            sink,
            scroll: ScrollTrigger::new(listing.clone()),
            listing,
            session,
            desk,
            detail: Mutex::new(None),
        }
    }

    /// Page load: restore the session, then fill the station bar and the first listing page.
    pub async fn load(&self) {
        let state = self.session.restore().await;
        debug!(?state, "Session state after restore.");
        // Failures are already logged and surfaced by the engine.
        let _ = self.listing.stations().await;
        let _ = self.listing.search("").await;
    }

    /// Reads events line by line until the input closes or `cancel` fires.
    ///
    /// Handlers run concurrently on this task, so a slow fetch never blocks
    /// later events.
    pub async fn run<R>(&self, input: R, cancel: CancellationToken) -> Result<(), ClientError>
    where
        R: AsyncRead + Unpin,
    {
        let mut lines = FramedRead::new(input, LinesCodec::new_with_max_length(MAX_EVENT_LINE));
        let mut pending = FuturesUnordered::new();

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Shutdown requested; abandoning {} pending handlers.", pending.len());
                    return Ok(());
                }
                Some(result) = pending.next(), if !pending.is_empty() => {
                    if let Err(e) = result {
                        debug!("Event handler finished with error: {:?}", e);
                    }
                }
                next = lines.next() => match next {
                    Some(Ok(line)) => {
                        if line.trim().is_empty() {
                            continue;
                        }
                        match serde_json::from_str::<PageEvent>(&line) {
                            Ok(event) => pending.push(self.handle(event)),
                            Err(e) => warn!("Ignoring malformed page event: {}", e),
                        }
                    }
                    Some(Err(e)) => {
                        error!("Failed to read page events: {:?}", e);
                        return Err(ClientError::Internal(e.to_string()));
                    }
                    None => break,
                },
            }
        }

        info!("Event input closed.");
        while let Some(result) = pending.next().await {
            if let Err(e) = result {
                debug!("Event handler finished with error: {:?}", e);
            }
        }
        Ok(())
    }

    pub async fn handle(&self, event: PageEvent) -> PortResult<()> {
        debug!(?event, "Handling page event.");
        match event {
            PageEvent::Search { keyword } => self.listing.search(&keyword).await.map(drop),
            PageEvent::SelectStation { station } => {
                self.listing.search_by_station(&station).await.map(drop)
            }
            PageEvent::Scroll(metrics) => self.scroll.on_scroll(metrics).await.map(drop),

            PageEvent::OpenAttraction { id } => self.open_attraction(id).await,
            PageEvent::NextImage => self.update_detail(|d| d.carousel.next()).await,
            PageEvent::PrevImage => self.update_detail(|d| d.carousel.prev()).await,
            PageEvent::SelectImage { index } => {
                self.update_detail(|d| {
                    d.carousel.select(index);
                })
                .await
            }
            PageEvent::SelectSlot { time_slot } => match TimeSlot::parse(&time_slot) {
                Some(slot) => self.update_detail(|d| d.slot = slot).await,
                None => {
                    warn!("Unknown time slot '{}'.", time_slot);
                    Err(PortError::Validation("Please choose a time slot".to_string()))
                }
            },
            PageEvent::Book { date } => self.book(date).await,

            PageEvent::OpenBookingPage => {
                self.desk.open_booking_page().await;
                Ok(())
            }
            PageEvent::LoadBooking => self.desk.load_summary().await.map(drop),
            PageEvent::CancelBooking => self.desk.cancel().await.map(drop),
            PageEvent::Checkout { name, email, phone } => self
                .desk
                .checkout(&ContactInfo { name, email, phone })
                .await
                .map(drop),
            PageEvent::ShowThankYou { query } => {
                let number = order_number_from_query(&query);
                self.sink.show_view(render::thank_you(number.as_deref()));
                Ok(())
            }

            PageEvent::LoginClicked => {
                self.sink.open_login_prompt();
                Ok(())
            }
            PageEvent::CloseLoginPrompt => {
                self.sink.close_login_prompt();
                Ok(())
            }
            PageEvent::Login { email, password } => self.session.login(&email, &password).await,
            PageEvent::Signup {
                name,
                email,
                password,
            } => self.session.signup(&name, &email, &password).await,
            PageEvent::Logout => {
                self.session.logout().await;
                Ok(())
            }
        }
    }

    async fn open_attraction(&self, id: u64) -> PortResult<()> {
        match self.gateway.attraction(id).await {
            Ok(detail) => {
                let state = DetailState {
                    carousel: Carousel::new(detail.images.len()),
                    slot: TimeSlot::Morning,
                    detail,
                };
                self.sink.show_view(render::attraction_detail(
                    &state.detail,
                    &state.carousel,
                    state.slot,
                ));
                *self.detail.lock().await = Some(state);
                Ok(())
            }
            Err(e) => {
                error!("Failed to load attraction {}: {:?}", id, e);
                self.sink.show_alert(&e.user_message());
                Err(e)
            }
        }
    }

    async fn update_detail(&self, change: impl FnOnce(&mut DetailState)) -> PortResult<()> {
        let mut detail = self.detail.lock().await;
        let Some(state) = detail.as_mut() else {
            warn!("Detail event received with no attraction open.");
            return Err(PortError::Validation("No attraction is open".to_string()));
        };
        change(state);
        self.sink.show_view(render::attraction_detail(
            &state.detail,
            &state.carousel,
            state.slot,
        ));
        Ok(())
    }

    async fn book(&self, date: String) -> PortResult<()> {
        let form = {
            let detail = self.detail.lock().await;
            let Some(state) = detail.as_ref() else {
                warn!("Booking requested with no attraction open.");
                return Err(PortError::Validation("No attraction is open".to_string()));
            };
            BookingForm {
                attraction_id: state.detail.id,
                date,
                time_slot: state.slot.as_str().to_string(),
            }
        };
        self.desk.submit(&form).await.map(drop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{FileCredentialStore, StaticPrimeTokenizer};
    use crate::protocol::PageUpdate;
    use crate::sink::JsonLinesSink;
    use async_trait::async_trait;
    use day_trip_core::domain::{
        AttractionSummary, Booking, BookingDraft, Credential, Cursor, ListingPage, OrderReceipt,
        User,
    };
    use day_trip_core::HeaderControl;
    use std::collections::VecDeque;
    use std::sync::Mutex as StdMutex;
    use tokio::sync::mpsc;

    #[derive(Default)]
    struct StubGateway {
        pages: StdMutex<VecDeque<ListingPage>>,
        listing_calls: StdMutex<Vec<(String, Cursor)>>,
        bookings: StdMutex<usize>,
    }

    fn summary(id: u64) -> AttractionSummary {
        AttractionSummary {
            id,
            name: format!("Spot {}", id),
            category: "Sights".to_string(),
            mrt: None,
            thumbnail: None,
        }
    }

    #[async_trait]
    impl BackendGateway for StubGateway {
        async fn list_attractions(&self, keyword: &str, cursor: Cursor) -> PortResult<ListingPage> {
            self.listing_calls
                .lock()
                .unwrap()
                .push((keyword.to_string(), cursor));
            Ok(self.pages.lock().unwrap().pop_front().unwrap_or_default())
        }
        async fn list_stations(&self) -> PortResult<Vec<String>> {
            Ok(vec!["Zhongshan".to_string()])
        }
        async fn attraction(&self, id: u64) -> PortResult<AttractionDetail> {
            Ok(AttractionDetail {
                id,
                name: "Spot".to_string(),
                category: "Sights".to_string(),
                description: String::new(),
                address: String::new(),
                transport: String::new(),
                mrt: None,
                images: vec!["a.jpg".to_string(), "b.jpg".to_string()],
            })
        }
        async fn current_user(&self, _credential: &Credential) -> PortResult<User> {
            Err(PortError::Unauthorized)
        }
        async fn login(&self, _email: &str, _password: &str) -> PortResult<Credential> {
            Ok(Credential::new("fresh"))
        }
        async fn logout(&self, _credential: &Credential) -> PortResult<()> {
            Ok(())
        }
        async fn signup(&self, _name: &str, _email: &str, _password: &str) -> PortResult<()> {
            Ok(())
        }
        async fn current_booking(&self, _credential: &Credential) -> PortResult<Option<Booking>> {
            Ok(None)
        }
        async fn create_booking(
            &self,
            _credential: &Credential,
            _draft: &BookingDraft,
        ) -> PortResult<()> {
            *self.bookings.lock().unwrap() += 1;
            Ok(())
        }
        async fn cancel_booking(&self, _credential: &Credential) -> PortResult<()> {
            Ok(())
        }
        async fn create_order(
            &self,
            _credential: &Credential,
            _prime: &str,
            _booking: &Booking,
            _contact: &ContactInfo,
        ) -> PortResult<OrderReceipt> {
            Err(PortError::Unexpected("not used".to_string()))
        }
    }

    struct Harness {
        gateway: Arc<StubGateway>,
        page: Page,
        updates: mpsc::UnboundedReceiver<PageUpdate>,
        _dir: tempfile::TempDir,
    }

    fn harness(pages: Vec<ListingPage>) -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let gateway = Arc::new(StubGateway {
            pages: StdMutex::new(pages.into()),
            ..Default::default()
        });
        let (tx, updates) = mpsc::unbounded_channel();
        let page = Page::new(
            gateway.clone(),
            Arc::new(FileCredentialStore::new(dir.path().join("storage.json"))),
            Arc::new(StaticPrimeTokenizer::new("prime".to_string())),
            Arc::new(JsonLinesSink::new(tx)),
        );
        Harness {
            gateway,
            page,
            updates,
            _dir: dir,
        }
    }

    fn drain(updates: &mut mpsc::UnboundedReceiver<PageUpdate>) -> Vec<PageUpdate> {
        let mut out = Vec::new();
        while let Ok(update) = updates.try_recv() {
            out.push(update);
        }
        out
    }

    #[tokio::test]
    async fn page_load_sets_header_stations_and_first_page() {
        let mut h = harness(vec![ListingPage {
            items: vec![summary(1), summary(2)],
            next_cursor: Some(1),
        }]);

        h.page.load().await;

        let updates = drain(&mut h.updates);
        assert!(matches!(
            updates[0],
            PageUpdate::Header {
                control: HeaderControl::Login,
                ..
            }
        ));
        assert!(matches!(updates[1], PageUpdate::Stations { .. }));
        assert!(matches!(&updates[2], PageUpdate::ReplaceListing { cards } if cards.len() == 2));
    }

    #[tokio::test]
    async fn event_stream_drives_listing_and_ignores_garbage() {
        let mut h = harness(vec![
            ListingPage {
                items: vec![summary(1)],
                next_cursor: Some(1),
            },
            ListingPage {
                items: vec![summary(2)],
                next_cursor: None,
            },
        ]);
        let input = concat!(
            "{\"type\":\"search\",\"keyword\":\"\"}\n",
            "not an event\n",
            "\n",
        );

        h.page
            .run(input.as_bytes(), CancellationToken::new())
            .await
            .unwrap();
        let scroll = concat!(
            "{\"type\":\"scroll\",\"scroll_top\":1200,\"viewport_height\":800,\"document_height\":2000}\n",
            "{\"type\":\"scroll\",\"scroll_top\":1200,\"viewport_height\":800,\"document_height\":2000}\n",
        );
        h.page
            .run(scroll.as_bytes(), CancellationToken::new())
            .await
            .unwrap();

        let calls = h.gateway.listing_calls.lock().unwrap().clone();
        assert_eq!(calls, vec![(String::new(), 0), (String::new(), 1)]);

        let appended: Vec<_> = drain(&mut h.updates)
            .into_iter()
            .filter(|u| matches!(u, PageUpdate::AppendListing { .. }))
            .collect();
        assert_eq!(appended.len(), 1);
    }

    #[tokio::test]
    async fn cancelled_run_returns_promptly() {
        let h = harness(Vec::new());
        let (_keep_open, reader) = tokio::io::duplex(64);
        let cancel = CancellationToken::new();
        cancel.cancel();

        h.page.run(reader, cancel).await.unwrap();
    }

    #[tokio::test]
    async fn detail_events_rerender_and_anonymous_booking_prompts() {
        let mut h = harness(Vec::new());
        h.page.load().await;
        drain(&mut h.updates);

        h.page.handle(PageEvent::OpenAttraction { id: 4 }).await.unwrap();
        h.page.handle(PageEvent::NextImage).await.unwrap();
        h.page
            .handle(PageEvent::SelectSlot {
                time_slot: "afternoon".to_string(),
            })
            .await
            .unwrap();

        let updates = drain(&mut h.updates);
        let PageUpdate::View { view } = updates.last().unwrap() else {
            panic!("expected a view update");
        };
        let slideshow = view.find_class("slideshow").unwrap();
        assert_eq!(slideshow.children[0].attributes["src"], "b.jpg");
        let price = view
            .children
            .iter()
            .find(|c| c.attributes.get("id").map(String::as_str) == Some("price"))
            .unwrap();
        assert_eq!(price.text.as_deref(), Some("2500"));

        h.page
            .handle(PageEvent::Book {
                date: "2026-11-20".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(
            drain(&mut h.updates),
            vec![PageUpdate::LoginPrompt { open: true }]
        );
        assert_eq!(*h.gateway.bookings.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn login_then_booking_goes_through() {
        let mut h = harness(Vec::new());
        h.page.load().await;
        h.page.handle(PageEvent::OpenAttraction { id: 4 }).await.unwrap();
        drain(&mut h.updates);

        h.page
            .handle(PageEvent::Login {
                email: "mei@example.com".to_string(),
                password: "pw".to_string(),
            })
            .await
            .unwrap();
        h.page
            .handle(PageEvent::Book {
                date: "2026-11-20".to_string(),
            })
            .await
            .unwrap();

        let updates = drain(&mut h.updates);
        assert!(updates.contains(&PageUpdate::LoginPrompt { open: false }));
        assert_eq!(
            updates.last(),
            Some(&PageUpdate::Navigate {
                location: "/booking".to_string()
            })
        );
        assert_eq!(*h.gateway.bookings.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn thank_you_page_reads_order_number() {
        let mut h = harness(Vec::new());

        h.page
            .handle(PageEvent::ShowThankYou {
                query: "?number=20261019000001".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(
            drain(&mut h.updates),
            vec![PageUpdate::View {
                view: render::thank_you(Some("20261019000001"))
            }]
        );
    }
}
