//! services/client/src/sink.rs
//!
//! A `RenderSink` that turns every view command into a `PageUpdate` and
//! queues it for the stdout writer.

use day_trip_core::{
    ports::RenderSink,
    render::{self, HeaderControl, LoginForm, ViewNode},
};
use tokio::sync::mpsc::UnboundedSender;
use tracing::warn;

use crate::protocol::PageUpdate;

pub struct JsonLinesSink {
    updates: UnboundedSender<PageUpdate>,
}

impl JsonLinesSink {
    pub fn new(updates: UnboundedSender<PageUpdate>) -> Self {
        Self { updates }
    }

    fn emit(&self, update: PageUpdate) {
        if self.updates.send(update).is_err() {
            warn!("Update writer has stopped; dropping page update.");
        }
    }
}

impl RenderSink for JsonLinesSink {
    fn replace_listing(&self, cards: Vec<ViewNode>) {
        self.emit(PageUpdate::ReplaceListing { cards });
    }

    fn append_listing(&self, cards: Vec<ViewNode>) {
        self.emit(PageUpdate::AppendListing { cards });
    }

    fn show_stations(&self, view: ViewNode) {
        self.emit(PageUpdate::Stations { view });
    }

    fn set_header(&self, control: HeaderControl) {
        self.emit(PageUpdate::Header {
            control,
            view: render::header_control(control),
        });
    }

    fn open_login_prompt(&self) {
        self.emit(PageUpdate::LoginPrompt { open: true });
    }

    fn close_login_prompt(&self) {
        self.emit(PageUpdate::LoginPrompt { open: false });
    }

    fn show_form_message(&self, form: LoginForm, message: &str) {
        self.emit(PageUpdate::FormMessage {
            form,
            message: message.to_string(),
        });
    }

    fn show_alert(&self, message: &str) {
        self.emit(PageUpdate::Alert {
            message: message.to_string(),
        });
    }

    fn show_view(&self, view: ViewNode) {
        self.emit(PageUpdate::View { view });
    }

    fn navigate(&self, location: &str) {
        self.emit(PageUpdate::Navigate {
            location: location.to_string(),
        });
    }
}
