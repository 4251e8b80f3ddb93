//! services/client/src/adapters/http.rs
//!
//! This module contains the adapter for the booking site's REST backend.
//! It implements the `BackendGateway` port from the `core` crate.

use async_trait::async_trait;
use day_trip_core::{
    domain::{
        AttractionDetail, Booking, BookingDraft, ContactInfo, Credential, Cursor, ListingPage,
        OrderReceipt, User,
    },
    ports::{BackendGateway, PortError, PortResult},
};
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::adapters::wire::{self, BookingRequest, ContactRecord, LoginRequest, OrderRequest, SignupRequest};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `BackendGateway` over HTTP.
///
/// Authenticated calls always carry `Authorization: Bearer <token>`.
#[derive(Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: String,
}

impl HttpGateway {
    /// Creates a new `HttpGateway` rooted at `base_url`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sends the request and returns the checked JSON body.
    async fn send(&self, request: RequestBuilder) -> PortResult<Value> {
        let response = request
            .send()
            .await
            .map_err(|e: reqwest::Error| PortError::Network(e.to_string()))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e: reqwest::Error| PortError::Network(e.to_string()))?;
        debug!(%status, bytes = body.len(), "Backend responded.");
        wire::check(status, &body)
    }
}

//=========================================================================================
// `BackendGateway` Trait Implementation
//=========================================================================================

#[async_trait]
impl BackendGateway for HttpGateway {
    async fn list_attractions(&self, keyword: &str, cursor: Cursor) -> PortResult<ListingPage> {
        let mut query: Vec<(&str, String)> = vec![("page", cursor.to_string())];
        if !keyword.is_empty() {
            query.push(("keyword", keyword.to_string()));
        }
        let request = self.client.get(self.url("/api/attractions")).query(&query);
        wire::listing_page(self.send(request).await?)
    }

    async fn list_stations(&self) -> PortResult<Vec<String>> {
        let request = self.client.get(self.url("/api/mrts"));
        wire::stations(self.send(request).await?)
    }

    async fn attraction(&self, id: u64) -> PortResult<AttractionDetail> {
        let request = self.client.get(self.url(&format!("/api/attractions/{}", id)));
        wire::attraction(self.send(request).await?)
    }

    async fn current_user(&self, credential: &Credential) -> PortResult<User> {
        let request = self
            .client
            .get(self.url("/api/user/auth"))
            .bearer_auth(credential.as_str());
        wire::user(self.send(request).await?)
    }

    async fn login(&self, email: &str, password: &str) -> PortResult<Credential> {
        let request = self
            .client
            .put(self.url("/api/user/auth"))
            .json(&LoginRequest { email, password });
        // A wrong password is a refusal, not a rejected credential.
        match self.send(request).await {
            Err(PortError::Unauthorized) => Err(PortError::Rejected(
                "Wrong email or password".to_string(),
            )),
            other => wire::token(other?),
        }
    }

    async fn logout(&self, credential: &Credential) -> PortResult<()> {
        let request = self
            .client
            .delete(self.url("/api/user/auth"))
            .bearer_auth(credential.as_str());
        self.send(request).await.map(|_| ())
    }

    async fn signup(&self, name: &str, email: &str, password: &str) -> PortResult<()> {
        let request = self.client.post(self.url("/api/user")).json(&SignupRequest {
            name,
            email,
            password,
        });
        wire::ok(self.send(request).await?, "signup")
    }

    async fn current_booking(&self, credential: &Credential) -> PortResult<Option<Booking>> {
        let request = self
            .client
            .get(self.url("/api/booking"))
            .bearer_auth(credential.as_str());
        wire::booking(self.send(request).await?)
    }

    async fn create_booking(
        &self,
        credential: &Credential,
        draft: &BookingDraft,
    ) -> PortResult<()> {
        let request = self
            .client
            .post(self.url("/api/booking"))
            .bearer_auth(credential.as_str())
            .json(&BookingRequest::from(draft));
        wire::ok(self.send(request).await?, "booking")
    }

    async fn cancel_booking(&self, credential: &Credential) -> PortResult<()> {
        let request = self
            .client
            .delete(self.url("/api/booking"))
            .bearer_auth(credential.as_str());
        wire::ok(self.send(request).await?, "booking")
    }

    async fn create_order(
        &self,
        credential: &Credential,
        prime: &str,
        booking: &Booking,
        contact: &ContactInfo,
    ) -> PortResult<OrderReceipt> {
        let contact = ContactRecord::from(contact);
        let request = self
            .client
            .post(self.url("/api/orders"))
            .bearer_auth(credential.as_str())
            .json(&OrderRequest::new(prime, booking, &contact));
        wire::order(self.send(request).await?)
    }
}
