//! crates/day_trip_core/src/render.rs
//!
//! Pure view builders. Every function here maps records to a `ViewNode` tree
//! and nothing else: no fetching, no state. The host page decides how a tree
//! becomes pixels.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::domain::{AttractionDetail, AttractionSummary, Booking, TimeSlot};

const DEFAULT_THUMBNAIL: &str = "default.jpg";
const NO_STATION: &str = "none";

//=========================================================================================
// View Tree
//=========================================================================================

/// A headless element tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewNode {
    pub tag: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ViewNode>,
}

impl ViewNode {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            classes: Vec::new(),
            attributes: BTreeMap::new(),
            text: None,
            children: Vec::new(),
        }
    }

    pub fn class(mut self, class: &str) -> Self {
        self.classes.push(class.to_string());
        self
    }

    pub fn attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.attributes.insert(name.to_string(), value.into());
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn child(mut self, child: ViewNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = ViewNode>) -> Self {
        self.children.extend(children);
        self
    }

    /// Depth-first search for the first node carrying `class`.
    pub fn find_class(&self, class: &str) -> Option<&ViewNode> {
        if self.classes.iter().any(|c| c == class) {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find_class(class))
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

//=========================================================================================
// Header and Login Prompt
//=========================================================================================

/// Which action the header's single session control offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderControl {
    Login,
    Logout,
}

/// The two forms of the login prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoginForm {
    Login,
    Signup,
}

pub fn header_control(control: HeaderControl) -> ViewNode {
    match control {
        HeaderControl::Login => ViewNode::new("a")
            .attr("id", "login-trigger")
            .attr("href", "#")
            .text("Sign in / Sign up"),
        HeaderControl::Logout => ViewNode::new("a")
            .attr("id", "logout-trigger")
            .attr("href", "#")
            .text("Sign out"),
    }
}

//=========================================================================================
// Listing Page
//=========================================================================================

pub fn spot_card(attraction: &AttractionSummary) -> ViewNode {
    let thumbnail = attraction
        .thumbnail
        .as_deref()
        .unwrap_or(DEFAULT_THUMBNAIL);

    ViewNode::new("a")
        .class("spot-card")
        .attr("href", format!("/attraction/{}", attraction.id))
        .child(
            ViewNode::new("div")
                .class("spot-image")
                .child(
                    ViewNode::new("img")
                        .attr("src", thumbnail)
                        .attr("alt", attraction.name.clone()),
                )
                .child(
                    ViewNode::new("div")
                        .class("spot-name-overlay")
                        .text(attraction.name.clone()),
                ),
        )
        .child(
            ViewNode::new("div")
                .class("spot-info")
                .child(
                    ViewNode::new("span")
                        .class("spot-mrt")
                        .text(attraction.mrt.as_deref().unwrap_or(NO_STATION)),
                )
                .child(
                    ViewNode::new("span")
                        .class("spot-category")
                        .text(attraction.category.clone()),
                ),
        )
}

pub fn listing(items: &[AttractionSummary]) -> Vec<ViewNode> {
    items.iter().map(spot_card).collect()
}

pub fn station_list(stations: &[String]) -> ViewNode {
    ViewNode::new("div").class("mrt-scroll").children(
        stations
            .iter()
            .map(|s| ViewNode::new("span").attr("data-station", s.clone()).text(s.clone())),
    )
}

//=========================================================================================
// Detail Page
//=========================================================================================

/// Image slideshow position on the detail page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Carousel {
    len: usize,
    index: usize,
}

impl Carousel {
    pub fn new(len: usize) -> Self {
        Self { len, index: 0 }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn next(&mut self) {
        if self.len > 0 {
            self.index = (self.index + 1) % self.len;
        }
    }

    pub fn prev(&mut self) {
        if self.len > 0 {
            self.index = (self.index + self.len - 1) % self.len;
        }
    }

    /// Jumps to a dot. Out-of-range indices are ignored.
    pub fn select(&mut self, index: usize) -> bool {
        if index < self.len {
            self.index = index;
            true
        } else {
            false
        }
    }
}

pub fn attraction_detail(
    detail: &AttractionDetail,
    carousel: &Carousel,
    slot: TimeSlot,
) -> ViewNode {
    let mut slideshow = ViewNode::new("div").class("slideshow");
    if let Some(image) = detail.images.get(carousel.index()) {
        slideshow = slideshow.child(
            ViewNode::new("img")
                .attr("id", "main-image")
                .attr("src", image.clone()),
        );
    }
    let dots = (0..detail.images.len()).map(|i| {
        let dot = ViewNode::new("span").class("dot");
        if i == carousel.index() {
            dot.class("active")
        } else {
            dot
        }
    });
    slideshow = slideshow.child(ViewNode::new("div").class("indicators").children(dots));

    let category_mrt = format!(
        "{} at {}",
        detail.category,
        detail.mrt.as_deref().unwrap_or(NO_STATION)
    );

    ViewNode::new("section")
        .class("attraction")
        .attr("data-id", detail.id.to_string())
        .child(slideshow)
        .child(
            ViewNode::new("h2")
                .attr("id", "attraction-name")
                .text(detail.name.clone()),
        )
        .child(
            ViewNode::new("p")
                .attr("id", "attraction-category-mrt")
                .text(category_mrt),
        )
        .child(
            ViewNode::new("p")
                .attr("id", "price")
                .attr("data-slot", slot.as_str())
                .text(slot.price().to_string()),
        )
        .child(
            ViewNode::new("p")
                .attr("id", "description")
                .text(detail.description.clone()),
        )
        .child(
            ViewNode::new("p")
                .attr("id", "address")
                .text(detail.address.clone()),
        )
        .child(
            ViewNode::new("p")
                .attr("id", "transportation")
                .text(detail.transport.clone()),
        )
}

//=========================================================================================
// Booking and Thank-you Pages
//=========================================================================================

/// The booking page. The contact form is pre-filled from the signed-in profile.
pub fn booking_summary(user_name: &str, user_email: &str, booking: &Booking) -> ViewNode {
    ViewNode::new("section")
        .class("booking")
        .child(
            ViewNode::new("p")
                .class("user-name")
                .text(user_name.to_string()),
        )
        .child(
            ViewNode::new("div")
                .class("tour")
                .child(
                    ViewNode::new("h3")
                        .class("tour-title")
                        .text(format!("Taipei day trip: {}", booking.attraction.name)),
                )
                .child(
                    ViewNode::new("img")
                        .class("tour-image")
                        .attr("src", booking.attraction.image.clone()),
                )
                .child(
                    ViewNode::new("span")
                        .attr("id", "tour-date")
                        .text(booking.date.format("%Y-%m-%d").to_string()),
                )
                .child(
                    ViewNode::new("span")
                        .attr("id", "tour-time")
                        .text(booking.time_slot.label()),
                )
                .child(
                    ViewNode::new("span")
                        .attr("id", "tour-price")
                        .text(booking.price.to_string()),
                )
                .child(
                    ViewNode::new("span")
                        .attr("id", "address")
                        .text(booking.attraction.address.clone()),
                ),
        )
        .child(contact_form(user_name, user_email))
        .child(
            ViewNode::new("span")
                .attr("id", "total-price")
                .text(booking.price.to_string()),
        )
}

fn contact_form(name: &str, email: &str) -> ViewNode {
    let input = |id: &str, kind: &str, value: &str| {
        ViewNode::new("input")
            .attr("id", id)
            .attr("type", kind)
            .attr("value", value)
    };
    ViewNode::new("form")
        .attr("id", "contactSection")
        .class("contact")
        .child(input("contact-name", "text", name))
        .child(input("contact-email", "email", email))
        .child(input("contact-phone", "tel", ""))
}

pub fn empty_booking(user_name: &str) -> ViewNode {
    ViewNode::new("section")
        .class("booking")
        .child(
            ViewNode::new("p")
                .class("user-name")
                .text(user_name.to_string()),
        )
        .child(
            ViewNode::new("p")
                .attr("id", "noToursMessage")
                .text("No booked tours yet"),
        )
}

pub fn thank_you(order_number: Option<&str>) -> ViewNode {
    ViewNode::new("section").class("thankyou").child(
        ViewNode::new("span")
            .attr("id", "order-num")
            .text(order_number.unwrap_or("order number not found")),
    )
}
