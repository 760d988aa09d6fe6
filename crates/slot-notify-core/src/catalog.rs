//! Option catalog
//!
//! Fixed lists of selectable statuses and cities, and the `{label, value}`
//! option layouts the transport turns into buttons.

use std::fmt;

/// Callback payload prefix for status buttons.
pub const STATUS_PREFIX: &str = "status_";
/// Callback payload prefix for city buttons.
pub const CITY_PREFIX: &str = "city_";

/// Cities offered in the second selection step, in display order.
pub const CITIES: &[&str] = &["Chennai", "Hyderabad", "Kolkata", "Mumbai", "New Delhi"];

/// Availability status picked in the first selection step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// A slot is available.
    Available,
    /// No slot is available.
    NotAvailable,
    /// Fallback sentinel used when a city is picked without a prior status.
    Unknown,
}

impl Status {
    /// Statuses a user can actually select, in display order.
    pub const SELECTABLE: [Self; 2] = [Self::Available, Self::NotAvailable];

    /// Wire value carried in callback payloads.
    #[must_use]
    pub const fn value(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::NotAvailable => "not_available",
            Self::Unknown => "unknown",
        }
    }

    /// Button label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Available => "✅ Available",
            Self::NotAvailable => "❌ Not Available",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.value())
    }
}

/// A presentable option: button label plus the callback payload it emits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionItem {
    /// Text shown on the button.
    pub label: String,
    /// Opaque payload delivered back when the button is pressed.
    pub value: String,
}

impl OptionItem {
    fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Selectable statuses as `(label, value)` pairs.
#[must_use]
pub fn statuses() -> Vec<(&'static str, &'static str)> {
    Status::SELECTABLE
        .iter()
        .map(|s| (s.label(), s.value()))
        .collect()
}

/// City names in display order.
#[must_use]
pub const fn cities() -> &'static [&'static str] {
    CITIES
}

/// Status buttons, one per selectable status.
#[must_use]
pub fn status_options() -> Vec<OptionItem> {
    statuses()
        .into_iter()
        .map(|(label, value)| OptionItem::new(label, format!("{STATUS_PREFIX}{value}")))
        .collect()
}

/// City buttons, one per catalog city.
#[must_use]
pub fn city_options() -> Vec<OptionItem> {
    cities()
        .iter()
        .map(|city| OptionItem::new(*city, format!("{CITY_PREFIX}{city}")))
        .collect()
}

/// Resolve a raw status value. Only selectable statuses are accepted.
#[must_use]
pub fn parse_status(raw: &str) -> Option<Status> {
    Status::SELECTABLE.into_iter().find(|s| s.value() == raw)
}

/// Resolve a raw city value to its catalog entry.
#[must_use]
pub fn parse_city(raw: &str) -> Option<&'static str> {
    cities().iter().copied().find(|city| *city == raw)
}
