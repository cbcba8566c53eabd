//! Calendar document assembly.

use crate::calendar::event::CalendarEvent;
use crate::calendar::ics;

/// Format version written into every document
pub const CALENDAR_VERSION: &str = "2.0";

/// Default product identifier
pub const DEFAULT_PRODUCT_ID: &str = "-//Finn//Birthday Calendar 1.0//ZH_CN";

/// Default human-readable calendar name
pub const DEFAULT_CALENDAR_NAME: &str = "生日快乐";

/// A finished, immutable calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarDocument {
    product_id: String,
    name: String,
    timezone: Option<String>,
    events: Vec<CalendarEvent>,
}

impl CalendarDocument {
    pub fn product_id(&self) -> &str {
        &self.product_id
    }

    pub fn version(&self) -> &'static str {
        CALENDAR_VERSION
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Zone name advertised for zoned documents
    pub fn timezone(&self) -> Option<&str> {
        self.timezone.as_deref()
    }

    pub fn events(&self) -> &[CalendarEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Render to iCalendar bytes.
    pub fn to_ics(&self) -> Vec<u8> {
        ics::render(self).into_bytes()
    }
}

/// Collects events in insertion order and seals them into a [`CalendarDocument`].
#[derive(Debug, Clone)]
pub struct CalendarAssembler {
    product_id: String,
    name: String,
    timezone: Option<String>,
    events: Vec<CalendarEvent>,
}

impl Default for CalendarAssembler {
    fn default() -> Self {
        Self::new(DEFAULT_PRODUCT_ID, DEFAULT_CALENDAR_NAME)
    }
}

impl CalendarAssembler {
    pub fn new(product_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self { product_id: product_id.into(), name: name.into(), timezone: None, events: Vec::new() }
    }

    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = Some(timezone.into());
        self
    }

    pub fn push(&mut self, event: CalendarEvent) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn finish(self) -> CalendarDocument {
        CalendarDocument {
            product_id: self.product_id,
            name: self.name,
            timezone: self.timezone,
            events: self.events,
        }
    }
}

impl Extend<CalendarEvent> for CalendarAssembler {
    fn extend<T: IntoIterator<Item = CalendarEvent>>(&mut self, iter: T) {
        self.events.extend(iter);
    }
}
