//! Calendar event construction, document assembly and iCalendar rendering.

mod document;
mod event;
pub mod ics;

pub use document::{
    CalendarAssembler, CalendarDocument, CALENDAR_VERSION, DEFAULT_CALENDAR_NAME, DEFAULT_PRODUCT_ID,
};
pub use event::{
    build_event, default_reminder_time, event_text, event_uid, Alarm, CalendarEvent, EventOptions, EventTime,
    TimeRepresentation, EVENT_STATUS,
};
