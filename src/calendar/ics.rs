//! iCalendar (RFC 5545) rendering through the `ical` generator.
//
// The generator emits CRLF-terminated, folded content lines but writes property values
// verbatim, so TEXT values are escaped here before they are handed over.

use crate::calendar::document::CalendarDocument;
use crate::calendar::event::{Alarm, CalendarEvent, EventTime};
use chrono::{DateTime, Utc};
use ical::generator::{Emitter, IcalCalendar, IcalCalendarBuilder, IcalEvent, IcalEventBuilder};
use ical::ical_property;
use ical::parser::ical::component::IcalAlarm;
use ical::property::Property;

const DATE_FORMAT: &str = "%Y%m%d";
const LOCAL_TIME_FORMAT: &str = "%Y%m%dT%H%M%S";
const UTC_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Zone handed to the event builder for date-only events; never written out.
const DATE_ONLY_TZID: &str = "UTC";

/// Render a whole document.
pub fn render(document: &CalendarDocument) -> String {
    to_ical(document).generate()
}

/// Convert a document into the `ical` component tree.
pub fn to_ical(document: &CalendarDocument) -> IcalCalendar {
    let mut builder = IcalCalendarBuilder::version(document.version())
        .gregorian()
        .prodid(document.product_id())
        .set(ical_property!("X-WR-CALNAME", escape_text(document.name())));
    if let Some(tz) = document.timezone() {
        builder = builder.set(ical_property!("X-WR-TIMEZONE", tz));
    }
    document.events().iter().map(to_ical_event).fold(builder, |builder, event| builder.add_event(event)).build()
}

fn to_ical_event(event: &CalendarEvent) -> IcalEvent {
    let stamp = format_utc(&event.stamp);
    let tzid = match &event.start {
        EventTime::Date(_) => DATE_ONLY_TZID.to_string(),
        EventTime::Zoned(dt) => dt.timezone().name().to_string(),
    };
    let builder = IcalEventBuilder::tzid(tzid).uid(escape_text(&event.uid)).changed_utc(stamp.as_str());
    let builder = match (&event.start, &event.end) {
        (EventTime::Date(start), EventTime::Date(end)) => {
            builder.start_day(start.format(DATE_FORMAT).to_string()).end_day(end.format(DATE_FORMAT).to_string())
        }
        (start, end) => builder.start(format_local(start)).end(format_local(end)),
    };

    let mut ical_event = builder
        .set(ical_property!("SUMMARY", escape_text(&event.summary)))
        .set(ical_property!("DESCRIPTION", escape_text(&event.description)))
        .set(ical_property!("CATEGORIES", event.category))
        .set(ical_property!("STATUS", event.status))
        .set(ical_property!("LAST-MODIFIED", stamp))
        .build();
    if let Some(alarm) = &event.alarm {
        ical_event.alarms.push(to_ical_alarm(alarm));
    }
    ical_event
}

fn to_ical_alarm(alarm: &Alarm) -> IcalAlarm {
    let mut ical_alarm = IcalAlarm::new();
    ical_alarm.properties = vec![
        ical_property!("ACTION", "DISPLAY"),
        ical_property!("DESCRIPTION", escape_text(&alarm.description)),
        // chrono prints ISO 8601 durations in seconds, e.g. PT32400S
        ical_property!("TRIGGER", alarm.trigger.to_string()),
    ];
    ical_alarm
}

fn format_local(time: &EventTime) -> String {
    match time {
        EventTime::Date(date) => date.format(DATE_FORMAT).to_string(),
        EventTime::Zoned(dt) => dt.format(LOCAL_TIME_FORMAT).to_string(),
    }
}

fn format_utc(stamp: &DateTime<Utc>) -> String {
    stamp.format(UTC_FORMAT).to_string()
}

/// Escape a TEXT value.
pub fn escape_text(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            ';' => escaped.push_str("\\;"),
            ',' => escaped.push_str("\\,"),
            '\n' => escaped.push_str("\\n"),
            '\r' => {}
            _ => escaped.push(ch),
        }
    }
    escaped
}
