//! Building calendar events from resolved occurrences.

use crate::error::BirthdayError;
use crate::records::EventKind;
use crate::recurrence::ResolvedOccurrence;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Status attached to every generated event
pub const EVENT_STATUS: &str = "CONFIRMED";

/// How event bounds are written; one choice applies to a whole document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeRepresentation {
    /// Date-only bounds with an exclusive end date
    AllDay,
    /// Local-midnight timestamps in the given zone
    Zoned(Tz),
}

impl TimeRepresentation {
    pub fn timezone(&self) -> Option<Tz> {
        match self {
            TimeRepresentation::AllDay => None,
            TimeRepresentation::Zoned(tz) => Some(*tz),
        }
    }
}

/// Start or end bound of an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventTime {
    Date(NaiveDate),
    Zoned(DateTime<Tz>),
}

/// Display reminder attached to an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alarm {
    /// Offset from the event start; negative when the reminder fires first
    pub trigger: Duration,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEvent {
    pub uid: String,
    pub summary: String,
    pub description: String,
    pub start: EventTime,
    pub end: EventTime,
    pub category: &'static str,
    pub status: &'static str,
    /// Run timestamp, written as DTSTAMP and LAST-MODIFIED
    pub stamp: DateTime<Utc>,
    pub alarm: Option<Alarm>,
}

/// Settings shared by every event of one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventOptions {
    pub namespace: String,
    pub time_representation: TimeRepresentation,
    /// Local time of the same-day reminder; `None` disables alarms
    pub reminder: Option<NaiveTime>,
    pub stamp: DateTime<Utc>,
}

impl EventOptions {
    pub fn new(namespace: impl Into<String>, stamp: DateTime<Utc>) -> Self {
        Self {
            namespace: namespace.into(),
            time_representation: TimeRepresentation::AllDay,
            reminder: None,
            stamp,
        }
    }

    pub fn zoned(mut self, tz: Tz) -> Self {
        self.time_representation = TimeRepresentation::Zoned(tz);
        self
    }

    pub fn with_reminder(mut self, at: NaiveTime) -> Self {
        self.reminder = Some(at);
        self
    }
}

/// Default reminder time, 09:00 local
pub fn default_reminder_time() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN)
}

/// Summary and description for an occurrence
pub fn event_text(occurrence: &ResolvedOccurrence) -> (String, String) {
    let name = &occurrence.subject_name;
    let addressed = &occurrence.addressed_name;
    match occurrence.kind {
        EventKind::SolarBirthday | EventKind::LunarBirthday => {
            let occasion = if occurrence.kind == EventKind::LunarBirthday { "农历生日" } else { "生日" };
            match occurrence.age {
                Some(age) => (
                    format!("{}的{}岁{}🎂", name, age, occasion),
                    format!("今天是{}的{}岁{}！", addressed, age, occasion),
                ),
                None => (format!("{}的{}🎂", name, occasion), format!("今天是{}的{}！", addressed, occasion)),
            }
        }
        EventKind::Anniversary => {
            let label = occurrence.label.as_deref().map(str::trim).unwrap_or(name.as_str());
            let count = occurrence.age.map(|age| age.to_string()).unwrap_or_default();
            (format!("{}{}周年纪念日", label, count), format!("今天是{}{}周年纪念日！", label, count))
        }
    }
}

/// Identifier derived from the subject, the resolved solar date and the kind.
///
/// Anniversaries also carry their label, so two occasions on one date stay distinct.
pub fn event_uid(occurrence: &ResolvedOccurrence, namespace: &str) -> String {
    let tag = match occurrence.label.as_deref().map(str::trim) {
        Some(label) if occurrence.kind == EventKind::Anniversary && !label.is_empty() => {
            format!("{}-{}", occurrence.kind.uid_tag(), label)
        }
        _ => occurrence.kind.uid_tag().to_string(),
    };
    format!("{}-{}-{}@{}", occurrence.subject_name, occurrence.solar_date.format("%Y-%m-%d"), tag, namespace)
}

/// Build the calendar entry for one occurrence.
pub fn build_event(occurrence: &ResolvedOccurrence, options: &EventOptions) -> Result<CalendarEvent, BirthdayError> {
    let (summary, description) = event_text(occurrence);
    let date = occurrence.solar_date;
    let next_day = date.succ_opt().unwrap_or(date);

    let (start, end, alarm) = match options.time_representation {
        TimeRepresentation::AllDay => {
            let alarm = options.reminder.map(|at| Alarm {
                trigger: date.and_time(at) - date.and_time(NaiveTime::MIN),
                description: summary.clone(),
            });
            (EventTime::Date(date), EventTime::Date(next_day), alarm)
        }
        TimeRepresentation::Zoned(tz) => {
            let start = localize(tz, date.and_time(NaiveTime::MIN))?;
            let end = localize(tz, next_day.and_time(NaiveTime::MIN))?;
            let alarm = match options.reminder {
                Some(at) => Some(Alarm {
                    trigger: localize(tz, date.and_time(at))? - start,
                    description: summary.clone(),
                }),
                None => None,
            };
            (EventTime::Zoned(start), EventTime::Zoned(end), alarm)
        }
    };

    Ok(CalendarEvent {
        uid: event_uid(occurrence, &options.namespace),
        summary,
        description,
        start,
        end,
        category: occurrence.kind.category(),
        status: EVENT_STATUS,
        stamp: options.stamp,
        alarm,
    })
}

/// Attach `local` to `tz`, moving forward out of a DST gap and taking the earlier of two
/// ambiguous instants.
fn localize(tz: Tz, local: NaiveDateTime) -> Result<DateTime<Tz>, BirthdayError> {
    (0..=12)
        .map(|step| local + Duration::minutes(15 * step))
        .find_map(|candidate| tz.from_local_datetime(&candidate).earliest())
        .ok_or_else(|| BirthdayError::InvalidLocalTime { date: local.date(), timezone: tz.name().to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn stamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn occurrence(kind: EventKind, age: Option<u32>, label: Option<&str>) -> ResolvedOccurrence {
        ResolvedOccurrence {
            subject_name: "Alice".to_string(),
            addressed_name: "Alice".to_string(),
            solar_date: NaiveDate::from_ymd_opt(2025, 5, 3).unwrap(),
            age,
            kind,
            label: label.map(str::to_string),
            adjusted: false,
        }
    }

    #[test]
    fn test_solar_birthday_text_with_age() {
        let (summary, description) = event_text(&occurrence(EventKind::SolarBirthday, Some(35), None));
        assert_eq!(summary, "Alice的35岁生日🎂");
        assert_eq!(description, "今天是Alice的35岁生日！");
    }

    #[test]
    fn test_solar_birthday_text_without_age() {
        let (summary, description) = event_text(&occurrence(EventKind::SolarBirthday, None, None));
        assert_eq!(summary, "Alice的生日🎂");
        assert_eq!(description, "今天是Alice的生日！");
        assert!(!summary.chars().any(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_lunar_birthday_text() {
        let (summary, description) = event_text(&occurrence(EventKind::LunarBirthday, Some(35), None));
        assert_eq!(summary, "Alice的35岁农历生日🎂");
        assert_eq!(description, "今天是Alice的35岁农历生日！");
        let (summary, _) = event_text(&occurrence(EventKind::LunarBirthday, None, None));
        assert_eq!(summary, "Alice的农历生日🎂");
    }

    #[test]
    fn test_anniversary_text() {
        let (summary, description) = event_text(&occurrence(EventKind::Anniversary, Some(9), Some(" 结婚纪念日")));
        assert_eq!(summary, "结婚纪念日9周年纪念日");
        assert_eq!(description, "今天是结婚纪念日9周年纪念日！");
        let (summary, description) = event_text(&occurrence(EventKind::Anniversary, None, Some("结婚纪念日")));
        assert_eq!(summary, "结婚纪念日周年纪念日");
        assert_eq!(description, "今天是结婚纪念日周年纪念日！");
    }

    #[test]
    fn test_description_uses_nickname() {
        let mut occ = occurrence(EventKind::SolarBirthday, None, None);
        occ.addressed_name = "Ally".to_string();
        let (summary, description) = event_text(&occ);
        assert_eq!(summary, "Alice的生日🎂");
        assert_eq!(description, "今天是Ally的生日！");
    }

    #[test]
    fn test_uid_uses_resolved_date_and_kind() {
        let solar = occurrence(EventKind::SolarBirthday, None, None);
        let lunar = occurrence(EventKind::LunarBirthday, None, None);
        assert_eq!(event_uid(&solar, "finn"), "Alice-2025-05-03-gregorian-birthday@finn");
        assert_eq!(event_uid(&lunar, "finn"), "Alice-2025-05-03-lunar-birthday@finn");
    }

    #[test]
    fn test_anniversaries_on_one_date_keep_distinct_uids() {
        let wedding = occurrence(EventKind::Anniversary, Some(9), Some(" 结婚纪念日 "));
        let engagement = occurrence(EventKind::Anniversary, Some(10), Some("订婚纪念日"));
        assert_eq!(event_uid(&wedding, "finn"), "Alice-2025-05-03-anniversary-结婚纪念日@finn");
        assert_ne!(event_uid(&wedding, "finn"), event_uid(&engagement, "finn"));

        let unlabelled = occurrence(EventKind::Anniversary, None, Some("  "));
        assert_eq!(event_uid(&unlabelled, "finn"), "Alice-2025-05-03-anniversary@finn");
    }

    #[test]
    fn test_all_day_event_bounds_and_alarm() {
        let options = EventOptions::new("finn", stamp()).with_reminder(default_reminder_time());
        let event = build_event(&occurrence(EventKind::SolarBirthday, Some(35), None), &options).unwrap();
        assert_eq!(event.start, EventTime::Date(NaiveDate::from_ymd_opt(2025, 5, 3).unwrap()));
        assert_eq!(event.end, EventTime::Date(NaiveDate::from_ymd_opt(2025, 5, 4).unwrap()));
        assert_eq!(event.category, "BIRTHDAY");
        let alarm = event.alarm.unwrap();
        assert_eq!(alarm.trigger, Duration::hours(9));
        assert_eq!(alarm.description, "Alice的35岁生日🎂");
    }

    #[test]
    fn test_no_alarm_when_disabled() {
        let options = EventOptions::new("finn", stamp());
        let event = build_event(&occurrence(EventKind::Anniversary, None, Some("x")), &options).unwrap();
        assert!(event.alarm.is_none());
        assert_eq!(event.category, "ANNIVERSARY");
    }

    #[test]
    fn test_zoned_event_starts_at_local_midnight() {
        let tz: Tz = "Asia/Shanghai".parse().unwrap();
        let options = EventOptions::new("finn", stamp()).zoned(tz).with_reminder(default_reminder_time());
        let event = build_event(&occurrence(EventKind::SolarBirthday, None, None), &options).unwrap();
        let expected_start = tz.with_ymd_and_hms(2025, 5, 3, 0, 0, 0).unwrap();
        assert_eq!(event.start, EventTime::Zoned(expected_start));
        assert_eq!(event.end, EventTime::Zoned(tz.with_ymd_and_hms(2025, 5, 4, 0, 0, 0).unwrap()));
        assert_eq!(event.alarm.unwrap().trigger, Duration::hours(9));
    }

    #[test]
    fn test_zoned_alarm_accounts_for_dst_shift() {
        // Clocks in New York jump from 02:00 to 03:00 on 2025-03-09.
        let tz: Tz = "America/New_York".parse().unwrap();
        let mut occ = occurrence(EventKind::SolarBirthday, None, None);
        occ.solar_date = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
        let options = EventOptions::new("finn", stamp()).zoned(tz).with_reminder(default_reminder_time());
        let event = build_event(&occ, &options).unwrap();
        assert_eq!(event.alarm.unwrap().trigger, Duration::hours(8));
    }
}
