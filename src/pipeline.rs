//! End-to-end generation: contacts in, calendar document out.

use crate::calendar::{build_event, CalendarAssembler, CalendarDocument, CalendarEvent, EventOptions};
use crate::contacts::{Contact, UNNAMED_SUBJECT};
use crate::error::BirthdayError;
use crate::lunar::{LunarConverter, LunarResolver};
use crate::records::DatedPerson;
use crate::recurrence::{recurrences, resolve_occurrence, YearRange};
use log::{debug, info, warn};

/// Everything one run needs besides the contacts themselves
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub years: YearRange,
    pub event: EventOptions,
    pub product_id: String,
    pub calendar_name: String,
}

/// A subject whose events were left out of the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectFailure {
    pub subject: String,
    pub error: BirthdayError,
}

/// Output of one run
#[derive(Debug, Clone)]
pub struct CalendarBuild {
    pub document: CalendarDocument,
    pub failures: Vec<SubjectFailure>,
}

impl CalendarBuild {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Every event for one person, in record order then year order.
///
/// Fails as a whole on the first bad occurrence so no partial set of events escapes.
pub fn person_events<C: LunarConverter>(
    person: &DatedPerson,
    resolver: &LunarResolver<C>,
    options: &PipelineOptions,
) -> Result<Vec<CalendarEvent>, BirthdayError> {
    let inherited_year = person.companion_birth_year();
    let mut events = Vec::with_capacity(person.dates.len() * options.years.len());
    for record in &person.dates {
        for (year, record) in recurrences(record, options.years) {
            let occurrence = resolve_occurrence(&person.person, record, year, inherited_year, resolver)?;
            events.push(build_event(&occurrence, &options.event)?);
        }
    }
    Ok(events)
}

/// Build the calendar for `contacts`.
///
/// Contacts are processed independently; a failing contact contributes no events and is
/// reported in [`CalendarBuild::failures`].
pub fn build_calendar<C: LunarConverter>(
    contacts: &[Contact],
    resolver: &LunarResolver<C>,
    options: &PipelineOptions,
) -> CalendarBuild {
    let mut assembler = CalendarAssembler::new(options.product_id.clone(), options.calendar_name.clone());
    if let Some(tz) = options.event.time_representation.timezone() {
        assembler = assembler.with_timezone(tz.name());
    }
    let mut failures = Vec::new();

    for contact in contacts {
        let subject = contact.display_name().unwrap_or(UNNAMED_SUBJECT).to_string();
        let result = contact.to_dated_person().and_then(|person| person_events(&person, resolver, options));
        match result {
            Ok(events) => {
                debug!("Generated {} events for {}", events.len(), subject);
                assembler.extend(events);
            }
            Err(error) => {
                warn!("Skipping {}: {}", subject, error);
                failures.push(SubjectFailure { subject, error });
            }
        }
    }

    let document = assembler.finish();
    info!(
        "Built calendar '{}' with {} events for years {}..{} ({} failed subjects)",
        document.name(),
        document.len(),
        options.years.start(),
        options.years.years().end,
        failures.len()
    );
    CalendarBuild { document, failures }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contacts::{ContactDate, ContactEvent, ContactName};
    use crate::lunar::LeapMonthTable;
    use chrono::{NaiveDate, TimeZone, Utc};

    struct ShortMonths;

    impl LunarConverter for ShortMonths {
        fn to_solar(&self, year: i32, month: u8, day: u8) -> Option<NaiveDate> {
            if day > 28 {
                return None;
            }
            NaiveDate::from_ymd_opt(year, u32::from(month), u32::from(day))
        }
    }

    struct Broken;

    impl LunarConverter for Broken {
        fn to_solar(&self, _: i32, _: u8, _: u8) -> Option<NaiveDate> {
            None
        }
    }

    fn options() -> PipelineOptions {
        PipelineOptions {
            years: YearRange::new(2024, 3),
            event: EventOptions::new("test", Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
            product_id: "-//Test//EN".to_string(),
            calendar_name: "Birthdays".to_string(),
        }
    }

    fn contact(name: &str, events: Vec<ContactEvent>) -> Contact {
        Contact {
            names: vec![ContactName { display_name: Some(name.to_string()) }],
            events,
            ..Default::default()
        }
    }

    fn lunar(month: u32, day: u32) -> ContactEvent {
        ContactEvent {
            kind: Some("农历生日".to_string()),
            date: Some(ContactDate { year: None, month: Some(month), day: Some(day) }),
        }
    }

    fn covering_table() -> LeapMonthTable {
        LeapMonthTable::parse("2000年 闰四月，2099年 闰二月").unwrap()
    }

    #[test]
    fn test_events_follow_subject_then_year_order() {
        let resolver = LunarResolver::new(covering_table(), ShortMonths);
        let contacts = vec![contact("A", vec![lunar(1, 5)]), contact("B", vec![lunar(2, 6)])];
        let build = build_calendar(&contacts, &resolver, &options());
        assert!(build.is_complete());
        let uids: Vec<&str> = build.document.events().iter().map(|e| e.uid.as_str()).collect();
        assert_eq!(
            uids,
            vec![
                "A-2024-01-05-lunar-birthday@test",
                "A-2025-01-05-lunar-birthday@test",
                "A-2026-01-05-lunar-birthday@test",
                "B-2024-02-06-lunar-birthday@test",
                "B-2025-02-06-lunar-birthday@test",
                "B-2026-02-06-lunar-birthday@test",
            ]
        );
    }

    #[test]
    fn test_failing_subject_is_excluded_and_reported() {
        let resolver = LunarResolver::new(covering_table(), Broken);
        let mut good = contact("Good", vec![]);
        good.birthdays = vec![crate::contacts::ContactBirthday {
            date: Some(ContactDate { year: Some(1990), month: Some(5), day: Some(3) }),
        }];
        let contacts = vec![good, contact("Bad", vec![lunar(1, 5)])];
        let build = build_calendar(&contacts, &resolver, &options());
        assert_eq!(build.document.len(), 3);
        assert!(build.document.events().iter().all(|e| e.uid.starts_with("Good-")));
        assert_eq!(build.failures.len(), 1);
        assert_eq!(build.failures[0].subject, "Bad");
        assert!(matches!(build.failures[0].error, BirthdayError::DateAdjustmentExhausted { .. }));
    }

    #[test]
    fn test_partial_person_contributes_nothing() {
        let resolver = LunarResolver::new(covering_table(), ShortMonths);
        let mut missing_day = lunar(3, 1);
        missing_day.date = Some(ContactDate { year: None, month: Some(3), day: None });
        let contacts = vec![contact("Half", vec![lunar(1, 5), missing_day])];
        let build = build_calendar(&contacts, &resolver, &options());
        assert!(build.document.is_empty());
        assert_eq!(
            build.failures[0].error,
            BirthdayError::MissingRequiredField { subject: "Half".to_string(), field: "day" }
        );
    }
}
