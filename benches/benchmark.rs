use birthday_calendar::calendar::EventOptions;
use birthday_calendar::contacts::{Contact, ContactBirthday, ContactDate, ContactEvent, ContactName};
use birthday_calendar::{build_calendar, IcuLunarConverter, LeapMonthTable, LunarResolver, PipelineOptions, YearRange};
use chrono::{NaiveTime, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

fn contacts(count: u32) -> Vec<Contact> {
    (0..count)
        .map(|i| Contact {
            names: vec![ContactName { display_name: Some(format!("联系人{}", i)) }],
            birthdays: vec![ContactBirthday {
                date: Some(ContactDate { year: Some(1960 + (i % 50) as i32), month: Some(i % 12 + 1), day: Some(i % 28 + 1) }),
            }],
            events: vec![
                ContactEvent {
                    kind: Some("农历生日".to_string()),
                    date: Some(ContactDate { year: None, month: Some(i % 12 + 1), day: Some(i % 30 + 1) }),
                },
                ContactEvent {
                    kind: Some("结婚纪念日#周年纪念日".to_string()),
                    date: Some(ContactDate { year: Some(2010), month: Some(6), day: Some(1) }),
                },
            ],
            ..Default::default()
        })
        .collect()
}

fn bench_leap_month_parsing(c: &mut Criterion) {
    c.bench_function("leap_month_table_bundled", |b| b.iter(|| black_box(LeapMonthTable::bundled())));
}

fn bench_build_calendar(c: &mut Criterion) {
    let resolver = LunarResolver::new(LeapMonthTable::bundled().unwrap(), IcuLunarConverter::new());
    let stamp = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let mut group = c.benchmark_group("build_calendar");

    for count in [10u32, 100, 500] {
        let input = contacts(count);
        let options = PipelineOptions {
            years: YearRange::new(2024, 5),
            event: EventOptions::new("bench", stamp).with_reminder(NaiveTime::from_hms_opt(9, 0, 0).unwrap()),
            product_id: "-//Bench//Birthdays//ZH_CN".to_string(),
            calendar_name: "生日快乐".to_string(),
        };
        group.throughput(Throughput::Elements(u64::from(count)));
        group.bench_with_input(BenchmarkId::new("contacts", count), &input, |b, input| {
            b.iter(|| build_calendar(black_box(input), &resolver, &options).document.to_ics())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_leap_month_parsing, bench_build_calendar);
criterion_main!(benches);
