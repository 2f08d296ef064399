// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use std::path::PathBuf;
use time::{Date, Duration, Month, OffsetDateTime, Time};

const FIRST_NAMES: [&str; 16] = [
    "Avery", "Jordan", "Taylor", "Riley", "Morgan", "Casey", "Alex", "Quinn", "Parker", "Drew",
    "Kai", "Elliot", "Robin", "Cameron", "Hayden", "Rowan",
];
const LAST_NAMES: [&str; 18] = [
    "Walker", "Martin", "Hill", "Evans", "Lopez", "Gray", "Ward", "Young", "Diaz", "Reed",
    "Campbell", "Turner", "Flores", "Bennett", "Price", "Morris", "Foster", "Brooks",
];

const DEVICE_NAMES: [&str; 8] = [
    "Dexterity G6",
    "Glimmer CGM",
    "OmniCare Pod",
    "Tandem Flux",
    "MediSync 770",
    "Contour Link",
    "OneTouch Verio",
    "Freeline Libre",
];

const INVITE_CONTEXTS: [&str; 6] = [
    "wants to share device data with you",
    "added you to their care team",
    "asked you to review their readings",
    "invited you from the clinic portal",
    "shared a new account with you",
    "needs a second pair of eyes on their data",
];

const EMAIL_DOMAINS: [&str; 5] = [
    "example-care.org",
    "families.local",
    "clinic-mail.net",
    "careteam.io",
    "sharing.example.com",
];

const DEVICE_EVENT_KINDS: [&str; 5] = ["smbg", "cgm", "bolus", "basal_rate", "upload"];

const REFERENCE_YEAR: i32 = 2026;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
    pub full_name: String,
    pub is_patient: bool,
    pub birthday: String,
    pub diagnosis_date: String,
    pub is_other_person: bool,
    pub patient_full_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invitation {
    pub key: String,
    pub creator_name: String,
    pub creator_email: String,
    pub context: String,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceEvent {
    pub kind: String,
    pub occurred_at: OffsetDateTime,
    pub device: String,
}

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }
}

/// Deterministic generator for roster fixtures. The same seed always yields
/// the same people, invitations, and device events.
#[derive(Debug, Clone)]
pub struct RosterFaker {
    rng: DeterministicRng,
}

impl RosterFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
        }
    }

    pub fn int_n(&mut self, n: usize) -> usize {
        self.rng.int_n(n)
    }

    fn pick<'a>(&mut self, pool: &[&'a str]) -> &'a str {
        pool[self.rng.int_n(pool.len())]
    }

    fn full_name(&mut self) -> String {
        format!("{} {}", self.pick(&FIRST_NAMES), self.pick(&LAST_NAMES))
    }

    pub fn person(&mut self) -> Person {
        let full_name = self.full_name();
        // Roughly one in eight records is a care-team member without device
        // data of their own.
        if self.rng.int_n(8) == 0 {
            return Person {
                full_name,
                is_patient: false,
                birthday: String::new(),
                diagnosis_date: String::new(),
                is_other_person: false,
                patient_full_name: String::new(),
            };
        }

        // Roughly one in ten patient records has no birthday on file; one
        // in five is an account managed for someone else.
        let birthday = if self.rng.int_n(10) == 0 {
            String::new()
        } else {
            format_fixture_date(self.birthday_date())
        };
        let is_other_person = self.rng.int_n(5) == 0;
        let patient_full_name = if is_other_person {
            self.full_name()
        } else {
            String::new()
        };
        let diagnosis_date = if birthday.is_empty() || self.rng.int_n(3) == 0 {
            String::new()
        } else {
            format_fixture_date(self.date_between(
                date_at(REFERENCE_YEAR - 12, Month::January, 1),
                date_at(REFERENCE_YEAR - 1, Month::December, 31),
            ))
        };

        Person {
            full_name,
            is_patient: true,
            birthday,
            diagnosis_date,
            is_other_person,
            patient_full_name,
        }
    }

    pub fn people(&mut self, count: usize) -> Vec<Person> {
        (0..count).map(|_| self.person()).collect()
    }

    pub fn invitation(&mut self) -> Invitation {
        let first = self.pick(&FIRST_NAMES);
        let last = self.pick(&LAST_NAMES);
        let domain = self.pick(&EMAIL_DOMAINS);
        Invitation {
            key: format!("inv-{:08x}", self.rng.next_u64() as u32),
            creator_name: format!("{first} {last}"),
            creator_email: format!(
                "{}.{}@{domain}",
                first.to_ascii_lowercase(),
                last.to_ascii_lowercase()
            ),
            context: self.pick(&INVITE_CONTEXTS).to_owned(),
            created_at: self.datetime_between(
                reference_now() - Duration::days(60),
                reference_now(),
            ),
        }
    }

    pub fn invitations(&mut self, count: usize) -> Vec<Invitation> {
        (0..count).map(|_| self.invitation()).collect()
    }

    pub fn device_event(&mut self) -> DeviceEvent {
        DeviceEvent {
            kind: self.pick(&DEVICE_EVENT_KINDS).to_owned(),
            occurred_at: self.datetime_between(
                reference_now() - Duration::days(30),
                reference_now(),
            ),
            device: self.pick(&DEVICE_NAMES).to_owned(),
        }
    }

    pub fn device_events(&mut self, count: usize) -> Vec<DeviceEvent> {
        (0..count).map(|_| self.device_event()).collect()
    }

    fn birthday_date(&mut self) -> Date {
        self.date_between(
            date_at(REFERENCE_YEAR - 80, Month::January, 1),
            date_at(REFERENCE_YEAR - 5, Month::December, 31),
        )
    }

    fn date_between(&mut self, start: Date, end: Date) -> Date {
        let span = (end - start).whole_days().max(0) as usize;
        start + Duration::days(self.rng.int_n(span + 1) as i64)
    }

    fn datetime_between(&mut self, start: OffsetDateTime, end: OffsetDateTime) -> OffsetDateTime {
        let span = (end - start).whole_seconds().max(0) as usize;
        start + Duration::seconds(self.rng.int_n(span + 1) as i64)
    }
}

pub fn reference_now() -> OffsetDateTime {
    OffsetDateTime::new_utc(
        date_at(REFERENCE_YEAR, Month::June, 15),
        Time::from_hms(12, 0, 0).expect("valid fixture time"),
    )
}

pub fn format_fixture_date(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

fn date_at(year: i32, month: Month, day: u8) -> Date {
    Date::from_calendar_date(year, month, day).expect("valid fixture date")
}

pub fn temp_db_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let temp = tempfile::tempdir().context("create temp dir for fixture database")?;
    let path = temp.path().join("careview.db");
    Ok((temp, path))
}

pub fn fixture_datetime() -> &'static str {
    "2026-06-15T12:00:00Z"
}
