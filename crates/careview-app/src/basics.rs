// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use time::macros::format_description;
use time::{Date, OffsetDateTime};

use crate::{DeviceEvent, DeviceEventKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BasicsSection {
    pub kind: DeviceEventKind,
    pub count: usize,
}

/// Readiness summary for the basics view: which device-data kinds exist,
/// over what date range, and when the device last synced. Chart rendering
/// itself is delegated to the UI layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicsSummary {
    pub date_range: Option<(Date, Date)>,
    pub sections: Vec<BasicsSection>,
    pub latest_upload: Option<OffsetDateTime>,
}

impl BasicsSummary {
    pub fn from_events(events: &[DeviceEvent]) -> Self {
        let sections = DeviceEventKind::ALL
            .into_iter()
            .filter(|kind| kind.is_chartable())
            .map(|kind| BasicsSection {
                kind,
                count: events.iter().filter(|event| event.kind == kind).count(),
            })
            .collect();

        let mut date_range: Option<(Date, Date)> = None;
        for event in events.iter().filter(|event| event.kind.is_chartable()) {
            let date = event.occurred_at.date();
            date_range = Some(match date_range {
                None => (date, date),
                Some((start, end)) => (start.min(date), end.max(date)),
            });
        }

        let latest_upload = events
            .iter()
            .filter(|event| event.kind == DeviceEventKind::Upload)
            .map(|event| event.occurred_at)
            .max();

        Self {
            date_range,
            sections,
            latest_upload,
        }
    }

    /// The view needs at least one chartable data point; uploads alone do
    /// not count.
    pub fn is_missing(&self) -> bool {
        self.sections.iter().all(|section| section.count == 0)
    }

    pub fn title(&self) -> String {
        match self.date_range {
            None => String::new(),
            Some((start, end)) => {
                format!("{} - {}", format_basics_date(start), format_basics_date(end))
            }
        }
    }
}

fn format_basics_date(date: Date) -> String {
    date.format(&format_description!(
        "[month repr:short] [day padding:none], [year]"
    ))
    .unwrap_or_default()
}
