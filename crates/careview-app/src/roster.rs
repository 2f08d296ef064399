// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::cmp::Ordering;

use time::Date;
use time::macros::format_description;

use crate::{PersonRecord, RosterColumn, SortDirection};

pub const LAST_UPLOAD_PLACEHOLDER: &str = "last upload";

/// Render-ready projection of a [`PersonRecord`]. Rows are discarded and
/// rebuilt wholesale on every source change; none of the fields are mutated
/// after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayRow {
    pub person: PersonRecord,
    pub full_name: String,
    pub birthday_display: String,
    pub birthday_sort_key: Option<Date>,
    pub link: String,
    pub last_upload: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub column: RosterColumn,
    pub direction: SortDirection,
}

pub fn detail_link(person: &PersonRecord) -> String {
    format!("#/patients/{}/data", person.id.get())
}

/// Attach detail-view links before the roster consumes the records.
pub fn assign_links(people: &mut [PersonRecord]) {
    for person in people.iter_mut() {
        person.link = detail_link(person);
    }
}

pub fn birthday_display_from_raw(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    match Date::parse(raw, &format_description!("[year]-[month]-[day]")) {
        Ok(date) => format!(
            " {}/{}/{}",
            u8::from(date.month()),
            date.day(),
            date.year()
        ),
        Err(_) => String::new(),
    }
}

/// The sort key is reparsed from the reformatted display text rather than
/// the stored `YYYY-MM-DD` value. Swapping the call site over to the raw
/// value is a one-line change here.
pub fn birthday_sort_key_from_display(display: &str) -> Option<Date> {
    Date::parse(
        display.trim_start(),
        &format_description!("[month padding:none]/[day padding:none]/[year]"),
    )
    .ok()
}

/// Builds the display list: ascending by lowercase resolved name (input
/// order breaks ties), one output row per input record.
pub fn build_rows(people: &[PersonRecord]) -> Vec<DisplayRow> {
    let mut ordered: Vec<&PersonRecord> = people.iter().collect();
    ordered.sort_by(|left, right| {
        left.patient_full_name()
            .to_lowercase()
            .cmp(&right.patient_full_name().to_lowercase())
    });

    ordered
        .into_iter()
        .map(|person| {
            let raw_birthday = person
                .profile
                .patient
                .as_ref()
                .map(|patient| patient.birthday.as_str())
                .unwrap_or("");
            let birthday_display = birthday_display_from_raw(raw_birthday);
            DisplayRow {
                full_name: person.patient_full_name().to_owned(),
                birthday_sort_key: birthday_sort_key_from_display(&birthday_display),
                birthday_display,
                link: person.link.clone(),
                last_upload: LAST_UPLOAD_PLACEHOLDER.to_owned(),
                person: person.clone(),
            }
        })
        .collect()
}

/// Case-insensitive substring match on the resolved name; match order
/// follows the list being searched.
pub fn filter_rows(rows: &[DisplayRow], needle: &str) -> Vec<DisplayRow> {
    let needle = needle.to_lowercase();
    rows.iter()
        .filter(|row| row.full_name.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

/// Stable sort by the named column. Rows without a valid birthday sort
/// after dated rows in either direction.
pub fn sort_rows(
    mut rows: Vec<DisplayRow>,
    column: RosterColumn,
    direction: SortDirection,
) -> Vec<DisplayRow> {
    rows.sort_by(|left, right| compare_rows(left, right, column, direction));
    rows
}

fn compare_rows(
    left: &DisplayRow,
    right: &DisplayRow,
    column: RosterColumn,
    direction: SortDirection,
) -> Ordering {
    let order = match column {
        RosterColumn::FullName => left
            .full_name
            .to_lowercase()
            .cmp(&right.full_name.to_lowercase()),
        RosterColumn::Birthday => {
            return match (left.birthday_sort_key, right.birthday_sort_key) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(left), Some(right)) => apply_direction(left.cmp(&right), direction),
            };
        }
        RosterColumn::LastUpload => left.last_upload.cmp(&right.last_upload),
    };
    apply_direction(order, direction)
}

const fn apply_direction(order: Ordering, direction: SortDirection) -> Ordering {
    match direction {
        SortDirection::Asc => order,
        SortDirection::Desc => order.reverse(),
    }
}

/// Table state for the people roster. `rows` is always a permutation or
/// subset of `build_rows(source)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterView {
    source: Vec<PersonRecord>,
    rows: Vec<DisplayRow>,
    searching: bool,
    show_names: bool,
    sort: Option<SortSpec>,
}

impl Default for RosterView {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl RosterView {
    pub fn new(people: Vec<PersonRecord>) -> Self {
        let mut view = Self {
            source: Vec::new(),
            rows: Vec::new(),
            searching: false,
            show_names: true,
            sort: None,
        };
        view.set_people(people);
        view
    }

    pub fn rows(&self) -> &[DisplayRow] {
        &self.rows
    }

    /// Rows the table actually renders: hidden names with no active search
    /// yield an empty view while the underlying rows stay intact.
    pub fn visible_rows(&self) -> &[DisplayRow] {
        if !self.show_names && !self.searching {
            &[]
        } else {
            &self.rows
        }
    }

    pub fn searching(&self) -> bool {
        self.searching
    }

    pub fn show_names(&self) -> bool {
        self.show_names
    }

    pub fn set_show_names(&mut self, show: bool) {
        self.show_names = show;
    }

    pub fn sort_indicator(&self, column: RosterColumn) -> Option<SortDirection> {
        self.sort
            .filter(|spec| spec.column == column)
            .map(|spec| spec.direction)
    }

    /// Replacing the source rebuilds the fresh unsorted, unfiltered list.
    /// The `searching` flag and sort indicator stay as they are, so they can
    /// briefly disagree with the data until the next filter or sort.
    pub fn set_people(&mut self, mut people: Vec<PersonRecord>) {
        assign_links(&mut people);
        self.rows = build_rows(&people);
        self.source = people;
    }

    /// An empty or whitespace needle clears the search and rebuilds from
    /// source; anything else narrows whatever is currently listed.
    pub fn change_filter(&mut self, needle: &str) {
        if needle.trim().is_empty() {
            self.searching = false;
            self.rows = build_rows(&self.source);
            return;
        }

        self.searching = true;
        self.rows = filter_rows(&self.rows, needle);
    }

    /// Direction a header click would apply: a repeat click reverses, a
    /// fresh column starts at Desc.
    pub fn next_direction_for(&self, column: RosterColumn) -> SortDirection {
        match self.sort {
            Some(spec) if spec.column == column => spec.direction.reverse(),
            _ => SortDirection::Desc,
        }
    }

    pub fn cycle_sort(&mut self, column: RosterColumn) -> SortDirection {
        let direction = self.next_direction_for(column);
        self.apply_sort(column, direction);
        direction
    }

    /// Sorts whatever `rows` currently holds (filtered or not); only one
    /// column retains a direction at a time.
    pub fn apply_sort(&mut self, column: RosterColumn, direction: SortDirection) {
        self.rows = sort_rows(std::mem::take(&mut self.rows), column, direction);
        self.sort = Some(SortSpec { column, direction });
    }

    pub fn toggle_show_names(&mut self) -> bool {
        self.show_names = !self.show_names;
        self.show_names
    }
}

#[cfg(test)]
mod tests {
    use super::{
        LAST_UPLOAD_PLACEHOLDER, RosterView, birthday_display_from_raw,
        birthday_sort_key_from_display, build_rows, filter_rows, sort_rows,
    };
    use crate::{PatientProfile, PersonId, PersonRecord, Profile, RosterColumn, SortDirection};
    use time::{Date, Month, OffsetDateTime};

    fn patient(id: i64, full_name: &str, birthday: &str) -> PersonRecord {
        PersonRecord {
            id: PersonId::new(id),
            profile: Profile {
                full_name: full_name.to_owned(),
                patient: Some(PatientProfile {
                    birthday: birthday.to_owned(),
                    ..PatientProfile::default()
                }),
            },
            link: format!("#/patients/{id}/data"),
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    fn sample_people() -> Vec<PersonRecord> {
        vec![
            patient(1, "Bob Smith", "1990-05-01"),
            patient(2, "Amy Zhu", ""),
        ]
    }

    fn names(view: &RosterView) -> Vec<&str> {
        view.rows()
            .iter()
            .map(|row| row.full_name.as_str())
            .collect()
    }

    #[test]
    fn build_orders_by_lowercase_name_and_formats_birthdays() {
        let rows = build_rows(&sample_people());

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].full_name, "Amy Zhu");
        assert_eq!(rows[0].birthday_display, "");
        assert_eq!(rows[0].birthday_sort_key, None);
        assert_eq!(rows[1].full_name, "Bob Smith");
        assert_eq!(rows[1].birthday_display, " 5/1/1990");
        assert_eq!(
            rows[1].birthday_sort_key,
            Some(Date::from_calendar_date(1990, Month::May, 1).expect("valid date")),
        );
        assert_eq!(rows[1].last_upload, LAST_UPLOAD_PLACEHOLDER);
    }

    #[test]
    fn build_preserves_every_input_record_exactly_once() {
        let people = vec![
            patient(1, "Cleo Park", "1971-11-30"),
            patient(2, "ben hall", "1980-01-02"),
            patient(3, "Ada Wu", ""),
            patient(4, "Ben Hall", "2001-07-09"),
        ];

        let rows = build_rows(&people);
        assert_eq!(rows.len(), people.len());

        let mut seen: Vec<i64> = rows.iter().map(|row| row.person.id.get()).collect();
        seen.sort_unstable();
        assert_eq!(seen, vec![1, 2, 3, 4]);
        // Equal lowercased names keep input order.
        let ben_ids: Vec<i64> = rows
            .iter()
            .filter(|row| row.full_name.to_lowercase() == "ben hall")
            .map(|row| row.person.id.get())
            .collect();
        assert_eq!(ben_ids, vec![2, 4]);
    }

    #[test]
    fn build_uses_other_person_override_name() {
        let mut person = patient(7, "Joan Carter", "2014-03-05");
        if let Some(patient) = person.profile.patient.as_mut() {
            patient.is_other_person = true;
            patient.full_name = "Sam Carter".to_owned();
        }

        let rows = build_rows(&[person]);
        assert_eq!(rows[0].full_name, "Sam Carter");
    }

    #[test]
    fn malformed_birthday_degrades_to_empty_display() {
        assert_eq!(birthday_display_from_raw("not-a-date"), "");
        assert_eq!(birthday_display_from_raw("1990-13-40"), "");
        assert_eq!(birthday_display_from_raw(""), "");
        assert_eq!(birthday_display_from_raw("1990-05-01"), " 5/1/1990");
    }

    #[test]
    fn sort_key_comes_from_the_display_string() {
        assert_eq!(
            birthday_sort_key_from_display(" 5/1/1990"),
            Some(Date::from_calendar_date(1990, Month::May, 1).expect("valid date")),
        );
        assert_eq!(birthday_sort_key_from_display(""), None);
        assert_eq!(birthday_sort_key_from_display("garbage"), None);
    }

    #[test]
    fn filter_matches_case_insensitive_substring() {
        let rows = build_rows(&sample_people());
        let filtered = filter_rows(&rows, "amy");
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].full_name, "Amy Zhu");
    }

    #[test]
    fn filter_is_idempotent_for_a_fixed_needle() {
        let rows = build_rows(&sample_people());
        let once = filter_rows(&rows, "zh");
        let twice = filter_rows(&once, "zh");
        assert_eq!(once, twice);
    }

    #[test]
    fn sorting_same_column_twice_reverses_order() {
        let people = vec![
            patient(1, "Bob Smith", "1990-05-01"),
            patient(2, "Amy Zhu", "1985-12-24"),
            patient(3, "Cleo Park", "1971-11-30"),
        ];
        let rows = build_rows(&people);

        let desc = sort_rows(rows.clone(), RosterColumn::FullName, SortDirection::Desc);
        let reversed = sort_rows(desc, RosterColumn::FullName, SortDirection::Asc);
        let asc = sort_rows(rows, RosterColumn::FullName, SortDirection::Asc);
        assert_eq!(reversed, asc);
    }

    #[test]
    fn missing_birthdays_sort_last_in_both_directions() {
        let people = vec![
            patient(1, "Bob Smith", "1990-05-01"),
            patient(2, "Amy Zhu", ""),
            patient(3, "Cleo Park", "1971-11-30"),
        ];
        let rows = build_rows(&people);

        let asc = sort_rows(rows.clone(), RosterColumn::Birthday, SortDirection::Asc);
        assert_eq!(asc.last().map(|row| row.full_name.as_str()), Some("Amy Zhu"));
        assert_eq!(asc[0].full_name, "Cleo Park");

        let desc = sort_rows(rows, RosterColumn::Birthday, SortDirection::Desc);
        assert_eq!(
            desc.last().map(|row| row.full_name.as_str()),
            Some("Amy Zhu")
        );
        assert_eq!(desc[0].full_name, "Bob Smith");
    }

    #[test]
    fn view_filter_then_clear_rebuilds_from_source() {
        let mut view = RosterView::new(sample_people());

        view.change_filter("amy");
        assert!(view.searching());
        assert_eq!(names(&view), vec!["Amy Zhu"]);

        view.change_filter("");
        assert!(!view.searching());
        assert_eq!(names(&view), vec!["Amy Zhu", "Bob Smith"]);
    }

    #[test]
    fn view_whitespace_needle_clears_search() {
        let mut view = RosterView::new(sample_people());
        view.change_filter("bob");
        view.change_filter("   ");
        assert!(!view.searching());
        assert_eq!(view.rows().len(), 2);
    }

    #[test]
    fn view_shortening_the_needle_does_not_widen_until_cleared() {
        let mut view = RosterView::new(vec![
            patient(1, "Amy Zhu", ""),
            patient(2, "Amir Khan", ""),
        ]);

        view.change_filter("am");
        assert_eq!(view.rows().len(), 2);
        view.change_filter("amy");
        assert_eq!(names(&view), vec!["Amy Zhu"]);
        // The narrower list is what gets searched next.
        view.change_filter("am");
        assert_eq!(names(&view), vec!["Amy Zhu"]);
        view.change_filter("");
        assert_eq!(view.rows().len(), 2);
    }

    #[test]
    fn header_click_starts_desc_then_toggles_and_clears_other_columns() {
        let mut view = RosterView::new(sample_people());

        assert_eq!(view.cycle_sort(RosterColumn::Birthday), SortDirection::Desc);
        assert_eq!(
            view.sort_indicator(RosterColumn::Birthday),
            Some(SortDirection::Desc)
        );

        assert_eq!(view.cycle_sort(RosterColumn::Birthday), SortDirection::Asc);
        assert_eq!(
            view.sort_indicator(RosterColumn::Birthday),
            Some(SortDirection::Asc)
        );

        assert_eq!(view.cycle_sort(RosterColumn::FullName), SortDirection::Desc);
        assert_eq!(
            view.sort_indicator(RosterColumn::FullName),
            Some(SortDirection::Desc)
        );
        assert_eq!(view.sort_indicator(RosterColumn::Birthday), None);
    }

    #[test]
    fn sort_applies_to_the_filtered_list() {
        let mut view = RosterView::new(vec![
            patient(1, "Amy Zhu", "1985-12-24"),
            patient(2, "Amir Khan", "1990-05-01"),
            patient(3, "Bob Smith", "1971-11-30"),
        ]);

        view.change_filter("am");
        view.cycle_sort(RosterColumn::Birthday);
        assert_eq!(names(&view), vec!["Amir Khan", "Amy Zhu"]);
    }

    #[test]
    fn hidden_names_with_no_search_render_zero_rows_but_keep_state() {
        let mut view = RosterView::new(sample_people());

        assert!(!view.toggle_show_names());
        assert!(view.visible_rows().is_empty());
        assert_eq!(view.rows().len(), 2);

        view.change_filter("amy");
        assert_eq!(view.visible_rows().len(), 1);

        view.change_filter("");
        assert!(view.visible_rows().is_empty());

        assert!(view.toggle_show_names());
        assert_eq!(view.visible_rows().len(), 2);
    }

    #[test]
    fn source_change_rebuilds_but_keeps_axis_flags() {
        let mut view = RosterView::new(sample_people());
        view.change_filter("amy");
        view.cycle_sort(RosterColumn::FullName);

        let mut replacement = vec![
            patient(4, "Dana Reyes", "2002-02-02"),
            patient(5, "Cleo Park", ""),
        ];
        replacement[0].link.clear();
        view.set_people(replacement);

        // Fresh unsorted, unfiltered list; the stale flags stay set.
        assert_eq!(names(&view), vec!["Cleo Park", "Dana Reyes"]);
        assert!(view.searching());
        assert_eq!(
            view.sort_indicator(RosterColumn::FullName),
            Some(SortDirection::Desc)
        );
        assert_eq!(view.rows()[1].link, "#/patients/4/data");
    }
}
