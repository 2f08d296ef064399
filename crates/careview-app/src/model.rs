// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::ids::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TabKind {
    Patients,
    Invitations,
    Basics,
}

impl TabKind {
    pub const ALL: [Self; 3] = [Self::Patients, Self::Invitations, Self::Basics];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Patients => "patients",
            Self::Invitations => "invites",
            Self::Basics => "basics",
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Patients => "patients",
            Self::Invitations => "invitations",
            Self::Basics => "basics",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "patients" => Some(Self::Patients),
            "invitations" => Some(Self::Invitations),
            "basics" => Some(Self::Basics),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppMode {
    Nav,
    Search,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub const fn reverse(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RosterColumn {
    FullName,
    Birthday,
    LastUpload,
}

impl RosterColumn {
    pub const ALL: [Self; 3] = [Self::FullName, Self::Birthday, Self::LastUpload];

    pub const fn header(self) -> &'static str {
        match self {
            Self::FullName => "NAME",
            Self::Birthday => "BIRTHDAY",
            Self::LastUpload => "LAST UPLOAD",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DeviceEventKind {
    Smbg,
    Cgm,
    Bolus,
    BasalRate,
    Upload,
}

impl DeviceEventKind {
    pub const ALL: [Self; 5] = [
        Self::Smbg,
        Self::Cgm,
        Self::Bolus,
        Self::BasalRate,
        Self::Upload,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Smbg => "smbg",
            Self::Cgm => "cgm",
            Self::Bolus => "bolus",
            Self::BasalRate => "basal_rate",
            Self::Upload => "upload",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "smbg" => Some(Self::Smbg),
            "cgm" => Some(Self::Cgm),
            "bolus" => Some(Self::Bolus),
            "basal_rate" => Some(Self::BasalRate),
            "upload" => Some(Self::Upload),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Smbg => "fingersticks",
            Self::Cgm => "cgm readings",
            Self::Bolus => "boluses",
            Self::BasalRate => "basal changes",
            Self::Upload => "uploads",
        }
    }

    /// Uploads mark device sync activity; only the other kinds count as
    /// chartable data.
    pub const fn is_chartable(self) -> bool {
        !matches!(self, Self::Upload)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SettingKey {
    UiShowNames,
    UiStartTab,
}

impl SettingKey {
    pub const ALL: [Self; 2] = [Self::UiShowNames, Self::UiStartTab];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UiShowNames => "ui.show_names",
            Self::UiStartTab => "ui.start_tab",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "ui.show_names" => Some(Self::UiShowNames),
            "ui.start_tab" => Some(Self::UiStartTab),
            _ => None,
        }
    }

    pub const fn expected_value_kind(self) -> SettingValueKind {
        match self {
            Self::UiShowNames => SettingValueKind::Bool,
            Self::UiStartTab => SettingValueKind::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingValueKind {
    Bool,
    Text,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SettingValue {
    Bool(bool),
    Text(String),
}

impl SettingValue {
    pub fn parse_for_key(key: SettingKey, raw: &str) -> Option<Self> {
        match key.expected_value_kind() {
            SettingValueKind::Bool => match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "on" | "yes" => Some(Self::Bool(true)),
                "0" | "false" | "off" | "no" => Some(Self::Bool(false)),
                _ => None,
            },
            SettingValueKind::Text => Some(Self::Text(raw.to_owned())),
        }
    }

    pub fn to_storage(&self, key: SettingKey) -> Option<String> {
        match (key.expected_value_kind(), self) {
            (SettingValueKind::Bool, Self::Bool(value)) => {
                Some(if *value { "true" } else { "false" }.to_owned())
            }
            (SettingValueKind::Text, Self::Text(value)) => Some(value.clone()),
            _ => None,
        }
    }
}

/// Sub-record present when a person shares device data. The `birthday` and
/// `diagnosis_date` fields hold the raw stored `YYYY-MM-DD` text exactly as
/// received; display formatting degrades malformed values instead of
/// rejecting them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PatientProfile {
    #[serde(default)]
    pub birthday: String,
    #[serde(default)]
    pub diagnosis_date: String,
    #[serde(default)]
    pub is_other_person: bool,
    #[serde(default)]
    pub full_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub patient: Option<PatientProfile>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonRecord {
    pub id: PersonId,
    pub profile: Profile,
    /// Navigation target for the detail view; empty until the roster layer
    /// derives it.
    #[serde(default)]
    pub link: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl PersonRecord {
    pub fn is_patient(&self) -> bool {
        self.profile.patient.is_some()
    }

    /// Resolved display name: the patient override wins when the record is
    /// managed on behalf of another person and the override is non-empty.
    pub fn patient_full_name(&self) -> &str {
        match &self.profile.patient {
            Some(patient) if patient.is_other_person && !patient.full_name.is_empty() => {
                &patient.full_name
            }
            _ => &self.profile.full_name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invitation {
    pub id: InvitationId,
    pub key: String,
    pub creator_name: String,
    pub creator_email: String,
    pub context: String,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceEvent {
    pub id: DeviceEventId,
    pub person_id: PersonId,
    pub kind: DeviceEventKind,
    pub occurred_at: OffsetDateTime,
    pub device: String,
}

#[cfg(test)]
mod tests {
    use super::{
        DeviceEventKind, PatientProfile, PersonRecord, Profile, SettingKey, SettingValue, TabKind,
    };
    use crate::PersonId;
    use time::OffsetDateTime;

    fn person(profile: Profile) -> PersonRecord {
        PersonRecord {
            id: PersonId::new(1),
            profile,
            link: String::new(),
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn patient_full_name_prefers_other_person_override() {
        let record = person(Profile {
            full_name: "Joan Carter".to_owned(),
            patient: Some(PatientProfile {
                is_other_person: true,
                full_name: "Sam Carter".to_owned(),
                ..PatientProfile::default()
            }),
        });
        assert_eq!(record.patient_full_name(), "Sam Carter");
    }

    #[test]
    fn patient_full_name_ignores_empty_override() {
        let record = person(Profile {
            full_name: "Joan Carter".to_owned(),
            patient: Some(PatientProfile {
                is_other_person: true,
                ..PatientProfile::default()
            }),
        });
        assert_eq!(record.patient_full_name(), "Joan Carter");
    }

    #[test]
    fn patient_full_name_ignores_override_for_own_account() {
        let record = person(Profile {
            full_name: "Joan Carter".to_owned(),
            patient: Some(PatientProfile {
                is_other_person: false,
                full_name: "Someone Else".to_owned(),
                ..PatientProfile::default()
            }),
        });
        assert_eq!(record.patient_full_name(), "Joan Carter");
    }

    #[test]
    fn device_event_kind_round_trips_through_storage_string() {
        for kind in DeviceEventKind::ALL {
            assert_eq!(DeviceEventKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(DeviceEventKind::parse("steps"), None);
    }

    #[test]
    fn only_uploads_are_excluded_from_chartable_data() {
        assert!(DeviceEventKind::Smbg.is_chartable());
        assert!(DeviceEventKind::Bolus.is_chartable());
        assert!(!DeviceEventKind::Upload.is_chartable());
    }

    #[test]
    fn tab_kind_round_trips_through_storage_string() {
        for tab in TabKind::ALL {
            assert_eq!(TabKind::parse(tab.as_str()), Some(tab));
        }
        assert_eq!(TabKind::parse("dashboard"), None);
    }

    #[test]
    fn bool_setting_parse_and_storage_round_trip() {
        let parsed = SettingValue::parse_for_key(SettingKey::UiShowNames, "true")
            .expect("parse true bool setting");
        assert_eq!(parsed, SettingValue::Bool(true));
        assert_eq!(
            parsed.to_storage(SettingKey::UiShowNames),
            Some("true".to_owned())
        );
    }

    #[test]
    fn mismatched_setting_value_type_rejected() {
        let text = SettingValue::Text("patients".to_owned());
        assert!(text.to_storage(SettingKey::UiShowNames).is_none());
    }
}
