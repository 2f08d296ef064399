// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use careview_app::{
    DeviceEvent, DeviceEventId, DeviceEventKind, Invitation, InvitationId, PatientProfile,
    PersonId, PersonRecord, Profile, SettingKey, SettingValue, TabKind,
};
use rusqlite::{Connection, OptionalExtension, params};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

pub const APP_NAME: &str = "careview";

const DEMO_SEED: u64 = 20_260_615;

const REQUIRED_SCHEMA: &[(&str, &[&str])] = &[
    (
        "people",
        &[
            "id",
            "full_name",
            "is_patient",
            "birthday",
            "diagnosis_date",
            "is_other_person",
            "patient_full_name",
            "created_at",
            "updated_at",
        ],
    ),
    (
        "invitations",
        &[
            "id",
            "invite_key",
            "creator_name",
            "creator_email",
            "context",
            "created_at",
        ],
    ),
    (
        "device_events",
        &["id", "person_id", "kind", "occurred_at", "device"],
    ),
    ("settings", &["key", "value", "updated_at"]),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RequiredIndex {
    name: &'static str,
    create_sql: &'static str,
}

const REQUIRED_INDEXES: &[RequiredIndex] = &[
    RequiredIndex {
        name: "idx_people_full_name",
        create_sql: "CREATE INDEX IF NOT EXISTS idx_people_full_name ON people (full_name);",
    },
    RequiredIndex {
        name: "idx_invitations_invite_key",
        create_sql: "CREATE UNIQUE INDEX IF NOT EXISTS idx_invitations_invite_key ON invitations (invite_key);",
    },
    RequiredIndex {
        name: "idx_device_events_person_id",
        create_sql: "CREATE INDEX IF NOT EXISTS idx_device_events_person_id ON device_events (person_id);",
    },
    RequiredIndex {
        name: "idx_device_events_occurred_at",
        create_sql: "CREATE INDEX IF NOT EXISTS idx_device_events_occurred_at ON device_events (occurred_at);",
    },
];

/// Incoming person record, either hand-built or decoded from a roster
/// import file. Birthday text is stored verbatim; the display layer is
/// responsible for degrading malformed values.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewPerson {
    pub full_name: String,
    #[serde(default)]
    pub patient: Option<NewPatientProfile>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct NewPatientProfile {
    #[serde(default)]
    pub birthday: String,
    #[serde(default)]
    pub diagnosis_date: String,
    #[serde(default)]
    pub is_other_person: bool,
    #[serde(default)]
    pub full_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInvitation {
    pub key: String,
    pub creator_name: String,
    pub creator_email: String,
    pub context: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDeviceEvent {
    pub person_id: PersonId,
    pub kind: DeviceEventKind,
    pub occurred_at: OffsetDateTime,
    pub device: String,
}

pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        let printable = path.to_string_lossy().to_string();
        validate_db_path(&printable)?;
        let conn = Connection::open(path)
            .with_context(|| format!("open database at {}", path.display()))?;
        configure_connection(&conn)?;
        if printable != ":memory:" {
            set_private_permissions(path)?;
        }
        Ok(Self { conn })
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory database")?;
        configure_connection(&conn)?;
        Ok(Self { conn })
    }

    pub fn raw_connection(&self) -> &Connection {
        &self.conn
    }

    pub fn bootstrap(&self) -> Result<()> {
        if has_user_tables(&self.conn)? {
            validate_schema(&self.conn)?;
        } else {
            self.conn
                .execute_batch(include_str!("sql/schema.sql"))
                .context("create schema")?;
        }

        ensure_required_indexes(&self.conn)?;
        Ok(())
    }

    pub fn create_person(&self, person: &NewPerson) -> Result<PersonId> {
        if person.full_name.trim().is_empty() {
            bail!("person full name is required");
        }

        let now = now_rfc3339()?;
        let patient = person.patient.clone().unwrap_or_default();
        self.conn
            .execute(
                "
                INSERT INTO people (
                  full_name, is_patient, birthday, diagnosis_date,
                  is_other_person, patient_full_name, created_at, updated_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                ",
                params![
                    person.full_name,
                    person.patient.is_some(),
                    patient.birthday,
                    patient.diagnosis_date,
                    patient.is_other_person,
                    patient.full_name,
                    now,
                    now,
                ],
            )
            .with_context(|| format!("insert person {}", person.full_name))?;
        Ok(PersonId::new(self.conn.last_insert_rowid()))
    }

    /// Refreshes the row matching on full name, or inserts a new one.
    /// Roster files are keyed by name, so the first match wins.
    pub fn upsert_person(&self, person: &NewPerson) -> Result<PersonId> {
        let existing: Option<i64> = self
            .conn
            .query_row(
                "SELECT id FROM people WHERE full_name = ? ORDER BY id ASC LIMIT 1",
                params![person.full_name],
                |row| row.get(0),
            )
            .optional()
            .with_context(|| format!("look up person {}", person.full_name))?;

        let Some(id) = existing else {
            return self.create_person(person);
        };

        let now = now_rfc3339()?;
        let patient = person.patient.clone().unwrap_or_default();
        self.conn
            .execute(
                "
                UPDATE people
                SET is_patient = ?, birthday = ?, diagnosis_date = ?,
                    is_other_person = ?, patient_full_name = ?, updated_at = ?
                WHERE id = ?
                ",
                params![
                    person.patient.is_some(),
                    patient.birthday,
                    patient.diagnosis_date,
                    patient.is_other_person,
                    patient.full_name,
                    now,
                    id,
                ],
            )
            .with_context(|| format!("update person {}", person.full_name))?;
        Ok(PersonId::new(id))
    }

    pub fn get_person(&self, person_id: PersonId) -> Result<PersonRecord> {
        self.conn
            .query_row(
                "
                SELECT id, full_name, is_patient, birthday, diagnosis_date,
                       is_other_person, patient_full_name, created_at, updated_at
                FROM people
                WHERE id = ?
                ",
                params![person_id.get()],
                person_from_row,
            )
            .optional()
            .with_context(|| format!("query person {}", person_id.get()))?
            .ok_or_else(|| anyhow!("person {} not found", person_id.get()))
    }

    pub fn list_people(&self) -> Result<Vec<PersonRecord>> {
        let mut stmt = self
            .conn
            .prepare(
                "
                SELECT id, full_name, is_patient, birthday, diagnosis_date,
                       is_other_person, patient_full_name, created_at, updated_at
                FROM people
                ORDER BY id ASC
                ",
            )
            .context("prepare people query")?;
        let rows = stmt.query_map([], person_from_row).context("query people")?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .context("collect people")
    }

    pub fn remove_person(&self, person_id: PersonId) -> Result<()> {
        let changed = self
            .conn
            .execute("DELETE FROM people WHERE id = ?", params![person_id.get()])
            .with_context(|| format!("delete person {}", person_id.get()))?;
        if changed == 0 {
            bail!("person {} not found", person_id.get());
        }
        Ok(())
    }

    pub fn create_invitation(&self, invitation: &NewInvitation) -> Result<InvitationId> {
        if invitation.key.trim().is_empty() {
            bail!("invitation key is required");
        }
        if invitation.creator_name.trim().is_empty() {
            bail!("invitation creator name is required");
        }

        let now = now_rfc3339()?;
        self.conn
            .execute(
                "
                INSERT INTO invitations (invite_key, creator_name, creator_email, context, created_at)
                VALUES (?, ?, ?, ?, ?)
                ",
                params![
                    invitation.key,
                    invitation.creator_name,
                    invitation.creator_email,
                    invitation.context,
                    now,
                ],
            )
            .with_context(|| format!("insert invitation {}", invitation.key))?;
        Ok(InvitationId::new(self.conn.last_insert_rowid()))
    }

    pub fn list_invitations(&self) -> Result<Vec<Invitation>> {
        let mut stmt = self
            .conn
            .prepare(
                "
                SELECT id, invite_key, creator_name, creator_email, context, created_at
                FROM invitations
                ORDER BY created_at DESC, id DESC
                ",
            )
            .context("prepare invitations query")?;
        let rows = stmt
            .query_map([], invitation_from_row)
            .context("query invitations")?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .context("collect invitations")
    }

    /// Accepting adds the invitation's creator as a shared person and
    /// removes the pending row in one transaction. The new record carries
    /// an empty patient sub-record until a roster refresh fills it in.
    pub fn accept_invitation(&self, invitation_id: InvitationId) -> Result<PersonId> {
        let tx = self
            .conn
            .unchecked_transaction()
            .context("begin accept transaction")?;

        let creator_name: String = tx
            .query_row(
                "SELECT creator_name FROM invitations WHERE id = ?",
                params![invitation_id.get()],
                |row| row.get(0),
            )
            .optional()
            .with_context(|| format!("query invitation {}", invitation_id.get()))?
            .ok_or_else(|| anyhow!("invitation {} not found", invitation_id.get()))?;

        let now = now_rfc3339()?;
        tx.execute(
            "
            INSERT INTO people (
              full_name, is_patient, birthday, diagnosis_date,
              is_other_person, patient_full_name, created_at, updated_at
            ) VALUES (?, 1, '', '', 0, '', ?, ?)
            ",
            params![creator_name, now, now],
        )
        .with_context(|| format!("insert person for invitation {}", invitation_id.get()))?;
        let person_id = PersonId::new(tx.last_insert_rowid());

        tx.execute(
            "DELETE FROM invitations WHERE id = ?",
            params![invitation_id.get()],
        )
        .with_context(|| format!("delete accepted invitation {}", invitation_id.get()))?;

        tx.commit().context("commit accept transaction")?;
        Ok(person_id)
    }

    pub fn dismiss_invitation(&self, invitation_id: InvitationId) -> Result<()> {
        let changed = self
            .conn
            .execute(
                "DELETE FROM invitations WHERE id = ?",
                params![invitation_id.get()],
            )
            .with_context(|| format!("delete invitation {}", invitation_id.get()))?;
        if changed == 0 {
            bail!("invitation {} not found", invitation_id.get());
        }
        Ok(())
    }

    pub fn record_device_event(&self, event: &NewDeviceEvent) -> Result<DeviceEventId> {
        let occurred_at = event
            .occurred_at
            .format(&Rfc3339)
            .context("format device event timestamp")?;
        self.conn
            .execute(
                "
                INSERT INTO device_events (person_id, kind, occurred_at, device)
                VALUES (?, ?, ?, ?)
                ",
                params![
                    event.person_id.get(),
                    event.kind.as_str(),
                    occurred_at,
                    event.device,
                ],
            )
            .with_context(|| format!("insert device event for person {}", event.person_id.get()))?;
        Ok(DeviceEventId::new(self.conn.last_insert_rowid()))
    }

    pub fn list_device_events(&self, person_id: PersonId) -> Result<Vec<DeviceEvent>> {
        let mut stmt = self
            .conn
            .prepare(
                "
                SELECT id, person_id, kind, occurred_at, device
                FROM device_events
                WHERE person_id = ?
                ORDER BY occurred_at ASC, id ASC
                ",
            )
            .context("prepare device events query")?;
        let rows = stmt
            .query_map(params![person_id.get()], device_event_from_row)
            .context("query device events")?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .context("collect device events")
    }

    /// Reads a JSON roster export (array of person records) and upserts
    /// every entry. Returns the number of records applied.
    pub fn import_roster(&self, path: &Path) -> Result<usize> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read roster file {}", path.display()))?;
        let roster: Vec<NewPerson> = serde_json::from_str(&raw)
            .with_context(|| format!("parse roster JSON {}", path.display()))?;

        for person in &roster {
            self.upsert_person(person)?;
        }
        Ok(roster.len())
    }

    pub fn seed_demo_data(&self) -> Result<()> {
        let mut faker = careview_testkit::RosterFaker::new(DEMO_SEED);

        let mut patient_ids = Vec::new();
        for person in faker.people(12) {
            let patient = person.is_patient.then_some(NewPatientProfile {
                birthday: person.birthday,
                diagnosis_date: person.diagnosis_date,
                is_other_person: person.is_other_person,
                full_name: person.patient_full_name,
            });
            let is_patient = patient.is_some();
            let id = self.create_person(&NewPerson {
                full_name: person.full_name,
                patient,
            })?;
            if is_patient {
                patient_ids.push(id);
            }
        }

        for invitation in faker.invitations(3) {
            self.create_invitation(&NewInvitation {
                key: invitation.key,
                creator_name: invitation.creator_name,
                creator_email: invitation.creator_email,
                context: invitation.context,
            })?;
        }

        for person_id in patient_ids.iter().take(4) {
            for event in faker.device_events(25) {
                let kind = DeviceEventKind::parse(&event.kind)
                    .ok_or_else(|| anyhow!("unknown demo device event kind {:?}", event.kind))?;
                self.record_device_event(&NewDeviceEvent {
                    person_id: *person_id,
                    kind,
                    occurred_at: event.occurred_at,
                    device: event.device,
                })?;
            }
        }

        Ok(())
    }

    pub fn get_setting_raw(&self, key: &str) -> Result<Option<String>> {
        self.conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .with_context(|| format!("query setting {key}"))
    }

    pub fn put_setting_raw(&self, key: &str, value: &str) -> Result<()> {
        let now = now_rfc3339()?;
        self.conn
            .execute(
                "
                INSERT INTO settings (key, value, updated_at)
                VALUES (?, ?, ?)
                ON CONFLICT (key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
                ",
                params![key, value, now],
            )
            .with_context(|| format!("store setting {key}"))?;
        Ok(())
    }

    pub fn get_show_names_override(&self) -> Result<Option<bool>> {
        let Some(raw) = self.get_setting_raw(SettingKey::UiShowNames.as_str())? else {
            return Ok(None);
        };
        match SettingValue::parse_for_key(SettingKey::UiShowNames, &raw) {
            Some(SettingValue::Bool(value)) => Ok(Some(value)),
            _ => bail!(
                "setting {} holds invalid value {raw:?}; set a valid value and retry",
                SettingKey::UiShowNames.as_str()
            ),
        }
    }

    pub fn put_show_names(&self, show: bool) -> Result<()> {
        let value = SettingValue::Bool(show)
            .to_storage(SettingKey::UiShowNames)
            .ok_or_else(|| anyhow!("show names setting must be a bool"))?;
        self.put_setting_raw(SettingKey::UiShowNames.as_str(), &value)
    }

    pub fn get_start_tab_override(&self) -> Result<Option<TabKind>> {
        let Some(raw) = self.get_setting_raw(SettingKey::UiStartTab.as_str())? else {
            return Ok(None);
        };
        match TabKind::parse(&raw) {
            Some(tab) => Ok(Some(tab)),
            None => bail!(
                "setting {} holds invalid tab {raw:?}; expected one of patients, invitations, basics",
                SettingKey::UiStartTab.as_str()
            ),
        }
    }

    pub fn put_start_tab(&self, tab: TabKind) -> Result<()> {
        self.put_setting_raw(SettingKey::UiStartTab.as_str(), tab.as_str())
    }
}

fn person_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PersonRecord> {
    let id: i64 = row.get(0)?;
    let full_name: String = row.get(1)?;
    let is_patient: bool = row.get(2)?;
    let birthday: String = row.get(3)?;
    let diagnosis_date: String = row.get(4)?;
    let is_other_person: bool = row.get(5)?;
    let patient_full_name: String = row.get(6)?;
    let created_at: String = row.get(7)?;
    let updated_at: String = row.get(8)?;

    let patient = is_patient.then_some(PatientProfile {
        birthday,
        diagnosis_date,
        is_other_person,
        full_name: patient_full_name,
    });

    Ok(PersonRecord {
        id: PersonId::new(id),
        profile: Profile {
            full_name,
            patient,
        },
        link: String::new(),
        created_at: parse_datetime(&created_at).map_err(to_sql_error)?,
        updated_at: parse_datetime(&updated_at).map_err(to_sql_error)?,
    })
}

fn invitation_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Invitation> {
    let id: i64 = row.get(0)?;
    let key: String = row.get(1)?;
    let creator_name: String = row.get(2)?;
    let creator_email: String = row.get(3)?;
    let context: String = row.get(4)?;
    let created_at: String = row.get(5)?;

    Ok(Invitation {
        id: InvitationId::new(id),
        key,
        creator_name,
        creator_email,
        context,
        created_at: parse_datetime(&created_at).map_err(to_sql_error)?,
    })
}

fn device_event_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<DeviceEvent> {
    let id: i64 = row.get(0)?;
    let person_id: i64 = row.get(1)?;
    let kind: String = row.get(2)?;
    let occurred_at: String = row.get(3)?;
    let device: String = row.get(4)?;

    let kind = DeviceEventKind::parse(&kind)
        .ok_or_else(|| anyhow!("unknown device event kind {kind:?}"))
        .map_err(to_sql_error)?;

    Ok(DeviceEvent {
        id: DeviceEventId::new(id),
        person_id: PersonId::new(person_id),
        kind,
        occurred_at: parse_datetime(&occurred_at).map_err(to_sql_error)?,
        device,
    })
}

pub fn default_db_path() -> Result<PathBuf> {
    if let Some(override_path) = env::var_os("CAREVIEW_DB_PATH") {
        return Ok(PathBuf::from(override_path));
    }

    let data_root = dirs::data_local_dir().ok_or_else(|| {
        anyhow!("cannot resolve data directory; set CAREVIEW_DB_PATH to a writable database path")
    })?;

    let app_dir = data_root.join(APP_NAME);
    fs::create_dir_all(&app_dir)
        .with_context(|| format!("create data directory {}", app_dir.display()))?;
    Ok(app_dir.join("careview.db"))
}

pub fn validate_db_path(path: &str) -> Result<()> {
    if path.is_empty() {
        bail!("database path must not be empty");
    }
    if path == ":memory:" {
        return Ok(());
    }

    if let Some(index) = path.find("://")
        && index > 0
    {
        let scheme = &path[..index];
        if scheme.chars().all(char::is_alphabetic) {
            bail!(
                "database path {path:?} looks like a URI ({scheme}://); pass a filesystem path instead"
            );
        }
    }

    if path.starts_with("file:") {
        bail!("database path {path:?} uses file: URI syntax; pass a plain filesystem path");
    }

    if path.contains('?') {
        bail!(
            "database path {path:?} contains '?'; remove query parameters and use a plain file path"
        );
    }

    Ok(())
}

fn has_user_tables(conn: &Connection) -> Result<bool> {
    let count: i64 = conn
        .query_row(
            "
            SELECT COUNT(*)
            FROM sqlite_master
            WHERE type = 'table'
              AND name NOT LIKE 'sqlite_%'
            ",
            [],
            |row| row.get(0),
        )
        .context("count user tables")?;
    Ok(count > 0)
}

fn validate_schema(conn: &Connection) -> Result<()> {
    for (table, required_columns) in REQUIRED_SCHEMA {
        if !table_exists(conn, table)? {
            bail!(
                "database is missing required table `{table}`; use a careview-compatible database or migrate first"
            );
        }

        let columns = table_columns(conn, table)?;
        let missing: Vec<&str> = required_columns
            .iter()
            .copied()
            .filter(|column| !columns.contains(*column))
            .collect();

        if !missing.is_empty() {
            bail!(
                "table `{table}` is missing required columns: {}; run migration before launching",
                missing.join(", ")
            );
        }
    }

    Ok(())
}

fn ensure_required_indexes(conn: &Connection) -> Result<()> {
    for index in REQUIRED_INDEXES {
        conn.execute_batch(index.create_sql)
            .with_context(|| format!("ensure required index `{}`", index.name))?;
    }

    let existing_indexes = index_names(conn)?;
    let missing = REQUIRED_INDEXES
        .iter()
        .filter(|index| !existing_indexes.contains(index.name))
        .map(|index| index.name)
        .collect::<Vec<_>>();
    if !missing.is_empty() {
        bail!(
            "database is missing required indexes: {}; run migration before launching",
            missing.join(", ")
        );
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
    let exists = conn
        .query_row(
            "
            SELECT EXISTS(
              SELECT 1
              FROM sqlite_master
              WHERE type = 'table' AND name = ?
            )
            ",
            params![table],
            |row| row.get::<_, i64>(0),
        )
        .with_context(|| format!("check table existence for {table}"))?;
    Ok(exists == 1)
}

fn table_columns(conn: &Connection, table: &str) -> Result<BTreeSet<String>> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({table})"))
        .with_context(|| format!("inspect columns for {table}"))?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(1))
        .with_context(|| format!("query column info for {table}"))?;

    let names = rows
        .collect::<rusqlite::Result<BTreeSet<_>>>()
        .with_context(|| format!("collect columns for {table}"))?;
    Ok(names)
}

fn index_names(conn: &Connection) -> Result<BTreeSet<String>> {
    let mut stmt = conn
        .prepare(
            "
            SELECT name
            FROM sqlite_master
            WHERE type = 'index'
              AND name NOT LIKE 'sqlite_%'
            ORDER BY name ASC
            ",
        )
        .context("prepare index names query")?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .context("query index names")?;
    rows.collect::<rusqlite::Result<BTreeSet<_>>>()
        .context("collect index names")
}

fn configure_connection(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        PRAGMA foreign_keys = ON;
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA busy_timeout = 5000;
        ",
    )
    .context("configure sqlite pragmas")
}

fn now_rfc3339() -> Result<String> {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .context("format current timestamp")
}

fn parse_datetime(raw: &str) -> Result<OffsetDateTime> {
    if let Ok(value) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Ok(value);
    }

    if let Ok(value) = PrimitiveDateTime::parse(
        raw,
        &format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]"),
    ) {
        return Ok(value.assume_utc());
    }

    if let Ok(value) = PrimitiveDateTime::parse(
        raw,
        &format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    ) {
        return Ok(value.assume_utc());
    }

    if let Ok(value) = PrimitiveDateTime::parse(
        raw,
        &format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    ) {
        return Ok(value.assume_utc());
    }

    bail!("unsupported datetime format {raw:?}")
}

fn to_sql_error(error: anyhow::Error) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        0,
        rusqlite::types::Type::Text,
        Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            error.to_string(),
        )),
    )
}

fn set_private_permissions(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        if let Ok(metadata) = fs::metadata(path) {
            let mut permissions = metadata.permissions();
            permissions.set_mode(0o600);
            fs::set_permissions(path, permissions)
                .with_context(|| format!("set permissions on {}", path.display()))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::Store;
    use anyhow::Result;
    use careview_app::TabKind;

    #[test]
    fn settings_default_to_absent() -> Result<()> {
        let store = Store::open_memory()?;
        store.bootstrap()?;

        assert_eq!(store.get_show_names_override()?, None);
        assert_eq!(store.get_start_tab_override()?, None);
        Ok(())
    }

    #[test]
    fn typed_settings_round_trip() -> Result<()> {
        let store = Store::open_memory()?;
        store.bootstrap()?;

        store.put_show_names(false)?;
        store.put_start_tab(TabKind::Invitations)?;

        assert_eq!(store.get_show_names_override()?, Some(false));
        assert_eq!(
            store.get_start_tab_override()?,
            Some(TabKind::Invitations)
        );
        Ok(())
    }

    #[test]
    fn invalid_setting_value_is_actionable() -> Result<()> {
        let store = Store::open_memory()?;
        store.bootstrap()?;

        store.put_setting_raw("ui.show_names", "maybe")?;
        let error = store
            .get_show_names_override()
            .expect_err("invalid bool should be rejected");
        assert!(error.to_string().contains("set a valid value"));
        Ok(())
    }
}
