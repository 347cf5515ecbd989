use super::{optional_str, required_str, Fields, NewRow, StoredRecord, TableModel};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde_json::Value as JsonValue;
use std::fmt;

pub const PROJECTS_TABLE: &str = "projects";

/// Lifecycle marker of a project. Set once at creation; nothing here advances it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectStatus {
    Todo,
    InProgress,
    Done,
    /// Any other value an operator typed into the store.
    Other(String),
}

impl ProjectStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ProjectStatus::Todo => "Todo",
            ProjectStatus::InProgress => "In progress",
            ProjectStatus::Done => "Done",
            ProjectStatus::Other(s) => s,
        }
    }
}

impl From<&str> for ProjectStatus {
    fn from(s: &str) -> Self {
        match s {
            "Todo" => ProjectStatus::Todo,
            "In progress" => ProjectStatus::InProgress,
            "Done" => ProjectStatus::Done,
            other => ProjectStatus::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Name used when the shopkeeper does not supply one.
pub fn default_project_name(now: DateTime<Utc>) -> String {
    format!("Project {}", now.format("%Y-%m-%d"))
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewProject {
    pub id: String,
    pub name: String,
    pub status: ProjectStatus,
    pub created_at: DateTime<Utc>,
}

impl NewProject {
    /// A freshly created project: `Todo`, stamped `now`, blank names replaced by the default.
    pub fn new(id: String, name: Option<&str>, now: DateTime<Utc>) -> Self {
        let name = match name.map(str::trim) {
            Some(n) if !n.is_empty() => n.to_string(),
            _ => default_project_name(now),
        };
        Self {
            id,
            name,
            status: ProjectStatus::Todo,
            created_at: now,
        }
    }
}

impl NewRow for NewProject {
    const TABLE: &'static str = PROJECTS_TABLE;

    fn to_fields(&self) -> Fields {
        let mut fields = Fields::new();
        fields.insert("id".into(), JsonValue::from(self.id.clone()));
        fields.insert("name".into(), JsonValue::from(self.name.clone()));
        fields.insert("status".into(), JsonValue::from(self.status.as_str()));
        fields.insert(
            "createdAt".into(),
            JsonValue::from(self.created_at.to_rfc3339_opts(SecondsFormat::Secs, true)),
        );
        fields
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    pub id: String,
    /// Store handle used only for linking products; never sent to clients.
    pub internal_ref: String,
    pub name: String,
    pub status: ProjectStatus,
    pub created_at: DateTime<Utc>,
}

impl TableModel for Project {
    const TABLE: &'static str = PROJECTS_TABLE;

    fn from_record(record: &StoredRecord) -> Result<Self, String> {
        let fields = &record.fields;
        let id = required_str(fields, "id")?.to_string();
        let name = optional_str(fields, "name").unwrap_or_default();
        let status = optional_str(fields, "status")
            .map(|s| ProjectStatus::from(s.as_str()))
            .unwrap_or(ProjectStatus::Todo);
        let created_at = optional_str(fields, "createdAt")
            .and_then(|s| parse_timestamp(&s))
            .or_else(|| record.created_time.as_deref().and_then(parse_timestamp))
            .ok_or_else(|| format!("project '{}' has no readable createdAt", id))?;

        Ok(Self {
            id,
            internal_ref: record.id.clone(),
            name,
            status,
            created_at,
        })
    }
}

/// Accepts full RFC 3339 instants and the date-only values older rows carry.
fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}
