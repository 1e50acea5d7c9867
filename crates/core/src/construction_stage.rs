//! Construction stage field rules, duration derivation and update merging.
//!
//! Request bodies are mapped into a [`StageInput`] field by field. A create
//! runs the full rule set through [`StageInput::validate`]; an update only
//! checks the status and then resolves a [`StagePatch`] against the stored
//! schedule so the derived duration never goes stale.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{DateTime, Datelike, NaiveDateTime, Utc};
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::CoreError;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum length of a stage name, in characters.
pub const MAX_NAME_LENGTH: usize = 255;

/// Maximum length of an external correlation id, in characters.
pub const MAX_EXTERNAL_ID_LENGTH: usize = 255;

/// Accepted color form: `#RRGGBB`.
pub const HEX_COLOR_PATTERN: &str = r"^#[0-9a-fA-F]{6}$";

static HEX_COLOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(HEX_COLOR_PATTERN).expect("valid regex"));

/// Layout of a `Z`-suffixed timestamp once the suffix is stripped.
const UTC_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Layouts accepted for timestamps carrying a numeric offset.
const OFFSET_TIMESTAMP_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%z", "%Y-%m-%dT%H:%M:%S%:z"];

pub const NAME_MESSAGE: &str =
    "Name is required and must be a maximum of 255 characters in length.";
pub const START_DATE_MESSAGE: &str =
    "Start date must be a valid date and time in ISO8601 format (e.g. 2022-12-31T14:59:00Z).";
pub const END_DATE_MESSAGE: &str =
    "End date must be a valid date and time that is later than the start date.";
pub const DURATION_UNIT_MESSAGE: &str = "Duration unit must be one of HOURS, DAYS, or WEEKS.";
pub const COLOR_MESSAGE: &str = "Color must be a valid HEX color code (e.g. #FF0000).";
pub const EXTERNAL_ID_MESSAGE: &str =
    "External ID must be a maximum of 255 characters in length.";
pub const STATUS_MESSAGE: &str =
    "Status is required and must be one of NEW, PLANNED, or DELETED.";
pub const UPDATE_STATUS_MESSAGE: &str =
    "Invalid status value. Status must be NEW, PLANNED or DELETED.";
pub const BODY_NOT_OBJECT_MESSAGE: &str = "Request body must be a JSON object.";

// ---------------------------------------------------------------------------
// Enumerations
// ---------------------------------------------------------------------------

/// Granularity of the derived `duration` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DurationUnit {
    Hours,
    #[default]
    Days,
    Weeks,
}

impl DurationUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hours => "HOURS",
            Self::Days => "DAYS",
            Self::Weeks => "WEEKS",
        }
    }
}

impl FromStr for DurationUnit {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "HOURS" => Ok(Self::Hours),
            "DAYS" => Ok(Self::Days),
            "WEEKS" => Ok(Self::Weeks),
            _ => Err(CoreError::Validation(DURATION_UNIT_MESSAGE.to_string())),
        }
    }
}

impl TryFrom<String> for DurationUnit {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for DurationUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle marker of a stage. `Deleted` is the soft-delete flag and is not
/// terminal: any status may be set from any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StageStatus {
    #[default]
    New,
    Planned,
    Deleted,
}

impl StageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "NEW",
            Self::Planned => "PLANNED",
            Self::Deleted => "DELETED",
        }
    }
}

impl FromStr for StageStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NEW" => Ok(Self::New),
            "PLANNED" => Ok(Self::Planned),
            "DELETED" => Ok(Self::Deleted),
            _ => Err(CoreError::Validation(STATUS_MESSAGE.to_string())),
        }
    }
}

impl TryFrom<String> for StageStatus {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Timestamps and duration
// ---------------------------------------------------------------------------

/// Parse an ISO-8601 timestamp with second precision, e.g.
/// `2022-12-31T14:59:00Z` or `2022-12-31T15:59:00+01:00`. The result is UTC.
///
/// The year must be exactly four digits, both as written and once shifted to
/// UTC. chrono's `%Y` also takes signed and longer years, which the store
/// cannot format back.
pub fn parse_timestamp(value: &str) -> Option<Timestamp> {
    if !has_four_digit_year(value) {
        return None;
    }
    let parsed = match value.strip_suffix('Z') {
        Some(naive) => NaiveDateTime::parse_from_str(naive, UTC_TIMESTAMP_FORMAT)
            .ok()
            .map(|dt| dt.and_utc()),
        None => OFFSET_TIMESTAMP_FORMATS
            .iter()
            .find_map(|format| DateTime::parse_from_str(value, format).ok())
            .map(|dt| dt.with_timezone(&Utc)),
    }?;
    (0..=9999).contains(&parsed.year()).then_some(parsed)
}

fn has_four_digit_year(value: &str) -> bool {
    match value.as_bytes() {
        [y0, y1, y2, y3, b'-', ..] => [y0, y1, y2, y3].iter().all(|b| b.is_ascii_digit()),
        _ => false,
    }
}

/// Derive the stored `duration` for a start/end pair.
///
/// Returns `None` when there is no end date. The elapsed interval is taken
/// as an absolute value and measured in:
///
/// - `Hours`: whole hours elapsed.
/// - `Days`: whole days elapsed.
/// - `Weeks`: `whole_days / 7 * 24`. This is not a week count; existing
///   clients depend on the figure, so it is kept as is.
///
/// The result is rounded to the nearest integer.
pub fn compute_duration(
    start: Timestamp,
    end: Option<Timestamp>,
    unit: DurationUnit,
) -> Option<f64> {
    let end = end?;
    let elapsed = (end - start).abs();
    let days = elapsed.num_days();

    let duration = match unit {
        DurationUnit::Hours => elapsed.num_hours() as f64,
        DurationUnit::Weeks => days as f64 / 7.0 * 24.0,
        DurationUnit::Days => days as f64,
    };

    Some(duration.round())
}

// ---------------------------------------------------------------------------
// Input mapping
// ---------------------------------------------------------------------------

/// Raw stage fields as supplied by a client. Every field is optional here;
/// which ones are required depends on the operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageInput {
    pub name: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub duration_unit: Option<String>,
    pub color: Option<String>,
    pub external_id: Option<String>,
    pub status: Option<String>,
    /// Body keys that held an array or object. Those fields fail their rule
    /// instead of being read as absent.
    pub malformed: Vec<&'static str>,
}

impl StageInput {
    /// Map a JSON request body into stage fields.
    pub fn from_value(body: &Value) -> Result<Self, CoreError> {
        let fields = body
            .as_object()
            .ok_or_else(|| CoreError::Validation(BODY_NOT_OBJECT_MESSAGE.to_string()))?;
        Ok(Self::from_fields(fields))
    }

    /// Copy the known keys out of a generic key/value map. Unknown keys and
    /// `duration` (always derived) are ignored; `null` counts as absent.
    /// Numbers and booleans are kept as their JSON text.
    pub fn from_fields(fields: &Map<String, Value>) -> Self {
        let mut malformed = Vec::new();
        let mut text = |key: &'static str| match fields.get(key) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            Some(Value::Bool(b)) => Some(b.to_string()),
            Some(Value::Array(_) | Value::Object(_)) => {
                malformed.push(key);
                None
            }
        };

        let name = text("name");
        let start_date = text("startDate");
        let end_date = text("endDate");
        let duration_unit = text("durationUnit");
        let color = text("color");
        let external_id = text("externalId");
        let status = text("status");

        Self {
            name,
            start_date,
            end_date,
            duration_unit,
            color,
            external_id,
            status,
            malformed,
        }
    }

    /// Fail with `message` if `key` held a non-scalar value.
    fn require_scalar(&self, key: &str, message: &str) -> Result<(), CoreError> {
        if self.malformed.iter().any(|k| *k == key) {
            return Err(CoreError::Validation(message.to_string()));
        }
        Ok(())
    }

    /// Run the full create rule set. The first failing rule wins.
    pub fn validate(&self) -> Result<NewStage, CoreError> {
        let name = match &self.name {
            Some(name) if name.chars().count() <= MAX_NAME_LENGTH => name.clone(),
            _ => return Err(CoreError::Validation(NAME_MESSAGE.to_string())),
        };

        let start_date = self
            .start_date
            .as_deref()
            .and_then(parse_timestamp)
            .ok_or_else(|| CoreError::Validation(START_DATE_MESSAGE.to_string()))?;

        self.require_scalar("endDate", END_DATE_MESSAGE)?;
        let end_date = match self.end_date.as_deref() {
            None => None,
            Some(raw) => match parse_timestamp(raw) {
                Some(end) if end > start_date => Some(end),
                _ => return Err(CoreError::Validation(END_DATE_MESSAGE.to_string())),
            },
        };

        self.require_scalar("durationUnit", DURATION_UNIT_MESSAGE)?;
        let duration_unit = match self.duration_unit.as_deref() {
            None => DurationUnit::default(),
            Some(raw) => raw.parse()?,
        };

        self.require_scalar("color", COLOR_MESSAGE)?;
        if let Some(color) = &self.color {
            if !HEX_COLOR_RE.is_match(color) {
                return Err(CoreError::Validation(COLOR_MESSAGE.to_string()));
            }
        }

        self.require_scalar("externalId", EXTERNAL_ID_MESSAGE)?;
        if let Some(external_id) = &self.external_id {
            if external_id.chars().count() > MAX_EXTERNAL_ID_LENGTH {
                return Err(CoreError::Validation(EXTERNAL_ID_MESSAGE.to_string()));
            }
        }

        self.require_scalar("status", STATUS_MESSAGE)?;
        let status = match self.status.as_deref() {
            None => StageStatus::default(),
            Some(raw) => raw.parse()?,
        };

        Ok(NewStage {
            name,
            start_date,
            end_date,
            duration_unit,
            color: self.color.clone(),
            external_id: self.external_id.clone(),
            status,
        })
    }

    /// Check only the status field, as the update path does.
    pub fn validate_status_only(&self) -> Result<Option<StageStatus>, CoreError> {
        self.require_scalar("status", UPDATE_STATUS_MESSAGE)?;
        self.status
            .as_deref()
            .map(|raw| {
                raw.parse()
                    .map_err(|_| CoreError::Validation(UPDATE_STATUS_MESSAGE.to_string()))
            })
            .transpose()
    }

    /// Merge the supplied fields over an existing stage's schedule.
    ///
    /// Omitted schedule fields fall back to the stored ones and the duration
    /// is recomputed from the effective triple. Date ordering is not checked
    /// here; supplied dates only have to parse.
    pub fn resolve_patch(&self, existing: &StageSchedule) -> Result<StagePatch, CoreError> {
        let status = self.validate_status_only()?;
        self.require_scalar("startDate", START_DATE_MESSAGE)?;
        self.require_scalar("endDate", END_DATE_MESSAGE)?;
        self.require_scalar("durationUnit", DURATION_UNIT_MESSAGE)?;
        self.require_scalar("name", NAME_MESSAGE)?;
        self.require_scalar("color", COLOR_MESSAGE)?;
        self.require_scalar("externalId", EXTERNAL_ID_MESSAGE)?;

        let start_date = self
            .start_date
            .as_deref()
            .map(|raw| {
                parse_timestamp(raw)
                    .ok_or_else(|| CoreError::Validation(START_DATE_MESSAGE.to_string()))
            })
            .transpose()?;
        let end_date = self
            .end_date
            .as_deref()
            .map(|raw| {
                parse_timestamp(raw)
                    .ok_or_else(|| CoreError::Validation(END_DATE_MESSAGE.to_string()))
            })
            .transpose()?;
        let duration_unit = self
            .duration_unit
            .as_deref()
            .map(str::parse::<DurationUnit>)
            .transpose()?;

        let effective = StageSchedule {
            start_date: start_date.unwrap_or(existing.start_date),
            end_date: end_date.or(existing.end_date),
            duration_unit: duration_unit.unwrap_or(existing.duration_unit),
        };

        Ok(StagePatch {
            name: self.name.clone(),
            start_date,
            end_date,
            duration: effective.duration(),
            duration_unit,
            color: self.color.clone(),
            external_id: self.external_id.clone(),
            status,
        })
    }
}

// ---------------------------------------------------------------------------
// Normalized results
// ---------------------------------------------------------------------------

/// A fully validated stage ready to insert, with defaults applied.
#[derive(Debug, Clone, PartialEq)]
pub struct NewStage {
    pub name: String,
    pub start_date: Timestamp,
    pub end_date: Option<Timestamp>,
    pub duration_unit: DurationUnit,
    pub color: Option<String>,
    pub external_id: Option<String>,
    pub status: StageStatus,
}

impl NewStage {
    pub fn duration(&self) -> Option<f64> {
        compute_duration(self.start_date, self.end_date, self.duration_unit)
    }
}

/// The fields the derived duration depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageSchedule {
    pub start_date: Timestamp,
    pub end_date: Option<Timestamp>,
    pub duration_unit: DurationUnit,
}

impl StageSchedule {
    pub fn duration(&self) -> Option<f64> {
        compute_duration(self.start_date, self.end_date, self.duration_unit)
    }
}

/// Column values for a partial update. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StagePatch {
    pub name: Option<String>,
    pub start_date: Option<Timestamp>,
    pub end_date: Option<Timestamp>,
    pub duration: Option<f64>,
    pub duration_unit: Option<DurationUnit>,
    pub color: Option<String>,
    pub external_id: Option<String>,
    pub status: Option<StageStatus>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
