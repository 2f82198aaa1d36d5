use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::entity::time_entry::Model as TimeEntryModel;
use crate::model::global_error::{AppError, ErrorCode};
use crate::model::schedule::ScheduleSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Day {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl Day {
    pub const ALL: [Day; 7] = [Day::Mon, Day::Tue, Day::Wed, Day::Thu, Day::Fri, Day::Sat, Day::Sun];

    pub fn as_str(&self) -> &'static str {
        match self {
            Day::Mon => "mon",
            Day::Tue => "tue",
            Day::Wed => "wed",
            Day::Thu => "thu",
            Day::Fri => "fri",
            Day::Sat => "sat",
            Day::Sun => "sun",
        }
    }

    /// Lowercases and keeps the first three characters, so "Monday" and "MON" both resolve.
    pub fn parse(raw: &str) -> Result<Day, AppError> {
        let key: String = raw.to_lowercase().chars().take(3).collect();

        Day::ALL
            .into_iter()
            .find(|day| day.as_str() == key)
            .ok_or_else(|| AppError::with_detail(ErrorCode::InvalidDay, format!("잘못된 요일: {raw}")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoteMode {
    #[default]
    Replace,
    Append,
}

impl NoteMode {
    // "append" 이외의 값은 모두 replace
    pub fn from_request(raw: Option<&str>) -> Self {
        match raw {
            Some(mode) if mode.eq_ignore_ascii_case("append") => NoteMode::Append,
            _ => NoteMode::Replace,
        }
    }
}

/// Per-day notes with exactly the seven day keys on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct WeekNotes {
    pub mon: String,
    pub tue: String,
    pub wed: String,
    pub thu: String,
    pub fri: String,
    pub sat: String,
    pub sun: String,
}

impl WeekNotes {
    pub fn get(&self, day: Day) -> &str {
        match day {
            Day::Mon => &self.mon,
            Day::Tue => &self.tue,
            Day::Wed => &self.wed,
            Day::Thu => &self.thu,
            Day::Fri => &self.fri,
            Day::Sat => &self.sat,
            Day::Sun => &self.sun,
        }
    }

    fn slot_mut(&mut self, day: Day) -> &mut String {
        match day {
            Day::Mon => &mut self.mon,
            Day::Tue => &mut self.tue,
            Day::Wed => &mut self.wed,
            Day::Thu => &mut self.thu,
            Day::Fri => &mut self.fri,
            Day::Sat => &mut self.sat,
            Day::Sun => &mut self.sun,
        }
    }

    pub fn apply(&mut self, day: Day, text: &str, mode: NoteMode) {
        let slot = self.slot_mut(day);
        match mode {
            NoteMode::Append if !slot.is_empty() => {
                slot.push('\n');
                slot.push_str(text);
            }
            _ => *slot = text.to_string(),
        }
    }

    pub fn from_stored(raw: &str) -> Self {
        serde_json::from_str(raw).unwrap_or_else(|err| {
            tracing::warn!(error = %err, "저장된 notes 를 해석할 수 없어 빈 값으로 대체");
            WeekNotes::default()
        })
    }

    pub fn to_stored(&self) -> String {
        serde_json::json!({
            "mon": self.mon,
            "tue": self.tue,
            "wed": self.wed,
            "thu": self.thu,
            "fri": self.fri,
            "sat": self.sat,
            "sun": self.sun,
        })
        .to_string()
    }
}

/// Notes arrive either as an object or as a JSON-encoded string of one.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum NotesInput {
    Map(WeekNotes),
    Encoded(String),
}

impl NotesInput {
    pub fn into_notes(self) -> Result<WeekNotes, AppError> {
        match self {
            NotesInput::Map(notes) => Ok(notes),
            NotesInput::Encoded(raw) if raw.trim().is_empty() => Ok(WeekNotes::default()),
            NotesInput::Encoded(raw) => serde_json::from_str(&raw)
                .map_err(|_| AppError::with_detail(ErrorCode::ValidationError, "notes 는 요일별 문자열 객체여야 합니다")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, ToSchema)]
pub struct DayHours {
    pub mon: f64,
    pub tue: f64,
    pub wed: f64,
    pub thu: f64,
    pub fri: f64,
    pub sat: f64,
    pub sun: f64,
}

impl DayHours {
    pub fn get(&self, day: Day) -> f64 {
        match day {
            Day::Mon => self.mon,
            Day::Tue => self.tue,
            Day::Wed => self.wed,
            Day::Thu => self.thu,
            Day::Fri => self.fri,
            Day::Sat => self.sat,
            Day::Sun => self.sun,
        }
    }

    pub fn total(&self) -> f64 {
        Day::ALL.iter().map(|day| self.get(*day)).sum()
    }
}

/// Raw day values as sent by clients: numbers, numeric strings, or anything else.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct HoursInput {
    pub mon: Option<Value>,
    pub tue: Option<Value>,
    pub wed: Option<Value>,
    pub thu: Option<Value>,
    pub fri: Option<Value>,
    pub sat: Option<Value>,
    pub sun: Option<Value>,
}

impl HoursInput {
    fn raw(&self, day: Day) -> Option<&Value> {
        match day {
            Day::Mon => self.mon.as_ref(),
            Day::Tue => self.tue.as_ref(),
            Day::Wed => self.wed.as_ref(),
            Day::Thu => self.thu.as_ref(),
            Day::Fri => self.fri.as_ref(),
            Day::Sat => self.sat.as_ref(),
            Day::Sun => self.sun.as_ref(),
        }
    }

    /// Full week, absent days count as zero.
    pub fn normalize(&self) -> DayHours {
        let value = |day| normalize_hours(self.raw(day));
        DayHours {
            mon: value(Day::Mon),
            tue: value(Day::Tue),
            wed: value(Day::Wed),
            thu: value(Day::Thu),
            fri: value(Day::Fri),
            sat: value(Day::Sat),
            sun: value(Day::Sun),
        }
    }

    /// Only the days present in the request.
    pub fn present(&self) -> Vec<(Day, f64)> {
        Day::ALL
            .into_iter()
            .filter_map(|day| self.raw(day).map(|raw| (day, normalize_hours(Some(raw)))))
            .collect()
    }
}

// 범위(0~24)는 검사하지 않는다. 해석 불가 값만 0 으로.
pub fn normalize_hours(raw: Option<&Value>) -> f64 {
    let parsed = match raw {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite()).unwrap_or(0.0)
}

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp (its UTC date is used).
pub fn parse_week_ending(raw: &str) -> Result<NaiveDate, AppError> {
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(trimmed).map(|dt| dt.with_timezone(&Utc).date_naive()))
        .map_err(|_| AppError::with_detail(ErrorCode::InvalidWeekEnding, format!("잘못된 날짜: {raw}")))
}

/// Validated input for one upsert.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryDraft {
    pub schedule_id: i32,
    pub week_ending: NaiveDate,
    pub hours: DayHours,
    pub notes: WeekNotes,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveEntryRequest {
    #[serde(default, deserialize_with = "crate::model::id::lenient_id")]
    pub schedule_id: Option<i32>,
    pub week_ending: Option<String>,
    #[serde(flatten)]
    pub hours: HoursInput,
    pub notes: Option<NotesInput>,
}

impl EntryDraft {
    pub fn build(
        schedule_id: Option<i32>,
        week_ending: Option<&str>,
        hours: &HoursInput,
        notes: Option<NotesInput>,
    ) -> Result<Self, AppError> {
        let schedule_id = schedule_id.ok_or_else(|| AppError::missing_field("scheduleId"))?;
        let week_ending = week_ending
            .filter(|raw| !raw.trim().is_empty())
            .ok_or_else(|| AppError::missing_field("weekEnding"))?;

        Ok(Self {
            schedule_id,
            week_ending: parse_week_ending(week_ending)?,
            hours: hours.normalize(),
            notes: notes.map(NotesInput::into_notes).transpose()?.unwrap_or_default(),
        })
    }
}

impl SaveEntryRequest {
    pub fn into_draft(self) -> Result<EntryDraft, AppError> {
        EntryDraft::build(self.schedule_id, self.week_ending.as_deref(), &self.hours, self.notes)
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateNotesRequest {
    pub notes: Option<NotesInput>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateDayNoteRequest {
    pub day: Option<String>,
    pub text: Option<String>,
    pub mode: Option<String>,
}

/// A validated single-day note edit.
#[derive(Debug, Clone, PartialEq)]
pub struct DayNoteEdit {
    pub day: Day,
    pub text: String,
    pub mode: NoteMode,
}

impl UpdateDayNoteRequest {
    pub fn into_edit(self) -> Result<DayNoteEdit, AppError> {
        let day = self
            .day
            .filter(|d| !d.is_empty())
            .ok_or_else(|| AppError::missing_field("day"))?;
        let text = self.text.ok_or_else(|| AppError::missing_field("text"))?;

        Ok(DayNoteEdit {
            day: Day::parse(&day)?,
            text,
            mode: NoteMode::from_request(self.mode.as_deref()),
        })
    }
}

#[derive(Debug, Deserialize, ToSchema, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListEntriesQuery {
    pub schedule_id: Option<i32>,
    pub week_ending: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryFilter {
    pub schedule_id: Option<i32>,
    pub week_ending: Option<NaiveDate>,
}

impl ListEntriesQuery {
    pub fn into_filter(self) -> Result<EntryFilter, AppError> {
        Ok(EntryFilter {
            schedule_id: self.schedule_id,
            week_ending: self
                .week_ending
                .as_deref()
                .filter(|raw| !raw.trim().is_empty())
                .map(parse_week_ending)
                .transpose()?,
        })
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BatchEntryRow {
    #[serde(default, deserialize_with = "crate::model::id::lenient_id")]
    pub schedule_id: Option<i32>,
    #[serde(flatten)]
    pub hours: HoursInput,
    pub notes: Option<NotesInput>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BatchSaveRequest {
    pub week_ending: Option<String>,
    #[serde(default)]
    pub submit: bool,
    #[serde(default)]
    pub entries: Vec<BatchEntryRow>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BatchFailure {
    pub index: usize,
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BatchSaveResponse {
    pub processed: usize,
    pub saved: Vec<TimeEntryResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<BatchFailure>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntryResponse {
    pub id: i32,
    pub schedule_id: i32,
    pub week_ending: NaiveDate,
    #[serde(flatten)]
    pub hours: DayHours,
    pub notes: WeekNotes,
    pub is_submitted: bool,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<ScheduleSummary>,
}

impl From<TimeEntryModel> for TimeEntryResponse {
    fn from(model: TimeEntryModel) -> Self {
        Self {
            id: model.id,
            schedule_id: model.schedule_id,
            week_ending: model.week_ending,
            hours: model.hours(),
            notes: model.week_notes(),
            is_submitted: model.is_submitted,
            created_at: model.created_at,
            schedule: None,
        }
    }
}

impl TimeEntryResponse {
    pub fn with_schedule(mut self, schedule: ScheduleSummary) -> Self {
        self.schedule = Some(schedule);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn day_codes_are_lowercased_and_truncated() {
        assert_eq!(Day::parse("Monday").unwrap(), Day::Mon);
        assert_eq!(Day::parse("SUN").unwrap(), Day::Sun);
        assert_eq!(Day::parse("thursday").unwrap(), Day::Thu);
        assert_eq!(Day::parse("xyz").unwrap_err().code(), ErrorCode::InvalidDay);
        assert_eq!(Day::parse("mo").unwrap_err().code(), ErrorCode::InvalidDay);
    }

    #[test]
    fn append_joins_with_newline_only_when_existing_text() {
        let mut notes = WeekNotes::default();
        notes.apply(Day::Mon, "A", NoteMode::Append);
        assert_eq!(notes.mon, "A");

        notes.apply(Day::Mon, "B", NoteMode::Append);
        assert_eq!(notes.mon, "A\nB");

        notes.apply(Day::Mon, "C", NoteMode::Replace);
        assert_eq!(notes.mon, "C");
        assert_eq!(notes.tue, "");
    }

    #[test]
    fn unknown_mode_falls_back_to_replace() {
        assert_eq!(NoteMode::from_request(None), NoteMode::Replace);
        assert_eq!(NoteMode::from_request(Some("overwrite")), NoteMode::Replace);
        assert_eq!(NoteMode::from_request(Some("APPEND")), NoteMode::Append);
    }

    #[test]
    fn stored_notes_always_have_seven_keys() {
        let notes = WeekNotes { wed: "standup".into(), ..Default::default() };
        let stored: Value = serde_json::from_str(&notes.to_stored()).unwrap();
        let keys: Vec<&String> = stored.as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), 7);
        assert_eq!(stored["wed"], "standup");

        assert_eq!(WeekNotes::from_stored(r#"{"fri":"x"}"#).fri, "x");
        assert_eq!(WeekNotes::from_stored("not json"), WeekNotes::default());
    }

    #[test]
    fn hours_are_lenient() {
        assert_eq!(normalize_hours(Some(&json!(7.5))), 7.5);
        assert_eq!(normalize_hours(Some(&json!("8"))), 8.0);
        assert_eq!(normalize_hours(Some(&json!("eight"))), 0.0);
        assert_eq!(normalize_hours(Some(&json!(true))), 0.0);
        assert_eq!(normalize_hours(None), 0.0);
        // 범위 밖 값도 그대로 유지
        assert_eq!(normalize_hours(Some(&json!(30))), 30.0);
        assert_eq!(normalize_hours(Some(&json!(-2))), -2.0);
    }

    #[test]
    fn save_request_builds_draft_with_defaults() {
        let request: SaveEntryRequest = serde_json::from_value(json!({
            "scheduleId": 3,
            "weekEnding": "2024-06-07",
            "mon": 8,
            "tue": "4.5"
        }))
        .unwrap();

        let draft = request.into_draft().unwrap();
        assert_eq!(draft.schedule_id, 3);
        assert_eq!(draft.week_ending, NaiveDate::from_ymd_opt(2024, 6, 7).unwrap());
        assert_eq!(draft.hours.mon, 8.0);
        assert_eq!(draft.hours.tue, 4.5);
        assert_eq!(draft.hours.sun, 0.0);
        assert_eq!(draft.notes, WeekNotes::default());
    }

    #[test]
    fn save_request_requires_schedule_and_week() {
        let request: SaveEntryRequest = serde_json::from_value(json!({ "weekEnding": "2024-06-07" })).unwrap();
        assert_eq!(request.into_draft().unwrap_err().code(), ErrorCode::ValidationError);

        let request: SaveEntryRequest = serde_json::from_value(json!({ "scheduleId": 1 })).unwrap();
        assert_eq!(request.into_draft().unwrap_err().code(), ErrorCode::ValidationError);

        let request: SaveEntryRequest =
            serde_json::from_value(json!({ "scheduleId": 1, "weekEnding": "next friday" })).unwrap();
        assert_eq!(request.into_draft().unwrap_err().code(), ErrorCode::InvalidWeekEnding);
    }

    #[test]
    fn notes_accept_object_or_encoded_string() {
        let request: SaveEntryRequest = serde_json::from_value(json!({
            "scheduleId": 1,
            "weekEnding": "2024-06-07",
            "notes": "{\"mon\":\"kickoff\"}"
        }))
        .unwrap();
        assert_eq!(request.into_draft().unwrap().notes.mon, "kickoff");

        let request: SaveEntryRequest = serde_json::from_value(json!({
            "scheduleId": 1,
            "weekEnding": "2024-06-07",
            "notes": { "sat": "deploy" }
        }))
        .unwrap();
        assert_eq!(request.into_draft().unwrap().notes.sat, "deploy");
    }

    #[test]
    fn week_ending_accepts_timestamps() {
        assert_eq!(
            parse_week_ending("2024-06-07T00:00:00.000Z").unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 7).unwrap()
        );
    }

    #[test]
    fn partial_hours_only_report_present_days() {
        let input: HoursInput = serde_json::from_value(json!({ "mon": 4, "fri": "2" })).unwrap();
        assert_eq!(input.present(), vec![(Day::Mon, 4.0), (Day::Fri, 2.0)]);
        assert!(HoursInput::default().present().is_empty());
    }
}
