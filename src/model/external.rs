use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::global_error::AppError;
use crate::model::timesheet::{
    Day, DayNoteEdit, EntryDraft, HoursInput, NotesInput, TimeEntryResponse, UpdateDayNoteRequest, WeekNotes,
};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExternalNoteRequest {
    #[serde(default, deserialize_with = "crate::model::id::lenient_id")]
    pub entry_id: Option<i32>,
    #[serde(flatten)]
    pub edit: UpdateDayNoteRequest,
}

impl ExternalNoteRequest {
    pub fn into_parts(self) -> Result<(i32, DayNoteEdit), AppError> {
        let entry_id = self.entry_id.ok_or_else(|| AppError::missing_field("entryId"))?;
        Ok((entry_id, self.edit.into_edit()?))
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExternalNoteResponse {
    pub success: bool,
    pub entry_id: i32,
    pub updated_day: Day,
    pub notes: WeekNotes,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExternalSubmitRequest {
    pub username: Option<String>,
    #[serde(default, deserialize_with = "crate::model::id::lenient_id")]
    pub schedule_id: Option<i32>,
    pub week_ending: Option<String>,
    #[serde(flatten)]
    pub hours: HoursInput,
    pub notes: Option<NotesInput>,
}

impl ExternalSubmitRequest {
    pub fn into_parts(self) -> Result<(String, EntryDraft), AppError> {
        let username = self
            .username
            .filter(|u| !u.is_empty())
            .ok_or_else(|| AppError::missing_field("username"))?;
        let draft = EntryDraft::build(self.schedule_id, self.week_ending.as_deref(), &self.hours, self.notes)?;

        Ok((username, draft))
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ExternalSubmitResponse {
    pub success: bool,
    pub message: String,
    pub entry: TimeEntryResponse,
}
