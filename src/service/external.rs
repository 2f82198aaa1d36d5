//! Operations for callers holding the static API key. There is no user identity here;
//! the submit path scopes the schedule to the named user instead.

use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use tracing::{info, instrument};

use crate::entity::user::{self, Entity as UserEntity};
use crate::model::external::{ExternalNoteResponse, ExternalSubmitResponse};
use crate::model::global_error::{AppError, ErrorCode};
use crate::model::timesheet::{DayNoteEdit, EntryDraft, TimeEntryResponse};
use crate::service::schedule::find_owned_schedule;
use crate::service::timesheet::{apply_day_note, find_entry, upsert_entry};

#[instrument(skip(db, edit), fields(day = edit.day.as_str(), mode = ?edit.mode))]
pub async fn update_note<C: ConnectionTrait>(
    db: &C,
    entry_id: i32,
    edit: &DayNoteEdit,
) -> Result<ExternalNoteResponse, AppError> {
    let entry = find_entry(db, entry_id).await?;
    let updated = apply_day_note(db, entry, edit).await?;

    info!(entry_id, "외부 연동 노트 갱신");
    Ok(ExternalNoteResponse {
        success: true,
        entry_id: updated.id,
        updated_day: edit.day,
        notes: updated.week_notes(),
    })
}

/// Upserts and submits in one write. An already submitted week is rejected as locked.
#[instrument(skip(db, draft), fields(schedule_id = draft.schedule_id, week_ending = %draft.week_ending))]
pub async fn submit_timesheet<C: ConnectionTrait>(
    db: &C,
    username: &str,
    draft: EntryDraft,
) -> Result<ExternalSubmitResponse, AppError> {
    let owner = UserEntity::find()
        .filter(user::Column::Username.eq(username))
        .one(db)
        .await?
        .ok_or_else(|| AppError::with_detail(ErrorCode::UserNotFound, format!("사용자 '{username}' 없음")))?;

    find_owned_schedule(db, draft.schedule_id, &owner).await?;

    let entry = upsert_entry(db, &draft, true).await?;
    info!(entry_id = entry.id, user_id = owner.id, "외부 연동 타임시트 제출");

    Ok(ExternalSubmitResponse {
        success: true,
        message: "타임시트가 제출되었습니다".to_string(),
        entry: TimeEntryResponse::from(entry),
    })
}
