//! Time entry lifecycle: DRAFT -> SUBMITTED, with SUBMITTED terminal.
//!
//! Every write against an existing row is conditional on `is_submitted = false`,
//! so a submitted entry cannot be changed even by a request that raced the submit.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use sea_query::{Expr, OnConflict};
use std::collections::HashMap;
use tracing::{info, instrument, warn};

use crate::auth::{require_owner_or_admin, Identity};
use crate::entity::schedule::{self, Entity as ScheduleEntity};
use crate::entity::time_entry::{self, Entity as TimeEntryEntity};
use crate::entity::user::{self, Entity as UserEntity};
use crate::model::global_error::{AppError, ErrorCode};
use crate::model::schedule::ScheduleSummary;
use crate::model::timesheet::{
    BatchFailure, BatchSaveRequest, BatchSaveResponse, Day, DayNoteEdit, EntryDraft, EntryFilter, HoursInput,
    TimeEntryResponse, WeekNotes,
};
use crate::service::schedule::{find_schedule, owned_schedule_ids};

#[instrument(skip(db, identity, draft), fields(caller = identity.id, schedule_id = draft.schedule_id, week_ending = %draft.week_ending))]
pub async fn save_entry<C: ConnectionTrait>(
    db: &C,
    identity: &Identity,
    draft: EntryDraft,
) -> Result<TimeEntryResponse, AppError> {
    let schedule = find_schedule(db, draft.schedule_id).await?;
    require_owner_or_admin(identity, schedule.user_id)?;

    let entry = upsert_entry(db, &draft, false).await?;
    info!(entry_id = entry.id, total_hours = draft.hours.total(), "타임시트 저장");

    Ok(TimeEntryResponse::from(entry))
}

#[instrument(skip(db, identity), fields(caller = identity.id))]
pub async fn submit_entry<C: ConnectionTrait>(
    db: &C,
    identity: &Identity,
    entry_id: i32,
) -> Result<TimeEntryResponse, AppError> {
    let (entry, schedule) = find_entry_with_schedule(db, entry_id).await?;
    require_owner_or_admin(identity, schedule.user_id)?;

    let submitted = mark_submitted(db, entry.id).await?;

    info!(entry_id, "타임시트 제출");
    Ok(TimeEntryResponse::from(submitted))
}

#[instrument(skip(db, identity, notes), fields(caller = identity.id))]
pub async fn update_notes<C: ConnectionTrait>(
    db: &C,
    identity: &Identity,
    entry_id: i32,
    notes: WeekNotes,
) -> Result<TimeEntryResponse, AppError> {
    let (entry, schedule) = find_entry_with_schedule(db, entry_id).await?;
    require_owner_or_admin(identity, schedule.user_id)?;
    ensure_unlocked(&entry)?;

    let update = TimeEntryEntity::update_many().col_expr(time_entry::Column::Notes, Expr::value(notes.to_stored()));
    write_unlocked(db, update, entry_id).await?;

    reload(db, entry_id).await.map(TimeEntryResponse::from)
}

#[instrument(skip(db, identity, hours), fields(caller = identity.id))]
pub async fn update_hours<C: ConnectionTrait>(
    db: &C,
    identity: &Identity,
    entry_id: i32,
    hours: &HoursInput,
) -> Result<TimeEntryResponse, AppError> {
    let (entry, schedule) = find_entry_with_schedule(db, entry_id).await?;
    require_owner_or_admin(identity, schedule.user_id)?;
    ensure_unlocked(&entry)?;

    let present = hours.present();
    if present.is_empty() {
        return Err(AppError::with_detail(
            ErrorCode::ValidationError,
            "mon ~ sun 중 최소 하나의 요일 값이 필요합니다",
        ));
    }

    let mut update = TimeEntryEntity::update_many();
    for (day, value) in present {
        update = update.col_expr(time_entry::Column::for_day(day), Expr::value(value));
    }
    write_unlocked(db, update, entry_id).await?;

    reload(db, entry_id).await.map(TimeEntryResponse::from)
}

#[instrument(skip(db, identity, edit), fields(caller = identity.id, day = edit.day.as_str()))]
pub async fn update_day_note<C: ConnectionTrait>(
    db: &C,
    identity: &Identity,
    entry_id: i32,
    edit: &DayNoteEdit,
) -> Result<TimeEntryResponse, AppError> {
    let (entry, schedule) = find_entry_with_schedule(db, entry_id).await?;
    require_owner_or_admin(identity, schedule.user_id)?;

    apply_day_note(db, entry, edit).await.map(TimeEntryResponse::from)
}

/// Admins get every entry; users get only entries under schedules they own.
#[instrument(skip(db, identity), fields(caller = identity.id))]
pub async fn list_entries<C: ConnectionTrait>(
    db: &C,
    identity: &Identity,
    filter: EntryFilter,
) -> Result<Vec<TimeEntryResponse>, AppError> {
    let mut query = TimeEntryEntity::find();

    if let Some(schedule_id) = filter.schedule_id {
        query = query.filter(time_entry::Column::ScheduleId.eq(schedule_id));
    }
    if let Some(week_ending) = filter.week_ending {
        query = query.filter(time_entry::Column::WeekEnding.eq(week_ending));
    }
    if !identity.is_admin() {
        let owned = owned_schedule_ids(db, identity.id).await?;
        if owned.is_empty() {
            return Ok(Vec::new());
        }
        query = query.filter(time_entry::Column::ScheduleId.is_in(owned));
    }

    let rows = query
        .order_by_desc(time_entry::Column::CreatedAt)
        .order_by_desc(time_entry::Column::Id)
        .find_also_related(ScheduleEntity)
        .all(db)
        .await?;

    let owner_ids: Vec<i32> = rows
        .iter()
        .filter_map(|(_, schedule)| schedule.as_ref().map(|s| s.user_id))
        .collect();
    let owners: HashMap<i32, user::Model> = if owner_ids.is_empty() {
        HashMap::new()
    } else {
        UserEntity::find()
            .filter(user::Column::Id.is_in(owner_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect()
    };

    Ok(rows
        .into_iter()
        .map(|(entry, schedule)| {
            let response = TimeEntryResponse::from(entry);
            match schedule {
                Some(schedule) => {
                    let summary = ScheduleSummary::new(&schedule, owners.get(&schedule.user_id));
                    response.with_schedule(summary)
                }
                None => response,
            }
        })
        .collect())
}

/// Saves rows in order, optionally submitting each. Stops at the first failing row;
/// rows saved before it stay committed and are listed in `saved`.
#[instrument(skip(db, identity, request), fields(caller = identity.id, rows = request.entries.len(), submit = request.submit))]
pub async fn save_batch<C: ConnectionTrait>(
    db: &C,
    identity: &Identity,
    request: BatchSaveRequest,
) -> Result<BatchSaveResponse, AppError> {
    let week_ending = request
        .week_ending
        .filter(|raw| !raw.trim().is_empty())
        .ok_or_else(|| AppError::missing_field("weekEnding"))?;

    let mut saved = Vec::with_capacity(request.entries.len());
    let mut failure = None;

    for (index, row) in request.entries.into_iter().enumerate() {
        let result = async {
            let draft = EntryDraft::build(row.schedule_id, Some(&week_ending), &row.hours, row.notes)?;
            let entry = save_entry(db, identity, draft).await?;
            if request.submit {
                submit_entry(db, identity, entry.id).await
            } else {
                Ok(entry)
            }
        }
        .await;

        match result {
            Ok(entry) => saved.push(entry),
            Err(err) => {
                warn!(index, code = ?err.code(), saved = saved.len(), "일괄 저장 중단");
                failure = Some(BatchFailure {
                    index,
                    code: err.code(),
                    message: err.to_string(),
                });
                break;
            }
        }
    }

    Ok(BatchSaveResponse {
        processed: saved.len() + usize::from(failure.is_some()),
        saved,
        failure,
    })
}

/// Atomic insert-or-update keyed on `(schedule_id, week_ending)`.
///
/// The insert relies on the unique index to arbitrate concurrent creators; the
/// follow-up update only touches an unsubmitted row. `submit` marks the row
/// submitted in the same write.
pub(crate) async fn upsert_entry<C: ConnectionTrait>(
    db: &C,
    draft: &EntryDraft,
    submit: bool,
) -> Result<time_entry::Model, AppError> {
    let notes = draft.notes.to_stored();

    let mut row = time_entry::ActiveModel {
        schedule_id: Set(draft.schedule_id),
        week_ending: Set(draft.week_ending),
        notes: Set(notes.clone()),
        is_submitted: Set(submit),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    for day in Day::ALL {
        row.set(time_entry::Column::for_day(day), draft.hours.get(day).into());
    }

    let inserted = TimeEntryEntity::insert(row)
        .on_conflict(
            OnConflict::columns([time_entry::Column::ScheduleId, time_entry::Column::WeekEnding])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    if inserted == 0 {
        let mut update = TimeEntryEntity::update_many().col_expr(time_entry::Column::Notes, Expr::value(notes));
        for day in Day::ALL {
            update = update.col_expr(time_entry::Column::for_day(day), Expr::value(draft.hours.get(day)));
        }
        if submit {
            update = update.col_expr(time_entry::Column::IsSubmitted, Expr::value(true));
        }

        let result = update
            .filter(time_entry::Column::ScheduleId.eq(draft.schedule_id))
            .filter(time_entry::Column::WeekEnding.eq(draft.week_ending))
            .filter(time_entry::Column::IsSubmitted.eq(false))
            .exec(db)
            .await?;

        if result.rows_affected == 0 {
            // 행이 있는데 갱신되지 않았다면 제출 잠금
            return match find_by_key(db, draft).await? {
                Some(_) => {
                    warn!(schedule_id = draft.schedule_id, "제출된 타임시트 수정 거부");
                    Err(AppError::new(ErrorCode::EntryLocked))
                }
                None => Err(AppError::new(ErrorCode::ScheduleNotFound)),
            };
        }
    }

    find_by_key(db, draft)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::TimeEntryNotFound))
}

/// Merges one day's note into the entry, refusing submitted entries.
pub(crate) async fn apply_day_note<C: ConnectionTrait>(
    db: &C,
    entry: time_entry::Model,
    edit: &DayNoteEdit,
) -> Result<time_entry::Model, AppError> {
    ensure_unlocked(&entry)?;

    let mut notes = entry.week_notes();
    notes.apply(edit.day, &edit.text, edit.mode);

    let update = TimeEntryEntity::update_many().col_expr(time_entry::Column::Notes, Expr::value(notes.to_stored()));
    write_unlocked(db, update, entry.id).await?;

    reload(db, entry.id).await
}

pub(crate) async fn find_entry<C: ConnectionTrait>(db: &C, entry_id: i32) -> Result<time_entry::Model, AppError> {
    TimeEntryEntity::find_by_id(entry_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::TimeEntryNotFound))
}

async fn find_entry_with_schedule<C: ConnectionTrait>(
    db: &C,
    entry_id: i32,
) -> Result<(time_entry::Model, schedule::Model), AppError> {
    let (entry, schedule) = TimeEntryEntity::find_by_id(entry_id)
        .find_also_related(ScheduleEntity)
        .one(db)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::TimeEntryNotFound))?;

    let schedule = schedule.ok_or_else(|| AppError::new(ErrorCode::ScheduleNotFound))?;
    Ok((entry, schedule))
}

async fn find_by_key<C: ConnectionTrait>(db: &C, draft: &EntryDraft) -> Result<Option<time_entry::Model>, AppError> {
    Ok(TimeEntryEntity::find()
        .filter(time_entry::Column::ScheduleId.eq(draft.schedule_id))
        .filter(time_entry::Column::WeekEnding.eq(draft.week_ending))
        .one(db)
        .await?)
}

fn ensure_unlocked(entry: &time_entry::Model) -> Result<(), AppError> {
    if entry.is_submitted {
        warn!(entry_id = entry.id, "제출된 타임시트 수정 거부");
        return Err(AppError::new(ErrorCode::EntryLocked));
    }
    Ok(())
}

/// Runs `update` against one row, only while it is unsubmitted.
async fn write_unlocked<C: ConnectionTrait>(
    db: &C,
    update: sea_orm::UpdateMany<TimeEntryEntity>,
    entry_id: i32,
) -> Result<(), AppError> {
    let result = update
        .filter(time_entry::Column::Id.eq(entry_id))
        .filter(time_entry::Column::IsSubmitted.eq(false))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        // 조회와 갱신 사이에 제출되었거나 삭제됨
        return match TimeEntryEntity::find_by_id(entry_id).one(db).await? {
            Some(_) => Err(AppError::new(ErrorCode::EntryLocked)),
            None => Err(AppError::new(ErrorCode::TimeEntryNotFound)),
        };
    }
    Ok(())
}

/// Sets the submit flag. Resubmitting writes the same value again; a row
/// deleted after the ownership check reports as not found.
async fn mark_submitted<C: ConnectionTrait>(db: &C, entry_id: i32) -> Result<time_entry::Model, AppError> {
    TimeEntryEntity::update_many()
        .col_expr(time_entry::Column::IsSubmitted, Expr::value(true))
        .filter(time_entry::Column::Id.eq(entry_id))
        .exec(db)
        .await?;

    reload(db, entry_id).await
}

async fn reload<C: ConnectionTrait>(db: &C, entry_id: i32) -> Result<time_entry::Model, AppError> {
    find_entry(db, entry_id).await
}
