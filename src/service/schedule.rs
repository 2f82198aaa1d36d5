use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::{info, instrument};

use crate::auth::{require_owner_or_admin, require_role, Identity};
use crate::entity::schedule::{self, Entity as ScheduleEntity};
use crate::entity::time_entry::{self, Entity as TimeEntryEntity};
use crate::entity::user::{self, Entity as UserEntity, Role};
use crate::model::global_error::{AppError, ErrorCode};
use crate::model::schedule::{NamedSchedule, ScheduleResponse, UserRef, UserSchedulesResponse};

/// Admins see every schedule, users only their own; newest first.
#[instrument(skip(db, identity), fields(caller = identity.id))]
pub async fn list_schedules<C: ConnectionTrait>(
    db: &C,
    identity: &Identity,
) -> Result<Vec<ScheduleResponse>, AppError> {
    let mut query = ScheduleEntity::find();
    if !identity.is_admin() {
        query = query.filter(schedule::Column::UserId.eq(identity.id));
    }

    let schedules = query
        .order_by_desc(schedule::Column::CreatedAt)
        .order_by_desc(schedule::Column::Id)
        .find_also_related(UserEntity)
        .all(db)
        .await?;

    Ok(schedules
        .into_iter()
        .map(|(schedule, owner)| ScheduleResponse::new(schedule, owner.as_ref()))
        .collect())
}

#[instrument(skip(db, identity), fields(caller = identity.id))]
pub async fn create_schedule<C: ConnectionTrait>(
    db: &C,
    identity: &Identity,
    user_id: Option<i32>,
    project_title: Option<&str>,
) -> Result<ScheduleResponse, AppError> {
    require_role(identity, Role::Admin)?;

    let user_id = user_id.ok_or_else(|| AppError::missing_field("userId"))?;
    let project_title = project_title
        .map(str::trim)
        .filter(|title| !title.is_empty())
        .ok_or_else(|| AppError::missing_field("projectTitle"))?;

    let owner = UserEntity::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;

    let created = schedule::ActiveModel {
        user_id: Set(owner.id),
        project_title: Set(project_title.to_string()),
        is_assigned: Set(true),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(schedule_id = created.id, user_id = owner.id, "스케줄 생성");
    Ok(ScheduleResponse::new(created, Some(&owner)))
}

/// Removes the schedule and every time entry under it in one transaction.
#[instrument(skip(db, identity), fields(caller = identity.id))]
pub async fn delete_schedule<C>(db: &C, identity: &Identity, schedule_id: i32) -> Result<(), AppError>
where
    C: ConnectionTrait + TransactionTrait,
{
    require_role(identity, Role::Admin)?;

    let txn = db.begin().await?;

    ScheduleEntity::find_by_id(schedule_id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::ScheduleNotFound))?;

    // FK cascade 와 별개로 명시적으로 삭제 (SQLite foreign_keys 설정에 의존하지 않음)
    let removed = TimeEntryEntity::delete_many()
        .filter(time_entry::Column::ScheduleId.eq(schedule_id))
        .exec(&txn)
        .await?;

    ScheduleEntity::delete_by_id(schedule_id).exec(&txn).await?;

    txn.commit().await?;

    info!(schedule_id, removed_entries = removed.rows_affected, "스케줄 삭제");
    Ok(())
}

#[instrument(skip(db, identity), fields(caller = identity.id))]
pub async fn list_for_user<C: ConnectionTrait>(
    db: &C,
    identity: &Identity,
    target_user_id: i32,
) -> Result<UserSchedulesResponse, AppError> {
    require_owner_or_admin(identity, target_user_id)?;

    let target = UserEntity::find_by_id(target_user_id)
        .one(db)
        .await?
        .ok_or_else(|| {
            AppError::with_detail(ErrorCode::UserNotFound, format!("id {target_user_id} 사용자가 없습니다"))
        })?;

    let schedules = ScheduleEntity::find()
        .filter(schedule::Column::UserId.eq(target.id))
        .order_by_desc(schedule::Column::CreatedAt)
        .order_by_desc(schedule::Column::Id)
        .all(db)
        .await?;

    Ok(UserSchedulesResponse {
        user: UserRef::from(&target),
        schedules: schedules.into_iter().map(NamedSchedule::from).collect(),
    })
}

/// Ids of every schedule owned by `user_id`.
pub(crate) async fn owned_schedule_ids<C: ConnectionTrait>(db: &C, user_id: i32) -> Result<Vec<i32>, AppError> {
    let schedules = ScheduleEntity::find()
        .filter(schedule::Column::UserId.eq(user_id))
        .all(db)
        .await?;

    Ok(schedules.into_iter().map(|s| s.id).collect())
}

pub(crate) async fn find_schedule<C: ConnectionTrait>(db: &C, schedule_id: i32) -> Result<schedule::Model, AppError> {
    ScheduleEntity::find_by_id(schedule_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::ScheduleNotFound))
}

/// Schedule lookup scoped to one owner; a schedule owned by someone else reads as missing.
pub(crate) async fn find_owned_schedule<C: ConnectionTrait>(
    db: &C,
    schedule_id: i32,
    user: &user::Model,
) -> Result<schedule::Model, AppError> {
    ScheduleEntity::find()
        .filter(schedule::Column::Id.eq(schedule_id))
        .filter(schedule::Column::UserId.eq(user.id))
        .one(db)
        .await?
        .ok_or_else(|| AppError::with_detail(ErrorCode::ScheduleNotFound, "해당 사용자의 스케줄이 아닙니다"))
}
