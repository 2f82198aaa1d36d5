use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};
use tracing::{info, instrument};

use crate::configuration::AdminCredentials;
use crate::entity::schedule;
use crate::entity::user::{self, Entity as UserEntity, Role};
use crate::model::global_error::{AppError, ErrorCode};
use crate::service::credential::CredentialService;

const SAMPLE_USERS: [(&str, &str, Role); 3] = [
    ("admin", "admin123", Role::Admin),
    ("jsmith", "user123", Role::User),
    ("mjohnson", "user123", Role::User),
];

const SAMPLE_SCHEDULES: [(&str, &str); 6] = [
    ("jsmith", "PSA - Platform Support & Administration"),
    ("jsmith", "ERP - SAP S/4HANA Migration"),
    ("jsmith", "CRM - Salesforce Integration"),
    ("jsmith", "BI - Power BI Dashboard Development"),
    ("mjohnson", "INFRA - Cloud Infrastructure Setup"),
    ("mjohnson", "SEC - Cybersecurity Audit"),
];

/// Creates the configured admin unless the username is already taken.
#[instrument(skip(db, credentials, admin), fields(username = %admin.username))]
pub async fn bootstrap_admin<C: ConnectionTrait>(
    db: &C,
    credentials: &CredentialService,
    admin: &AdminCredentials,
) -> Result<bool, AppError> {
    let (_, created) = ensure_user(db, credentials, &admin.username, &admin.password, Role::Admin).await?;
    if created {
        info!("관리자 계정 생성");
    }
    Ok(created)
}

/// Sample users and their schedules. Schedules are only added for users created by
/// this call, so running it again changes nothing.
#[instrument(skip_all)]
pub async fn seed_sample_data<C: ConnectionTrait>(db: &C, credentials: &CredentialService) -> Result<(), AppError> {
    let mut fresh = Vec::new();
    for (username, password, role) in SAMPLE_USERS {
        let (user, created) = ensure_user(db, credentials, username, password, role).await?;
        if created {
            fresh.push(user);
        }
    }

    let mut schedules = 0;
    for (username, title) in SAMPLE_SCHEDULES {
        let Some(owner) = fresh.iter().find(|u| u.username == username) else {
            continue;
        };
        schedule::ActiveModel {
            user_id: Set(owner.id),
            project_title: Set(title.to_string()),
            is_assigned: Set(true),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(db)
        .await?;
        schedules += 1;
    }

    info!(users = fresh.len(), schedules, "샘플 데이터 시드 완료");
    Ok(())
}

async fn ensure_user<C: ConnectionTrait>(
    db: &C,
    credentials: &CredentialService,
    username: &str,
    password: &str,
    role: Role,
) -> Result<(user::Model, bool), AppError> {
    let existing = UserEntity::find()
        .filter(user::Column::Username.eq(username))
        .one(db)
        .await?;
    if let Some(user) = existing {
        return Ok((user, false));
    }

    let created = credentials.create_user(db, username, password, role).await?;
    let user = UserEntity::find_by_id(created.id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;
    Ok((user, true))
}
