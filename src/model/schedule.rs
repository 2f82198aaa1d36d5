use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entity::schedule::Model as ScheduleModel;
use crate::entity::user::Model as UserModel;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleCreateRequest {
    #[serde(default, deserialize_with = "crate::model::id::lenient_id")]
    pub user_id: Option<i32>,
    pub project_title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct UserRef {
    pub id: i32,
    pub username: String,
}

impl From<&UserModel> for UserRef {
    fn from(user: &UserModel) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleResponse {
    pub id: i32,
    pub user_id: i32,
    pub project_title: String,
    pub is_assigned: bool,
    pub created_at: DateTime<Utc>,
    pub user: Option<UserRef>,
}

impl ScheduleResponse {
    pub fn new(schedule: ScheduleModel, user: Option<&UserModel>) -> Self {
        Self {
            id: schedule.id,
            user_id: schedule.user_id,
            project_title: schedule.project_title,
            is_assigned: schedule.is_assigned,
            created_at: schedule.created_at,
            user: user.map(UserRef::from),
        }
    }
}

/// Schedule as embedded in a time entry listing.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSummary {
    pub id: i32,
    pub project_title: String,
    pub user: Option<UserRef>,
}

impl ScheduleSummary {
    pub fn new(schedule: &ScheduleModel, user: Option<&UserModel>) -> Self {
        Self {
            id: schedule.id,
            project_title: schedule.project_title.clone(),
            user: user.map(UserRef::from),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NamedSchedule {
    pub id: i32,
    pub project_title: String,
    pub is_assigned: bool,
    pub created_at: DateTime<Utc>,
}

impl From<ScheduleModel> for NamedSchedule {
    fn from(model: ScheduleModel) -> Self {
        Self {
            id: model.id,
            project_title: model.project_title,
            is_assigned: model.is_assigned,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserSchedulesResponse {
    pub user: UserRef,
    pub schedules: Vec<NamedSchedule>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteResponse {
    pub success: bool,
}
