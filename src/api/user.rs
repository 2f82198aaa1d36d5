use actix_web::{get, web, HttpResponse};
use sea_orm::DatabaseConnection;

use crate::auth::Identity;
use crate::model::auth::UserResponse;
use crate::model::global_error::{AppError, ErrorResponse};
use crate::model::schedule::UserSchedulesResponse;
use crate::service::{credential, schedule};

#[utoipa::path(
    get,
    path = "/api/users",
    summary = "사용자 목록 (관리자)",
    responses(
        (status = 200, description = "사용자 목록", body = Vec<UserResponse>),
        (status = 403, description = "관리자 권한 필요", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "users",
)]
#[get("/users")]
pub async fn list_users(
    db: web::Data<DatabaseConnection>,
    identity: web::ReqData<Identity>,
) -> Result<HttpResponse, AppError> {
    let users = credential::list_users(db.get_ref(), &identity).await?;
    Ok(HttpResponse::Ok().json(users))
}

#[utoipa::path(
    get,
    path = "/api/users/{user_id}/schedules",
    summary = "사용자별 스케줄 조회",
    params(("user_id" = i32, Path, description = "사용자 ID")),
    responses(
        (status = 200, description = "사용자와 스케줄 목록", body = UserSchedulesResponse),
        (status = 403, description = "본인 또는 관리자만 조회 가능", body = ErrorResponse),
        (status = 404, description = "사용자 없음", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "users",
)]
#[get("/users/{user_id}/schedules")]
pub async fn user_schedules(
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
    identity: web::ReqData<Identity>,
) -> Result<HttpResponse, AppError> {
    let response = schedule::list_for_user(db.get_ref(), &identity, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}
