use actix_web::{delete, get, post, web, HttpResponse};
use sea_orm::DatabaseConnection;

use crate::auth::Identity;
use crate::model::global_error::{AppError, ErrorResponse};
use crate::model::schedule::{DeleteResponse, ScheduleCreateRequest, ScheduleResponse};
use crate::service::schedule;

#[utoipa::path(
    get,
    path = "/api/schedules",
    summary = "스케줄 목록",
    description = "관리자는 전체, 일반 사용자는 본인 스케줄만 조회",
    responses(
        (status = 200, description = "스케줄 목록", body = Vec<ScheduleResponse>),
    ),
    security(("bearer" = [])),
    tag = "schedules",
)]
#[get("/schedules")]
pub async fn list_schedules(
    db: web::Data<DatabaseConnection>,
    identity: web::ReqData<Identity>,
) -> Result<HttpResponse, AppError> {
    let schedules = schedule::list_schedules(db.get_ref(), &identity).await?;
    Ok(HttpResponse::Ok().json(schedules))
}

#[utoipa::path(
    post,
    path = "/api/schedules",
    summary = "스케줄 생성 (관리자)",
    request_body = ScheduleCreateRequest,
    responses(
        (status = 201, description = "스케줄 생성", body = ScheduleResponse),
        (status = 400, description = "필수 값 누락", body = ErrorResponse),
        (status = 403, description = "관리자 권한 필요", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "schedules",
)]
#[post("/schedules")]
pub async fn create_schedule(
    body: web::Json<ScheduleCreateRequest>,
    db: web::Data<DatabaseConnection>,
    identity: web::ReqData<Identity>,
) -> Result<HttpResponse, AppError> {
    let created = schedule::create_schedule(
        db.get_ref(),
        &identity,
        body.user_id,
        body.project_title.as_deref(),
    )
    .await?;
    Ok(HttpResponse::Created().json(created))
}

#[utoipa::path(
    delete,
    path = "/api/schedules/{id}",
    summary = "스케줄 삭제 (관리자)",
    description = "스케줄에 속한 타임시트도 함께 삭제",
    params(("id" = i32, Path, description = "스케줄 ID")),
    responses(
        (status = 200, description = "삭제 완료", body = DeleteResponse),
        (status = 404, description = "스케줄 없음", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "schedules",
)]
#[delete("/schedules/{id}")]
pub async fn delete_schedule(
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
    identity: web::ReqData<Identity>,
) -> Result<HttpResponse, AppError> {
    schedule::delete_schedule(db.get_ref(), &identity, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(DeleteResponse { success: true }))
}
