use actix_web::http::StatusCode;
use actix_web::{get, patch, post, web, HttpResponse};
use sea_orm::DatabaseConnection;

use crate::auth::Identity;
use crate::model::global_error::{AppError, ErrorResponse};
use crate::model::timesheet::{
    BatchSaveRequest, BatchSaveResponse, HoursInput, ListEntriesQuery, SaveEntryRequest, TimeEntryResponse,
    UpdateDayNoteRequest, UpdateNotesRequest,
};
use crate::service::timesheet;

#[utoipa::path(
    get,
    path = "/api/timeentries",
    summary = "타임시트 목록",
    description = "일반 사용자는 본인 스케줄의 항목만 조회",
    params(ListEntriesQuery),
    responses(
        (status = 200, description = "타임시트 목록", body = Vec<TimeEntryResponse>),
        (status = 400, description = "잘못된 weekEnding", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "timeentries",
)]
#[get("/timeentries")]
pub async fn list_entries(
    query: web::Query<ListEntriesQuery>,
    db: web::Data<DatabaseConnection>,
    identity: web::ReqData<Identity>,
) -> Result<HttpResponse, AppError> {
    let filter = query.into_inner().into_filter()?;
    let entries = timesheet::list_entries(db.get_ref(), &identity, filter).await?;
    Ok(HttpResponse::Ok().json(entries))
}

#[utoipa::path(
    post,
    path = "/api/timeentries",
    summary = "타임시트 저장",
    description = "(scheduleId, weekEnding) 기준으로 생성 또는 갱신. 제출된 항목은 거부",
    request_body = SaveEntryRequest,
    responses(
        (status = 200, description = "저장된 항목", body = TimeEntryResponse),
        (status = 400, description = "유효성 오류 또는 제출 잠금", body = ErrorResponse),
        (status = 403, description = "스케줄 소유자가 아님", body = ErrorResponse),
        (status = 404, description = "스케줄 없음", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "timeentries",
)]
#[post("/timeentries")]
pub async fn save_entry(
    body: web::Json<SaveEntryRequest>,
    db: web::Data<DatabaseConnection>,
    identity: web::ReqData<Identity>,
) -> Result<HttpResponse, AppError> {
    let draft = body.into_inner().into_draft()?;
    let entry = timesheet::save_entry(db.get_ref(), &identity, draft).await?;
    Ok(HttpResponse::Ok().json(entry))
}

#[utoipa::path(
    post,
    path = "/api/timeentries/batch",
    summary = "주간 타임시트 일괄 저장",
    description = "순서대로 저장하며 첫 실패에서 중단. 실패 이전 항목은 유지",
    request_body = BatchSaveRequest,
    responses(
        (status = 200, description = "모든 항목 처리", body = BatchSaveResponse),
        (status = 400, description = "실패한 항목의 오류 상태", body = BatchSaveResponse),
    ),
    security(("bearer" = [])),
    tag = "timeentries",
)]
#[post("/timeentries/batch")]
pub async fn save_batch(
    body: web::Json<BatchSaveRequest>,
    db: web::Data<DatabaseConnection>,
    identity: web::ReqData<Identity>,
) -> Result<HttpResponse, AppError> {
    let response = timesheet::save_batch(db.get_ref(), &identity, body.into_inner()).await?;

    let status = response
        .failure
        .as_ref()
        .map_or(StatusCode::OK, |failure| failure.code.status_code());
    Ok(HttpResponse::build(status).json(response))
}

#[utoipa::path(
    patch,
    path = "/api/timeentries/{id}/submit",
    summary = "타임시트 제출",
    params(("id" = i32, Path, description = "타임시트 ID")),
    responses(
        (status = 200, description = "제출된 항목", body = TimeEntryResponse),
        (status = 404, description = "항목 없음", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "timeentries",
)]
#[patch("/timeentries/{id}/submit")]
pub async fn submit_entry(
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
    identity: web::ReqData<Identity>,
) -> Result<HttpResponse, AppError> {
    let entry = timesheet::submit_entry(db.get_ref(), &identity, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(entry))
}

#[utoipa::path(
    patch,
    path = "/api/timeentries/{id}/notes",
    summary = "주간 노트 전체 교체",
    params(("id" = i32, Path, description = "타임시트 ID")),
    request_body = UpdateNotesRequest,
    responses(
        (status = 200, description = "갱신된 항목", body = TimeEntryResponse),
        (status = 400, description = "제출 잠금", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "timeentries",
)]
#[patch("/timeentries/{id}/notes")]
pub async fn update_notes(
    path: web::Path<i32>,
    body: web::Json<UpdateNotesRequest>,
    db: web::Data<DatabaseConnection>,
    identity: web::ReqData<Identity>,
) -> Result<HttpResponse, AppError> {
    let notes = body
        .into_inner()
        .notes
        .ok_or_else(|| AppError::missing_field("notes"))?
        .into_notes()?;
    let entry = timesheet::update_notes(db.get_ref(), &identity, path.into_inner(), notes).await?;
    Ok(HttpResponse::Ok().json(entry))
}

#[utoipa::path(
    patch,
    path = "/api/timeentries/{id}/hours",
    summary = "요일별 시간 부분 수정",
    params(("id" = i32, Path, description = "타임시트 ID")),
    request_body = HoursInput,
    responses(
        (status = 200, description = "갱신된 항목", body = TimeEntryResponse),
        (status = 400, description = "요일 값 없음 또는 제출 잠금", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "timeentries",
)]
#[patch("/timeentries/{id}/hours")]
pub async fn update_hours(
    path: web::Path<i32>,
    body: web::Json<HoursInput>,
    db: web::Data<DatabaseConnection>,
    identity: web::ReqData<Identity>,
) -> Result<HttpResponse, AppError> {
    let entry = timesheet::update_hours(db.get_ref(), &identity, path.into_inner(), &body).await?;
    Ok(HttpResponse::Ok().json(entry))
}

#[utoipa::path(
    patch,
    path = "/api/timeentries/{id}/notes/day",
    summary = "요일 노트 수정",
    description = "mode 가 append 이면 기존 노트 뒤에 줄바꿈으로 추가, 그 외에는 교체",
    params(("id" = i32, Path, description = "타임시트 ID")),
    request_body = UpdateDayNoteRequest,
    responses(
        (status = 200, description = "갱신된 항목", body = TimeEntryResponse),
        (status = 400, description = "잘못된 요일 또는 제출 잠금", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "timeentries",
)]
#[patch("/timeentries/{id}/notes/day")]
pub async fn update_day_note(
    path: web::Path<i32>,
    body: web::Json<UpdateDayNoteRequest>,
    db: web::Data<DatabaseConnection>,
    identity: web::ReqData<Identity>,
) -> Result<HttpResponse, AppError> {
    let edit = body.into_inner().into_edit()?;
    let entry = timesheet::update_day_note(db.get_ref(), &identity, path.into_inner(), &edit).await?;
    Ok(HttpResponse::Ok().json(entry))
}
