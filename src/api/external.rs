use actix_web::{patch, post, web, HttpResponse};
use sea_orm::DatabaseConnection;

use crate::model::external::{ExternalNoteRequest, ExternalNoteResponse, ExternalSubmitRequest, ExternalSubmitResponse};
use crate::model::global_error::{AppError, ErrorResponse};
use crate::service::external;

#[utoipa::path(
    patch,
    path = "/api/external/update-note",
    summary = "외부 연동: 요일 노트 수정",
    request_body = ExternalNoteRequest,
    responses(
        (status = 200, description = "갱신 결과", body = ExternalNoteResponse),
        (status = 400, description = "잘못된 요청 또는 제출 잠금", body = ErrorResponse),
        (status = 401, description = "API 키 오류", body = ErrorResponse),
        (status = 404, description = "항목 없음", body = ErrorResponse),
    ),
    security(("api_key" = [])),
    tag = "external",
)]
#[patch("/update-note")]
pub async fn update_note(
    body: web::Json<ExternalNoteRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let (entry_id, edit) = body.into_inner().into_parts()?;
    let response = external::update_note(db.get_ref(), entry_id, &edit).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[utoipa::path(
    post,
    path = "/api/external/submit-timesheet",
    summary = "외부 연동: 타임시트 저장 후 제출",
    request_body = ExternalSubmitRequest,
    responses(
        (status = 200, description = "제출 결과", body = ExternalSubmitResponse),
        (status = 400, description = "잘못된 요청 또는 이미 제출됨", body = ErrorResponse),
        (status = 401, description = "API 키 오류", body = ErrorResponse),
        (status = 404, description = "사용자 또는 스케줄 없음", body = ErrorResponse),
    ),
    security(("api_key" = [])),
    tag = "external",
)]
#[post("/submit-timesheet")]
pub async fn submit_timesheet(
    body: web::Json<ExternalSubmitRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let (username, draft) = body.into_inner().into_parts()?;
    let response = external::submit_timesheet(db.get_ref(), &username, draft).await?;
    Ok(HttpResponse::Ok().json(response))
}
