use actix_web::{get, post, web, HttpResponse};
use sea_orm::DatabaseConnection;

use crate::auth::Identity;
use crate::model::auth::{LoginRequest, LoginResponse, RegisterRequest, UserResponse};
use crate::model::global_error::{AppError, ErrorResponse};
use crate::service::credential::{self, CredentialService};

#[utoipa::path(
    post,
    path = "/api/auth/login",
    summary = "로그인",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "로그인 성공", body = LoginResponse),
        (status = 401, description = "잘못된 자격 증명", body = ErrorResponse),
    ),
    tag = "auth",
)]
#[post("/api/auth/login")]
pub async fn login(
    body: web::Json<LoginRequest>,
    db: web::Data<DatabaseConnection>,
    credentials: web::Data<CredentialService>,
) -> Result<HttpResponse, AppError> {
    let LoginRequest { username, password } = body.into_inner();
    let username = username.ok_or_else(|| AppError::missing_field("username"))?;
    let password = password.ok_or_else(|| AppError::missing_field("password"))?;

    let response = credentials.login(db.get_ref(), &username, &password).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    summary = "사용자 등록 (관리자)",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "사용자 생성", body = UserResponse),
        (status = 403, description = "관리자 권한 필요", body = ErrorResponse),
        (status = 409, description = "중복된 사용자명", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "auth",
)]
#[post("/auth/register")]
pub async fn register(
    body: web::Json<RegisterRequest>,
    db: web::Data<DatabaseConnection>,
    credentials: web::Data<CredentialService>,
    identity: web::ReqData<Identity>,
) -> Result<HttpResponse, AppError> {
    let RegisterRequest { username, password, role } = body.into_inner();
    let username = username
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .ok_or_else(|| AppError::missing_field("username"))?;
    let password = password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::missing_field("password"))?;

    let created = credentials
        .register(db.get_ref(), &identity, &username, &password, role)
        .await?;
    Ok(HttpResponse::Created().json(created))
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    summary = "내 정보 조회",
    responses(
        (status = 200, description = "현재 사용자", body = UserResponse),
        (status = 401, description = "인증 실패", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "auth",
)]
#[get("/auth/me")]
pub async fn me(
    db: web::Data<DatabaseConnection>,
    identity: web::ReqData<Identity>,
) -> Result<HttpResponse, AppError> {
    let user = credential::current_user(db.get_ref(), &identity).await?;
    Ok(HttpResponse::Ok().json(user))
}
