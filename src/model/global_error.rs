use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use sea_orm::DbErr;
use serde::Serialize;
use std::fmt;
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub enum ErrorCode {
    // 400 BAD REQUEST
    ValidationError,
    InvalidDay,
    InvalidWeekEnding,
    EntryLocked,

    // 401 UNAUTHORIZED
    MissingAuthToken,
    InvalidAuthToken,
    ExpiredAuthToken,
    InvalidApiKey,
    InvalidCredentials,

    // 403 FORBIDDEN
    AdminRequired,
    NotEnoughPermission,

    // 404 NOT FOUND
    UserNotFound,
    ScheduleNotFound,
    TimeEntryNotFound,

    // 409 CONFLICT
    DuplicateUsername,

    // 500 SERVER ERRORS
    DatabaseError,
    InternalError,
    TokenGenerationFailed,
}

impl ErrorCode {
    pub fn message(&self) -> &'static str {
        match self {
            ErrorCode::ValidationError => "유효성 검증에 실패했습니다",
            ErrorCode::InvalidDay => "요일은 mon, tue, wed, thu, fri, sat, sun 중 하나여야 합니다",
            ErrorCode::InvalidWeekEnding => "weekEnding 은 YYYY-MM-DD 형식의 날짜여야 합니다",
            ErrorCode::EntryLocked => "제출된 타임시트는 수정할 수 없습니다",

            ErrorCode::MissingAuthToken => "인증 토큰이 필요합니다",
            ErrorCode::InvalidAuthToken => "유효하지 않은 로그인 토큰입니다",
            ErrorCode::ExpiredAuthToken => "로그인 토큰이 만료되었습니다",
            ErrorCode::InvalidApiKey => "X-API-Key 헤더가 없거나 올바르지 않습니다",
            ErrorCode::InvalidCredentials => "잘못된 자격 증명입니다",

            ErrorCode::AdminRequired => "관리자 권한이 필요합니다",
            ErrorCode::NotEnoughPermission => "권한이 부족합니다",

            ErrorCode::UserNotFound => "사용자를 찾을 수 없습니다",
            ErrorCode::ScheduleNotFound => "스케줄을 찾을 수 없습니다",
            ErrorCode::TimeEntryNotFound => "타임시트 항목을 찾을 수 없습니다",

            ErrorCode::DuplicateUsername => "이미 존재하는 사용자명입니다",

            ErrorCode::DatabaseError => "데이터베이스 오류가 발생했습니다",
            ErrorCode::InternalError => "내부 서버 오류가 발생했습니다",
            ErrorCode::TokenGenerationFailed => "토큰 생성에 실패했습니다",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::ValidationError |
            ErrorCode::InvalidDay |
            ErrorCode::InvalidWeekEnding |
            ErrorCode::EntryLocked => StatusCode::BAD_REQUEST,

            ErrorCode::MissingAuthToken |
            ErrorCode::InvalidAuthToken |
            ErrorCode::ExpiredAuthToken |
            ErrorCode::InvalidApiKey |
            ErrorCode::InvalidCredentials => StatusCode::UNAUTHORIZED,

            ErrorCode::AdminRequired |
            ErrorCode::NotEnoughPermission => StatusCode::FORBIDDEN,

            ErrorCode::UserNotFound |
            ErrorCode::ScheduleNotFound |
            ErrorCode::TimeEntryNotFound => StatusCode::NOT_FOUND,

            ErrorCode::DuplicateUsername => StatusCode::CONFLICT,

            ErrorCode::DatabaseError |
            ErrorCode::InternalError |
            ErrorCode::TokenGenerationFailed => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ValidationFieldError {
    pub field: String,
    pub message: String,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    ApiError(ErrorCode, Option<String>),
    #[error("유효성 검증에 실패했습니다")]
    ValidationError(Vec<ValidationFieldError>),
}

impl AppError {
    pub fn new(code: ErrorCode) -> Self {
        AppError::ApiError(code, None)
    }

    pub fn with_detail(code: ErrorCode, detail: impl Into<String>) -> Self {
        AppError::ApiError(code, Some(detail.into()))
    }

    pub fn missing_field(field: &str) -> Self {
        AppError::ValidationError(vec![ValidationFieldError {
            field: field.to_string(),
            message: format!("{field} 은(는) 필수입니다"),
        }])
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::ApiError(code, _) => *code,
            AppError::ValidationError(_) => ErrorCode::ValidationError,
        }
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        tracing::error!(error = %err, "데이터베이스 오류");
        AppError::new(ErrorCode::DatabaseError)
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        tracing::error!(error = %err, "토큰 생성 실패");
        AppError::new(ErrorCode::TokenGenerationFailed)
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(err: bcrypt::BcryptError) -> Self {
        tracing::error!(error = %err, "비밀번호 해시 처리 실패");
        AppError::new(ErrorCode::InternalError)
    }
}

#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ValidationFieldError>,
}

impl From<&AppError> for ErrorResponse {
    fn from(err: &AppError) -> Self {
        match err {
            AppError::ApiError(code, detail) => ErrorResponse {
                code: *code,
                message: code.message().to_string(),
                detail: detail.clone(),
                errors: Vec::new(),
            },
            AppError::ValidationError(errors) => ErrorResponse {
                code: ErrorCode::ValidationError,
                message: ErrorCode::ValidationError.message().to_string(),
                detail: None,
                errors: errors.clone(),
            },
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.code().status_code()
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse::from(self))
    }
}
