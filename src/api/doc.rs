use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::auth::middleware::API_KEY_HEADER;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
        components.add_security_scheme(
            "api_key",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                API_KEY_HEADER,
                "외부 연동용 고정 API 키",
            ))),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(title = "Timesheet API", description = "주간 타임시트 입력, 제출 및 외부 연동"),
    paths(
        super::health::health_check,
        super::auth::login,
        super::auth::register,
        super::auth::me,
        super::user::list_users,
        super::user::user_schedules,
        super::schedule::list_schedules,
        super::schedule::create_schedule,
        super::schedule::delete_schedule,
        super::timesheet::list_entries,
        super::timesheet::save_entry,
        super::timesheet::save_batch,
        super::timesheet::submit_entry,
        super::timesheet::update_notes,
        super::timesheet::update_hours,
        super::timesheet::update_day_note,
        super::external::update_note,
        super::external::submit_timesheet,
    ),
    tags(
        (name = "auth", description = "로그인 및 계정"),
        (name = "users", description = "사용자"),
        (name = "schedules", description = "프로젝트 배정"),
        (name = "timeentries", description = "주간 타임시트"),
        (name = "external", description = "API 키 기반 외부 연동"),
        (name = "health check", description = "상태 확인"),
    )
)]
pub struct ApiDoc;
