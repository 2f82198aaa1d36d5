mod auth;
mod doc;
mod external;
mod health;
mod schedule;
mod timesheet;
mod user;

use actix_web::web::{scope, JsonConfig, PathConfig, QueryConfig, ServiceConfig};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::{AuthMiddleware, JwtUtils};
use crate::model::{AppError, ErrorCode};

pub use crate::api::auth::{login, me, register};
pub use crate::api::doc::ApiDoc;
pub use crate::api::external::{submit_timesheet, update_note};
pub use crate::api::health::health_check;
pub use crate::api::schedule::{create_schedule, delete_schedule, list_schedules};
pub use crate::api::timesheet::{
    list_entries, save_batch, save_entry, submit_entry, update_day_note, update_hours, update_notes,
};
pub use crate::api::user::{list_users, user_schedules};

/// Registers every route. Expects `web::Data<DatabaseConnection>` and
/// `web::Data<CredentialService>` on the app.
///
/// Public routes go first: actix scopes do not fall through, so anything under
/// `/api` registered after the bearer scope would be unreachable without a token.
pub fn configure(jwt: JwtUtils, external_api_key: String) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        // 추출기 실패도 공통 에러 본문으로 응답
        cfg.app_data(JsonConfig::default().error_handler(|err, _| {
            AppError::with_detail(ErrorCode::ValidationError, err.to_string()).into()
        }))
        .app_data(PathConfig::default().error_handler(|err, _| {
            AppError::with_detail(ErrorCode::ValidationError, err.to_string()).into()
        }))
        .app_data(QueryConfig::default().error_handler(|err, _| {
            AppError::with_detail(ErrorCode::ValidationError, err.to_string()).into()
        }));

        cfg.service(health_check)
            .service(login)
            .service(SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()))
            .service(
                scope("/api/external")
                    .wrap(AuthMiddleware::api_key(external_api_key))
                    .service(update_note)
                    .service(submit_timesheet),
            )
            .service(
                scope("/api")
                    .wrap(AuthMiddleware::bearer(jwt))
                    .service(register)
                    .service(me)
                    .service(list_users)
                    .service(user_schedules)
                    .service(list_schedules)
                    .service(create_schedule)
                    .service(delete_schedule)
                    .service(list_entries)
                    .service(save_batch)
                    .service(save_entry)
                    .service(submit_entry)
                    .service(update_notes)
                    .service(update_hours)
                    .service(update_day_note),
            );
    }
}
