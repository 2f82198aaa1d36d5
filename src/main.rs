use actix_cors::Cors;
use actix_web::http::header;
use actix_web::middleware::Logger;
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use dotenv::dotenv;
use tracing::info;

use timesheet::api;
use timesheet::auth::password::DEFAULT_COST;
use timesheet::auth::JwtUtils;
use timesheet::configuration::Settings;
use timesheet::db::init_db_with_migrations;
use timesheet::service::{seed, CredentialService};
use timesheet::telemetry::{get_subscriber, init_subscriber};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let subscriber = get_subscriber("timesheet".into(), "info,sqlx=warn".into(), std::io::stdout);
    init_subscriber(subscriber)?;

    info!("애플리케이션 시작 중...");

    let settings = Settings::from_env()?;
    info!(?settings, "환경 변수 로드 완료");

    let db = init_db_with_migrations(&settings).await?;

    let jwt = JwtUtils::new(&settings.auth);
    let credentials = CredentialService::new(jwt.clone(), DEFAULT_COST)?;

    if let Some(admin) = &settings.bootstrap_admin {
        seed::bootstrap_admin(&db, &credentials, admin).await?;
    }
    if settings.seed_sample_data {
        seed::seed_sample_data(&db, &credentials).await?;
    }

    let db_data = Data::new(db);
    let credentials_data = Data::new(credentials);
    let external_api_key = settings.auth.external_api_key.clone();
    let cors_origin = settings.cors_allowed_origin.clone();

    info!("서버 시작 중: http://{}:{}", settings.host, settings.port);
    HttpServer::new(move || {
        let cors = match &cors_origin {
            Some(origin) => Cors::default().allowed_origin(origin),
            None => Cors::default().allow_any_origin(),
        }
        .allowed_methods(vec!["GET", "POST", "PATCH", "DELETE", "OPTIONS"])
        .allowed_headers(vec![
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::HeaderName::from_static("x-api-key"),
        ])
        .max_age(3600);

        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .app_data(db_data.clone())
            .app_data(credentials_data.clone())
            .configure(api::configure(jwt.clone(), external_api_key.clone()))
    })
    .bind((settings.host.as_str(), settings.port))?
    .run()
    .await?;

    Ok(())
}
