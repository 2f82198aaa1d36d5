#![allow(dead_code)]

use sea_orm::DatabaseConnection;
use serde_json::Value;

use timesheet::auth::{Identity, JwtUtils};
use timesheet::configuration::Settings;
use timesheet::db::init_db_with_migrations;
use timesheet::entity::user::Role;
use timesheet::model::schedule::ScheduleResponse;
use timesheet::model::timesheet::{EntryDraft, HoursInput};
use timesheet::service::{schedule, CredentialService};

pub const API_KEY: &str = "test-external-key";
pub const PASSWORD: &str = "pa55word";

// bcrypt 최소 cost
const TEST_HASH_COST: u32 = 4;

pub fn settings() -> Settings {
    Settings::from_lookup(|name| match name {
        "DATABASE_URL" => Some("sqlite::memory:".to_string()),
        "JWT_SECRET" => Some("integration-test-secret".to_string()),
        "EXTERNAL_API_KEY" => Some(API_KEY.to_string()),
        _ => None,
    })
    .expect("test settings")
}

pub struct TestContext {
    pub db: DatabaseConnection,
    pub credentials: CredentialService,
    pub admin: Identity,
}

impl TestContext {
    pub async fn new() -> Self {
        Self::with_settings(settings()).await
    }

    /// Same setup against a caller-provided database URL.
    pub async fn with_database_url(url: &str) -> Self {
        let mut settings = settings();
        settings.database_url = url.to_string();
        Self::with_settings(settings).await
    }

    async fn with_settings(settings: Settings) -> Self {
        let db = init_db_with_migrations(&settings).await.expect("migrated db");
        let credentials =
            CredentialService::new(JwtUtils::new(&settings.auth), TEST_HASH_COST).expect("credential service");

        let created = credentials
            .create_user(&db, "admin", PASSWORD, Role::Admin)
            .await
            .expect("admin user");
        let admin = Identity { id: created.id, username: created.username, role: created.role };

        Self { db, credentials, admin }
    }

    pub async fn user(&self, username: &str) -> Identity {
        let created = self
            .credentials
            .create_user(&self.db, username, PASSWORD, Role::User)
            .await
            .expect("user");
        Identity { id: created.id, username: created.username, role: created.role }
    }

    pub async fn schedule_for(&self, owner: &Identity, title: &str) -> ScheduleResponse {
        schedule::create_schedule(&self.db, &self.admin, Some(owner.id), Some(title))
            .await
            .expect("schedule")
    }

    pub fn token_for(&self, identity: &Identity) -> String {
        self.credentials
            .jwt()
            .generate_token(&timesheet::model::auth::UserProfile {
                id: identity.id,
                username: identity.username.clone(),
                role: identity.role,
            })
            .expect("token")
    }
}

pub fn hours(value: Value) -> HoursInput {
    serde_json::from_value(value).expect("hours input")
}

pub fn draft(schedule_id: i32, week_ending: &str, value: Value) -> EntryDraft {
    EntryDraft::build(Some(schedule_id), Some(week_ending), &hours(value), None).expect("draft")
}
