mod common;

use sea_orm::{EntityTrait, PaginatorTrait};
use serde_json::json;

use common::{draft, TestContext};
use timesheet::entity::time_entry::Entity as TimeEntryEntity;
use timesheet::model::ErrorCode;
use timesheet::service::{schedule, timesheet as timesheet_service};

#[tokio::test]
async fn only_admins_create_schedules() {
    let ctx = TestContext::new().await;
    let alice = ctx.user("alice").await;

    let err = schedule::create_schedule(&ctx.db, &alice, Some(alice.id), Some("X"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::AdminRequired);

    let created = schedule::create_schedule(&ctx.db, &ctx.admin, Some(alice.id), Some("  X  "))
        .await
        .unwrap();
    assert_eq!(created.project_title, "X");
    assert!(created.is_assigned);
    assert_eq!(created.user.unwrap().username, "alice");
}

#[tokio::test]
async fn create_validates_input() {
    let ctx = TestContext::new().await;
    let alice = ctx.user("alice").await;

    let err = schedule::create_schedule(&ctx.db, &ctx.admin, None, Some("X")).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::ValidationError);

    let err = schedule::create_schedule(&ctx.db, &ctx.admin, Some(alice.id), Some(" "))
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::ValidationError);

    let err = schedule::create_schedule(&ctx.db, &ctx.admin, Some(4242), Some("X"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::UserNotFound);
}

#[tokio::test]
async fn listing_is_scoped_by_role() {
    let ctx = TestContext::new().await;
    let alice = ctx.user("alice").await;
    let bob = ctx.user("bob").await;
    ctx.schedule_for(&alice, "A1").await;
    ctx.schedule_for(&alice, "A2").await;
    ctx.schedule_for(&bob, "B1").await;

    let mine = schedule::list_schedules(&ctx.db, &alice).await.unwrap();
    assert_eq!(mine.len(), 2);
    assert!(mine.iter().all(|s| s.user_id == alice.id));
    // 최신순
    assert_eq!(mine[0].project_title, "A2");

    let all = schedule::list_schedules(&ctx.db, &ctx.admin).await.unwrap();
    assert_eq!(all.len(), 3);
}

#[tokio::test]
async fn delete_removes_schedule_and_its_entries() {
    let ctx = TestContext::new().await;
    let alice = ctx.user("alice").await;
    let doomed = ctx.schedule_for(&alice, "A").await;
    let kept = ctx.schedule_for(&alice, "B").await;

    for week in ["2024-06-07", "2024-06-14"] {
        timesheet_service::save_entry(&ctx.db, &alice, draft(doomed.id, week, json!({ "mon": 1 })))
            .await
            .unwrap();
    }
    timesheet_service::save_entry(&ctx.db, &alice, draft(kept.id, "2024-06-07", json!({ "mon": 1 })))
        .await
        .unwrap();

    let err = schedule::delete_schedule(&ctx.db, &alice, doomed.id).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::AdminRequired);

    schedule::delete_schedule(&ctx.db, &ctx.admin, doomed.id).await.unwrap();

    assert_eq!(TimeEntryEntity::find().count(&ctx.db).await.unwrap(), 1);
    let remaining = schedule::list_schedules(&ctx.db, &ctx.admin).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, kept.id);

    let err = schedule::delete_schedule(&ctx.db, &ctx.admin, doomed.id).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::ScheduleNotFound);
}

#[tokio::test]
async fn user_schedules_are_visible_to_self_and_admin() {
    let ctx = TestContext::new().await;
    let alice = ctx.user("alice").await;
    let bob = ctx.user("bob").await;
    ctx.schedule_for(&alice, "A").await;

    let own = schedule::list_for_user(&ctx.db, &alice, alice.id).await.unwrap();
    assert_eq!(own.user.username, "alice");
    assert_eq!(own.schedules.len(), 1);
    assert_eq!(own.schedules[0].project_title, "A");

    let err = schedule::list_for_user(&ctx.db, &bob, alice.id).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::NotEnoughPermission);

    let by_admin = schedule::list_for_user(&ctx.db, &ctx.admin, alice.id).await.unwrap();
    assert_eq!(by_admin.schedules.len(), 1);

    let err = schedule::list_for_user(&ctx.db, &ctx.admin, 4242).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::UserNotFound);
}
