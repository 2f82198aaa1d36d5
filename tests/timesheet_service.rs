mod common;

use sea_orm::{EntityTrait, PaginatorTrait};
use serde_json::json;

use common::{draft, hours, TestContext};
use timesheet::entity::time_entry::Entity as TimeEntryEntity;
use timesheet::model::timesheet::{
    BatchSaveRequest, Day, DayNoteEdit, EntryDraft, EntryFilter, NoteMode, NotesInput, WeekNotes,
};
use timesheet::model::ErrorCode;
use timesheet::service::timesheet as timesheet_service;

fn edit(day: Day, text: &str, mode: NoteMode) -> DayNoteEdit {
    DayNoteEdit { day, text: text.to_string(), mode }
}

#[tokio::test]
async fn save_creates_entry_with_unspecified_days_zeroed() {
    let ctx = TestContext::new().await;
    let alice = ctx.user("alice").await;
    let schedule = ctx.schedule_for(&alice, "X").await;

    let entry = timesheet_service::save_entry(&ctx.db, &alice, draft(schedule.id, "2024-06-07", json!({ "mon": 8 })))
        .await
        .unwrap();

    assert_eq!(entry.hours.mon, 8.0);
    assert_eq!(entry.hours.total(), 8.0);
    assert!(!entry.is_submitted);
    assert_eq!(entry.week_ending.to_string(), "2024-06-07");
}

#[tokio::test]
async fn saving_same_week_twice_keeps_one_row_with_latest_values() {
    let ctx = TestContext::new().await;
    let alice = ctx.user("alice").await;
    let schedule = ctx.schedule_for(&alice, "X").await;

    let first = timesheet_service::save_entry(&ctx.db, &alice, draft(schedule.id, "2024-06-07", json!({ "mon": 8 })))
        .await
        .unwrap();
    let second = timesheet_service::save_entry(
        &ctx.db,
        &alice,
        draft(schedule.id, "2024-06-07T00:00:00Z", json!({ "tue": "7.5" })),
    )
    .await
    .unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.hours.mon, 0.0);
    assert_eq!(second.hours.tue, 7.5);
    assert_eq!(TimeEntryEntity::find().count(&ctx.db).await.unwrap(), 1);
}

#[tokio::test]
async fn unparseable_hours_are_stored_as_zero() {
    let ctx = TestContext::new().await;
    let alice = ctx.user("alice").await;
    let schedule = ctx.schedule_for(&alice, "X").await;

    let entry = timesheet_service::save_entry(
        &ctx.db,
        &alice,
        draft(schedule.id, "2024-06-07", json!({ "mon": "abc", "wed": null, "fri": 26 })),
    )
    .await
    .unwrap();

    assert_eq!(entry.hours.mon, 0.0);
    assert_eq!(entry.hours.wed, 0.0);
    assert_eq!(entry.hours.fri, 26.0);
}

#[tokio::test]
async fn users_cannot_write_to_schedules_they_do_not_own() {
    let ctx = TestContext::new().await;
    let alice = ctx.user("alice").await;
    let bob = ctx.user("bob").await;
    let schedule = ctx.schedule_for(&alice, "X").await;

    let err = timesheet_service::save_entry(&ctx.db, &bob, draft(schedule.id, "2024-06-07", json!({ "mon": 1 })))
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::NotEnoughPermission);

    let entry = timesheet_service::save_entry(&ctx.db, &ctx.admin, draft(schedule.id, "2024-06-07", json!({ "mon": 1 })))
        .await
        .unwrap();
    let err = timesheet_service::submit_entry(&ctx.db, &bob, entry.id).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::NotEnoughPermission);
}

#[tokio::test]
async fn unknown_schedule_and_entry_are_not_found() {
    let ctx = TestContext::new().await;
    let alice = ctx.user("alice").await;

    let err = timesheet_service::save_entry(&ctx.db, &alice, draft(999, "2024-06-07", json!({})))
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::ScheduleNotFound);

    let err = timesheet_service::submit_entry(&ctx.db, &alice, 999).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::TimeEntryNotFound);
}

#[tokio::test]
async fn submitted_entry_rejects_every_mutation() {
    let ctx = TestContext::new().await;
    let alice = ctx.user("alice").await;
    let schedule = ctx.schedule_for(&alice, "X").await;

    let entry = timesheet_service::save_entry(&ctx.db, &alice, draft(schedule.id, "2024-06-07", json!({ "mon": 8 })))
        .await
        .unwrap();
    let submitted = timesheet_service::submit_entry(&ctx.db, &alice, entry.id).await.unwrap();
    assert!(submitted.is_submitted);

    let err = timesheet_service::update_hours(&ctx.db, &alice, entry.id, &hours(json!({ "mon": 4 })))
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::EntryLocked);

    let err = timesheet_service::update_notes(&ctx.db, &alice, entry.id, WeekNotes::default())
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::EntryLocked);

    let err = timesheet_service::update_day_note(&ctx.db, &alice, entry.id, &edit(Day::Mon, "late", NoteMode::Append))
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::EntryLocked);

    let err = timesheet_service::save_entry(&ctx.db, &ctx.admin, draft(schedule.id, "2024-06-07", json!({ "mon": 1 })))
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::EntryLocked);

    let stored = TimeEntryEntity::find_by_id(entry.id).one(&ctx.db).await.unwrap().unwrap();
    assert_eq!(stored.mon, 8.0);
    assert!(stored.is_submitted);
}

#[tokio::test]
async fn submitting_twice_is_harmless() {
    let ctx = TestContext::new().await;
    let alice = ctx.user("alice").await;
    let schedule = ctx.schedule_for(&alice, "X").await;
    let entry = timesheet_service::save_entry(&ctx.db, &alice, draft(schedule.id, "2024-06-07", json!({})))
        .await
        .unwrap();

    timesheet_service::submit_entry(&ctx.db, &alice, entry.id).await.unwrap();
    let again = timesheet_service::submit_entry(&ctx.db, &alice, entry.id).await.unwrap();

    assert!(again.is_submitted);
    assert_eq!(again.hours.total(), 0.0);
}

#[tokio::test]
async fn hours_patch_touches_only_given_days() {
    let ctx = TestContext::new().await;
    let alice = ctx.user("alice").await;
    let schedule = ctx.schedule_for(&alice, "X").await;
    let entry = timesheet_service::save_entry(
        &ctx.db,
        &alice,
        draft(schedule.id, "2024-06-07", json!({ "mon": 8, "tue": 8 })),
    )
    .await
    .unwrap();

    let updated = timesheet_service::update_hours(&ctx.db, &alice, entry.id, &hours(json!({ "tue": "6", "sat": 2 })))
        .await
        .unwrap();
    assert_eq!(updated.hours.mon, 8.0);
    assert_eq!(updated.hours.tue, 6.0);
    assert_eq!(updated.hours.sat, 2.0);

    let err = timesheet_service::update_hours(&ctx.db, &alice, entry.id, &hours(json!({})))
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::ValidationError);
}

#[tokio::test]
async fn day_note_replace_and_append() {
    let ctx = TestContext::new().await;
    let alice = ctx.user("alice").await;
    let schedule = ctx.schedule_for(&alice, "X").await;
    let entry = timesheet_service::save_entry(&ctx.db, &alice, draft(schedule.id, "2024-06-07", json!({})))
        .await
        .unwrap();

    // 빈 노트에 append 하면 개행 없이 그대로
    let first = timesheet_service::update_day_note(&ctx.db, &alice, entry.id, &edit(Day::Mon, "A", NoteMode::Append))
        .await
        .unwrap();
    assert_eq!(first.notes.mon, "A");

    let second = timesheet_service::update_day_note(&ctx.db, &alice, entry.id, &edit(Day::Mon, "B", NoteMode::Append))
        .await
        .unwrap();
    assert_eq!(second.notes.mon, "A\nB");

    let replaced = timesheet_service::update_day_note(&ctx.db, &alice, entry.id, &edit(Day::Mon, "C", NoteMode::Replace))
        .await
        .unwrap();
    assert_eq!(replaced.notes.mon, "C");
    assert_eq!(replaced.notes.tue, "");
}

#[tokio::test]
async fn full_notes_replacement_accepts_encoded_map() {
    let ctx = TestContext::new().await;
    let alice = ctx.user("alice").await;
    let schedule = ctx.schedule_for(&alice, "X").await;
    let entry = timesheet_service::save_entry(&ctx.db, &alice, draft(schedule.id, "2024-06-07", json!({})))
        .await
        .unwrap();

    let notes = NotesInput::Encoded(r#"{"fri":"demo day"}"#.to_string()).into_notes().unwrap();
    let updated = timesheet_service::update_notes(&ctx.db, &alice, entry.id, notes).await.unwrap();

    assert_eq!(updated.notes.fri, "demo day");
    assert_eq!(updated.notes.mon, "");
}

#[tokio::test]
async fn listing_is_scoped_to_owned_schedules() {
    let ctx = TestContext::new().await;
    let alice = ctx.user("alice").await;
    let bob = ctx.user("bob").await;
    let alice_schedule = ctx.schedule_for(&alice, "A").await;
    let bob_schedule = ctx.schedule_for(&bob, "B").await;

    for (owner, schedule_id) in [(&alice, alice_schedule.id), (&bob, bob_schedule.id)] {
        for week in ["2024-06-07", "2024-06-14"] {
            timesheet_service::save_entry(&ctx.db, owner, draft(schedule_id, week, json!({ "mon": 1 })))
                .await
                .unwrap();
        }
    }

    let mine = timesheet_service::list_entries(&ctx.db, &alice, EntryFilter::default()).await.unwrap();
    assert_eq!(mine.len(), 2);
    assert!(mine.iter().all(|e| e.schedule_id == alice_schedule.id));
    let summary = mine[0].schedule.as_ref().unwrap();
    assert_eq!(summary.user.as_ref().unwrap().username, "alice");

    // 타인의 scheduleId 를 지정해도 결과는 비어 있음
    let foreign = timesheet_service::list_entries(
        &ctx.db,
        &alice,
        EntryFilter { schedule_id: Some(bob_schedule.id), week_ending: None },
    )
    .await
    .unwrap();
    assert!(foreign.is_empty());

    let all = timesheet_service::list_entries(&ctx.db, &ctx.admin, EntryFilter::default()).await.unwrap();
    assert_eq!(all.len(), 4);

    let week = EntryFilter {
        schedule_id: None,
        week_ending: Some(chrono::NaiveDate::from_ymd_opt(2024, 6, 14).unwrap()),
    };
    let one_week = timesheet_service::list_entries(&ctx.db, &ctx.admin, week).await.unwrap();
    assert_eq!(one_week.len(), 2);
}

#[tokio::test]
async fn user_without_schedules_sees_nothing() {
    let ctx = TestContext::new().await;
    let alice = ctx.user("alice").await;
    let carol = ctx.user("carol").await;
    let schedule = ctx.schedule_for(&alice, "A").await;
    timesheet_service::save_entry(&ctx.db, &alice, draft(schedule.id, "2024-06-07", json!({})))
        .await
        .unwrap();

    let entries = timesheet_service::list_entries(&ctx.db, &carol, EntryFilter::default()).await.unwrap();
    assert!(entries.is_empty());
}

#[tokio::test]
async fn batch_stops_at_first_failure_and_keeps_earlier_rows() {
    let ctx = TestContext::new().await;
    let alice = ctx.user("alice").await;
    let bob = ctx.user("bob").await;
    let mine = ctx.schedule_for(&alice, "A").await;
    let theirs = ctx.schedule_for(&bob, "B").await;
    let also_mine = ctx.schedule_for(&alice, "C").await;

    let request: BatchSaveRequest = serde_json::from_value(json!({
        "weekEnding": "2024-06-07",
        "submit": true,
        "entries": [
            { "scheduleId": mine.id, "mon": 8 },
            { "scheduleId": theirs.id, "mon": 8 },
            { "scheduleId": also_mine.id, "mon": 8 },
        ]
    }))
    .unwrap();

    let response = timesheet_service::save_batch(&ctx.db, &alice, request).await.unwrap();

    assert_eq!(response.processed, 2);
    assert_eq!(response.saved.len(), 1);
    assert!(response.saved[0].is_submitted);
    let failure = response.failure.unwrap();
    assert_eq!(failure.index, 1);
    assert_eq!(failure.code, ErrorCode::NotEnoughPermission);

    assert_eq!(TimeEntryEntity::find().count(&ctx.db).await.unwrap(), 1);
}

#[tokio::test]
async fn batch_requires_week_ending() {
    let ctx = TestContext::new().await;
    let alice = ctx.user("alice").await;

    let request: BatchSaveRequest = serde_json::from_value(json!({ "entries": [] })).unwrap();
    let err = timesheet_service::save_batch(&ctx.db, &alice, request).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::ValidationError);
}

#[tokio::test]
async fn draft_rejects_bad_week_ending() {
    let err = EntryDraft::build(Some(1), Some("06/07/2024"), &hours(json!({})), None).unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidWeekEnding);

    let err = EntryDraft::build(None, Some("2024-06-07"), &hours(json!({})), None).unwrap_err();
    assert_eq!(err.code(), ErrorCode::ValidationError);
}

struct TempDbFile(std::path::PathBuf);

impl Drop for TempDbFile {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm", "-journal"] {
            let mut path = self.0.clone().into_os_string();
            path.push(suffix);
            let _ = std::fs::remove_file(path);
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_saves_for_one_week_keep_one_row() {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let file = TempDbFile(std::env::temp_dir().join(format!("timesheet-{}-{nanos}.db", std::process::id())));
    let url = format!("sqlite://{}?mode=rwc", file.0.display());

    // 파일 DB 는 여러 커넥션을 쓰므로 실제로 동시에 upsert 가 실행됨
    let ctx = TestContext::with_database_url(&url).await;
    let alice = ctx.user("alice").await;
    let schedule = ctx.schedule_for(&alice, "X").await;

    let mut tasks = tokio::task::JoinSet::new();
    for n in 0..32 {
        let db = ctx.db.clone();
        let alice = alice.clone();
        let draft = draft(schedule.id, "2024-06-07", json!({ "mon": n }));
        tasks.spawn(async move { timesheet_service::save_entry(&db, &alice, draft).await });
    }

    let mut ids = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        ids.push(joined.unwrap().unwrap().id);
    }

    assert_eq!(ids.len(), 32);
    assert!(ids.iter().all(|id| *id == ids[0]));
    assert_eq!(TimeEntryEntity::find().count(&ctx.db).await.unwrap(), 1);

    ctx.db.close().await.unwrap();
}
