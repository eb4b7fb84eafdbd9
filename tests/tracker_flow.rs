use chrono::{DateTime, NaiveDate, Utc};
use tempfile::TempDir;
use uuid::Uuid;

use worktrack::{Database, PauseToggle, Tracker, TrackerError, TrackerStatus, WorkSession};

/// Fresh store and tracker per test; the temp dir must outlive them.
struct TestContext {
    tracker: Tracker,
    db: Database,
    _temp_dir: TempDir,
}

fn setup() -> TestContext {
    let temp_dir = tempfile::tempdir().expect("failed to create temp dir");
    let db = Database::new(temp_dir.path().join("worktrack.sqlite3"))
        .expect("failed to open test database");

    TestContext {
        tracker: Tracker::new(db.clone()),
        db,
        _temp_dir: temp_dir,
    }
}

async fn register(ctx: &TestContext, chat_id: i64) {
    ctx.tracker
        .register_or_update_user(
            chat_id,
            Some("tester".to_string()),
            Some("Test".to_string()),
            None,
            false,
        )
        .await
        .expect("registration failed");
}

fn ts(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .unwrap()
        .with_timezone(&Utc)
}

fn completed_session(
    user_id: i64,
    date: &str,
    start: &str,
    end: &str,
    total_pause_seconds: u64,
) -> WorkSession {
    WorkSession {
        id: Uuid::new_v4().to_string(),
        user_id,
        date: date.parse().unwrap(),
        start_time: ts(start),
        end_time: Some(ts(end)),
        description: None,
        total_pause_seconds,
        created_at: ts(start),
    }
}

#[tokio::test]
async fn registration_creates_then_updates_metadata() {
    let ctx = setup();

    let created = ctx
        .tracker
        .register_or_update_user(1, Some("tester".to_string()), None, None, false)
        .await
        .unwrap();
    assert_eq!(created.username.as_deref(), Some("tester"));
    assert!(!created.is_admin);

    let updated = ctx
        .tracker
        .register_or_update_user(1, Some("renamed".to_string()), Some("Test".to_string()), None, true)
        .await
        .unwrap();
    assert_eq!(updated.username.as_deref(), Some("renamed"));
    assert_eq!(updated.first_name.as_deref(), Some("Test"));
    assert!(updated.is_admin);
    assert_eq!(updated.created_at, created.created_at);
}

#[tokio::test]
async fn operations_require_registration() {
    let ctx = setup();

    assert!(matches!(
        ctx.tracker.start_work_day(99, None).await,
        Err(TrackerError::NotRegistered(99))
    ));
    assert!(matches!(
        ctx.tracker.toggle_pause(99, None).await,
        Err(TrackerError::NotRegistered(99))
    ));
    assert!(matches!(
        ctx.tracker.daily_stats(99, Utc::now().date_naive()).await,
        Err(TrackerError::NotRegistered(99))
    ));
}

#[tokio::test]
async fn second_start_is_refused_without_side_effects() {
    let ctx = setup();
    register(&ctx, 1).await;

    let first = ctx.tracker.start_work_day(1, None).await.unwrap();

    let refused = ctx.tracker.start_work_day(1, None).await;
    match refused {
        Err(TrackerError::AlreadyActive { started_at }) => {
            assert_eq!(started_at, first.start_time);
        }
        other => panic!("expected AlreadyActive, got {other:?}"),
    }

    // The refusal must not have created a second session.
    ctx.tracker.stop_work_day(1).await.unwrap();
    let daily = ctx.tracker.daily_stats(1, first.date).await.unwrap();
    assert_eq!(daily.sessions_count, 1);

    // And once stopped, a new day can begin.
    ctx.tracker.start_work_day(1, None).await.unwrap();
}

#[tokio::test]
async fn stop_and_pause_are_refused_while_idle() {
    let ctx = setup();
    register(&ctx, 1).await;

    assert!(matches!(
        ctx.tracker.stop_work_day(1).await,
        Err(TrackerError::NoActiveSession)
    ));
    assert!(matches!(
        ctx.tracker.toggle_pause(1, None).await,
        Err(TrackerError::NoActiveSession)
    ));
}

#[tokio::test]
async fn pause_toggle_roundtrip_accumulates_exactly() {
    let ctx = setup();
    register(&ctx, 1).await;
    ctx.tracker.start_work_day(1, None).await.unwrap();
    assert_eq!(ctx.tracker.status(1).await.unwrap(), TrackerStatus::Working);

    let opened = match ctx
        .tracker
        .toggle_pause(1, Some("Lunch".to_string()))
        .await
        .unwrap()
    {
        PauseToggle::Opened(pause) => pause,
        other => panic!("expected Opened, got {other:?}"),
    };
    assert_eq!(opened.reason.as_deref(), Some("Lunch"));
    assert!(opened.end_time.is_none());
    assert_eq!(ctx.tracker.status(1).await.unwrap(), TrackerStatus::Paused);

    // Reading the open pause twice yields the same pause identity.
    let read_one = ctx.tracker.active_pause(1).await.unwrap().unwrap();
    let read_two = ctx.tracker.active_pause(1).await.unwrap().unwrap();
    assert_eq!(read_one.pause.id, opened.id);
    assert_eq!(read_two.pause.id, opened.id);

    let (closed, session) = match ctx.tracker.toggle_pause(1, None).await.unwrap() {
        PauseToggle::Closed { pause, session } => (pause, session),
        other => panic!("expected Closed, got {other:?}"),
    };
    assert_eq!(closed.id, opened.id);
    assert!(closed.end_time.is_some());
    assert_eq!(
        session.total_pause_seconds,
        closed.duration_seconds().unwrap()
    );
    assert_eq!(ctx.tracker.status(1).await.unwrap(), TrackerStatus::Working);
    assert!(ctx.tracker.active_pause(1).await.unwrap().is_none());
}

#[tokio::test]
async fn accumulator_never_decreases_across_toggles() {
    let ctx = setup();
    register(&ctx, 1).await;
    ctx.tracker.start_work_day(1, None).await.unwrap();

    let mut last_total = 0u64;
    let mut expected_total = 0u64;
    for _ in 0..3 {
        ctx.tracker.toggle_pause(1, None).await.unwrap();
        let (pause, session) = match ctx.tracker.toggle_pause(1, None).await.unwrap() {
            PauseToggle::Closed { pause, session } => (pause, session),
            other => panic!("expected Closed, got {other:?}"),
        };
        expected_total += pause.duration_seconds().unwrap();
        assert_eq!(session.total_pause_seconds, expected_total);
        assert!(session.total_pause_seconds >= last_total);
        last_total = session.total_pause_seconds;
    }
}

#[tokio::test]
async fn end_pause_requires_an_open_pause() {
    let ctx = setup();
    register(&ctx, 1).await;
    ctx.tracker.start_work_day(1, None).await.unwrap();

    assert!(matches!(
        ctx.tracker.end_pause(1).await,
        Err(TrackerError::NoActivePause)
    ));

    ctx.tracker.toggle_pause(1, None).await.unwrap();
    assert!(matches!(
        ctx.tracker.end_pause(1).await,
        Ok(PauseToggle::Closed { .. })
    ));
    assert!(matches!(
        ctx.tracker.end_pause(1).await,
        Err(TrackerError::NoActivePause)
    ));
}

#[tokio::test]
async fn stop_while_paused_closes_the_trailing_pause() {
    let ctx = setup();
    register(&ctx, 1).await;
    ctx.tracker.start_work_day(1, None).await.unwrap();
    ctx.tracker
        .toggle_pause(1, Some("Call / meeting".to_string()))
        .await
        .unwrap();

    let session = ctx.tracker.stop_work_day(1).await.unwrap();
    assert!(!session.is_active());
    assert!(session.end_time.is_some());

    let pauses = ctx.tracker.session_pauses(&session.id).await.unwrap();
    assert_eq!(pauses.len(), 1);
    assert!(pauses.iter().all(|p| p.end_time.is_some()));
    assert_eq!(
        session.total_pause_seconds,
        pauses[0].duration_seconds().unwrap()
    );

    assert_eq!(ctx.tracker.status(1).await.unwrap(), TrackerStatus::Idle);

    // The closed session cannot grow a new pause.
    assert!(matches!(
        ctx.tracker.toggle_pause(1, None).await,
        Err(TrackerError::NoActiveSession)
    ));
}

#[tokio::test]
async fn daily_stats_sum_the_days_sessions() {
    let ctx = setup();
    register(&ctx, 7).await;

    ctx.db
        .insert_session(&completed_session(
            7,
            "2024-03-18",
            "2024-03-18T09:00:00Z",
            "2024-03-18T10:00:00Z",
            0,
        ))
        .await
        .unwrap();
    ctx.db
        .insert_session(&completed_session(
            7,
            "2024-03-18",
            "2024-03-18T12:00:00Z",
            "2024-03-18T14:30:00Z",
            1800,
        ))
        .await
        .unwrap();

    let date: NaiveDate = "2024-03-18".parse().unwrap();
    let daily = ctx.tracker.daily_stats(7, date).await.unwrap();
    assert_eq!(daily.total_work_seconds, 10_800);
    assert_eq!(daily.total_pause_seconds, 1800);
    assert_eq!(daily.sessions_count, 2);
    assert_eq!(daily.productivity, 85);

    // A day with nothing completed aggregates to zero.
    let empty: NaiveDate = "2024-03-20".parse().unwrap();
    let daily = ctx.tracker.daily_stats(7, empty).await.unwrap();
    assert_eq!(daily.sessions_count, 0);
    assert_eq!(daily.total_work_seconds, 0);
    assert_eq!(daily.productivity, 0);
}

#[tokio::test]
async fn weekly_stats_window_and_grand_totals() {
    let ctx = setup();
    register(&ctx, 8).await;

    // Inside the window: one fully productive day, one 50/50 day.
    ctx.db
        .insert_session(&completed_session(
            8,
            "2024-03-18",
            "2024-03-18T09:00:00Z",
            "2024-03-18T10:00:00Z",
            0,
        ))
        .await
        .unwrap();
    ctx.db
        .insert_session(&completed_session(
            8,
            "2024-03-19",
            "2024-03-19T09:00:00Z",
            "2024-03-19T09:30:00Z",
            900,
        ))
        .await
        .unwrap();
    // On the inclusive lower boundary of the window.
    ctx.db
        .insert_session(&completed_session(
            8,
            "2024-03-13",
            "2024-03-13T07:00:00Z",
            "2024-03-13T08:00:00Z",
            0,
        ))
        .await
        .unwrap();
    // Completed before the window; must not appear.
    ctx.db
        .insert_session(&completed_session(
            8,
            "2024-03-10",
            "2024-03-10T09:00:00Z",
            "2024-03-10T17:00:00Z",
            0,
        ))
        .await
        .unwrap();

    let from: NaiveDate = "2024-03-19".parse().unwrap();
    let weekly = ctx.tracker.weekly_stats(8, from).await.unwrap();

    let dates: Vec<String> = weekly.days.iter().map(|d| d.date.to_string()).collect();
    assert_eq!(dates, vec!["2024-03-13", "2024-03-18", "2024-03-19"]);

    assert_eq!(weekly.days[1].stats.productivity, 100);
    assert_eq!(weekly.days[2].stats.productivity, 50);

    // Grand totals recompute productivity from the summed seconds:
    // 8100 work / 900 pause = 90%, not an average of 100/100/50.
    assert_eq!(weekly.totals.total_work_seconds, 8100);
    assert_eq!(weekly.totals.total_pause_seconds, 900);
    assert_eq!(weekly.totals.sessions_count, 3);
    assert_eq!(weekly.totals.productivity, 90);
}
