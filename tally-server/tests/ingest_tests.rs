mod test_helpers;

use tally_core::compute_leaderboard;
use tally_server::ingest::IngestError;
use tally_types::SummarySubmission;
use test_helpers::*;

const SUMMARY: &str = "Your group is on a 3 day streak! 🔥 Here are yesterday's results:\n\
👑 3/6: <@111>\n\
3/6: @Jiawen\n\
4/6: <@222>\n\
X/6: @Stranger Danger";

#[tokio::test]
async fn test_summary_without_results_is_rejected() {
    let setup = TestTallySetup::new().await;

    let result = setup.ingest(&submission("gm everyone, who's playing today?")).await;

    assert!(matches!(result, Err(IngestError::NotRecognized)));
    assert_eq!(setup.result_repository.counts().await.unwrap().results, 0);
}

#[tokio::test]
async fn test_date_defaults_to_previous_day() {
    let setup = TestTallySetup::new().await;

    let report = setup.ingest(&submission("2/6: <@111>")).await.unwrap();

    assert_eq!(report.date_iso, "2024-07-14");
    assert_eq!(report.puzzle_number, None);

    let rows = setup.result_repository.all_results().await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].date_iso, "2024-07-14");
    assert_eq!(rows[0].guesses, Some(2));
}

#[tokio::test]
async fn test_invalid_date_is_rejected() {
    let setup = TestTallySetup::new().await;

    let result = setup
        .ingest(&dated_submission("2/6: <@111>", "14/07/2024"))
        .await;

    match result {
        Err(err @ IngestError::InvalidDate(_)) => assert_eq!(err.status(), 400),
        other => panic!("Expected InvalidDate, got {:?}", other),
    }
}

#[tokio::test]
async fn test_only_configured_author_is_accepted() {
    let setup = TestTallySetup::with_author(Some("900")).await;

    let missing_author = setup.ingest(&submission("2/6: <@111>")).await;
    assert!(matches!(missing_author, Err(IngestError::UnexpectedAuthor(ref a)) if a.is_empty()));

    let wrong_author = SummarySubmission {
        author_id: Some("901".to_string()),
        ..submission("2/6: <@111>")
    };
    let result = setup.ingest(&wrong_author).await;
    assert!(matches!(result, Err(IngestError::UnexpectedAuthor(ref a)) if a == "901"));

    let right_author = SummarySubmission {
        author_id: Some("900".to_string()),
        ..submission("2/6: <@111>")
    };
    assert_eq!(setup.ingest(&right_author).await.unwrap().ingested, 1);
}

#[tokio::test]
async fn test_plain_handles_resolve_through_aliases() {
    let setup = TestTallySetup::new().await;
    setup.add_aliases(&[("@jiawen", "333")]).await;

    let report = setup
        .ingest(&dated_submission(SUMMARY, "2024-07-10"))
        .await
        .unwrap();

    assert_eq!(report.ingested, 3);
    assert_eq!(report.unresolved, vec!["@stranger danger".to_string()]);

    let board = compute_leaderboard(&setup.result_repository.all_results().await.unwrap());
    let ids: Vec<_> = board.iter().map(|row| row.user_id.as_str()).collect();
    assert_eq!(ids, vec!["111", "333", "222"]);
}

#[tokio::test]
async fn test_display_names_resolve_after_refresh() {
    let setup = TestTallySetup::new().await;

    let before = setup
        .ingest(&dated_submission("5/6: @Stranger", "2024-07-10"))
        .await
        .unwrap();
    assert_eq!(before.ingested, 0);

    setup
        .result_repository
        .set_display_name("444", "Stranger Danger")
        .await
        .unwrap();
    let refresh = setup.ingest_service.refresh_aliases().await.unwrap();
    assert_eq!(refresh.members, 1);

    let after = setup
        .ingest(&dated_submission("5/6: @Stranger", "2024-07-10"))
        .await
        .unwrap();
    assert_eq!(after.ingested, 1);

    let rows = setup.result_repository.results_for_user("444").await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].guesses, Some(5));
}

#[tokio::test]
async fn test_reingesting_a_summary_is_idempotent() {
    let setup = TestTallySetup::new().await;
    setup.add_aliases(&[("@jiawen", "333")]).await;

    let summary = dated_submission(SUMMARY, "2024-07-10");
    setup.ingest(&summary).await.unwrap();
    let first = compute_leaderboard(&setup.result_repository.all_results().await.unwrap());

    setup.ingest(&summary).await.unwrap();
    let second = compute_leaderboard(&setup.result_repository.all_results().await.unwrap());

    assert_eq!(first, second);
    assert_eq!(setup.result_repository.counts().await.unwrap().results, 3);
}

#[tokio::test]
async fn test_corrected_summary_replaces_result() {
    let setup = TestTallySetup::new().await;

    setup
        .ingest(&dated_submission("X/6: <@111>", "2024-07-10"))
        .await
        .unwrap();
    setup
        .ingest(&dated_submission("4/6: <@111>", "2024-07-10"))
        .await
        .unwrap();

    let rows = setup.result_repository.results_for_user("111").await.unwrap();
    assert_eq!(rows.len(), 1);
    assert!(!rows[0].failed);
    assert_eq!(rows[0].guesses, Some(4));
}

#[tokio::test]
async fn test_refresh_advances_generation() {
    let setup = TestTallySetup::new().await;

    let first = setup.ingest_service.refresh_aliases().await.unwrap();
    setup.add_aliases(&[("@anika", "555")]).await;

    let directory = setup.ingest_service.directory();
    let directory = directory.read().await;
    assert_eq!(first.generation, 1);
    assert_eq!(directory.generation(), 2);
    assert_eq!(directory.alias_count(), 1);
    assert!(directory.refreshed_at().is_some());
}
