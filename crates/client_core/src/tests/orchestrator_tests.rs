use super::*;
use shared::domain::InvalidSeriesId;

use crate::{
    error::{GatewayError, EMPTY_SERIES_ID_MESSAGE},
    selection::selection_channel,
    test_support::{observation, series_data, FakeGateway, GatewayCall},
};

fn gdp() -> SeriesData {
    series_data(
        "GDP",
        Some("Billions of Dollars"),
        vec![
            observation("2024-01-01", Some(27000.0)),
            observation("2024-04-01", Some(27500.0)),
        ],
    )
}

#[tokio::test]
async fn submit_uppercases_trimmed_id_and_stores_series_and_summary() {
    let gateway = FakeGateway::new()
        .with_series(gdp())
        .with_summary(Ok("GDP grew steadily.".to_string()))
        .shared();
    let mut orchestrator = Orchestrator::new(gateway.clone());

    let outcome = orchestrator.submit("  gdp ").await.expect("submit");

    assert_eq!(outcome, SubmitOutcome::Complete);
    assert_eq!(
        gateway.calls(),
        [
            GatewayCall::FetchSeries("GDP".to_string()),
            GatewayCall::Summarize("GDP".to_string()),
        ]
    );
    let state = orchestrator.state();
    assert_eq!(state.phase, SubmitPhase::Succeeded);
    assert!(!state.loading);
    assert_eq!(state.error, None);
    assert_eq!(state.series.as_ref().map(|s| s.observation_count), Some(2));
    assert_eq!(state.summary.as_deref(), Some("GDP grew steadily."));
}

#[tokio::test]
async fn blank_input_is_rejected_without_network_calls() {
    let gateway = FakeGateway::new().with_series(gdp()).shared();
    let mut orchestrator = Orchestrator::new(gateway.clone());

    for input in ["", "   ", "\t\n"] {
        let err = orchestrator.submit(input).await.expect_err("input error");
        assert!(matches!(err, OrchestratorError::Input(_)));
    }

    assert!(gateway.calls().is_empty());
    let state = orchestrator.state();
    assert_eq!(state.phase, SubmitPhase::Idle);
    assert!(!state.loading);
    assert_eq!(state.error.as_deref(), Some(EMPTY_SERIES_ID_MESSAGE));
}

#[tokio::test]
async fn over_long_id_is_rejected_locally() {
    let gateway = FakeGateway::new().shared();
    let mut orchestrator = Orchestrator::new(gateway.clone());

    let err = orchestrator
        .submit(&"X".repeat(101))
        .await
        .expect_err("input error");

    assert!(matches!(
        err,
        OrchestratorError::Input(InvalidSeriesId::TooLong { len: 101 })
    ));
    assert!(gateway.calls().is_empty());
    assert_eq!(
        orchestrator.state().error.as_deref(),
        Some("Series ID must be at most 100 characters")
    );
}

#[tokio::test]
async fn id_at_length_limit_reaches_gateway() {
    let gateway = FakeGateway::new().shared();
    let mut orchestrator = Orchestrator::new(gateway.clone());
    let id = "x".repeat(100);

    let err = orchestrator.submit(&id).await.expect_err("unknown series");

    assert!(matches!(err, OrchestratorError::Fetch(_)));
    assert_eq!(gateway.calls(), [GatewayCall::FetchSeries(id.to_uppercase())]);
}

#[tokio::test]
async fn blank_input_keeps_previously_loaded_series() {
    let gateway = FakeGateway::new().with_series(gdp()).shared();
    let mut orchestrator = Orchestrator::new(gateway);
    orchestrator.submit("GDP").await.expect("submit");

    let _ = orchestrator.submit(" ").await;

    assert!(orchestrator.state().series.is_some());
}

#[tokio::test]
async fn fetch_failure_surfaces_gateway_detail_and_clears_data() {
    let gateway = FakeGateway::new()
        .with_series(gdp())
        .with_fetch_error(
            "INVALID",
            GatewayError::status(404, "Series ID 'INVALID' not found"),
        )
        .shared();
    let mut orchestrator = Orchestrator::new(gateway.clone());
    orchestrator.submit("GDP").await.expect("first submit");

    let err = orchestrator.submit("INVALID").await.expect_err("fetch error");

    assert!(matches!(err, OrchestratorError::Fetch(_)));
    let state = orchestrator.state();
    assert_eq!(state.phase, SubmitPhase::Failed);
    assert!(!state.loading);
    assert_eq!(state.error.as_deref(), Some("Series ID 'INVALID' not found"));
    assert!(state.series.is_none());
    assert!(state.summary.is_none());
    assert!(!gateway
        .calls()
        .contains(&GatewayCall::Summarize("INVALID".to_string())));
}

#[tokio::test]
async fn summarize_failure_keeps_fetched_series() {
    let gateway = FakeGateway::new()
        .with_series(series_data(
            "UNRATE",
            Some("Percent"),
            vec![observation("2024-01-01", Some(3.7))],
        ))
        .with_summary(Err(GatewayError::status(
            500,
            "Error generating summary: quota exceeded",
        )))
        .shared();
    let mut orchestrator = Orchestrator::new(gateway);

    let outcome = orchestrator.submit("unrate").await.expect("partial success");

    assert!(matches!(
        outcome.summary_error(),
        Some(OrchestratorError::Summarize(_))
    ));
    let state = orchestrator.state();
    assert_eq!(state.phase, SubmitPhase::PartiallySucceeded);
    assert!(!state.loading);
    assert_eq!(state.series.as_ref().map(|s| s.observations.len()), Some(1));
    assert!(state.summary.is_none());
    assert_eq!(
        state.error.as_deref(),
        Some("Error generating summary: quota exceeded")
    );
    assert!(crate::chart::to_chart_series(state.series.as_ref().expect("series")).is_some());
}

#[tokio::test]
async fn new_submission_clears_previous_pair_before_fetch_resolves() {
    let gateway = FakeGateway::new()
        .with_series(gdp())
        .with_series(series_data("UNRATE", None, vec![observation("2024-01-01", Some(3.7))]))
        .shared();
    let mut orchestrator = Orchestrator::new(gateway.clone());
    orchestrator.submit("GDP").await.expect("first");
    let mut watcher = orchestrator.watch();
    let release = gateway.gate_next_fetch();

    let observer = tokio::spawn(async move {
        watcher
            .wait_for(|state| state.loading)
            .await
            .map(|state| (state.series.is_none(), state.summary.is_none(), state.error.is_none()))
            .expect("loading state")
    });
    let submit = async {
        let result = orchestrator.submit("unrate").await;
        (result, orchestrator.state())
    };
    let releaser = async {
        let seen = observer.await.expect("observer");
        release.send(()).expect("release");
        seen
    };
    let ((result, final_state), seen_while_loading) = tokio::join!(submit, releaser);

    assert_eq!(seen_while_loading, (true, true, true));
    assert_eq!(result.expect("second"), SubmitOutcome::Complete);
    assert_eq!(
        final_state.series.as_ref().map(|s| s.series_id.as_str()),
        Some("UNRATE")
    );
}

#[tokio::test]
async fn dropping_an_unsettled_submission_clears_loading() {
    let gateway = FakeGateway::new().with_series(gdp()).shared();
    let mut orchestrator = Orchestrator::new(gateway.clone());
    let _release = gateway.gate_next_fetch();

    {
        let submit = orchestrator.submit("GDP");
        let timed_out =
            tokio::time::timeout(std::time::Duration::from_millis(20), submit).await;
        assert!(timed_out.is_err());
    }

    let state = orchestrator.state();
    assert!(!state.loading);
    assert!(orchestrator.can_submit());
    assert_eq!(state.phase, SubmitPhase::Failed);
}

#[tokio::test]
async fn selection_sets_pending_input_without_submitting() {
    let gateway = FakeGateway::new().with_series(gdp()).shared();
    let (publisher, subscriber) = selection_channel();
    let mut orchestrator = Orchestrator::with_selections(gateway.clone(), subscriber);

    publisher.publish("PAYEMS");
    publisher.publish("gdp");
    let applied = orchestrator.apply_selections();

    assert_eq!(applied.as_deref(), Some("gdp"));
    assert_eq!(orchestrator.state().pending_input, "gdp");
    assert!(gateway.calls().is_empty());

    orchestrator.submit_pending().await.expect("submit pending");
    assert_eq!(gateway.calls()[0], GatewayCall::FetchSeries("GDP".to_string()));
}

#[test]
fn apply_selections_without_subscriber_is_noop() {
    let mut orchestrator = Orchestrator::new(FakeGateway::new().shared());

    assert_eq!(orchestrator.apply_selections(), None);
    assert_eq!(orchestrator.state().pending_input, "");
}
