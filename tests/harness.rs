mod common;

use std::time::Duration;

use common::FakeService;
use lifecycle_bench::backend::{
    Query, ResourceAdmin, ResourceId, ResourceSpec, SimulatedConfig, SimulatedService,
};
use lifecycle_bench::error::TrialFailure;
use lifecycle_bench::harness::{
    BenchmarkLoop, CancellationToken, LoopOutcome, Phase, PhaseStopwatches, Progress, ReleasePolicy,
};

fn query() -> Query {
    Query::new("SELECT count(1) FROM projects")
}

fn resource() -> ResourceId {
    ResourceId::new("alpha")
}

fn sample_counts(stopwatches: &PhaseStopwatches) -> [usize; 3] {
    [stopwatches.acquire.len(), stopwatches.work.len(), stopwatches.release.len()]
}

#[tokio::test]
async fn uninterrupted_run_records_every_trial() {
    for trials in [1, 2, 25, 333] {
        let service = FakeService::new();
        let mut stopwatches = PhaseStopwatches::new(trials).unwrap();
        let mut progress: Vec<Progress> = Vec::new();

        let outcome = BenchmarkLoop::new(trials, 5)
            .unwrap()
            .run(&mut stopwatches, &service, &resource(), &query(), &CancellationToken::new(), &mut progress)
            .await
            .unwrap();

        assert_eq!(outcome, LoopOutcome::Completed { trials });
        assert_eq!(sample_counts(&stopwatches), [trials; 3]);
        assert_eq!(service.connects.get(), trials);
        assert_eq!(service.closes.get(), trials);
    }
}

#[tokio::test]
async fn hundred_trials_every_ten_emits_ten_progress_lines() {
    let service = FakeService::new();
    let mut stopwatches = PhaseStopwatches::new(100).unwrap();
    let mut progress: Vec<Progress> = Vec::new();

    BenchmarkLoop::new(100, 10)
        .unwrap()
        .run(&mut stopwatches, &service, &resource(), &query(), &CancellationToken::new(), &mut progress)
        .await
        .unwrap();

    let indices: Vec<usize> = progress.iter().map(|p| p.trial).collect();
    assert_eq!(indices, (0..100).step_by(10).collect::<Vec<_>>());
    let percents: Vec<usize> = progress.iter().map(Progress::percent).collect();
    assert_eq!(percents, vec![0, 10, 20, 30, 40, 50, 60, 70, 80, 90]);
    assert!(progress.iter().all(|p| p.total == 100));
    assert!(progress[0].to_string().starts_with("0%  last:"));
}

#[tokio::test]
async fn cancellation_before_trial_k_keeps_k_samples() {
    let trials = 100;
    for k in [0, 1, 5, 57, 100] {
        let cancel = CancellationToken::new();
        let service = FakeService::cancelling_after(k, &cancel);
        if k == 0 {
            cancel.cancel();
        }
        let mut stopwatches = PhaseStopwatches::new(trials).unwrap();
        let mut progress: Vec<Progress> = Vec::new();

        let outcome = BenchmarkLoop::new(trials, 10)
            .unwrap()
            .run(&mut stopwatches, &service, &resource(), &query(), &cancel, &mut progress)
            .await
            .unwrap();

        assert_eq!(outcome.trials(), k);
        assert_eq!(outcome.is_cancelled(), k < trials);
        assert_eq!(sample_counts(&stopwatches), [k; 3]);
        assert_eq!(service.connects.get(), k);
    }
}

#[tokio::test]
async fn acquire_failure_halts_the_loop() {
    let service = FakeService {
        fail_connect_at: Some(3),
        ..FakeService::new()
    };
    let mut stopwatches = PhaseStopwatches::new(10).unwrap();
    let mut progress: Vec<Progress> = Vec::new();

    let err = BenchmarkLoop::new(10, 1)
        .unwrap()
        .run(&mut stopwatches, &service, &resource(), &query(), &CancellationToken::new(), &mut progress)
        .await
        .unwrap_err();

    assert_eq!(err.trial, 3);
    assert_eq!(err.completed(), 3);
    assert_eq!(err.phase, Phase::Acquire);
    assert!(matches!(err.source, TrialFailure::Backend(_)));
    assert_eq!(sample_counts(&stopwatches), [3; 3]);
    assert_eq!(service.connects.get(), 4);
    assert_eq!(progress.len(), 3);
}

#[tokio::test]
async fn work_failure_halts_the_loop_and_closes_the_connection() {
    let service = FakeService {
        fail_query_at: Some(7),
        ..FakeService::new()
    };
    let mut stopwatches = PhaseStopwatches::new(10).unwrap();

    let err = BenchmarkLoop::new(10, 1)
        .unwrap()
        .run(&mut stopwatches, &service, &resource(), &query(), &CancellationToken::new(), &mut Vec::<Progress>::new())
        .await
        .unwrap_err();

    assert_eq!(err.phase, Phase::Work);
    assert_eq!(err.completed(), 7);
    assert_eq!(sample_counts(&stopwatches), [err.completed(); 3]);
    assert_eq!(stopwatches.completed_trials(), 7);
    assert!(!stopwatches.work.in_flight());
    assert_eq!(service.connects.get(), 8);
    assert_eq!(service.closes.get(), 8);
}

#[tokio::test]
async fn release_failure_depends_on_policy() {
    let strict = FakeService {
        fail_close_at: Some(2),
        ..FakeService::new()
    };
    let mut stopwatches = PhaseStopwatches::new(5).unwrap();
    let err = BenchmarkLoop::new(5, 1)
        .unwrap()
        .run(&mut stopwatches, &strict, &resource(), &query(), &CancellationToken::new(), &mut Vec::<Progress>::new())
        .await
        .unwrap_err();
    assert_eq!(err.phase, Phase::Release);
    assert_eq!(err.trial, 2);
    assert_eq!(sample_counts(&stopwatches), [err.completed(); 3]);

    let lenient = FakeService {
        fail_close_at: Some(2),
        ..FakeService::new()
    };
    let mut stopwatches = PhaseStopwatches::new(5).unwrap();
    let outcome = BenchmarkLoop::new(5, 1)
        .unwrap()
        .with_release_policy(ReleasePolicy::BestEffort)
        .run(&mut stopwatches, &lenient, &resource(), &query(), &CancellationToken::new(), &mut Vec::<Progress>::new())
        .await
        .unwrap();
    assert_eq!(outcome, LoopOutcome::Completed { trials: 5 });
    assert_eq!(sample_counts(&stopwatches), [5; 3]);
}

#[tokio::test]
async fn undersized_stopwatches_fail_the_first_extra_trial() {
    let service = FakeService::new();
    let mut stopwatches = PhaseStopwatches::new(2).unwrap();
    let err = BenchmarkLoop::new(3, 1)
        .unwrap()
        .run(&mut stopwatches, &service, &resource(), &query(), &CancellationToken::new(), &mut Vec::<Progress>::new())
        .await
        .unwrap_err();
    assert_eq!(err.trial, 2);
    assert!(matches!(err.source, TrialFailure::Stopwatch(_)));
    assert_eq!(service.connects.get(), 2);
}

#[tokio::test]
async fn simulated_latency_shows_up_in_the_right_phase() {
    let service = SimulatedService::new(SimulatedConfig {
        connect_latency_us: 2_000,
        query_latency_us: 0,
        close_latency_us: 0,
    });
    let id = service.create_resource(&ResourceSpec::default()).await.unwrap();
    let mut stopwatches = PhaseStopwatches::new(10).unwrap();

    BenchmarkLoop::new(10, 100)
        .unwrap()
        .run(&mut stopwatches, &service, &id, &query(), &CancellationToken::new(), &mut Vec::<Progress>::new())
        .await
        .unwrap();

    let acquire = stopwatches.acquire.elapsed();
    assert_eq!(acquire.len(), 10);
    assert!(acquire.iter().all(|d| *d >= Duration::from_millis(2)));
    assert_eq!(service.open_sessions(), 0);
}
