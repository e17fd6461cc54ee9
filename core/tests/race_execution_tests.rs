// tests/race_execution_tests.rs
mod common;

use common::*;
use fnflow::{FlowConfig, FlowError, FlowFn, RacePolicy, Strategy};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test(start_paused = true)]
async fn test_fastest_candidate_wins_regardless_of_order() {
  setup_tracing();
  let orders: Vec<Vec<(&'static str, u64, i64)>> = vec![
    vec![("slow", 3000, 15), ("mid", 1000, 7), ("fast", 10, 6)],
    vec![("fast", 10, 6), ("slow", 3000, 15), ("mid", 1000, 7)],
    vec![("mid", 1000, 7), ("fast", 10, 6), ("slow", 3000, 15)],
  ];

  for order in orders {
    let flow = engine(FlowConfig::default(), 5);
    let candidates = order
      .iter()
      .map(|(label, delay, value)| sleepy_step(*label, *delay, *value))
      .collect();
    let x = flow.run_parallel_race(candidates).await.unwrap();
    assert_eq!(x, 6);
    assert_eq!(flow.x(), 6);
    assert_eq!(flow.last_strategy(), Some(Strategy::Race));
  }
}

#[tokio::test(start_paused = true)]
async fn test_sync_candidate_beats_sleeping_ones() {
  setup_tracing();
  let flow = engine(FlowConfig::default(), 5);
  let x = flow
    .run_parallel_race(vec![
      sleepy_step("f1", 1000, 7),
      sleepy_step("f2", 3000, 15),
      add_step("f3", 1),
    ])
    .await
    .unwrap();
  assert_eq!(x, 6);
}

#[tokio::test(start_paused = true)]
async fn test_candidates_share_one_snapshot() {
  setup_tracing();
  let flow = engine(FlowConfig::default(), 40);
  let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
  let candidate = |label: &'static str, delay_ms: u64| {
    let seen = Arc::clone(&seen);
    FlowFn::new(label, move |x: i64, _lib: Arc<TestLib>| {
      let seen = Arc::clone(&seen);
      async move {
        seen.lock().push(x);
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        anyhow::Ok(x + delay_ms as i64)
      }
    })
  };
  let x = flow
    .run_parallel_race(vec![candidate("a", 5), candidate("b", 50), candidate("c", 500)])
    .await
    .unwrap();
  assert_eq!(x, 45);
  assert_eq!(*seen.lock(), vec![40, 40, 40]);
}

#[tokio::test(start_paused = true)]
async fn test_losers_finish_in_background_without_touching_x() {
  setup_tracing();
  let flow = engine(FlowConfig::default(), 1);
  let loser_done = Arc::new(AtomicBool::new(false));
  let flag = Arc::clone(&loser_done);
  let loser = FlowFn::new("loser", move |_x: i64, _lib: Arc<TestLib>| {
    let flag = Arc::clone(&flag);
    async move {
      tokio::time::sleep(Duration::from_millis(2000)).await;
      flag.store(true, Ordering::SeqCst);
      anyhow::Ok(999)
    }
  });

  let x = flow
    .run_parallel_race(vec![loser, sleepy_step("winner", 100, 2)])
    .await
    .unwrap();
  assert_eq!(x, 2);
  assert!(!loser_done.load(Ordering::SeqCst));

  tokio::time::sleep(Duration::from_millis(5000)).await;
  assert!(loser_done.load(Ordering::SeqCst), "abandoned candidate should run to completion");
  assert_eq!(flow.x(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_failed_candidate_does_not_win_by_default() {
  setup_tracing();
  let flow = engine(FlowConfig::default(), 0);
  let x = flow
    .run_parallel_race(vec![
      sleepy_failing_step("quick-fail", 10, "flaky"),
      sleepy_step("steady", 500, 42),
    ])
    .await
    .unwrap();
  assert_eq!(x, 42);
}

#[tokio::test(start_paused = true)]
async fn test_race_fails_when_every_candidate_fails() {
  setup_tracing();
  let flow = engine(FlowConfig::default(), 3);
  let err = flow
    .run_parallel_race(vec![
      sleepy_failing_step("late", 300, "late failure"),
      sleepy_failing_step("early", 20, "early failure"),
    ])
    .await
    .unwrap_err();

  match err {
    FlowError::RaceFailed {
      candidates,
      index,
      label,
      source,
    } => {
      assert_eq!(candidates, 2);
      assert_eq!(index, 1);
      assert_eq!(label, "early");
      assert_eq!(source.to_string(), "early failure");
    }
    other => panic!("Expected RaceFailed, got {:?}", other),
  }
  assert_eq!(flow.x(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_first_settled_policy_surfaces_early_failure() {
  setup_tracing();
  let flow = engine(FlowConfig::default().with_race_policy(RacePolicy::FirstSettled), 3);
  let err = flow
    .run_parallel_race(vec![
      sleepy_step("steady", 500, 42),
      sleepy_failing_step("quick-fail", 10, "flaky"),
    ])
    .await
    .unwrap_err();
  assert!(matches!(err, FlowError::RaceFailed { index: 1, .. }));
  assert_eq!(flow.x(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_panicking_candidate_counts_as_failure() {
  setup_tracing();
  let flow = engine(FlowConfig::default(), 0);
  let panicky = FlowFn::sync("panicky", |_x: i64, _lib: &TestLib| -> anyhow::Result<i64> {
    panic!("candidate blew up")
  });
  let x = flow
    .run_parallel_race(vec![panicky, sleepy_step("steady", 50, 8)])
    .await
    .unwrap();
  assert_eq!(x, 8);
}

#[tokio::test]
async fn test_empty_race_is_invalid() {
  setup_tracing();
  let flow = engine(FlowConfig::default(), 0);
  let err = flow.run_parallel_race(Vec::new()).await.unwrap_err();
  assert!(matches!(
    err,
    FlowError::InvalidArgument {
      operation: "run_parallel_race",
      ..
    }
  ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_race_runs_candidates_in_parallel() {
  setup_tracing();
  let flow = engine(FlowConfig::default(), 0);
  // Blocking candidates only overlap if they really run on separate workers.
  let blocking = |label: &'static str, ms: u64, value: i64| {
    FlowFn::sync(label, move |_x: i64, _lib: &TestLib| {
      std::thread::sleep(Duration::from_millis(ms));
      anyhow::Ok(value)
    })
  };
  let started = std::time::Instant::now();
  let x = flow
    .run_parallel_race(vec![blocking("a", 300, 1), blocking("b", 50, 2)])
    .await
    .unwrap();
  assert_eq!(x, 2);
  assert!(started.elapsed() < Duration::from_millis(300));
}
