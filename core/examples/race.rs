// fnflow/examples/race.rs

use fnflow::{FlowConfig, FlowError, FlowFn, FunctionFlow};
use std::time::Duration;
use tracing::info;

fn delayed(label: &'static str, delay_ms: u64, f: fn(i64) -> i64) -> FlowFn<i64, ()> {
  FlowFn::new(label, move |x: i64, _lib: std::sync::Arc<()>| async move {
    info!("{} started with x = {}", label, x);
    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    anyhow::Ok(f(x))
  })
}

#[tokio::main]
async fn main() -> Result<(), FlowError> {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();
  info!("--- Race Example ---");

  let flow = FunctionFlow::new(FlowConfig::default().with_debug(true), 5i64, ())?;

  // The fastest candidate sets x; the others finish unobserved.
  let x = flow
    .run_parallel_race(vec![
      delayed("f1", 1000, |x| x + 2),
      delayed("f2", 3000, |x| x * 3),
      FlowFn::sync("f3", |x: i64, _lib: &()| anyhow::Ok(x + 1)),
    ])
    .await?;

  info!("race result: {}", x);
  assert_eq!(x, 6);
  Ok(())
}
