// fnflow/examples/basic_serial.rs

use fnflow::{FlowConfig, FlowError, FlowFn, FunctionFlow};
use std::sync::Arc;
use tracing::info;

// 1. Define the shared services every step can see
#[derive(Debug)]
struct Services {
  greeting: String,
}

#[tokio::main]
async fn main() -> Result<(), FlowError> {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();
  info!("--- Basic Serial Example ---");

  // 2. Configure the engine: verbose step log, 300ms between steps
  let config = FlowConfig::default().with_debug(true).with_inter_step_delay_ms(300);
  let flow = FunctionFlow::new(
    config,
    5i64,
    Services {
      greeting: "hello".to_string(),
    },
  )?;

  // 3. Steps may be sync or async
  let add_two = FlowFn::sync("add_two", |x: i64, _lib: &Services| anyhow::Ok(x + 2));
  let triple = FlowFn::new("triple", |x: i64, lib: Arc<Services>| async move {
    info!("{} from triple, x = {}", lib.greeting, x);
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    anyhow::Ok(x * 3)
  });
  let add_one = FlowFn::sync("add_one", |x: i64, _lib: &Services| anyhow::Ok(x + 1));

  // 4. Run them in order
  let x = flow.run_serial(vec![add_two, triple, add_one.clone()]).await?;
  info!("serial result: {}", x);
  assert_eq!(x, 22);

  // 5. Run one step, then replay it
  flow.run_one(add_one).await?;
  let x = flow.repeat(3).await?;
  info!("after run_one + repeat(3): {}", x);
  assert_eq!(x, 26);

  Ok(())
}
