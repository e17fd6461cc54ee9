// fnflow/examples/signal_control.rs

use fnflow::{FlowConfig, FlowError, FlowFn, FunctionFlow, InMemorySignalBus, SignalBus};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), FlowError> {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();
  info!("--- Signal Control Example ---");

  let bus = InMemorySignalBus::new(16);
  let config = FlowConfig::default()
    .with_debug(true)
    .with_inter_step_delay_ms(1000)
    .with_signal_bridge(true);
  let flow = FunctionFlow::with_signal_bus(config, 5i64, (), Arc::clone(&bus) as Arc<dyn SignalBus>)?;

  // An operator somewhere else pauses, resumes and finally stops the run.
  let operator = {
    let bus = Arc::clone(&bus);
    tokio::spawn(async move {
      for (wait_ms, signal) in [(2000, "ff-pause"), (3000, "ff-start"), (3000, "ff-stop")] {
        tokio::time::sleep(Duration::from_millis(wait_ms)).await;
        info!("operator sends {}", signal);
        if let Err(err) = bus.publish(signal).await {
          info!("signal not delivered: {}", err);
        }
      }
    })
  };

  let inc = FlowFn::sync("inc", |x: i64, _lib: &()| {
    info!("inc x = {}", x);
    anyhow::Ok(x + 1)
  });
  let x = flow.run_serial(vec![inc; 9]).await?;
  let _ = operator.await;

  info!("stopped with x = {} ({})", x, flow.state());
  Ok(())
}
