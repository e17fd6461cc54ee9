// tests/common/mod.rs
#![allow(dead_code)] // Allow unused code in this common test module

use fnflow::{FlowConfig, FlowControl, FlowFn, FunctionFlow, Transition};
use parking_lot::Mutex;
use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};
use std::time::Duration;
use tracing::Level;

// --- Common shared context ---
#[derive(Debug, Default)]
pub struct TestLib {
  pub calls: Mutex<Vec<String>>,
  pub control: Option<FlowControl>,
}

impl TestLib {
  pub fn with_control(control: FlowControl) -> Self {
    Self {
      calls: Mutex::new(Vec::new()),
      control: Some(control),
    }
  }

  pub fn record(&self, label: &str) {
    self.calls.lock().push(label.to_string());
  }

  pub fn calls(&self) -> Vec<String> {
    self.calls.lock().clone()
  }
}

pub type TestFlow = FunctionFlow<i64, TestLib>;
pub type TestStep = FlowFn<i64, TestLib>;

pub fn engine(config: FlowConfig, x: i64) -> TestFlow {
  FunctionFlow::new(config, x, TestLib::default()).expect("engine without bridge")
}

/// Engine whose `lib` carries its own control handle, so steps can pause or stop it.
pub fn self_controlled_engine(config: FlowConfig, x: i64) -> TestFlow {
  let flow = engine(config, x);
  flow.inject_lib(TestLib::with_control(flow.control()));
  flow
}

// --- Common step creators ---
pub fn add_step(label: &'static str, n: i64) -> TestStep {
  FlowFn::sync(label, move |x: i64, lib: &TestLib| {
    lib.record(label);
    tracing::debug!(target: "test_steps", step = label, x, "add");
    anyhow::Ok(x + n)
  })
}

pub fn mul_step(label: &'static str, n: i64) -> TestStep {
  FlowFn::new(label, move |x: i64, lib: Arc<TestLib>| async move {
    lib.record(label);
    tokio::task::yield_now().await;
    anyhow::Ok(x * n)
  })
}

/// Resolves to `value` after `delay_ms`, ignoring `x`.
pub fn sleepy_step(label: &'static str, delay_ms: u64, value: i64) -> TestStep {
  FlowFn::new(label, move |_x: i64, lib: Arc<TestLib>| async move {
    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    lib.record(label);
    anyhow::Ok(value)
  })
}

pub fn failing_step(label: &'static str, message: &'static str) -> TestStep {
  FlowFn::sync(label, move |_x: i64, lib: &TestLib| -> anyhow::Result<i64> {
    lib.record(label);
    anyhow::bail!(message)
  })
}

pub fn sleepy_failing_step(label: &'static str, delay_ms: u64, message: &'static str) -> TestStep {
  FlowFn::new(label, move |_x: i64, lib: Arc<TestLib>| async move {
    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    lib.record(label);
    Err::<i64, _>(anyhow::anyhow!(message))
  })
}

pub fn keep_step(label: &'static str) -> TestStep {
  FlowFn::sync(label, move |_x: i64, lib: &TestLib| {
    lib.record(label);
    anyhow::Ok(Transition::<i64>::Keep)
  })
}

/// Adds one, then pauses the engine it runs in.
pub fn pausing_step(label: &'static str) -> TestStep {
  FlowFn::sync(label, move |x: i64, lib: &TestLib| {
    lib.record(label);
    if let Some(control) = &lib.control {
      control.pause();
    }
    anyhow::Ok(x + 1)
  })
}

/// Adds one, then stops the engine it runs in.
pub fn stopping_step(label: &'static str) -> TestStep {
  FlowFn::sync(label, move |x: i64, lib: &TestLib| {
    lib.record(label);
    if let Some(control) = &lib.control {
      control.stop();
    }
    anyhow::Ok(x + 1)
  })
}

// --- Helper for Tracing Setup (call once per test run if needed) ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer() // Important for tests to capture output
    .try_init()
    .ok(); // Allow multiple initializations in tests (ok if fails)
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

// --- Atomic counter for checking execution counts across tests ---
pub static STEP_EXEC_COUNTER: Lazy<Arc<AtomicUsize>> = Lazy::new(|| Arc::new(AtomicUsize::new(0)));

pub fn reset_counters() {
  STEP_EXEC_COUNTER.store(0, Ordering::SeqCst);
}

pub fn counting_step(label: &'static str) -> TestStep {
  FlowFn::sync(label, move |x: i64, _lib: &TestLib| {
    STEP_EXEC_COUNTER.fetch_add(1, Ordering::SeqCst);
    anyhow::Ok(x + 1)
  })
}
