// fnflow/src/control/bridge.rs

//! Control Signal Bridge: maps named signals on a publish/subscribe bus onto
//! pause/resume/stop requests for one engine.

use crate::config::SignalNames;
use crate::control::state::{ControlSignal, FlowControl};
use crate::error::{FlowError, FlowResult};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::{event, Level};

/// Minimal publish/subscribe capability the bridge depends on.
#[async_trait]
pub trait SignalBus: Send + Sync {
  async fn publish(&self, signal: &str) -> FlowResult<()>;
  fn subscribe(&self) -> broadcast::Receiver<String>;
}

/// In-process bus backed by a tokio broadcast channel.
pub struct InMemorySignalBus {
  sender: broadcast::Sender<String>,
}

impl InMemorySignalBus {
  pub fn new(capacity: usize) -> Arc<Self> {
    let (sender, _) = broadcast::channel(capacity.max(1));
    Arc::new(Self { sender })
  }
}

#[async_trait]
impl SignalBus for InMemorySignalBus {
  async fn publish(&self, signal: &str) -> FlowResult<()> {
    self
      .sender
      .send(signal.to_string())
      .map(|_| ())
      .map_err(|err| FlowError::SignalDelivery(err.to_string()))
  }

  fn subscribe(&self) -> broadcast::Receiver<String> {
    self.sender.subscribe()
  }
}

impl SignalNames {
  pub fn resolve(&self, name: &str) -> Option<ControlSignal> {
    if name == self.pause {
      Some(ControlSignal::Pause)
    } else if name == self.resume {
      Some(ControlSignal::Resume)
    } else if name == self.stop {
      Some(ControlSignal::Stop)
    } else {
      None
    }
  }
}

/// Background listener owned by an engine. Aborted when dropped.
pub(crate) struct SignalBridge {
  handle: JoinHandle<()>,
}

impl SignalBridge {
  /// Subscribes immediately, so signals published after this returns are
  /// never missed, then dispatches them from a spawned task.
  pub(crate) fn attach(bus: &dyn SignalBus, names: SignalNames, control: FlowControl) -> FlowResult<Self> {
    let runtime = tokio::runtime::Handle::try_current()
      .map_err(|err| FlowError::Configuration(format!("signal bridge requires a tokio runtime: {err}")))?;
    let mut rx = bus.subscribe();

    let handle = runtime.spawn(async move {
      loop {
        match rx.recv().await {
          Ok(name) => match names.resolve(&name) {
            Some(signal) => {
              event!(Level::DEBUG, signal = %name, "Bridged control signal received.");
              control.apply(signal);
            }
            None => {
              event!(Level::TRACE, signal = %name, "Ignoring unrelated bus signal.");
            }
          },
          Err(RecvError::Lagged(skipped)) => {
            event!(Level::WARN, skipped, "Signal bridge lagged behind the bus; signals were dropped.");
          }
          Err(RecvError::Closed) => {
            event!(Level::DEBUG, "Signal bus closed; bridge exiting.");
            break;
          }
        }
      }
    });

    Ok(Self { handle })
  }
}

impl Drop for SignalBridge {
  fn drop(&mut self) {
    self.handle.abort();
  }
}
