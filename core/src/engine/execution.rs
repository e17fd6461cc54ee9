// fnflow/src/engine/execution.rs

//! Execution strategies of `FunctionFlow<X, L>`: run-one, run-serial,
//! run-parallel-race and repeat, plus the checkpoint they all share.

use crate::control::state::ControlState;
use crate::config::RacePolicy;
use crate::core::step::FlowFn;
use crate::engine::action::{LastAction, Strategy};
use crate::engine::definition::FunctionFlow;
use crate::error::{FlowError, FlowResult};
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{event, instrument, Instrument, Level};

impl<X, L> FunctionFlow<X, L>
where
  X: Clone + Send + Sync + 'static,
  L: Send + Sync + 'static,
{
  /// Runs a single flow function and returns the resulting `x`.
  ///
  /// If the engine is stopped before the step starts, nothing runs and the
  /// current `x` is returned.
  #[instrument(name = "FunctionFlow::run_one", skip_all, fields(step = %f.label()), err(Display))]
  pub async fn run_one(&self, f: FlowFn<X, L>) -> FlowResult<X> {
    let _run = self.run_lock.lock().await;
    self.record(LastAction::One(f.clone()));
    self.control.begin();
    self.exec_one(&f, false).await
  }

  /// Runs `fns` in order, each step consuming the previous step's output.
  ///
  /// Checks the control state before every step and sleeps the configured
  /// inter-step delay after each one. The first failing step fails the run;
  /// a stop ends it early with `Ok`.
  #[instrument(name = "FunctionFlow::run_serial", skip_all, fields(num_steps = fns.len()), err(Display))]
  pub async fn run_serial(&self, fns: Vec<FlowFn<X, L>>) -> FlowResult<X> {
    if fns.is_empty() {
      return Err(FlowError::empty_list("run_serial"));
    }
    let _run = self.run_lock.lock().await;
    self.record(LastAction::Serial(fns.clone()));
    self.control.begin();
    self.exec_serial(&fns).await
  }

  /// Runs every candidate concurrently on the same snapshot of `x`; the
  /// first one to win (see [`RacePolicy`]) sets `x`.
  ///
  /// Losing candidates are not cancelled. They keep running as detached
  /// tasks and whatever they produce is discarded.
  #[instrument(name = "FunctionFlow::run_parallel_race", skip_all, fields(candidates = fns.len()), err(Display))]
  pub async fn run_parallel_race(&self, fns: Vec<FlowFn<X, L>>) -> FlowResult<X> {
    if fns.is_empty() {
      return Err(FlowError::empty_list("run_parallel_race"));
    }
    let _run = self.run_lock.lock().await;
    self.record(LastAction::Race(fns.clone()));
    self.control.begin();
    self.exec_race(&fns, false).await
  }

  /// Replays the last run-one / run-serial / run-parallel-race call `n` more
  /// times, each iteration starting from the previous iteration's `x`.
  #[instrument(name = "FunctionFlow::repeat", skip(self), err(Display))]
  pub async fn repeat(&self, n: usize) -> FlowResult<X> {
    let _run = self.run_lock.lock().await;
    let action = self.last_action.lock().clone().ok_or(FlowError::NoPriorAction)?;
    self.control.begin();
    event!(Level::DEBUG, strategy = %action.strategy(), "Replaying last action.");

    for iteration in 1..=n {
      if self.control.state() == ControlState::Stopped {
        event!(Level::DEBUG, iteration, "Repeat stopped before iteration.");
        break;
      }
      self.tracer.repeat_iteration(iteration, n, action.strategy());
      let outcome = match &action {
        LastAction::One(f) => self.exec_one(f, true).await,
        LastAction::Serial(fns) => self.exec_serial(fns).await,
        LastAction::Race(fns) => self.exec_race(fns, true).await,
      };
      outcome.map_err(|source| FlowError::RepeatFailed {
        iteration,
        source: Box::new(source),
      })?;
    }
    Ok(self.x())
  }

  /// Sleeps for `ms` milliseconds. No checkpoint, no effect on `repeat`.
  pub async fn delay(&self, ms: u64) {
    self.delay_for(Duration::from_millis(ms)).await;
  }

  pub async fn delay_for(&self, duration: Duration) {
    event!(Level::TRACE, delay_ms = duration.as_millis() as u64, "Delay.");
    tokio::time::sleep(duration).await;
  }

  // --- Strategy bodies (no locking, no recording, no state reset) ---

  async fn exec_one(&self, f: &FlowFn<X, L>, pace: bool) -> FlowResult<X> {
    let mut rx = self.control.subscribe();
    if !self.checkpoint(&mut rx, 0).await {
      return Ok(self.x());
    }
    self.execute_step(Strategy::One, 0, f).await?;
    if pace {
      self.pace().await;
    }
    Ok(self.x())
  }

  async fn exec_serial(&self, fns: &[FlowFn<X, L>]) -> FlowResult<X> {
    let mut rx = self.control.subscribe();
    for (index, f) in fns.iter().enumerate() {
      if !self.checkpoint(&mut rx, index).await {
        event!(Level::INFO, completed = index, remaining = fns.len() - index, "Serial run stopped.");
        break;
      }
      self.execute_step(Strategy::Serial, index, f).await?;
      self.pace().await;
    }
    Ok(self.x())
  }

  async fn exec_race(&self, fns: &[FlowFn<X, L>], pace: bool) -> FlowResult<X> {
    let mut rx = self.control.subscribe();
    if !self.checkpoint(&mut rx, 0).await {
      return Ok(self.x());
    }

    let (x, lib) = self.context.read().snapshot();
    self.tracer.race_started(fns.len());
    let started = Instant::now();

    // Dropping a JoinHandle detaches its task, so losers run to completion.
    let mut pending: FuturesUnordered<_> = fns
      .iter()
      .enumerate()
      .map(|(index, f)| {
        let handle = tokio::spawn(f.call(x.clone(), Arc::clone(&lib)).in_current_span());
        async move { (index, handle.await) }
      })
      .collect();

    let mut first_failure: Option<(usize, anyhow::Error)> = None;
    while let Some((index, joined)) = pending.next().await {
      let label = fns[index].label();
      let settled = joined
        .map_err(|err| anyhow::anyhow!("flow function task did not complete: {err}"))
        .and_then(|result| result);

      match settled {
        Ok(transition) => {
          self.context.modify(|ctx| transition.apply(&mut ctx.x));
          self.tracer.race_won(index, label, started.elapsed());
          event!(Level::DEBUG, winner = index, abandoned = pending.len(), "Race resolved.");
          drop(pending);
          if pace {
            self.pace().await;
          }
          return Ok(self.x());
        }
        Err(source) => {
          self.tracer.step_failed(Strategy::Race, index, label, &source);
          if self.config.race_policy == RacePolicy::FirstSettled {
            event!(Level::ERROR, index, error = %source, "Race settled by a failing candidate.");
            return Err(FlowError::RaceFailed {
              candidates: fns.len(),
              index,
              label: label.to_string(),
              source,
            });
          }
          event!(Level::DEBUG, index, remaining = pending.len(), "Race candidate failed.");
          if first_failure.is_none() {
            first_failure = Some((index, source));
          }
        }
      }
    }

    let (index, source) = first_failure.ok_or_else(|| FlowError::empty_list("run_parallel_race"))?;
    event!(Level::ERROR, candidates = fns.len(), "Every race candidate failed.");
    Err(FlowError::RaceFailed {
      candidates: fns.len(),
      index,
      label: fns[index].label().to_string(),
      source,
    })
  }

  /// Runs one step against a fresh snapshot and writes its output back.
  /// A failing step leaves `x` exactly as it was.
  async fn execute_step(&self, strategy: Strategy, index: usize, f: &FlowFn<X, L>) -> FlowResult<()> {
    let label = f.label();
    let (x, lib) = self.context.read().snapshot();
    self.tracer.step_started(strategy, index, label);
    event!(Level::TRACE, %strategy, index, label, "Executing step.");
    let started = Instant::now();

    match f.call(x, lib).await {
      Ok(transition) => {
        let replaced = self.context.modify(|ctx| transition.apply(&mut ctx.x));
        self.tracer.step_finished(strategy, index, label, started.elapsed(), replaced);
        Ok(())
      }
      Err(source) => {
        self.tracer.step_failed(strategy, index, label, &source);
        event!(Level::ERROR, %strategy, index, label, error = %source, "Step failed.");
        Err(FlowError::StepFailed {
          strategy,
          index,
          label: label.to_string(),
          source,
        })
      }
    }
  }

  /// Blocks while paused. Returns `false` once the engine is stopped.
  async fn checkpoint(&self, rx: &mut watch::Receiver<ControlState>, index: usize) -> bool {
    let poll = self.config.inter_step_delay();
    let mut announced = false;
    loop {
      let state = *rx.borrow_and_update();
      match state {
        ControlState::Running | ControlState::Ready => return true,
        ControlState::Stopped => {
          self.tracer.checkpoint_stopped(index);
          return false;
        }
        ControlState::Paused => {
          if !announced {
            self.tracer.checkpoint_paused(index);
            event!(Level::DEBUG, index, "Checkpoint waiting for resume.");
            announced = true;
          }
          if poll.is_zero() {
            if rx.changed().await.is_err() {
              return false;
            }
          } else {
            tokio::select! {
              changed = rx.changed() => {
                if changed.is_err() {
                  return false;
                }
              }
              _ = tokio::time::sleep(poll) => {
                event!(Level::TRACE, index, "Still paused.");
              }
            }
          }
        }
      }
    }
  }

  async fn pace(&self) {
    let delay = self.config.inter_step_delay();
    if !delay.is_zero() {
      tokio::time::sleep(delay).await;
    }
  }
}
