//! Periodic refresh of the quote store.
//!
//! `RefreshScheduler` owns one background thread that, every `interval`, reads
//! a snapshot of the shared store, moves it through the `MarketSimulator`,
//! writes the result back, and notifies the host subscriber.
//!
//! State machine:
//!
//! ```text
//! Idle --start--> Scheduled --tick--> Running --done--> Scheduled ...
//!   \                 |                  |
//!    `----cancel------+------cancel------+--> Cancelled (terminal)
//! ```
//!
//! Concurrency and shutdown:
//! - The state, the not-yet-started simulator, the cancel channel sender and
//!   the worker handle live behind one `Mutex`. `start` and `cancel` each make
//!   their whole transition inside that critical section, so there is never
//!   more than one ticking loop and a cancel always hits the loop it was meant
//!   for.
//! - A tick only begins after checking the state under the same lock; once
//!   `Cancelled` is observed no new tick starts. A tick already `Running` is
//!   allowed to finish.
//! - `cancel` joins the worker (unless it is called from the worker itself), so
//!   no notification is delivered after it returns.
//! - The store lock is held from snapshot to write-back, which serializes the
//!   tick against host `add`/`remove` calls. It is released before the
//!   subscriber runs.
//! - Simulation failures skip the tick. Subscriber errors and panics are
//!   logged; the loop keeps ticking in every case.
//! - Every method takes `&self`, so a host can share the scheduler through an
//!   `Arc` with a signal handler or with its own subscriber.

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, select, tick};
use log::{debug, error, info, warn};
use rust_decimal::Decimal;
use strum_macros::Display;

use quote_common::config::validate_interval;
use quote_common::{QuoteError, QuoteRecord, RefreshConfig, Result};

use crate::model::simulator::MarketSimulator;
use crate::model::store::SharedQuoteStore;
use crate::subscriber::{RefreshEvent, RefreshSubscriber};

/// Lifecycle of a `RefreshScheduler`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum SchedulerState {
    /// Built, not started.
    Idle,
    /// Waiting for the next tick.
    Scheduled,
    /// A tick is in progress.
    Running,
    /// Stopped for good.
    Cancelled,
}

struct Control {
    state: SchedulerState,
    simulator: Option<MarketSimulator>,
    interval: Option<Duration>,
    cancel_tx: Option<Sender<()>>,
    worker: Option<JoinHandle<()>>,
}

/// Drives periodic refreshes of a shared quote store.
pub struct RefreshScheduler {
    store: SharedQuoteStore,
    subscriber: Arc<dyn RefreshSubscriber>,
    control: Arc<Mutex<Control>>,
}

impl RefreshScheduler {
    /// Scheduler over `store` that moves prices with `simulator` and reports to `subscriber`.
    pub fn new(
        store: SharedQuoteStore,
        simulator: MarketSimulator,
        subscriber: Arc<dyn RefreshSubscriber>,
    ) -> Self {
        Self {
            store,
            subscriber,
            control: Arc::new(Mutex::new(Control {
                state: SchedulerState::Idle,
                simulator: Some(simulator),
                interval: None,
                cancel_tx: None,
                worker: None,
            })),
        }
    }

    /// Scheduler whose simulator is seeded and rounded as `config` says.
    pub fn from_config(
        store: SharedQuoteStore,
        config: &RefreshConfig,
        subscriber: Arc<dyn RefreshSubscriber>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(
            store,
            MarketSimulator::from_config(config),
            subscriber,
        ))
    }

    /// Begin ticking every `interval`.
    ///
    /// Fails with `AlreadyStarted` if the loop is running, `SchedulerCancelled`
    /// after `cancel`, and `InvalidConfig` for a zero interval.
    pub fn start(&self, interval: Duration) -> Result<()> {
        validate_interval(interval)?;
        let mut control = self.control.lock()?;
        match control.state {
            SchedulerState::Idle => {}
            SchedulerState::Scheduled | SchedulerState::Running => {
                return Err(QuoteError::AlreadyStarted);
            }
            SchedulerState::Cancelled => return Err(QuoteError::SchedulerCancelled),
        }
        let simulator = control.simulator.take().ok_or(QuoteError::AlreadyStarted)?;

        let (cancel_tx, cancel_rx) = crossbeam_channel::bounded::<()>(1);
        let worker = TickWorker {
            store: self.store.clone(),
            simulator,
            subscriber: Arc::clone(&self.subscriber),
            control: Arc::clone(&self.control),
            sequence: 0,
        };
        let handle = thread::Builder::new()
            .name("quote-refresh".to_string())
            .spawn(move || worker.run(tick(interval), cancel_rx))?;

        control.state = SchedulerState::Scheduled;
        control.cancel_tx = Some(cancel_tx);
        control.worker = Some(handle);
        control.interval = Some(interval);
        info!("Refresh scheduler started, interval {:?}", interval);
        Ok(())
    }

    /// Stop ticking. Idempotent; the scheduler cannot be restarted afterwards.
    ///
    /// Blocks until an in-flight tick has finished, unless called from the
    /// subscriber on the scheduler's own thread.
    pub fn cancel(&self) -> Result<()> {
        let worker = {
            let mut control = self.control.lock()?;
            if control.state == SchedulerState::Cancelled {
                return Ok(());
            }
            control.state = SchedulerState::Cancelled;
            control.cancel_tx.take();
            control.worker.take()
        };
        info!("Refresh scheduler cancelled");

        if let Some(handle) = worker {
            if handle.thread().id() == thread::current().id() {
                return Ok(());
            }
            if handle.join().is_err() {
                error!("Refresh worker panicked");
            }
        }
        Ok(())
    }

    /// Current lifecycle state.
    pub fn state(&self) -> Result<SchedulerState> {
        Ok(self.control.lock()?.state)
    }

    /// True once `cancel` has been called.
    pub fn is_cancelled(&self) -> bool {
        matches!(self.state(), Ok(SchedulerState::Cancelled))
    }

    /// Interval passed to `start`, if started.
    pub fn interval(&self) -> Option<Duration> {
        self.control.lock().ok().and_then(|control| control.interval)
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        if let Err(e) = self.cancel() {
            error!("Failed to cancel refresh scheduler on drop: {}", e);
        }
    }
}

/// Everything the background thread owns.
struct TickWorker {
    store: SharedQuoteStore,
    simulator: MarketSimulator,
    subscriber: Arc<dyn RefreshSubscriber>,
    control: Arc<Mutex<Control>>,
    sequence: u64,
}

impl TickWorker {
    fn run(mut self, ticker: Receiver<Instant>, cancel_rx: Receiver<()>) {
        debug!("Refresh worker running (Thread ID: {:?})", thread::current().id());
        loop {
            select! {
                recv(cancel_rx) -> _ => break,
                recv(ticker) -> _ => {
                    if !self.transition(SchedulerState::Scheduled, SchedulerState::Running) {
                        break;
                    }
                    self.tick();
                    if !self.transition(SchedulerState::Running, SchedulerState::Scheduled) {
                        break;
                    }
                }
            }
        }
        debug!("Refresh worker stopped after {} ticks", self.sequence);
    }

    /// Move `from -> to` unless the scheduler was cancelled meanwhile.
    fn transition(&self, from: SchedulerState, to: SchedulerState) -> bool {
        match self.control.lock() {
            Ok(mut control) if control.state == from => {
                control.state = to;
                true
            }
            Ok(_) => false,
            Err(e) => {
                error!("Refresh control lock poisoned: {}", e);
                false
            }
        }
    }

    /// One read-simulate-write-notify pass. Never fails the loop.
    fn tick(&mut self) {
        let (multiplier, quotes) = match self.refresh_store() {
            Ok(refreshed) => refreshed,
            Err(e) => {
                warn!("Refresh tick skipped: {}", e);
                return;
            }
        };
        self.sequence += 1;
        let event = RefreshEvent::new(self.sequence, multiplier, quotes);
        debug!(
            "Tick {}: {} quotes moved by {}",
            event.sequence,
            event.quotes.len(),
            event.multiplier
        );
        let subscriber = &self.subscriber;
        let delivered = panic::catch_unwind(AssertUnwindSafe(|| subscriber.on_refreshed(&event)))
            .unwrap_or_else(|payload| {
                Err(QuoteError::Subscriber(panic_message(payload.as_ref())))
            });
        if let Err(e) = delivered {
            error!("Subscriber failed on tick {}: {}", event.sequence, e);
        }
    }

    fn refresh_store(&mut self) -> Result<(Decimal, Vec<QuoteRecord>)> {
        let mut store = self.store.lock()?;
        let snapshot = store.list();
        let multiplier = if snapshot.is_empty() {
            Decimal::ONE
        } else {
            self.simulator.draw_multiplier()?
        };
        let refreshed = self.simulator.apply_multiplier(&snapshot, multiplier)?;
        store.replace_all(refreshed.clone())?;
        Ok((multiplier, refreshed))
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        format!("panicked: {}", msg)
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        format!("panicked: {}", msg)
    } else {
        "panicked".to_string()
    }
}
