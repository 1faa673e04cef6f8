//! Host notification after each refresh.
//!
//! The scheduler calls a typed `RefreshSubscriber` instead of publishing on a
//! named bus. Hosts that render on a single UI thread pass a channel `Sender`
//! and drain it from that thread; simpler hosts wrap a closure.
//!
//! Channel delivery never blocks the scheduler thread: when a bounded channel
//! is full the event is dropped and reported as `ChannelSend`.

use chrono::{DateTime, Utc};
use crossbeam_channel::{Sender, TrySendError};
use rust_decimal::Decimal;
use serde::Serialize;

use quote_common::{QuoteError, QuoteRecord, Result};

/// Outcome of one successful tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshEvent {
    /// Count of successful ticks so far, starting at 1.
    pub sequence: u64,
    /// Multiplier applied to every price in this tick.
    pub multiplier: Decimal,
    /// When the store was rewritten.
    pub refreshed_at: DateTime<Utc>,
    /// Snapshot of the store right after the tick.
    pub quotes: Vec<QuoteRecord>,
}

impl RefreshEvent {
    /// Event stamped with the current time.
    pub fn new(sequence: u64, multiplier: Decimal, quotes: Vec<QuoteRecord>) -> Self {
        Self {
            sequence,
            multiplier,
            refreshed_at: Utc::now(),
            quotes,
        }
    }

    /// Encode the event as one JSON line.
    pub fn to_json_line(&self) -> Result<String> {
        let json = serde_json::to_string(self)?;
        Ok(json)
    }
}

/// Receiver of refreshed snapshots.
pub trait RefreshSubscriber: Send + Sync {
    /// Called on the scheduler thread after every successful tick.
    ///
    /// An error is logged by the scheduler and does not stop it.
    fn on_refreshed(&self, event: &RefreshEvent) -> Result<()>;
}

impl RefreshSubscriber for Sender<RefreshEvent> {
    fn on_refreshed(&self, event: &RefreshEvent) -> Result<()> {
        match self.try_send(event.clone()) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(dropped)) => Err(QuoteError::ChannelSend(format!(
                "refresh channel full, tick {} dropped",
                dropped.sequence
            ))),
            Err(TrySendError::Disconnected(_)) => Err(QuoteError::ChannelSend(
                "refresh channel disconnected".to_string(),
            )),
        }
    }
}

/// Adapter turning a closure into a `RefreshSubscriber`.
pub struct CallbackSubscriber<F>(F);

impl<F> CallbackSubscriber<F>
where
    F: Fn(&RefreshEvent) -> Result<()> + Send + Sync,
{
    /// Wrap `callback`.
    pub fn new(callback: F) -> Self {
        CallbackSubscriber(callback)
    }
}

impl<F> RefreshSubscriber for CallbackSubscriber<F>
where
    F: Fn(&RefreshEvent) -> Result<()> + Send + Sync,
{
    fn on_refreshed(&self, event: &RefreshEvent) -> Result<()> {
        (self.0)(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quote_common::tickers::Ticker;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicU64, Ordering};

    fn event() -> RefreshEvent {
        RefreshEvent::new(3, dec!(1.02), vec![Ticker::AZUL4.seed_quote().unwrap()])
    }

    #[test]
    fn sender_forwards_events() {
        let (tx, rx) = crossbeam_channel::unbounded();
        tx.on_refreshed(&event()).unwrap();
        let got = rx.try_recv().unwrap();
        assert_eq!(got.sequence, 3);
        assert_eq!(got.quotes[0].symbol(), "AZUL4");
    }

    #[test]
    fn sender_without_receiver_fails() {
        let (tx, rx) = crossbeam_channel::unbounded::<RefreshEvent>();
        drop(rx);
        assert!(matches!(
            tx.on_refreshed(&event()),
            Err(QuoteError::ChannelSend(_))
        ));
    }

    #[test]
    fn full_bounded_sender_drops_instead_of_blocking() {
        let (tx, rx) = crossbeam_channel::bounded::<RefreshEvent>(1);
        tx.on_refreshed(&event()).unwrap();
        match tx.on_refreshed(&event()) {
            Err(QuoteError::ChannelSend(msg)) => assert!(msg.contains("tick 3 dropped")),
            other => panic!("expected ChannelSend, got {:?}", other),
        }
        assert_eq!(rx.len(), 1);
    }

    #[test]
    fn callback_sees_each_event() {
        let last = AtomicU64::new(0);
        let subscriber = CallbackSubscriber::new(|e: &RefreshEvent| {
            last.store(e.sequence, Ordering::SeqCst);
            Ok(())
        });
        subscriber.on_refreshed(&event()).unwrap();
        assert_eq!(last.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn json_line_contains_multiplier_and_quotes() {
        let line = event().to_json_line().unwrap();
        assert!(line.contains("\"multiplier\":\"1.02\""));
        assert!(line.contains("\"refreshedAt\""));
        assert!(line.contains("\"symbol\":\"AZUL4\""));
    }
}
