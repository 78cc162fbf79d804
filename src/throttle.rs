use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{interval, Interval};

/// Fixed-interval ticker used to space successive upstream fetches. The
/// first tick completes immediately, so a fetch loop pays the delay between
/// requests rather than before the first one.
pub struct Ticker {
    interval: Interval,
    cancelled: watch::Receiver<bool>,
}

/// Handle that cancels the ticker it was created with. Safe to call from
/// another task (e.g. a Ctrl-C handler).
#[derive(Clone)]
pub struct Cancel {
    sender: Arc<watch::Sender<bool>>,
}

impl Cancel {
    pub fn cancel(&self) {
        let _ = self.sender.send(true);
    }
}

pub fn ticker(period: Duration) -> (Ticker, Cancel) {
    let (sender, receiver) = watch::channel(false);
    (
        Ticker {
            interval: interval(period),
            cancelled: receiver,
        },
        Cancel {
            sender: Arc::new(sender),
        },
    )
}

impl Ticker {
    /// Resolves `true` on the next tick and `false` once cancelled.
    pub async fn wait(&mut self) -> bool {
        loop {
            if *self.cancelled.borrow() {
                return false;
            }
            tokio::select! {
                _ = self.interval.tick() => return true,
                changed = self.cancelled.changed() => {
                    if changed.is_err() {
                        // Every cancel handle is gone; only the tick remains.
                        self.interval.tick().await;
                        return true;
                    }
                }
            }
        }
    }
}
