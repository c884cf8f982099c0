use log::*;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::api::FeedApi;
use crate::cache::{Clock, TtlCache, MEMBER_STATS_KEY};
use crate::model::logical::MemberStats;
use crate::storage::Storage;

pub const STATS_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Background refresh of member statistics while a view is showing them.
///
/// The first fetch happens one `interval` after `start`; the view is expected
/// to have loaded its initial value itself. Dropping the poller cancels it.
pub struct StatsPoller {
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
    latest: watch::Receiver<Option<MemberStats>>,
}

impl StatsPoller {
    pub fn start<A, S, C>(api: Arc<A>, cache: Arc<TtlCache<S, C>>, interval: Duration) -> Self
    where
        A: FeedApi + ?Sized + 'static,
        S: Storage + 'static,
        C: Clock + 'static,
    {
        let cancel = CancellationToken::new();
        let (tx, latest) = watch::channel(None);
        let handle = tokio::spawn(run(api, cache, interval, tx, cancel.clone()));
        debug!("Member stats polling started every {:?}", interval);
        StatsPoller {
            cancel,
            handle: Some(handle),
            latest,
        }
    }

    /// Receives every successfully polled value.
    pub fn subscribe(&self) -> watch::Receiver<Option<MemberStats>> {
        self.latest.clone()
    }

    /// Cancels polling and waits for an in-flight fetch to be abandoned.
    pub async fn stop(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                warn!("Member stats poller ended abnormally: {}", e);
            }
        }
        debug!("Member stats polling stopped");
    }
}

impl Drop for StatsPoller {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run<A, S, C>(
    api: Arc<A>,
    cache: Arc<TtlCache<S, C>>,
    interval: Duration,
    tx: watch::Sender<Option<MemberStats>>,
    cancel: CancellationToken,
) where
    A: FeedApi + ?Sized,
    S: Storage,
    C: Clock,
{
    let mut ticker = interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }
        let stats = tokio::select! {
            _ = cancel.cancelled() => break,
            stats = api.member_stats() => stats,
        };
        match stats {
            Ok(stats) => {
                if let Err(e) = cache.put(MEMBER_STATS_KEY, &stats) {
                    warn!("Could not cache polled member stats: {:#}", e);
                }
                tx.send_replace(Some(stats));
            }
            Err(e) => warn!("Error polling member stats: {}", e),
        }
    }
}
