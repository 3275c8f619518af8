use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::adapters::SampleStore;
use crate::ports::{Clock, CollectError, LinkCollector};

/// Outcome counts for one pass over the collectors
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub accepted: usize,
    pub not_associated: usize,
    pub failed: usize,
}

/// Periodic driver feeding collector readings into the store.
///
/// The scheduler is the store's only writer. Within a tick collectors run
/// concurrently, each under its own timeout, and their results are applied
/// in configured order.
pub struct Scheduler {
    store: Arc<SampleStore>,
    collectors: Vec<Arc<dyn LinkCollector>>,
    clock: Arc<dyn Clock>,
    interval: Duration,
    collect_timeout: Duration,
}

impl Scheduler {
    pub fn new(
        store: Arc<SampleStore>,
        collectors: Vec<Arc<dyn LinkCollector>>,
        clock: Arc<dyn Clock>,
        interval: Duration,
    ) -> Self {
        for collector in &collectors {
            store.register_interface(collector.interface());
        }

        Self {
            store,
            collectors,
            clock,
            interval,
            collect_timeout: interval,
        }
    }

    pub fn with_collect_timeout(mut self, collect_timeout: Duration) -> Self {
        self.collect_timeout = collect_timeout;
        self
    }

    /// Collect from every interface once and apply the results
    pub async fn tick(&self) -> TickReport {
        let observed_at = self.clock.now();
        let limit = self.collect_timeout;

        let results = join_all(self.collectors.iter().map(|collector| async move {
            match time::timeout(limit, collector.collect(observed_at)).await {
                Ok(result) => result,
                Err(_) => Err(CollectError::TimedOut(limit)),
            }
        }))
        .await;

        let mut report = TickReport::default();
        for (collector, result) in self.collectors.iter().zip(results) {
            match result {
                Ok(sample) => {
                    self.store.update(sample);
                    report.accepted += 1;
                }
                Err(e) if e.is_not_associated() => {
                    debug!(interface = collector.interface(), "not associated, keeping last sample");
                    report.not_associated += 1;
                }
                Err(e) => {
                    warn!(interface = collector.interface(), error = %e, "collect failed");
                    report.failed += 1;
                }
            }
        }

        report
    }

    /// Tick at the configured interval until `cancel` fires.
    ///
    /// The first tick runs immediately. A tick that overruns the interval
    /// delays the next one rather than bursting to catch up.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            interfaces = self.collectors.len(),
            interval_ms = self.interval.as_millis() as u64,
            "collection loop started"
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    self.tick().await;
                }
            }
        }

        info!("collection loop stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{ManualClock, StoreConfig};
    use crate::domain::Sample;
    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone, Utc};
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};

    enum Step {
        Reading(f64, bool),
        NotAssociated,
        Fail,
        Hang,
    }

    struct ScriptedCollector {
        name: String,
        steps: Mutex<VecDeque<Step>>,
        calls: AtomicUsize,
    }

    impl ScriptedCollector {
        fn new(name: &str, steps: Vec<Step>) -> Arc<Self> {
            Arc::new(Self {
                name: name.to_string(),
                steps: Mutex::new(steps.into()),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl LinkCollector for ScriptedCollector {
        fn interface(&self) -> &str {
            &self.name
        }

        async fn collect(&self, observed_at: DateTime<Utc>) -> Result<Sample, CollectError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let step = self.steps.lock().pop_front().unwrap_or(Step::NotAssociated);
            match step {
                Step::Reading(q, c) => Ok(Sample::new(self.name.clone(), observed_at, q, c)),
                Step::NotAssociated => Err(CollectError::NotAssociated(self.name.clone())),
                Step::Fail => Err(CollectError::Parse("garbled".into())),
                Step::Hang => std::future::pending().await,
            }
        }
    }

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn setup(collectors: Vec<Arc<dyn LinkCollector>>) -> (Arc<SampleStore>, Arc<ManualClock>, Scheduler) {
        let store = Arc::new(SampleStore::new(StoreConfig::default()));
        let clock = Arc::new(ManualClock::new(start()));
        let scheduler = Scheduler::new(
            Arc::clone(&store),
            collectors,
            clock.clone(),
            Duration::from_millis(500),
        );
        (store, clock, scheduler)
    }

    #[tokio::test]
    async fn test_tick_applies_readings_and_skips_errors() {
        let wlan0 = ScriptedCollector::new("wlan0", vec![Step::Reading(-50.0, true)]);
        let wlan1 = ScriptedCollector::new("wlan1", vec![Step::NotAssociated]);
        let wlan2 = ScriptedCollector::new("wlan2", vec![Step::Fail]);
        let (store, _clock, scheduler) = setup(vec![wlan0 as Arc<dyn LinkCollector>, wlan1, wlan2]);

        let report = scheduler.tick().await;
        assert_eq!(
            report,
            TickReport {
                accepted: 1,
                not_associated: 1,
                failed: 1
            }
        );

        let status = store.status();
        assert_eq!(status.len(), 3);
        assert!(status.get("wlan0").unwrap().sample().is_some());
        assert!(status.get("wlan1").unwrap().sample().is_none());
        assert!(status.get("wlan2").unwrap().sample().is_none());
    }

    #[tokio::test]
    async fn test_not_associated_keeps_last_sample() {
        let wlan0 = ScriptedCollector::new(
            "wlan0",
            vec![Step::Reading(-45.0, true), Step::NotAssociated],
        );
        let (store, clock, scheduler) = setup(vec![wlan0 as Arc<dyn LinkCollector>]);

        scheduler.tick().await;
        clock.advance(Duration::from_millis(500));
        scheduler.tick().await;

        let latest = store.status().get("wlan0").unwrap().sample().cloned().unwrap();
        assert_eq!(latest.signal_quality, -45.0);
        assert_eq!(latest.timestamp, start());
        assert_eq!(store.history("wlan0").unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_samples_are_stamped_by_injected_clock() {
        let wlan0 = ScriptedCollector::new(
            "wlan0",
            vec![Step::Reading(-1.0, true), Step::Reading(-2.0, true)],
        );
        let (store, clock, scheduler) = setup(vec![wlan0 as Arc<dyn LinkCollector>]);

        scheduler.tick().await;
        clock.advance(Duration::from_secs(3));
        scheduler.tick().await;

        let history = store.history("wlan0").unwrap();
        assert_eq!(history[0].timestamp, start());
        assert_eq!(history[1].timestamp, start() + chrono::Duration::seconds(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_collector_does_not_stall_others() {
        let stuck = ScriptedCollector::new("wlan0", vec![Step::Hang]);
        let healthy = ScriptedCollector::new("wlan1", vec![Step::Reading(-60.0, true)]);
        let (store, _clock, scheduler) = setup(vec![stuck as Arc<dyn LinkCollector>, healthy]);
        let scheduler = scheduler.with_collect_timeout(Duration::from_millis(100));

        let report = scheduler.tick().await;
        assert_eq!(report.accepted, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(store.best().unwrap().interface_name, "wlan1");
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_ticks_on_interval_until_cancelled() {
        let wlan0 = ScriptedCollector::new(
            "wlan0",
            (0..100).map(|i| Step::Reading(-(i as f64), true)).collect(),
        );
        let (store, _clock, scheduler) = setup(vec![wlan0.clone() as Arc<dyn LinkCollector>]);
        let scheduler = Arc::new(scheduler);
        let cancel = CancellationToken::new();

        let handle = {
            let scheduler = Arc::clone(&scheduler);
            let cancel = cancel.clone();
            tokio::spawn(async move { scheduler.run(cancel).await })
        };

        // immediate tick plus four more at 500ms spacing
        time::sleep(Duration::from_millis(2_100)).await;
        cancel.cancel();
        handle.await.unwrap();

        assert_eq!(wlan0.calls.load(Ordering::SeqCst), 5);
        assert_eq!(store.history("wlan0").unwrap().len(), 5);

        time::sleep(Duration::from_secs(5)).await;
        assert_eq!(wlan0.calls.load(Ordering::SeqCst), 5);
    }
}
