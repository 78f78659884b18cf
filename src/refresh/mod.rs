// src/refresh/mod.rs
// =============================================================================
// Auto-refresh: re-run the checks on a fixed timer while it is switched on.
//
// How it works:
// 1. start() spawns a background task with a tokio interval
// 2. Every tick, the task runs the check closure and waits for it to finish
// 3. stop() cancels the token; the loop exits before the next tick
//
// Things to know:
// - stop() never interrupts a run that is already in flight, it only
//   prevents future ones
// - Dropping the handle also stops the timer, so a forgotten handle can't
//   keep firing in the background
// - If a run takes longer than the period, missed ticks are skipped rather
//   than fired in a burst
// =============================================================================

use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::debug;

pub struct AutoRefresh {
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl AutoRefresh {
    // Starts calling `task` every `period`, the first call one period from now
    pub fn start<F, Fut>(period: Duration, task: F) -> Self
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        // tokio::time::interval panics on a zero period
        let period = period.max(Duration::from_millis(1));

        let cancel = CancellationToken::new();
        let loop_cancel = cancel.clone();

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            interval.tick().await; // Skip first immediate tick

            loop {
                tokio::select! {
                    biased;
                    _ = loop_cancel.cancelled() => break,
                    _ = interval.tick() => {
                        debug!(?period, "auto-refresh firing");
                        task().await;
                    }
                }
            }

            debug!("auto-refresh stopped");
        });

        Self {
            cancel,
            handle: Some(handle),
        }
    }

    // Stops future firings; an in-flight run still completes
    pub fn stop(&self) {
        if self.is_running() {
            debug!("stopping auto-refresh");
            self.cancel.cancel();
        }
    }

    pub fn is_running(&self) -> bool {
        !self.cancel.is_cancelled()
    }

    // Stops the timer and waits until the in-flight run (if any) is done
    pub async fn shutdown(mut self) {
        self.stop();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for AutoRefresh {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting(counter: &Arc<AtomicUsize>) -> impl Fn() -> std::future::Ready<()> + Send + 'static {
        let counter = counter.clone();
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
            std::future::ready(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_fires_once_per_period() {
        let counter = Arc::new(AtomicUsize::new(0));
        let refresh = AutoRefresh::start(Duration::from_secs(30), counting(&counter));

        // Nothing fires immediately
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 2);

        refresh.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_prevents_future_firings() {
        let counter = Arc::new(AtomicUsize::new(0));
        let refresh = AutoRefresh::start(Duration::from_secs(30), counting(&counter));

        tokio::time::sleep(Duration::from_secs(31)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        refresh.stop();
        assert!(!refresh.is_running());

        tokio::time::sleep(Duration::from_secs(300)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_lets_in_flight_run_finish() {
        let finished = Arc::new(AtomicUsize::new(0));
        let task_finished = finished.clone();

        let refresh = AutoRefresh::start(Duration::from_secs(30), move || {
            let finished = task_finished.clone();
            async move {
                tokio::time::sleep(Duration::from_secs(10)).await;
                finished.fetch_add(1, Ordering::SeqCst);
            }
        });

        // The first run starts at 30s and is still sleeping at 35s
        tokio::time::sleep(Duration::from_secs(35)).await;
        refresh.stop();
        assert_eq!(finished.load(Ordering::SeqCst), 0);

        refresh.shutdown().await;
        assert_eq!(finished.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_stops_the_timer() {
        let counter = Arc::new(AtomicUsize::new(0));
        drop(AutoRefresh::start(Duration::from_secs(30), counting(&counter)));

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }
}
