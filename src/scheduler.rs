// Periodic refresh coordination across the page lifecycle.
use chrono::{DateTime, Utc};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc;
use tokio::time::{Duration, sleep};
use tracing::{debug, info, warn};

/// Page lifecycle events, injected by whatever runtime hosts the views so
/// the transition logic stays testable without a real event source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleSignal {
    Hidden,
    Visible,
    Offline,
    Online,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TaskCommand {
    Pause,
    Resume,
    Reschedule(Duration),
    RefreshNow,
}

/// Pure Running/Paused state machine for one refresh target. The driving
/// loop applies transitions; this struct decides them.
#[derive(Debug, Clone)]
pub struct TaskState {
    interval: Duration,
    paused: bool,
    last_run_at: Option<DateTime<Utc>>,
}

impl TaskState {
    pub fn new(interval: Duration) -> Self {
        Self { interval, paused: false, last_run_at: None }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn last_run_at(&self) -> Option<DateTime<Utc>> {
        self.last_run_at
    }

    /// Stops future ticks. Configuration and any in-flight refresh survive.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Restarts the timer. Returns true when an immediate refresh must fire,
    /// which is always: refresh-on-resume is mandatory, not merely the next
    /// tick.
    pub fn resume(&mut self) -> bool {
        self.paused = false;
        true
    }

    /// Replaces the cadence and restarts the timer, preserving Running/Paused.
    pub fn reschedule(&mut self, new_interval: Duration) {
        self.interval = new_interval;
    }

    pub fn mark_run(&mut self) {
        self.last_run_at = Some(Utc::now());
    }
}

pub type RefreshJob = Arc<dyn Fn() -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

/// Handle to one scheduled task. Dropping all handles ends the task loop.
#[derive(Clone)]
pub struct TaskHandle {
    name: String,
    tx: mpsc::UnboundedSender<TaskCommand>,
}

impl TaskHandle {
    pub fn pause(&self) {
        let _ = self.tx.send(TaskCommand::Pause);
    }

    pub fn resume(&self) {
        let _ = self.tx.send(TaskCommand::Resume);
    }

    pub fn reschedule(&self, new_interval: Duration) {
        let _ = self.tx.send(TaskCommand::Reschedule(new_interval));
    }

    pub fn refresh_now(&self) {
        let _ = self.tx.send(TaskCommand::RefreshNow);
    }
}

/// Owns the refresh tasks and fans lifecycle signals out to all of them.
/// Tasks are independent: pausing one never affects another.
pub struct UpdateScheduler {
    tasks: Vec<TaskHandle>,
}

impl UpdateScheduler {
    pub fn new() -> Self {
        Self { tasks: Vec::new() }
    }

    /// Spawns the driving loop for one refresh target and returns its handle.
    pub fn add_task(
        &mut self,
        name: impl Into<String>,
        interval: Duration,
        job: RefreshJob,
    ) -> TaskHandle {
        let name = name.into();
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = TaskHandle { name: name.clone(), tx };
        tokio::spawn(run_task(name, TaskState::new(interval), rx, job));
        self.tasks.push(handle.clone());
        handle
    }

    pub fn task(&self, name: &str) -> Option<&TaskHandle> {
        self.tasks.iter().find(|t| t.name == name)
    }

    /// Translates a lifecycle signal into pause/resume for every task.
    pub fn deliver(&self, signal: LifecycleSignal) {
        info!("Lifecycle signal: {:?}", signal);
        for task in &self.tasks {
            match signal {
                LifecycleSignal::Hidden | LifecycleSignal::Offline => task.pause(),
                LifecycleSignal::Visible | LifecycleSignal::Online => task.resume(),
            }
        }
    }
}

impl Default for UpdateScheduler {
    fn default() -> Self {
        Self::new()
    }
}

async fn run_task(
    name: String,
    mut state: TaskState,
    mut rx: mpsc::UnboundedReceiver<TaskCommand>,
    job: RefreshJob,
) {
    // One in-flight refresh per task; extra requests are coalesced.
    let in_flight = Arc::new(AtomicBool::new(false));
    info!("Task '{}' started, interval {:?}", name, state.interval());

    loop {
        let command = if state.is_paused() {
            // Paused: no timer, wait for the next command only.
            match rx.recv().await {
                Some(cmd) => Some(cmd),
                None => break,
            }
        } else {
            tokio::select! {
                _ = sleep(state.interval()) => {
                    debug!("Task '{}' tick (last run {:?})", name, state.last_run_at());
                    spawn_refresh(&name, &mut state, &in_flight, &job);
                    None
                }
                cmd = rx.recv() => match cmd {
                    Some(cmd) => Some(cmd),
                    None => break,
                },
            }
        };

        if let Some(cmd) = command {
            match cmd {
                TaskCommand::Pause => {
                    info!("Task '{}' paused", name);
                    state.pause();
                }
                TaskCommand::Resume => {
                    info!("Task '{}' resumed", name);
                    if state.resume() {
                        spawn_refresh(&name, &mut state, &in_flight, &job);
                    }
                }
                TaskCommand::Reschedule(interval) => {
                    info!("Task '{}' rescheduled to {:?}", name, interval);
                    state.reschedule(interval);
                }
                TaskCommand::RefreshNow => {
                    spawn_refresh(&name, &mut state, &in_flight, &job);
                }
            }
        }
    }

    info!("Task '{}' ended", name);
}

/// Runs the job off the loop so pause never aborts an in-flight refresh;
/// a response landing after pause is still applied (last write wins).
fn spawn_refresh(
    name: &str,
    state: &mut TaskState,
    in_flight: &Arc<AtomicBool>,
    job: &RefreshJob,
) {
    if in_flight.swap(true, Ordering::SeqCst) {
        warn!("Task '{}': refresh already in flight, coalescing", name);
        return;
    }
    state.mark_run();
    let in_flight = in_flight.clone();
    let fut = job();
    tokio::spawn(async move {
        fut.await;
        in_flight.store(false, Ordering::SeqCst);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::Notify;
    use tokio::task::yield_now;

    #[test]
    fn pause_and_resume_preserve_interval() {
        let mut state = TaskState::new(Duration::from_secs(30));
        state.pause();
        assert!(state.is_paused());
        assert!(state.resume());
        assert!(!state.is_paused());
        assert_eq!(state.interval(), Duration::from_secs(30));
    }

    #[test]
    fn reschedule_keeps_paused_state() {
        let mut state = TaskState::new(Duration::from_secs(30));
        state.pause();
        state.reschedule(Duration::from_secs(60));
        assert!(state.is_paused());
        assert_eq!(state.interval(), Duration::from_secs(60));

        let mut running = TaskState::new(Duration::from_secs(30));
        running.reschedule(Duration::from_secs(10));
        assert!(!running.is_paused());
    }

    fn counting_job(counter: Arc<AtomicUsize>) -> RefreshJob {
        Arc::new(move || {
            let counter = counter.clone();
            Box::pin(async move {
                counter.fetch_add(1, Ordering::SeqCst);
            })
        })
    }

    async fn settle() {
        for _ in 0..20 {
            yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn resume_fires_immediate_refresh_before_next_tick() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut scheduler = UpdateScheduler::new();
        let handle = scheduler.add_task(
            "prices",
            Duration::from_millis(30_000),
            counting_job(counter.clone()),
        );

        handle.pause();
        settle().await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        handle.resume();
        settle().await;
        // No clock advance happened, so this run came from resume itself.
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn paused_task_skips_ticks() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut scheduler = UpdateScheduler::new();
        let handle = scheduler.add_task(
            "news",
            Duration::from_millis(100),
            counting_job(counter.clone()),
        );

        handle.pause();
        settle().await;
        tokio::time::advance(Duration::from_millis(1_000)).await;
        settle().await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn timer_ticks_run_the_job() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut scheduler = UpdateScheduler::new();
        let _handle = scheduler.add_task(
            "prices",
            Duration::from_millis(100),
            counting_job(counter.clone()),
        );

        settle().await;
        tokio::time::advance(Duration::from_millis(150)).await;
        settle().await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_refresh_requests_coalesce() {
        let started = Arc::new(AtomicUsize::new(0));
        let gate = Arc::new(Notify::new());

        let job: RefreshJob = {
            let started = started.clone();
            let gate = gate.clone();
            Arc::new(move || {
                let started = started.clone();
                let gate = gate.clone();
                Box::pin(async move {
                    started.fetch_add(1, Ordering::SeqCst);
                    gate.notified().await;
                })
            })
        };

        let mut scheduler = UpdateScheduler::new();
        let handle = scheduler.add_task("prices", Duration::from_secs(3_600), job);

        handle.refresh_now();
        settle().await;
        handle.refresh_now();
        settle().await;
        assert_eq!(started.load(Ordering::SeqCst), 1);

        gate.notify_one();
        settle().await;
        handle.refresh_now();
        settle().await;
        assert_eq!(started.load(Ordering::SeqCst), 2);
        gate.notify_one();
    }

    #[tokio::test(start_paused = true)]
    async fn tasks_are_independent() {
        let prices = Arc::new(AtomicUsize::new(0));
        let news = Arc::new(AtomicUsize::new(0));
        let mut scheduler = UpdateScheduler::new();
        let price_handle = scheduler.add_task(
            "prices",
            Duration::from_millis(100),
            counting_job(prices.clone()),
        );
        let _news_handle = scheduler.add_task(
            "news",
            Duration::from_millis(100),
            counting_job(news.clone()),
        );

        price_handle.pause();
        settle().await;
        tokio::time::advance(Duration::from_millis(150)).await;
        settle().await;

        assert_eq!(prices.load(Ordering::SeqCst), 0);
        assert_eq!(news.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn lifecycle_signals_fan_out() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut scheduler = UpdateScheduler::new();
        scheduler.add_task(
            "prices",
            Duration::from_millis(30_000),
            counting_job(counter.clone()),
        );

        scheduler.deliver(LifecycleSignal::Hidden);
        settle().await;
        tokio::time::advance(Duration::from_millis(60_000)).await;
        settle().await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        scheduler.deliver(LifecycleSignal::Visible);
        settle().await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
