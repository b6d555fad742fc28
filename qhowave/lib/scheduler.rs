//! Serialization of input and clock triggers into evaluate→publish cycles.
//!
//! Three sources change what should be on screen: the quantum number
//! selection, the time control, and the autonomous [clock][crate::clock].
//! None of them evaluate anything. Each one mutates the shared
//! [`QuantumState`] under a single lock, bumps its generation, and raises a
//! wake token on a channel of capacity one; while a token is pending, further
//! triggers add nothing to the queue. A single consumer then runs
//! [`UpdateScheduler::run_pending`], which keeps evaluating the newest
//! snapshot until the generation it last published is the live one.
//!
//! The consumer is either the caller (drive `run_pending` by hand) or a
//! dedicated worker thread started with [`UpdateScheduler::spawn`].

use std::{
    io,
    sync::Arc,
    thread::{ self, JoinHandle },
};
use crossbeam_channel::{ self as chan, Receiver, Sender };
use parking_lot::Mutex;
use crate::{
    cache::SampleCache,
    clock,
    config::Config,
    error::{ ConfigError, QhoError },
    grid::SpatialGrid,
    render::Renderer,
    state::{ QuantumState, Snapshot },
    wavefunction::{ Evaluator, QResult, Sample },
};

/// Stage of the current update cycle.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Evaluating,
    Publishing,
}

#[derive(Debug)]
struct Inner {
    state: QuantumState,
    phase: Phase,
    published: Option<u64>,
    last_error: Option<QhoError>,
}

// everything shared between the controls, the clock, and the consumer
struct Core {
    config: Config,
    grid: SpatialGrid,
    cache: SampleCache,
    inner: Mutex<Inner>,
    wake_tx: Sender<()>,
    wake_rx: Receiver<()>,
}

impl Core {
    fn wake(&self) {
        // a full channel means a wake is already pending
        let _ = self.wake_tx.try_send(());
    }

    fn set_phase(&self, phase: Phase) { self.inner.lock().phase = phase; }
}

/// Input side of the pipeline.
///
/// Cheap to clone and safe to call from any thread. Every method returns
/// immediately; evaluation happens on the consumer.
#[derive(Clone)]
pub struct Controls {
    core: Arc<Core>,
}

impl Controls {
    /// Select the quantum number to display.
    ///
    /// Rejected without touching the state if `n` exceeds the configured
    /// maximum or if its normalization cannot be represented.
    pub fn select_quantum_number(&self, n: usize) -> QResult<()> {
        QhoError::check_quantum_number(
            n, self.core.config.limits.max_quantum_number)?;
        self.core.cache.evaluator().normalization(n)?;
        self.core.inner.lock().state.set_n(n);
        tracing::debug!(n, "quantum number selected");
        self.core.wake();
        Ok(())
    }

    /// Move the time control to `t`.
    pub fn set_time(&self, t: f64) -> QResult<()> {
        self.core.inner.lock().state.set_t(t)?;
        self.core.wake();
        Ok(())
    }

    /// Set the multiplier applied to each clock step.
    ///
    /// Takes effect on the next tick; does not trigger a cycle by itself.
    pub fn set_speed(&self, speed: f64) -> QResult<()> {
        self.core.inner.lock().state.set_speed(speed)
    }

    /// Advance time by one clock step and trigger a cycle.
    ///
    /// Rejected without touching the state if the new time would not be
    /// finite.
    pub fn tick(&self) -> QResult<()> {
        let clock = &self.core.config.clock;
        self.core.inner.lock().state.advance(clock.step, clock.wrap)?;
        self.core.wake();
        Ok(())
    }

    /// Copy of the current state.
    pub fn state(&self) -> QuantumState { self.core.inner.lock().state }

    pub fn snapshot(&self) -> Snapshot {
        self.core.inner.lock().state.snapshot()
    }

    pub fn phase(&self) -> Phase { self.core.inner.lock().phase }

    /// Most recent failure of a cycle, cleared by the next successful
    /// publish.
    pub fn last_error(&self) -> Option<QhoError> {
        self.core.inner.lock().last_error.clone()
    }

    /// Generation of the most recently published snapshot.
    pub fn published_generation(&self) -> Option<u64> {
        self.core.inner.lock().published
    }

    pub fn config(&self) -> &Config { &self.core.config }
}

/// Consumer side of the pipeline: owns the renderer and runs cycles.
pub struct UpdateScheduler<R> {
    core: Arc<Core>,
    renderer: R,
}

impl<R> UpdateScheduler<R>
where R: Renderer
{
    /// Build the pipeline for a configuration.
    ///
    /// The initial state is `n = 0`, `t = 0` at the configured clock speed.
    pub fn new(config: Config, renderer: R) -> Result<Self, ConfigError> {
        config.validate()?;
        let grid = SpatialGrid::new(config.grid)?;
        let cache = SampleCache::new(
            Evaluator::new(config.oscillator), config.cache_capacity()?);
        let (wake_tx, wake_rx) = chan::bounded(1);
        let inner = Inner {
            state: QuantumState::new(0, 0.0, config.clock.speed),
            phase: Phase::Idle,
            published: None,
            last_error: None,
        };
        let core = Core {
            config,
            grid,
            cache,
            inner: Mutex::new(inner),
            wake_tx,
            wake_rx,
        };
        Ok(Self { core: Arc::new(core), renderer })
    }

    pub fn controls(&self) -> Controls {
        Controls { core: Arc::clone(&self.core) }
    }

    pub fn grid(&self) -> &SpatialGrid { &self.core.grid }

    pub fn cache(&self) -> &SampleCache { &self.core.cache }

    pub fn renderer(&self) -> &R { &self.renderer }

    /// Run cycles until the live state has been published.
    ///
    /// Returns the last snapshot published by this call, or `None` if the
    /// live state was already on display. On failure nothing is published
    /// for the failing snapshot, the previous sample stays current, and the
    /// error is also kept as [`Controls::last_error`].
    pub fn run_pending(&mut self) -> QResult<Option<Snapshot>> {
        let mut published = None;
        loop {
            // about to read the newest state anyway
            let _ = self.core.wake_rx.try_recv();
            let snap = {
                let mut inner = self.core.inner.lock();
                let snap = inner.state.snapshot();
                if inner.published == Some(snap.generation) {
                    return Ok(published);
                }
                inner.phase = Phase::Evaluating;
                snap
            };
            match self.cycle(snap) {
                Ok(()) => { published = Some(snap); }
                Err(err) => {
                    tracing::warn!(
                        n = snap.n,
                        t = snap.t,
                        "update failed, keeping previous sample: {err}",
                    );
                    let mut inner = self.core.inner.lock();
                    inner.phase = Phase::Idle;
                    inner.last_error = Some(err.clone());
                    return Err(err);
                }
            }
        }
    }

    fn evaluate(&self, snap: Snapshot) -> QResult<Sample> {
        let grid = &self.core.grid;
        let phi = self.core.cache.get_or_compute(grid, snap.n)?;
        self.core.cache.evaluator().sample(grid, &phi, snap.n, snap.t)
    }

    fn cycle(&mut self, snap: Snapshot) -> QResult<()> {
        let sample = self.evaluate(snap)?;
        self.core.set_phase(Phase::Publishing);
        self.renderer.publish(sample)?;
        let mut inner = self.core.inner.lock();
        inner.published = Some(snap.generation);
        inner.last_error = None;
        inner.phase = Phase::Idle;
        tracing::trace!(
            n = snap.n,
            t = snap.t,
            generation = snap.generation,
            "published",
        );
        Ok(())
    }
}

impl<R> UpdateScheduler<R>
where R: Renderer + 'static
{
    /// Move the scheduler onto a worker thread and, if enabled in the
    /// configuration, start the clock.
    ///
    /// The current state is published as soon as the worker starts.
    pub fn spawn(self) -> io::Result<SchedulerHandle> {
        let controls = self.controls();
        let wake_rx = self.core.wake_rx.clone();
        let (stop_tx, stop_rx) = chan::bounded::<()>(0);

        let worker_stop = stop_rx.clone();
        let worker = thread::Builder::new()
            .name("qho-scheduler".into())
            .spawn(move || worker_loop(self, &wake_rx, &worker_stop))?;

        let clock = if controls.config().clock.enabled {
            let clock_controls = controls.clone();
            match clock::spawn(clock_controls, stop_rx) {
                Ok(handle) => Some(handle),
                Err(err) => {
                    drop(stop_tx);
                    let _ = worker.join();
                    return Err(err);
                }
            }
        } else {
            None
        };

        Ok(SchedulerHandle {
            controls,
            stop: Some(stop_tx),
            worker: Some(worker),
            clock,
        })
    }
}

fn worker_loop<R>(
    mut scheduler: UpdateScheduler<R>,
    wake: &Receiver<()>,
    stop: &Receiver<()>,
)
where R: Renderer
{
    tracing::debug!("scheduler started");
    let _ = scheduler.run_pending();
    loop {
        chan::select! {
            recv(wake) -> msg => {
                if msg.is_err() { break; }
                // failures are logged and kept as `last_error`
                let _ = scheduler.run_pending();
            },
            recv(stop) -> _ => break,
        }
    }
    tracing::debug!("scheduler stopped");
}

/// Running pipeline; stops and joins its threads on [`Self::shutdown`] or
/// drop.
pub struct SchedulerHandle {
    controls: Controls,
    stop: Option<Sender<()>>,
    worker: Option<JoinHandle<()>>,
    clock: Option<JoinHandle<()>>,
}

impl SchedulerHandle {
    pub fn controls(&self) -> &Controls { &self.controls }

    /// Whether the clock thread was started.
    pub fn has_clock(&self) -> bool { self.clock.is_some() }

    /// Stop the clock and the worker and wait for both to exit.
    pub fn shutdown(mut self) { self.stop_and_join(); }

    fn stop_and_join(&mut self) {
        // disconnecting the stop channel wakes every `select!` on it
        self.stop.take();
        let threads = [self.clock.take(), self.worker.take()];
        for handle in threads.into_iter().flatten() {
            if handle.join().is_err() {
                tracing::error!("pipeline thread panicked");
            }
        }
    }
}

impl Drop for SchedulerHandle {
    fn drop(&mut self) { self.stop_and_join(); }
}

#[cfg(test)]
mod tests {
    use std::time::{ Duration, Instant };
    use crate::{
        config::Limits,
        error::RenderError,
        render::Mailbox,
    };
    use super::*;

    type Log = Arc<Mutex<Vec<(usize, f64)>>>;

    fn config() -> Config {
        let mut config = Config::default();
        config.grid.points = 200;
        config.limits = Limits { max_quantum_number: 9 };
        config.clock.enabled = false;
        config
    }

    fn recorder() -> (Log, impl Renderer + 'static) {
        let log: Log = Arc::default();
        let sink = Arc::clone(&log);
        let renderer = move |s: Sample| -> Result<(), RenderError> {
            sink.lock().push((s.n, s.t));
            Ok(())
        };
        (log, renderer)
    }

    fn wait_until<F>(timeout: Duration, mut cond: F) -> bool
    where F: FnMut() -> bool
    {
        let start = Instant::now();
        while start.elapsed() < timeout {
            if cond() { return true; }
            thread::sleep(Duration::from_millis(2));
        }
        cond()
    }

    #[test]
    fn initial_state_is_published_once() {
        let (log, renderer) = recorder();
        let mut sched = UpdateScheduler::new(config(), renderer).unwrap();
        let snap = sched.run_pending().unwrap().unwrap();
        assert_eq!((snap.n, snap.t), (0, 0.0));
        assert_eq!(sched.run_pending().unwrap(), None);
        assert_eq!(*log.lock(), vec![(0, 0.0)]);
        assert_eq!(sched.controls().phase(), Phase::Idle);
    }

    #[test]
    fn rapid_selections_coalesce() {
        let (log, renderer) = recorder();
        let mut sched = UpdateScheduler::new(config(), renderer).unwrap();
        let controls = sched.controls();
        controls.select_quantum_number(0).unwrap();
        controls.select_quantum_number(1).unwrap();
        controls.select_quantum_number(2).unwrap();
        sched.run_pending().unwrap();
        assert_eq!(*log.lock(), vec![(2, 0.0)]);
        assert_eq!(sched.cache().computations(), 1);
    }

    #[test]
    fn invalid_selection_keeps_previous_sample() {
        let (log, renderer) = recorder();
        let mut sched = UpdateScheduler::new(config(), renderer).unwrap();
        let controls = sched.controls();
        sched.run_pending().unwrap();
        let before = controls.snapshot();
        assert_eq!(
            controls.select_quantum_number(10),
            Err(QhoError::InvalidQuantumNumber { n: 10, max: 9 }),
        );
        assert_eq!(controls.snapshot(), before);
        assert_eq!(sched.run_pending().unwrap(), None);
        assert_eq!(*log.lock(), vec![(0, 0.0)]);
    }

    #[test]
    fn time_changes_reuse_the_cached_factor() {
        let (log, renderer) = recorder();
        let mut sched = UpdateScheduler::new(config(), renderer).unwrap();
        let controls = sched.controls();
        sched.run_pending().unwrap();
        controls.set_time(1.0).unwrap();
        sched.run_pending().unwrap();
        controls.tick().unwrap();
        sched.run_pending().unwrap();
        assert_eq!(log.lock().len(), 3);
        assert_eq!(log.lock()[1], (0, 1.0));
        // default speed 50, step 0.01
        assert!((log.lock()[2].1 - 1.5).abs() < 1e-12);
        assert_eq!(sched.cache().computations(), 1);
        assert!(controls.set_time(f64::NAN).is_err());
    }

    #[test]
    fn unavailable_renderer_is_retried() {
        let mailbox = Mailbox::closed();
        let mut sched = UpdateScheduler::new(config(), mailbox.clone()).unwrap();
        let controls = sched.controls();
        assert!(matches!(
            sched.run_pending(),
            Err(QhoError::RenderPortUnavailable(_)),
        ));
        assert!(controls.last_error().is_some());
        assert_eq!(controls.published_generation(), None);
        mailbox.open();
        controls.tick().unwrap();
        let snap = sched.run_pending().unwrap().unwrap();
        assert_eq!(mailbox.take().map(|s| s.t), Some(snap.t));
        assert_eq!(controls.last_error(), None);
    }

    #[test]
    fn overflowing_tick_is_rejected() {
        let (log, renderer) = recorder();
        let mut sched = UpdateScheduler::new(config(), renderer).unwrap();
        let controls = sched.controls();
        controls.set_time(f64::MAX).unwrap();
        controls.set_speed(f64::MAX).unwrap();
        sched.run_pending().unwrap();
        let before = controls.snapshot();
        for _ in 0..200 {
            assert_eq!(
                controls.tick(),
                Err(QhoError::InvalidTime(f64::INFINITY)),
            );
        }
        assert_eq!(controls.snapshot(), before);
        assert_eq!(sched.run_pending().unwrap(), None);
        assert_eq!(*log.lock(), vec![(0, f64::MAX)]);
    }

    #[test]
    fn failed_evaluation_keeps_previous_sample() {
        let (log, renderer) = recorder();
        let mut sched = UpdateScheduler::new(config(), renderer).unwrap();
        let controls = sched.controls();
        sched.run_pending().unwrap();
        {
            // a state the controls would never accept
            let mut inner = sched.core.inner.lock();
            inner.state = QuantumState::new(3, f64::INFINITY, 1.0);
            inner.state.set_n(3);
        }
        sched.core.wake();
        assert_eq!(
            sched.run_pending(),
            Err(QhoError::InvalidTime(f64::INFINITY)),
        );
        assert_eq!(controls.phase(), Phase::Idle);
        assert_eq!(
            controls.last_error(),
            Some(QhoError::InvalidTime(f64::INFINITY)),
        );
        assert_eq!(controls.published_generation(), Some(0));
        assert_eq!(*log.lock(), vec![(0, 0.0)]);

        controls.set_time(1.0).unwrap();
        sched.run_pending().unwrap();
        assert_eq!(*log.lock(), vec![(0, 0.0), (3, 1.0)]);
        assert_eq!(controls.last_error(), None);
    }

    #[test]
    fn worker_publishes_latest_selection_once() {
        let (log, renderer) = recorder();
        let sched = UpdateScheduler::new(config(), renderer).unwrap();
        let handle = sched.spawn().unwrap();
        assert!(!handle.has_clock());
        let controls = handle.controls().clone();
        assert!(wait_until(Duration::from_secs(5), || log.lock().len() == 1));

        controls.select_quantum_number(1).unwrap();
        controls.select_quantum_number(2).unwrap();
        let done = || controls.published_generation()
            == Some(controls.snapshot().generation);
        assert!(wait_until(Duration::from_secs(5), done));
        thread::sleep(Duration::from_millis(50));
        handle.shutdown();

        let log = log.lock();
        assert_eq!(log.last(), Some(&(2, 0.0)));
        assert_eq!(log.iter().filter(|(n, _)| *n == 2).count(), 1);
    }

    #[test]
    fn clock_drives_the_worker() {
        let mut config = config();
        config.clock.enabled = true;
        config.clock.period_ms = 5;
        let mailbox = Mailbox::new();
        let sched = UpdateScheduler::new(config, mailbox.clone()).unwrap();
        let handle = sched.spawn().unwrap();
        assert!(handle.has_clock());
        assert!(wait_until(Duration::from_secs(5), || mailbox.published() >= 3));
        let t = handle.controls().state().t();
        handle.shutdown();
        assert!(t > 0.0);
        let after = mailbox.published();
        thread::sleep(Duration::from_millis(30));
        assert_eq!(mailbox.published(), after);
    }
}
