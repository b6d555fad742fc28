//! The port through which finished samples leave the pipeline.

use std::{ sync::Arc, time::Duration };
use parking_lot::{ Condvar, Mutex };
use crate::{ error::RenderError, wavefunction::Sample };

/// Consumer of finished samples.
///
/// Called from the scheduler's worker thread at most once per completed
/// cycle; implementations must not block indefinitely. Returning
/// [`RenderError::Unavailable`] leaves the frame unpublished, and it is
/// retried on the next trigger.
pub trait Renderer: Send {
    fn publish(&mut self, sample: Sample) -> Result<(), RenderError>;
}

impl<F> Renderer for F
where F: FnMut(Sample) -> Result<(), RenderError> + Send
{
    fn publish(&mut self, sample: Sample) -> Result<(), RenderError> {
        self(sample)
    }
}

#[derive(Debug, Default)]
struct Slot {
    pending: Option<Sample>,
    published: u64,
    closed: bool,
}

/// Single-slot, most-recent-wins handoff from the worker thread to whichever
/// context owns the display.
///
/// Publishing overwrites any sample the display has not collected yet, so a
/// slow display skips intermediate frames but always sees the newest one.
/// Clones share the slot.
#[derive(Clone, Debug, Default)]
pub struct Mailbox {
    slot: Arc<(Mutex<Slot>, Condvar)>,
}

impl Mailbox {
    /// Create an open mailbox.
    pub fn new() -> Self { Self::default() }

    /// Create a mailbox that rejects samples until [`Self::open`] is called,
    /// as for a display that has not finished initializing.
    pub fn closed() -> Self {
        let mailbox = Self::default();
        mailbox.close();
        mailbox
    }

    pub fn open(&self) { self.slot.0.lock().closed = false; }

    pub fn close(&self) { self.slot.0.lock().closed = true; }

    pub fn is_open(&self) -> bool { !self.slot.0.lock().closed }

    /// Total number of samples accepted, including overwritten ones.
    pub fn published(&self) -> u64 { self.slot.0.lock().published }

    /// Collect the newest uncollected sample, if any.
    pub fn take(&self) -> Option<Sample> { self.slot.0.lock().pending.take() }

    /// Like [`Self::take`], but wait up to `timeout` for a sample to arrive.
    pub fn wait(&self, timeout: Duration) -> Option<Sample> {
        let (lock, cvar) = &*self.slot;
        let mut slot = lock.lock();
        let _ = cvar.wait_while_for(&mut slot, |s| s.pending.is_none(), timeout);
        slot.pending.take()
    }
}

impl Renderer for Mailbox {
    fn publish(&mut self, sample: Sample) -> Result<(), RenderError> {
        let (lock, cvar) = &*self.slot;
        let mut slot = lock.lock();
        if slot.closed {
            return Err(RenderError::Unavailable("mailbox closed".into()));
        }
        if slot.pending.replace(sample).is_some() {
            tracing::trace!("display skipped a frame");
        }
        slot.published += 1;
        cvar.notify_all();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::thread;
    use crate::{
        grid::SpatialGrid,
        units::Oscillator,
        wavefunction::Evaluator,
    };
    use super::*;

    fn sample(n: usize, t: f64) -> Sample {
        let grid = SpatialGrid::linspace(-1.0, 1.0, 5).unwrap();
        Evaluator::new(Oscillator::natural()).evaluate(&grid, n, t).unwrap()
    }

    #[test]
    fn newest_sample_wins() {
        let mut mailbox = Mailbox::new();
        mailbox.publish(sample(0, 0.0)).unwrap();
        mailbox.publish(sample(1, 0.5)).unwrap();
        let got = mailbox.take().unwrap();
        assert_eq!((got.n, got.t), (1, 0.5));
        assert!(mailbox.take().is_none());
        assert_eq!(mailbox.published(), 2);
    }

    #[test]
    fn closed_mailbox_rejects() {
        let mut mailbox = Mailbox::closed();
        assert!(matches!(
            mailbox.publish(sample(0, 0.0)),
            Err(RenderError::Unavailable(_)),
        ));
        mailbox.open();
        assert!(mailbox.publish(sample(0, 0.0)).is_ok());
        assert_eq!(mailbox.published(), 1);
    }

    #[test]
    fn wait_crosses_threads() {
        let mailbox = Mailbox::new();
        let mut sender = mailbox.clone();
        let handle = thread::spawn(move || sender.publish(sample(2, 1.0)));
        let got = mailbox.wait(Duration::from_secs(5)).unwrap();
        assert_eq!(got.n, 2);
        handle.join().unwrap().unwrap();
    }

    #[test]
    fn closures_are_renderers() {
        let mut seen = Vec::new();
        {
            let mut record = |s: Sample| -> Result<(), RenderError> {
                seen.push(s.n);
                Ok(())
            };
            record.publish(sample(4, 0.0)).unwrap();
        }
        assert_eq!(seen, vec![4]);
    }
}
