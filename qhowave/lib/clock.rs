//! Autonomous periodic time source.
//!
//! The clock never evaluates or publishes anything itself: each tick goes
//! through [`Controls::tick`], the same lock and wake channel as interactive
//! input.

use std::{
    io,
    thread::{ self, JoinHandle },
};
use crossbeam_channel::{ self as chan, Receiver };
use crate::scheduler::Controls;

/// Start a thread that calls [`Controls::tick`] once per configured period
/// until `stop` is disconnected.
pub(crate) fn spawn(controls: Controls, stop: Receiver<()>)
    -> io::Result<JoinHandle<()>>
{
    let period = controls.config().clock.period();
    thread::Builder::new()
        .name("qho-clock".into())
        .spawn(move || {
            let ticker = chan::tick(period);
            tracing::debug!(?period, "clock started");
            let mut stalled = false;
            loop {
                chan::select! {
                    recv(ticker) -> _ => {
                        match controls.tick() {
                            Ok(()) => { stalled = false; },
                            Err(err) if !stalled => {
                                tracing::warn!("clock stalled: {err}");
                                stalled = true;
                            },
                            Err(_) => { },
                        }
                    },
                    recv(stop) -> _ => break,
                }
            }
            tracing::debug!("clock stopped");
        })
}
