//! Dedicated OS-thread hotkey listener using `rdev::grab`, falling back to
//! `rdev::listen`.
//!
//! # Shutdown caveat
//!
//! Neither rdev call has a **graceful shutdown API**.  Dropping the
//! [`HotkeyListener`] sets a stop flag so no further events are forwarded
//! (or swallowed), but the OS thread stays blocked in the rdev event loop
//! until the process exits.

use std::io;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use tokio::sync::mpsc;

use super::{ChordTracker, HotkeyEvent, HotkeySpec};

/// Handle to a running hotkey listener thread.
pub struct HotkeyListener {
    stop: Arc<AtomicBool>,
    /// Kept so the thread is not detached; never joined because the rdev
    /// event loop does not return.
    _thread: std::thread::JoinHandle<()>,
}

impl HotkeyListener {
    /// Spawn a thread that watches global key events and sends
    /// [`HotkeyEvent::Triggered`] on `tx` each time `spec` is pressed.
    ///
    /// `try_send` is used from the rdev callback so a slow consumer never
    /// blocks the OS event hook; triggers that do not fit in the channel are
    /// dropped.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the OS refuses to create the thread.
    pub fn start(spec: HotkeySpec, tx: mpsc::Sender<HotkeyEvent>) -> io::Result<Self> {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_clone = Arc::clone(&stop);

        let thread = std::thread::Builder::new()
            .name("hotkey-listener".into())
            .spawn(move || {
                #[cfg(feature = "grab")]
                {
                    // Only returns if the hook could not be installed.
                    if let Err(e) = grab(spec, tx.clone(), Arc::clone(&stop_clone)) {
                        log::warn!(
                            "hotkey-listener: rdev::grab failed ({:?}); falling back to \
                             rdev::listen, {spec} will also reach the focused application",
                            e
                        );
                    }
                }
                listen(spec, tx, stop_clone);
            })?;

        Ok(Self {
            stop,
            _thread: thread,
        })
    }
}

impl Drop for HotkeyListener {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}

fn forward(spec: HotkeySpec, tx: &mpsc::Sender<HotkeyEvent>) {
    log::debug!("hotkey-listener: {spec} pressed");
    if tx.try_send(HotkeyEvent::Triggered).is_err() {
        log::warn!("hotkey-listener: trigger dropped, channel full or closed");
    }
}

/// Watch and swallow: the trigger keystroke never reaches the focused
/// application.
#[cfg(feature = "grab")]
fn grab(
    spec: HotkeySpec,
    tx: mpsc::Sender<HotkeyEvent>,
    stop: Arc<AtomicBool>,
) -> Result<(), rdev::GrabError> {
    use super::Interception;

    let tracker = std::cell::RefCell::new(ChordTracker::new(spec));
    rdev::grab(move |event| {
        if stop.load(Ordering::Relaxed) {
            return Some(event);
        }
        let verdict = tracker.borrow_mut().intercept(&event.event_type);
        match verdict {
            Interception::Pass => Some(event),
            Interception::Swallow => None,
            Interception::Fire => {
                forward(spec, &tx);
                None
            }
        }
    })
}

/// Watch only.
fn listen(spec: HotkeySpec, tx: mpsc::Sender<HotkeyEvent>, stop: Arc<AtomicBool>) {
    let mut tracker = ChordTracker::new(spec);
    let result = rdev::listen(move |event| {
        if stop.load(Ordering::Relaxed) {
            return;
        }
        if tracker.handle(&event.event_type) {
            forward(spec, &tx);
        }
    });

    if let Err(e) = result {
        log::error!("hotkey-listener: rdev::listen exited with error: {:?}", e);
    }
}
