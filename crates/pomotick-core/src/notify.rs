//! Audible cue at the end of a period.
//!
//! Playback is best effort. The session calls [`Notifier::play_cue`] and only
//! logs a failure; nothing about a missing or blocked output device ever
//! reaches the timer state.

use std::io::Write;

use crate::error::NotifyError;

pub trait Notifier {
    fn play_cue(&self) -> Result<(), NotifyError>;
}

impl<T: Notifier + ?Sized> Notifier for Box<T> {
    fn play_cue(&self) -> Result<(), NotifyError> {
        (**self).play_cue()
    }
}

/// Rings the terminal bell on stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalBell;

impl Notifier for TerminalBell {
    fn play_cue(&self) -> Result<(), NotifyError> {
        let mut stderr = std::io::stderr().lock();
        stderr.write_all(b"\x07")?;
        stderr.flush()?;
        Ok(())
    }
}

/// Does nothing. Used when the bell is disabled in the runtime config.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentNotifier;

impl Notifier for SilentNotifier {
    fn play_cue(&self) -> Result<(), NotifyError> {
        Ok(())
    }
}
