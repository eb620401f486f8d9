//! Completion cues played when a countdown hands over to the next mode.
//!
//! Cues are best effort. The driver runs them off the tick path and only
//! logs failures, so a missing sound device never holds up a transition.

use std::io::Write;

use crate::error::CueError;

/// Audible and haptic feedback for a completed interval.
pub trait CueService: Send + Sync {
    fn play_completion_sound(&self) -> Result<(), CueError>;

    fn notify_haptic(&self, success: bool) -> Result<(), CueError>;
}

/// Cue that does nothing. Used when cues are disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentCue;

impl CueService for SilentCue {
    fn play_completion_sound(&self) -> Result<(), CueError> {
        Ok(())
    }

    fn notify_haptic(&self, _success: bool) -> Result<(), CueError> {
        Ok(())
    }
}

/// Rings the terminal bell on stderr. Terminals have no haptics.
#[derive(Debug, Clone, Copy)]
pub struct TerminalBell {
    pub sound: bool,
}

impl CueService for TerminalBell {
    fn play_completion_sound(&self) -> Result<(), CueError> {
        if !self.sound {
            return Ok(());
        }
        let mut err = std::io::stderr().lock();
        err.write_all(b"\x07")?;
        err.flush()?;
        Ok(())
    }

    fn notify_haptic(&self, _success: bool) -> Result<(), CueError> {
        Err(CueError::Unsupported("haptic"))
    }
}

/// Play both cues, logging instead of returning failures.
pub fn play_completion(cue: &dyn CueService, haptic: bool) {
    if let Err(e) = cue.play_completion_sound() {
        tracing::warn!("completion sound failed: {e}");
    }
    if haptic {
        if let Err(e) = cue.notify_haptic(true) {
            tracing::warn!("haptic cue failed: {e}");
        }
    }
}
