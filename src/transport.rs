//! State behind the progress and transport bars.

use crate::session::{MediaHandle, PlaybackSession, PlaybackState};
use crate::time;

/// Internal resolution of the seek slider.
pub const SEEK_RESOLUTION: u32 = 1000;

const IDLE_LABEL: &str = "00:00 / 00:00";
const ERROR_LABEL: &str = "Playback error";

/// Maps a seek slider value onto a normalized media position.
pub fn slider_to_fraction(value: u32) -> f64 {
    f64::from(value.min(SEEK_RESOLUTION)) / f64::from(SEEK_RESOLUTION)
}

/// Maps a normalized media position onto the seek slider, truncating.
pub fn fraction_to_slider(fraction: f64) -> u32 {
    (fraction.clamp(0.0, 1.0) * f64::from(SEEK_RESOLUTION)) as u32
}

/// Result of one refresh-timer poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The user is dragging the seek slider; nothing was read.
    Inert,
    Updated,
    /// The engine stopped, ended or failed; the window should run its stop transition.
    Finished(PlaybackState),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transport {
    seek_value: u32,
    seek_enabled: bool,
    dragging: bool,
    playing: bool,
    label: String,
}

impl Default for Transport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport {
    pub fn new() -> Self {
        Transport {
            seek_value: 0,
            seek_enabled: false,
            dragging: false,
            playing: false,
            label: IDLE_LABEL.to_owned(),
        }
    }

    pub fn media_opened(&mut self) {
        self.playing = false;
        self.seek_enabled = true;
        self.dragging = false;
        self.seek_value = 0;
        self.label = IDLE_LABEL.to_owned();
    }

    pub fn set_playing(&mut self, playing: bool) {
        self.playing = playing;
    }

    /// Moves the slider under the user's hand. Returns `true` on the first move of a drag.
    pub fn drag(&mut self, value: u32) -> bool {
        if !self.seek_enabled {
            return false;
        }
        let started = !self.dragging;
        self.dragging = true;
        self.seek_value = value.min(SEEK_RESOLUTION);
        started
    }

    /// Ends a drag and returns the position to seek to.
    pub fn release(&mut self) -> Option<f64> {
        if !self.dragging {
            return None;
        }
        self.dragging = false;
        Some(slider_to_fraction(self.seek_value))
    }

    /// Reads position, length and state from the session (the refresh timer body).
    pub fn poll<H: MediaHandle>(&mut self, session: &mut PlaybackSession<H>) -> PollOutcome {
        if self.dragging {
            return PollOutcome::Inert;
        }

        let length = session.duration_ms();
        if length > 0 {
            let elapsed = session.elapsed_ms();
            self.seek_value = fraction_to_slider(session.position_fraction());
            self.label = time::format_progress(elapsed, length);
        }

        let state = session.state();
        if state.is_finished() {
            PollOutcome::Finished(state)
        } else {
            PollOutcome::Updated
        }
    }

    /// Resets the bars after a stop; an engine error stays visible in the label.
    pub fn stopped(&mut self, state: PlaybackState) {
        self.playing = false;
        self.dragging = false;
        self.seek_value = 0;
        self.label = if state == PlaybackState::Error {
            ERROR_LABEL.to_owned()
        } else {
            IDLE_LABEL.to_owned()
        };
    }

    pub fn seek_value(&self) -> u32 {
        self.seek_value
    }

    pub fn seek_enabled(&self) -> bool {
        self.seek_enabled
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}
