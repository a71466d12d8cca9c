//! Auto-hiding control overlay for fullscreen playback.
//!
//! [`OverlayController`] is a plain state machine: every transition is a call to
//! [`OverlayController::handle`] with the event and the current instant, returning the
//! [`Effect`] the window has to reflect. It knows nothing about timers or widgets; the
//! application feeds it ticks and reads back [`Phase`], opacity, [`Cursor`] and layout.
use crate::fade::Fade;
use crate::geometry::{OverlayLayout, WindowSize};
use log::debug;
use std::time::{Duration, Instant};

/// How long the overlay stays up without qualifying input.
pub const DEFAULT_IDLE_INTERVAL: Duration = Duration::from_millis(1500);
/// Duration of both fade-in and fade-out.
pub const DEFAULT_FADE_DURATION: Duration = Duration::from_millis(300);

/// Input that keeps the overlay alive while fullscreen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    MouseMove,
    MousePress,
    KeyPress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayEvent {
    /// Qualifying user input.
    Input(InputKind),
    /// Clock advanced; drives fades and the idle deadline.
    Tick,
    EnterFullscreen(WindowSize),
    ExitFullscreen,
    Resized(WindowSize),
    /// Suspends auto-hide while `true` (e.g. the seek slider is being dragged).
    Hold(bool),
}

/// Visibility phase of the floating panels.
///
/// `FadingIn` and `Shown` together form the visible state; `FadingOut` still shows the
/// widgets but they are already on their way out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Hidden,
    FadingIn,
    Shown,
    FadingOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    #[default]
    Arrow,
    Blank,
}

/// What the window must do after a transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effect {
    None,
    /// Only the idle deadline moved.
    DeadlineReset,
    FadeInStarted,
    FadeOutStarted,
    /// Fade-in completed at full opacity.
    Shown,
    /// Fade-out completed; the widgets must leave the view.
    Hidden,
    /// Panels detached from the normal layout and placed over the video.
    Floated(OverlayLayout),
    /// Panels put back into the normal layout at full opacity.
    Docked,
    /// Floating geometry recomputed after a resize.
    Relaid(OverlayLayout),
}

#[derive(Debug, Clone)]
pub struct OverlayController {
    phase: Phase,
    fullscreen: bool,
    opacity: f32,
    fade: Option<Fade>,
    idle_deadline: Option<Instant>,
    idle_interval: Duration,
    fade_duration: Duration,
    window: WindowSize,
    layout: Option<OverlayLayout>,
    held: bool,
    cursor: Cursor,
}

impl Default for OverlayController {
    fn default() -> Self {
        Self::new(DEFAULT_IDLE_INTERVAL, DEFAULT_FADE_DURATION)
    }
}

impl OverlayController {
    pub fn new(idle_interval: Duration, fade_duration: Duration) -> Self {
        OverlayController {
            phase: Phase::Shown,
            fullscreen: false,
            opacity: 1.0,
            fade: None,
            idle_deadline: None,
            idle_interval,
            fade_duration,
            window: WindowSize::default(),
            layout: None,
            held: false,
            cursor: Cursor::Arrow,
        }
    }

    pub fn handle(&mut self, event: OverlayEvent, now: Instant) -> Effect {
        let effect = match event {
            OverlayEvent::Input(kind) => self.on_input(kind, now),
            OverlayEvent::Tick => self.on_tick(now),
            OverlayEvent::EnterFullscreen(window) => self.enter_fullscreen(window, now),
            OverlayEvent::ExitFullscreen => self.exit_fullscreen(),
            OverlayEvent::Resized(window) => self.resize(window),
            OverlayEvent::Hold(held) => self.hold(held, now),
        };
        if !matches!(effect, Effect::None | Effect::DeadlineReset) {
            debug!("overlay {event:?} -> {effect:?} ({:?})", self.phase);
        }
        effect
    }

    fn on_input(&mut self, _kind: InputKind, now: Instant) -> Effect {
        if !self.fullscreen {
            return Effect::None;
        }
        self.idle_deadline = Some(now + self.idle_interval);
        self.cursor = Cursor::Arrow;

        match self.phase {
            Phase::Hidden | Phase::FadingOut => {
                let from = self.current_opacity(now);
                self.start_fade(from, 1.0, now);
                self.phase = Phase::FadingIn;
                Effect::FadeInStarted
            }
            Phase::FadingIn | Phase::Shown => Effect::DeadlineReset,
        }
    }

    fn on_tick(&mut self, now: Instant) -> Effect {
        if !self.fullscreen {
            return Effect::None;
        }

        let mut effect = Effect::None;
        if let Some(fade) = self.fade {
            self.opacity = fade.value_at(now);
            if fade.is_finished(now) {
                self.fade = None;
                effect = match self.phase {
                    Phase::FadingIn => {
                        self.phase = Phase::Shown;
                        Effect::Shown
                    }
                    Phase::FadingOut => {
                        self.phase = Phase::Hidden;
                        Effect::Hidden
                    }
                    Phase::Hidden | Phase::Shown => Effect::None,
                };
            }
        }

        let due = self.idle_deadline.is_some_and(|deadline| now >= deadline);
        if due && !self.held && matches!(self.phase, Phase::FadingIn | Phase::Shown) {
            self.idle_deadline = None;
            self.start_fade(self.opacity, 0.0, now);
            self.phase = Phase::FadingOut;
            self.cursor = Cursor::Blank;
            effect = Effect::FadeOutStarted;
        }
        effect
    }

    fn enter_fullscreen(&mut self, window: WindowSize, now: Instant) -> Effect {
        let layout = OverlayLayout::compute(window);
        self.fullscreen = true;
        self.window = window;
        self.layout = Some(layout);
        self.fade = None;
        self.opacity = 1.0;
        self.phase = Phase::Shown;
        self.cursor = Cursor::Arrow;
        self.idle_deadline = Some(now + self.idle_interval);
        Effect::Floated(layout)
    }

    fn exit_fullscreen(&mut self) -> Effect {
        self.fullscreen = false;
        self.layout = None;
        self.fade = None;
        self.opacity = 1.0;
        self.phase = Phase::Shown;
        self.cursor = Cursor::Arrow;
        self.idle_deadline = None;
        Effect::Docked
    }

    fn resize(&mut self, window: WindowSize) -> Effect {
        self.window = window;
        if !self.fullscreen {
            return Effect::None;
        }
        let layout = OverlayLayout::compute(window);
        self.layout = Some(layout);
        Effect::Relaid(layout)
    }

    fn hold(&mut self, held: bool, now: Instant) -> Effect {
        let released = self.held && !held;
        self.held = held;
        if released && self.fullscreen && self.is_visible() {
            self.idle_deadline = Some(now + self.idle_interval);
            return Effect::DeadlineReset;
        }
        Effect::None
    }

    fn start_fade(&mut self, from: f32, to: f32, now: Instant) {
        self.fade = Some(Fade::new(from, to, now, self.fade_duration));
        self.opacity = from;
    }

    fn current_opacity(&self, now: Instant) -> f32 {
        self.fade.map_or(self.opacity, |fade| fade.value_at(now))
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    /// `true` in `FadingIn` and `Shown`.
    pub fn is_visible(&self) -> bool {
        matches!(self.phase, Phase::FadingIn | Phase::Shown)
    }

    /// Whether the panels take part in layout and hit-testing at all.
    pub fn widgets_shown(&self) -> bool {
        self.phase != Phase::Hidden
    }

    /// Opacity as of the last event.
    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn is_animating(&self) -> bool {
        self.fade.is_some()
    }

    pub fn is_held(&self) -> bool {
        self.held
    }

    pub fn idle_deadline(&self) -> Option<Instant> {
        self.idle_deadline
    }

    /// Floating geometry; `None` while docked in the normal layout.
    pub fn layout(&self) -> Option<OverlayLayout> {
        self.layout
    }

    pub fn window(&self) -> WindowSize {
        self.window
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    fn fullscreen_at(now: Instant) -> OverlayController {
        let mut overlay = OverlayController::default();
        overlay.handle(
            OverlayEvent::EnterFullscreen(WindowSize::new(1920, 1080)),
            now,
        );
        overlay
    }

    #[test]
    fn windowed_overlay_ignores_input_and_ticks() {
        let now = Instant::now();
        let mut overlay = OverlayController::default();

        assert_eq!(
            overlay.handle(OverlayEvent::Input(InputKind::MouseMove), now),
            Effect::None
        );
        assert_eq!(
            overlay.handle(OverlayEvent::Tick, now + 10_000 * MS),
            Effect::None
        );
        assert_eq!(overlay.phase(), Phase::Shown);
        assert_eq!(overlay.opacity(), 1.0);
        assert!(overlay.idle_deadline().is_none());
    }

    #[test]
    fn entering_fullscreen_floats_panels_and_arms_deadline() {
        let now = Instant::now();
        let mut overlay = OverlayController::default();
        let effect = overlay.handle(
            OverlayEvent::EnterFullscreen(WindowSize::new(1920, 1080)),
            now,
        );

        let layout = OverlayLayout::compute(WindowSize::new(1920, 1080));
        assert_eq!(effect, Effect::Floated(layout));
        assert_eq!(overlay.layout(), Some(layout));
        assert_eq!(overlay.opacity(), 1.0);
        assert_eq!(overlay.idle_deadline(), Some(now + 1500 * MS));
    }

    #[test]
    fn idle_timeout_fades_out_then_hides() {
        let start = Instant::now();
        let mut overlay = fullscreen_at(start);

        assert_eq!(
            overlay.handle(OverlayEvent::Tick, start + 1499 * MS),
            Effect::None
        );
        assert_eq!(
            overlay.handle(OverlayEvent::Tick, start + 1500 * MS),
            Effect::FadeOutStarted
        );
        assert_eq!(overlay.phase(), Phase::FadingOut);
        assert_eq!(overlay.cursor(), Cursor::Blank);
        assert!(overlay.widgets_shown());

        overlay.handle(OverlayEvent::Tick, start + 1650 * MS);
        let mid = overlay.opacity();
        assert!(mid > 0.0 && mid < 1.0);

        assert_eq!(
            overlay.handle(OverlayEvent::Tick, start + 1800 * MS),
            Effect::Hidden
        );
        assert_eq!(overlay.phase(), Phase::Hidden);
        assert_eq!(overlay.opacity(), 0.0);
        assert!(!overlay.widgets_shown());
    }

    #[test]
    fn input_while_visible_only_moves_deadline() {
        let start = Instant::now();
        let mut overlay = fullscreen_at(start);

        let effect = overlay.handle(
            OverlayEvent::Input(InputKind::MouseMove),
            start + 1000 * MS,
        );
        assert_eq!(effect, Effect::DeadlineReset);
        assert!(!overlay.is_animating());
        assert_eq!(overlay.idle_deadline(), Some(start + 2500 * MS));
    }

    #[test]
    fn input_while_hidden_fades_in_and_restores_cursor() {
        let start = Instant::now();
        let mut overlay = fullscreen_at(start);
        overlay.handle(OverlayEvent::Tick, start + 1500 * MS);
        overlay.handle(OverlayEvent::Tick, start + 1800 * MS);
        assert_eq!(overlay.phase(), Phase::Hidden);

        let effect = overlay.handle(
            OverlayEvent::Input(InputKind::MousePress),
            start + 3000 * MS,
        );
        assert_eq!(effect, Effect::FadeInStarted);
        assert_eq!(overlay.phase(), Phase::FadingIn);
        assert_eq!(overlay.cursor(), Cursor::Arrow);
        assert!(overlay.widgets_shown());

        assert_eq!(
            overlay.handle(OverlayEvent::Tick, start + 3300 * MS),
            Effect::Shown
        );
        assert_eq!(overlay.opacity(), 1.0);
    }

    #[test]
    fn repeated_input_during_fade_in_does_not_restart_it() {
        let start = Instant::now();
        let mut overlay = fullscreen_at(start);
        overlay.handle(OverlayEvent::Tick, start + 1500 * MS);
        overlay.handle(OverlayEvent::Tick, start + 1800 * MS);

        overlay.handle(OverlayEvent::Input(InputKind::KeyPress), start + 2000 * MS);
        overlay.handle(OverlayEvent::Tick, start + 2150 * MS);
        let partway = overlay.opacity();
        assert_eq!(
            overlay.handle(OverlayEvent::Input(InputKind::MouseMove), start + 2150 * MS),
            Effect::DeadlineReset
        );
        overlay.handle(OverlayEvent::Tick, start + 2200 * MS);
        assert!(overlay.opacity() >= partway);
    }

    #[test]
    fn input_during_fade_out_reverses_from_current_opacity() {
        let start = Instant::now();
        let mut overlay = fullscreen_at(start);
        overlay.handle(OverlayEvent::Tick, start + 1500 * MS);
        overlay.handle(OverlayEvent::Tick, start + 1650 * MS);
        let partway = overlay.opacity();

        let effect = overlay.handle(
            OverlayEvent::Input(InputKind::MouseMove),
            start + 1650 * MS,
        );
        assert_eq!(effect, Effect::FadeInStarted);
        assert_eq!(overlay.opacity(), partway);
        assert_eq!(overlay.cursor(), Cursor::Arrow);
    }

    #[test]
    fn exit_fullscreen_resets_everything() {
        let start = Instant::now();
        let mut overlay = fullscreen_at(start);
        overlay.handle(OverlayEvent::Tick, start + 1500 * MS);
        overlay.handle(OverlayEvent::Tick, start + 1600 * MS);

        assert_eq!(
            overlay.handle(OverlayEvent::ExitFullscreen, start + 1600 * MS),
            Effect::Docked
        );
        assert_eq!(overlay.opacity(), 1.0);
        assert_eq!(overlay.phase(), Phase::Shown);
        assert_eq!(overlay.layout(), None);
        assert!(overlay.idle_deadline().is_none());
        assert!(!overlay.is_animating());
        assert_eq!(overlay.cursor(), Cursor::Arrow);
    }

    #[test]
    fn resize_relays_without_changing_phase() {
        let start = Instant::now();
        let mut overlay = fullscreen_at(start);
        let effect = overlay.handle(
            OverlayEvent::Resized(WindowSize::new(1280, 720)),
            start + 100 * MS,
        );

        let layout = OverlayLayout::compute(WindowSize::new(1280, 720));
        assert_eq!(effect, Effect::Relaid(layout));
        assert_eq!(overlay.layout(), Some(layout));
        assert_eq!(overlay.phase(), Phase::Shown);
        assert_eq!(overlay.idle_deadline(), Some(start + 1500 * MS));
    }

    #[test]
    fn resize_while_windowed_keeps_panels_docked() {
        let mut overlay = OverlayController::default();
        let effect = overlay.handle(
            OverlayEvent::Resized(WindowSize::new(800, 600)),
            Instant::now(),
        );
        assert_eq!(effect, Effect::None);
        assert_eq!(overlay.layout(), None);
        assert_eq!(overlay.window(), WindowSize::new(800, 600));
    }

    #[test]
    fn hold_suppresses_auto_hide_until_released() {
        let start = Instant::now();
        let mut overlay = fullscreen_at(start);
        overlay.handle(OverlayEvent::Hold(true), start + 100 * MS);

        assert_eq!(
            overlay.handle(OverlayEvent::Tick, start + 5000 * MS),
            Effect::None
        );
        assert_eq!(overlay.phase(), Phase::Shown);

        assert_eq!(
            overlay.handle(OverlayEvent::Hold(false), start + 5000 * MS),
            Effect::DeadlineReset
        );
        assert_eq!(
            overlay.handle(OverlayEvent::Tick, start + 6000 * MS),
            Effect::None
        );
        assert_eq!(
            overlay.handle(OverlayEvent::Tick, start + 6500 * MS),
            Effect::FadeOutStarted
        );
    }
}
