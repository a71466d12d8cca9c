use iced_overlay_player::{
    Cursor, Effect, InputKind, OverlayController, OverlayEvent, OverlayLayout, Phase, Rect,
    WindowSize,
};
use std::time::{Duration, Instant};

const MS: Duration = Duration::from_millis(1);
const IDLE: Duration = Duration::from_millis(1500);

fn enter(overlay: &mut OverlayController, now: Instant) {
    overlay.handle(
        OverlayEvent::EnterFullscreen(WindowSize::new(1920, 1080)),
        now,
    );
}

/// Drives ticks every 16ms up to `until`, returning the last instant ticked.
fn tick_until(overlay: &mut OverlayController, from: Instant, until: Instant) -> Instant {
    let mut now = from;
    while now < until {
        now = (now + 16 * MS).min(until);
        overlay.handle(OverlayEvent::Tick, now);
    }
    now
}

#[test]
fn idle_at_least_interval_hides_and_removes_widgets() {
    for extra_ms in [0u32, 1, 250, 1000, 10_000] {
        let start = Instant::now();
        let mut overlay = OverlayController::default();
        enter(&mut overlay, start);

        let deadline = start + IDLE + extra_ms * MS;
        let now = tick_until(&mut overlay, start, deadline);
        // let the fade-out run to completion
        tick_until(&mut overlay, now, now + 400 * MS);

        assert_eq!(overlay.phase(), Phase::Hidden, "idle for +{extra_ms}ms");
        assert!(!overlay.widgets_shown());
        assert_eq!(overlay.opacity(), 0.0);
        assert_eq!(overlay.cursor(), Cursor::Blank);
    }
}

#[test]
fn input_spaced_below_interval_never_hides() {
    for gap_ms in [16u32, 200, 700, 1499] {
        let start = Instant::now();
        let mut overlay = OverlayController::default();
        enter(&mut overlay, start);

        let mut now = start;
        for i in 0..40 {
            let next = now + gap_ms * MS;
            now = tick_until(&mut overlay, now, next);
            let kind = match i % 3 {
                0 => InputKind::MouseMove,
                1 => InputKind::MousePress,
                _ => InputKind::KeyPress,
            };
            overlay.handle(OverlayEvent::Input(kind), now);
            assert!(overlay.is_visible(), "gap {gap_ms}ms, step {i}");
            assert!(overlay.widgets_shown());
        }
        assert!(!overlay.is_animating());
    }
}

#[test]
fn leaving_fullscreen_restores_from_any_phase() {
    // offsets land in: shown, fading out, hidden, fading back in
    for offset_ms in [100u32, 1600, 2500, 2600] {
        let start = Instant::now();
        let mut overlay = OverlayController::default();
        enter(&mut overlay, start);
        let now = tick_until(&mut overlay, start, start + offset_ms.min(2500) * MS);
        if offset_ms == 2600 {
            overlay.handle(OverlayEvent::Input(InputKind::MouseMove), now);
            overlay.handle(OverlayEvent::Tick, now + 50 * MS);
        }

        assert_eq!(
            overlay.handle(OverlayEvent::ExitFullscreen, now + 100 * MS),
            Effect::Docked
        );
        assert_eq!(overlay.opacity(), 1.0);
        assert_eq!(overlay.layout(), None);
        assert!(overlay.idle_deadline().is_none());
        assert!(overlay.widgets_shown());
        assert!(!overlay.is_fullscreen());
    }
}

#[test]
fn resize_while_visible_recomputes_geometry_only() {
    let start = Instant::now();
    let mut overlay = OverlayController::default();
    enter(&mut overlay, start);

    for (w, h) in [(1280, 720), (2560, 1440), (800, 600)] {
        let phase = overlay.phase();
        let effect = overlay.handle(OverlayEvent::Resized(WindowSize::new(w, h)), start);
        let layout = overlay.layout().expect("floating layout");

        assert_eq!(effect, Effect::Relaid(layout));
        assert_eq!(layout.progress.width, w * 3 / 4);
        assert_eq!(layout.progress.x as u32, (w - layout.progress.width) / 2);
        assert_eq!(layout.transport.x, layout.progress.x);
        assert_eq!(overlay.phase(), phase);
    }
}

#[test]
fn full_hd_fullscreen_geometry() {
    let start = Instant::now();
    let mut overlay = OverlayController::default();
    let effect = overlay.handle(
        OverlayEvent::EnterFullscreen(WindowSize::new(1920, 1080)),
        start,
    );

    let expected = OverlayLayout {
        progress: Rect {
            x: 240,
            y: 970,
            width: 1440,
            height: 36,
        },
        transport: Rect {
            x: 240,
            y: 1020,
            width: 1440,
            height: 48,
        },
    };
    assert_eq!(effect, Effect::Floated(expected));
}

#[test]
fn key_press_while_hidden_starts_fade_in() {
    let start = Instant::now();
    let mut overlay = OverlayController::default();
    enter(&mut overlay, start);
    let now = tick_until(&mut overlay, start, start + 2000 * MS);
    assert_eq!(overlay.phase(), Phase::Hidden);

    assert_eq!(
        overlay.handle(OverlayEvent::Input(InputKind::KeyPress), now),
        Effect::FadeInStarted
    );
    assert!(overlay.is_visible());
    assert_eq!(overlay.cursor(), Cursor::Arrow);
}
