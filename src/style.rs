//! Theme styles scaled by the overlay opacity.
use iced::widget::{button::{self}, container, slider::{self}};
use iced::{Background, Border, Color, Theme};

pub(crate) fn faded(color: Color, alpha: f32) -> Color {
    Color {
        a: color.a * alpha.clamp(0.0, 1.0),
        ..color
    }
}

fn faded_background(background: Background, alpha: f32) -> Background {
    match background {
        Background::Color(color) => Background::Color(faded(color, alpha)),
        other => other,
    }
}

/// Panels keep a fully transparent backdrop in both layouts; only their content fades.
pub(crate) fn panel(alpha: f32) -> impl Fn(&Theme) -> container::Style {
    move |_theme: &Theme| container::Style {
        background: Some(Background::Color(Color::from_rgba8(30, 30, 30, 0.0))),
        text_color: Some(faded(Color::WHITE, alpha)),
        border: Border {
            radius: 10.0.into(),
            ..Border::default()
        },
        ..Default::default()
    }
}

pub(crate) fn button(alpha: f32) -> impl Fn(&Theme, button::Status) -> button::Style {
    move |theme: &Theme, status: button::Status| {
        let base = button::primary(theme, status);
        button::Style {
            background: base.background.map(|bg| faded_background(bg, alpha)),
            text_color: faded(base.text_color, alpha),
            border: Border {
                color: faded(base.border.color, alpha),
                ..base.border
            },
            ..base
        }
    }
}

/// Slider style; `enabled == false` greys it out.
pub(crate) fn slider(alpha: f32, enabled: bool) -> impl Fn(&Theme, slider::Status) -> slider::Style {
    let alpha = if enabled { alpha } else { alpha * 0.35 };
    move |theme: &Theme, status: slider::Status| {
        let base = slider::default(theme, status);
        let (left, right) = base.rail.backgrounds;
        slider::Style {
            rail: slider::Rail {
                backgrounds: (faded_background(left, alpha), faded_background(right, alpha)),
                border: Border {
                    color: faded(base.rail.border.color, alpha),
                    ..base.rail.border
                },
                ..base.rail
            },
            handle: slider::Handle {
                background: faded_background(base.handle.background, alpha),
                border_color: faded(base.handle.border_color, alpha),
                ..base.handle
            },
        }
    }
}
