//! Placement of the floating control panels over the video in fullscreen.

/// Window size in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WindowSize {
    pub width: u32,
    pub height: u32,
}

impl WindowSize {
    pub fn new(width: u32, height: u32) -> Self {
        WindowSize { width, height }
    }
}

impl From<iced::Size> for WindowSize {
    fn from(size: iced::Size) -> Self {
        WindowSize {
            width: size.width.max(0.0) as u32,
            height: size.height.max(0.0) as u32,
        }
    }
}

/// Integer rectangle relative to the window's top-left corner.
///
/// `y` may be negative when the window is shorter than the panel margins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

pub const PROGRESS_HEIGHT: u32 = 36;
pub const PROGRESS_BOTTOM_MARGIN: u32 = 110;
pub const TRANSPORT_HEIGHT: u32 = 48;
pub const TRANSPORT_BOTTOM_MARGIN: u32 = 60;

/// Geometry of both floating panels for one window size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayLayout {
    pub progress: Rect,
    pub transport: Rect,
}

impl OverlayLayout {
    /// Both panels take three quarters of the window width and are centered horizontally;
    /// the progress bar sits 110px above the bottom edge and the transport bar 60px above it.
    pub fn compute(window: WindowSize) -> Self {
        OverlayLayout {
            progress: panel(window, PROGRESS_HEIGHT, PROGRESS_BOTTOM_MARGIN),
            transport: panel(window, TRANSPORT_HEIGHT, TRANSPORT_BOTTOM_MARGIN),
        }
    }
}

fn panel(window: WindowSize, height: u32, bottom_margin: u32) -> Rect {
    let width = window.width * 3 / 4;
    Rect {
        x: ((window.width - width) / 2) as i32,
        y: window.height as i32 - bottom_margin as i32,
        width,
        height,
    }
}
