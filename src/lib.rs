pub mod app;
pub mod config;
mod fade;
pub mod geometry;
pub mod overlay;
pub mod session;
mod style;
mod surface;
pub mod time;
pub mod transport;

use gstreamer as gst;
use thiserror::Error;

pub use fade::{Easing, Fade};
pub use geometry::{OverlayLayout, Rect, WindowSize};
pub use overlay::{Cursor, Effect, InputKind, OverlayController, OverlayEvent, Phase};
pub use session::{Frame, GstHandle, MediaHandle, PlaybackSession, PlaybackState};

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Glib(#[from] glib::Error),
    #[error("{0}")]
    Bool(#[from] glib::BoolError),
    #[error("failed to get the gstreamer bus")]
    Bus,
    #[error("{0}")]
    StateChange(#[from] gst::StateChangeError),
    #[error("failed to cast gstreamer element")]
    Cast,
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("invalid URI")]
    Uri,
    #[error("no media loaded")]
    NoMedia,
    #[error("invalid config file: {0}")]
    Config(#[from] toml::de::Error),
    #[error("failed to serialize config: {0}")]
    ConfigWrite(#[from] toml::ser::Error),
}
