use crate::session::Frame;
use iced::widget::{container, image, Container};
use iced::{Color, ContentFit, Element, Length};

/// The embedded video surface: shows the newest frame the engine handed out, letterboxed
/// onto black.
#[derive(Debug, Default)]
pub(crate) struct VideoSurface {
    handle: Option<image::Handle>,
    size: (u32, u32),
}

impl VideoSurface {
    pub(crate) fn set_frame(&mut self, frame: Frame) {
        if frame.width == 0 || frame.height == 0 {
            return;
        }
        self.size = (frame.width, frame.height);
        self.handle = Some(image::Handle::from_rgba(
            frame.width,
            frame.height,
            frame.pixels,
        ));
    }

    pub(crate) fn clear(&mut self) {
        self.handle = None;
        self.size = (0, 0);
    }

    #[cfg(test)]
    pub(crate) fn size(&self) -> (u32, u32) {
        self.size
    }

    pub(crate) fn view<'a, Message: 'a>(&'a self) -> Element<'a, Message> {
        let content: Element<'a, Message> = match &self.handle {
            Some(handle) => image::Image::new(handle.clone())
                .content_fit(ContentFit::Contain)
                .width(Length::Fill)
                .height(Length::Fill)
                .into(),
            None => iced::widget::Space::new().into(),
        };

        let surface: Container<'a, Message> = container(content)
            .center(Length::Fill)
            .style(|_theme: &iced::Theme| container::Style {
                background: Some(Color::BLACK.into()),
                ..Default::default()
            });
        surface.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_frame_dimensions() {
        let mut surface = VideoSurface::default();
        surface.set_frame(Frame {
            width: 4,
            height: 2,
            pixels: vec![0; 4 * 2 * 4],
        });
        assert_eq!(surface.size(), (4, 2));
        assert!(surface.handle.is_some());

        surface.clear();
        assert_eq!(surface.size(), (0, 0));
        assert!(surface.handle.is_none());
    }

    #[test]
    fn empty_frames_are_ignored() {
        let mut surface = VideoSurface::default();
        surface.set_frame(Frame::default());
        assert!(surface.handle.is_none());
    }
}
