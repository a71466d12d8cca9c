//! The player window: glue between iced, the playback session and the overlay controller.
use crate::config::PlayerConfig;
use crate::geometry::{self, OverlayLayout, Rect, WindowSize};
use crate::overlay::{Cursor, Effect, InputKind, OverlayController, OverlayEvent};
use crate::session::{GstHandle, MediaHandle, PlaybackSession, PlaybackState};
use crate::style;
use crate::surface::VideoSurface;
use crate::transport::{PollOutcome, Transport, SEEK_RESOLUTION};
use iced::keyboard::{self, key};
use iced::widget::{
    button, column, container, mouse_area, row, slider, text, tooltip, Space, Stack,
};
use iced::{
    alignment, event, mouse, time, window, Color, Element, Event, Length, Padding, Size,
    Subscription, Task, Theme,
};
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mkv", "avi", "mov", "wmv", "flv"];

const APP_TITLE: &str = "Iced Overlay Player";
const FRAME_INTERVAL: Duration = Duration::from_millis(33);
const ANIMATION_TICK: Duration = Duration::from_millis(16);
const IDLE_TICK: Duration = Duration::from_millis(100);
const MIN_SURFACE: Size = Size::new(840.0, 460.0);

#[derive(Debug, Clone)]
pub enum Message {
    Open,
    Opened(Option<PathBuf>),
    PlayPause,
    Stop,
    Seek(u32),
    SeekReleased,
    Volume(u8),
    ToggleFullscreen,
    Poll,
    NextFrame,
    OverlayTick,
    RawEvent { window: window::Id, event: Event },
}

pub struct App<H: MediaHandle = GstHandle> {
    config: PlayerConfig,
    session: PlaybackSession<H>,
    transport: Transport,
    overlay: OverlayController,
    surface: VideoSurface,
    /// Floating panel geometry, `None` while the panels are docked.
    panels: Option<OverlayLayout>,
    window_id: Option<window::Id>,
    window_size: WindowSize,
}

impl App {
    pub fn new(config: PlayerConfig, startup: Option<PathBuf>) -> (Self, Task<Message>) {
        Self::with_handle(config, GstHandle::new(), startup)
    }
}

impl<H: MediaHandle> App<H> {
    pub fn with_handle(
        config: PlayerConfig,
        handle: H,
        startup: Option<PathBuf>,
    ) -> (Self, Task<Message>) {
        let app = App {
            session: PlaybackSession::new(handle, config.default_volume),
            transport: Transport::new(),
            overlay: OverlayController::new(config.idle_timeout(), config.fade_duration()),
            surface: VideoSurface::default(),
            panels: None,
            window_id: None,
            window_size: WindowSize::new(config.window_width, config.window_height),
            config,
        };
        let task = match startup {
            Some(path) => Task::done(Message::Opened(Some(path))),
            None => Task::none(),
        };
        (app, task)
    }

    pub fn title(&self) -> String {
        let name = self
            .session
            .uri()
            .and_then(|uri| uri.path_segments()?.next_back().map(str::to_owned));
        match name {
            Some(name) => format!("{name} - {APP_TITLE}"),
            None => APP_TITLE.to_owned(),
        }
    }

    pub fn theme(&self) -> Theme {
        Theme::Dark
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Open => Task::perform(pick_file(), Message::Opened),
            Message::Opened(Some(path)) => {
                self.open(&path);
                Task::none()
            }
            Message::Opened(None) => Task::none(),
            Message::PlayPause => {
                self.play_pause();
                Task::none()
            }
            Message::Stop => {
                self.stop(PlaybackState::Stopped);
                Task::none()
            }
            Message::Seek(value) => {
                if self.transport.drag(value) {
                    self.drive_overlay(OverlayEvent::Hold(true), Instant::now());
                }
                Task::none()
            }
            Message::SeekReleased => {
                if let Some(fraction) = self.transport.release() {
                    if let Err(err) = self.session.seek(fraction) {
                        warn!("seek to {fraction} failed: {err}");
                    }
                }
                self.drive_overlay(OverlayEvent::Hold(false), Instant::now());
                Task::none()
            }
            Message::Volume(percent) => {
                self.session.set_volume(percent);
                Task::none()
            }
            Message::ToggleFullscreen => self.set_fullscreen(!self.overlay.is_fullscreen()),
            Message::Poll => {
                if let PollOutcome::Finished(state) = self.transport.poll(&mut self.session) {
                    self.stop(state);
                }
                Task::none()
            }
            Message::NextFrame => {
                if let Some(frame) = self.session.take_frame() {
                    self.surface.set_frame(frame);
                }
                Task::none()
            }
            Message::OverlayTick => {
                self.drive_overlay(OverlayEvent::Tick, Instant::now());
                Task::none()
            }
            Message::RawEvent { window, event } => {
                self.window_id = Some(window);
                self.on_event(event)
            }
        }
    }

    /// Feeds the overlay and keeps the floating geometry in step with what it reports.
    fn drive_overlay(&mut self, event: OverlayEvent, now: Instant) {
        match self.overlay.handle(event, now) {
            Effect::Floated(layout) | Effect::Relaid(layout) => self.panels = Some(layout),
            Effect::Docked => self.panels = None,
            _ => {}
        }
    }

    fn open(&mut self, path: &Path) {
        match self.session.open(path) {
            Ok(()) => {
                info!("opened {}", path.display());
                self.surface.clear();
                self.transport.media_opened();
                self.play_pause();
            }
            Err(err) => {
                error!("cannot open {}: {err}", path.display());
                self.transport.stopped(PlaybackState::Error);
            }
        }
    }

    fn play_pause(&mut self) {
        match self.session.play_pause() {
            Ok(playing) => self.transport.set_playing(playing),
            Err(err) => warn!("play/pause failed: {err}"),
        }
    }

    /// Stop transition, also taken when the engine reports an end or an error.
    fn stop(&mut self, state: PlaybackState) {
        if state == PlaybackState::Error {
            error!("playback failed; stopping");
        }
        if let Err(err) = self.session.stop() {
            warn!("stop failed: {err}");
        }
        self.transport.stopped(state);
    }

    fn set_fullscreen(&mut self, fullscreen: bool) -> Task<Message> {
        if self.overlay.is_fullscreen() == fullscreen {
            return Task::none();
        }
        let Some(id) = self.window_id else {
            return Task::none();
        };

        let now = Instant::now();
        let mode = if fullscreen {
            self.drive_overlay(OverlayEvent::EnterFullscreen(self.window_size), now);
            window::Mode::Fullscreen
        } else {
            self.drive_overlay(OverlayEvent::ExitFullscreen, now);
            window::Mode::Windowed
        };
        window::set_mode(id, mode)
    }

    fn on_event(&mut self, event: Event) -> Task<Message> {
        let now = Instant::now();
        match event {
            Event::Mouse(mouse::Event::CursorMoved { .. }) => {
                self.drive_overlay(OverlayEvent::Input(InputKind::MouseMove), now);
            }
            Event::Mouse(mouse::Event::ButtonPressed(_)) => {
                self.drive_overlay(OverlayEvent::Input(InputKind::MousePress), now);
            }
            Event::Keyboard(keyboard::Event::KeyPressed { key, .. }) => {
                return self.on_key(key, now);
            }
            Event::Window(window::Event::Opened { size, .. })
            | Event::Window(window::Event::Resized(size)) => {
                self.window_size = size.into();
                self.drive_overlay(OverlayEvent::Resized(self.window_size), now);
            }
            Event::Window(window::Event::FileDropped(path)) => self.open(&path),
            _ => {}
        }
        Task::none()
    }

    fn on_key(&mut self, key: keyboard::Key, now: Instant) -> Task<Message> {
        match key {
            keyboard::Key::Named(key::Named::Escape) if self.overlay.is_fullscreen() => {
                self.set_fullscreen(false)
            }
            keyboard::Key::Named(key::Named::Space) => {
                self.drive_overlay(OverlayEvent::Input(InputKind::KeyPress), now);
                self.play_pause();
                Task::none()
            }
            _ => {
                self.drive_overlay(OverlayEvent::Input(InputKind::KeyPress), now);
                Task::none()
            }
        }
    }

    pub fn subscription(&self) -> Subscription<Message> {
        let mut subscriptions = vec![event::listen_with(raw_event)];

        if self.transport.is_playing() {
            subscriptions.push(time::every(self.config.poll_interval()).map(|_| Message::Poll));
        }
        if self.session.has_media() {
            subscriptions.push(time::every(FRAME_INTERVAL).map(|_| Message::NextFrame));
        }
        if self.overlay.is_fullscreen() {
            let period = if self.overlay.is_animating() {
                ANIMATION_TICK
            } else {
                IDLE_TICK
            };
            subscriptions.push(time::every(period).map(|_| Message::OverlayTick));
        }

        Subscription::batch(subscriptions)
    }

    pub fn view(&self) -> Element<'_, Message> {
        let surface = self.surface.view();

        match self.panels {
            Some(layout) => {
                let mut layers = Stack::new()
                    .push(surface)
                    .width(Length::Fill)
                    .height(Length::Fill);
                // hidden panels leave the tree so they stop catching input
                if self.overlay.widgets_shown() {
                    let alpha = self.overlay.opacity();
                    layers = layers
                        .push(floating(self.progress_bar(alpha), layout.progress))
                        .push(floating(self.transport_bar(alpha), layout.transport));
                }
                let interaction = match self.overlay.cursor() {
                    Cursor::Blank => mouse::Interaction::Hidden,
                    Cursor::Arrow => mouse::Interaction::Idle,
                };
                mouse_area(layers).interaction(interaction).into()
            }
            None => column![
                container(surface).height(Length::FillPortion(9)),
                self.progress_bar(1.0),
                self.transport_bar(1.0),
            ]
            .into(),
        }
    }

    fn progress_bar(&self, alpha: f32) -> Element<'_, Message> {
        let seek = slider(
            0..=SEEK_RESOLUTION,
            self.transport.seek_value(),
            Message::Seek,
        )
        .on_release(Message::SeekReleased)
        .width(Length::Fill)
        .style(style::slider(alpha, self.transport.seek_enabled()));

        let label = text(self.transport.label().to_owned())
            .width(120.0)
            .color(style::faded(Color::WHITE, alpha));

        container(
            row![seek, label]
                .spacing(10)
                .align_y(alignment::Vertical::Center),
        )
        .padding(Padding::new(0.0).left(12.0).right(12.0))
        .width(Length::Fill)
        .height(geometry::PROGRESS_HEIGHT as f32)
        .center_y(geometry::PROGRESS_HEIGHT as f32)
        .style(style::panel(alpha))
        .into()
    }

    fn transport_bar(&self, alpha: f32) -> Element<'_, Message> {
        let play_label = if self.transport.is_playing() {
            "Pause"
        } else {
            "Play"
        };
        let (fullscreen_label, fullscreen_tip) = if self.overlay.is_fullscreen() {
            ("Windowed", "Exit Fullscreen")
        } else {
            ("Fullscreen", "Fullscreen")
        };

        let fullscreen = tooltip(
            button(text(fullscreen_label))
                .on_press(Message::ToggleFullscreen)
                .style(style::button(alpha)),
            text(fullscreen_tip),
            tooltip::Position::Top,
        )
        .gap(4);

        let bar = row![
            button(text("Open"))
                .on_press(Message::Open)
                .style(style::button(alpha)),
            Space::new().width(Length::Fill),
            button(text(play_label))
                .width(80.0)
                .on_press(Message::PlayPause)
                .style(style::button(alpha)),
            button(text("Stop"))
                .on_press(Message::Stop)
                .style(style::button(alpha)),
            text("Vol").color(style::faded(Color::WHITE, alpha)),
            slider(0..=100u8, self.session.volume(), Message::Volume)
                .width(70.0)
                .style(style::slider(alpha, true)),
            Space::new().width(Length::Fill),
            fullscreen,
        ]
        .spacing(8)
        .align_y(alignment::Vertical::Center);

        container(bar)
            .padding(Padding::new(0.0).left(12.0).right(12.0))
            .width(Length::Fill)
            .height(geometry::TRANSPORT_HEIGHT as f32)
            .center_y(geometry::TRANSPORT_HEIGHT as f32)
            .style(style::panel(alpha))
            .into()
    }
}

/// Places `content` at `rect` inside a full-window layer.
fn floating(content: Element<'_, Message>, rect: Rect) -> Element<'_, Message> {
    container(
        container(content)
            .width(rect.width as f32)
            .height(rect.height as f32),
    )
    .padding(
        Padding::new(0.0)
            .top(rect.y.max(0) as f32)
            .left(rect.x.max(0) as f32),
    )
    .width(Length::Fill)
    .height(Length::Fill)
    .into()
}

fn raw_event(event: Event, status: event::Status, window: window::Id) -> Option<Message> {
    let forward = match &event {
        Event::Mouse(mouse::Event::CursorMoved { .. } | mouse::Event::ButtonPressed(_)) => true,
        Event::Keyboard(keyboard::Event::KeyPressed { .. }) => {
            matches!(status, event::Status::Ignored)
        }
        Event::Window(
            window::Event::Opened { .. }
            | window::Event::Resized(_)
            | window::Event::FileDropped(_),
        ) => true,
        _ => false,
    };
    forward.then_some(Message::RawEvent { window, event })
}

async fn pick_file() -> Option<PathBuf> {
    rfd::AsyncFileDialog::new()
        .set_title("Open Video")
        .add_filter("Video Files", VIDEO_EXTENSIONS)
        .add_filter("All Files", &["*"])
        .pick_file()
        .await
        .map(|file| file.path().to_path_buf())
}

/// Runs the player window until it is closed.
pub fn run(config: PlayerConfig, startup: Option<PathBuf>) -> iced::Result {
    let window = window::Settings {
        size: Size::new(config.window_width as f32, config.window_height as f32),
        min_size: Some(Size::new(
            MIN_SURFACE.width,
            MIN_SURFACE.height
                + (geometry::PROGRESS_HEIGHT + geometry::TRANSPORT_HEIGHT) as f32,
        )),
        ..window::Settings::default()
    };

    iced::application(
        move || App::new(config.clone(), startup.clone()),
        App::<GstHandle>::update,
        App::<GstHandle>::view,
    )
    .title(App::<GstHandle>::title)
    .theme(App::<GstHandle>::theme)
    .window(window)
    .subscription(App::<GstHandle>::subscription)
    .run()
}
