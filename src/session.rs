use crate::Error;
use gstreamer as gst;
use gstreamer_app as gst_app;
use gstreamer_app::prelude::*;
use log::{error, warn};
use std::fmt;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Lifecycle state as reported by the media engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
    Ended,
    Error,
}

impl PlaybackState {
    /// States after which the window falls back to its stopped controls.
    pub fn is_finished(self) -> bool {
        matches!(
            self,
            PlaybackState::Stopped | PlaybackState::Ended | PlaybackState::Error
        )
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlaybackState::Stopped => "stopped",
            PlaybackState::Playing => "playing",
            PlaybackState::Paused => "paused",
            PlaybackState::Ended => "ended",
            PlaybackState::Error => "error",
        };
        f.write_str(name)
    }
}

/// A decoded RGBA frame handed out by the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// The external playback engine, as seen by the window.
///
/// Implementations own decoding, rendering and clocking; callers only issue transport
/// commands and read back snapshots.
pub trait MediaHandle {
    /// Binds new media, replacing whatever was loaded. Does not start playback.
    fn load(&mut self, uri: &url::Url) -> Result<(), Error>;
    fn play(&mut self) -> Result<(), Error>;
    fn pause(&mut self) -> Result<(), Error>;
    fn stop(&mut self) -> Result<(), Error>;
    /// Seeks to a normalized position in `0.0..=1.0`.
    fn set_position(&mut self, fraction: f64) -> Result<(), Error>;
    /// Normalized position in `0.0..=1.0`.
    fn position(&self) -> f64;
    /// Elapsed time in milliseconds.
    fn time_ms(&self) -> i64;
    /// Total length in milliseconds, `0` when unknown.
    fn length_ms(&self) -> i64;
    /// Volume in percent.
    fn set_volume(&mut self, percent: u8);
    fn volume(&self) -> u8;
    fn state(&mut self) -> PlaybackState;
    /// The newest frame, if one arrived since the last call.
    fn take_frame(&mut self) -> Option<Frame>;
}

const APPSINK_NAME: &str = "overlay_player_video";
const PULL_TIMEOUT: Duration = Duration::from_millis(16);

/// States in which the appsink flushes and hands out nothing.
fn worker_parks(state: gst::State) -> bool {
    matches!(state, gst::State::Null | gst::State::Ready)
}

/// Time left of a pull slot after a pull came back empty after `waited`.
fn pull_backoff(waited: Duration) -> Duration {
    PULL_TIMEOUT.saturating_sub(waited)
}

struct Pipeline {
    bus: gst::Bus,
    source: gst::Pipeline,
    alive: Arc<AtomicBool>,
    worker: Option<std::thread::JoinHandle<()>>,

    frame: Arc<Mutex<Frame>>,
    upload_frame: Arc<AtomicBool>,
    paused: Arc<AtomicBool>,
    parked: Arc<AtomicBool>,
    is_eos: bool,
    failed: bool,
}

impl Pipeline {
    fn launch(uri: &url::Url) -> Result<Self, Error> {
        let pipeline = format!("playbin uri=\"{}\" video-sink=\"videoscale ! videoconvert ! appsink name={APPSINK_NAME} drop=true max-buffers=1 caps=video/x-raw,format=RGBA,pixel-aspect-ratio=1/1\"", uri.as_str());
        let pipeline = gst::parse::launch(pipeline.as_ref())?
            .downcast::<gst::Pipeline>()
            .map_err(|_| Error::Cast)?;

        let video_sink: gst::Element = pipeline.property("video-sink");
        let pad = video_sink.pads().first().cloned().ok_or(Error::Cast)?;
        let pad = pad.dynamic_cast::<gst::GhostPad>().map_err(|_| Error::Cast)?;
        let bin = pad
            .parent_element()
            .ok_or(Error::Cast)?
            .downcast::<gst::Bin>()
            .map_err(|_| Error::Cast)?;
        let app_sink = bin
            .by_name(APPSINK_NAME)
            .ok_or(Error::Cast)?
            .downcast::<gst_app::AppSink>()
            .map_err(|_| Error::Cast)?;

        let bus = pipeline.bus().ok_or(Error::Bus)?;

        // preroll without blocking; the caller decides when to play
        pipeline.set_state(gst::State::Paused)?;

        let frame = Arc::new(Mutex::new(Frame::default()));
        let upload_frame = Arc::new(AtomicBool::new(false));
        let alive = Arc::new(AtomicBool::new(true));
        let paused = Arc::new(AtomicBool::new(true));
        let parked = Arc::new(AtomicBool::new(false));

        let frame_ref = Arc::clone(&frame);
        let upload_frame_ref = Arc::clone(&upload_frame);
        let alive_ref = Arc::clone(&alive);
        let paused_ref = Arc::clone(&paused);
        let parked_ref = Arc::clone(&parked);

        let worker = std::thread::spawn(move || {
            let mut last_pts = None;
            let timeout = gst::ClockTime::from_nseconds(PULL_TIMEOUT.as_nanos() as u64);
            while alive_ref.load(Ordering::Acquire) {
                if parked_ref.load(Ordering::SeqCst) {
                    std::thread::park_timeout(PULL_TIMEOUT);
                    continue;
                }

                let started = Instant::now();
                let pulled = (|| -> Result<(), gst::FlowError> {
                    let paused = paused_ref.load(Ordering::SeqCst);
                    let sample = if paused {
                        app_sink
                            .try_pull_preroll(timeout)
                            .ok_or(gst::FlowError::Eos)?
                    } else {
                        app_sink
                            .try_pull_sample(timeout)
                            .ok_or(gst::FlowError::Eos)?
                    };

                    let buffer = sample.buffer().ok_or(gst::FlowError::Error)?;
                    // the preroll sample is handed out again on every pull while paused
                    if paused && buffer.pts() == last_pts {
                        return Ok(());
                    }
                    last_pts = buffer.pts();

                    let caps = sample.caps().ok_or(gst::FlowError::Error)?;
                    let s = caps.structure(0).ok_or(gst::FlowError::Error)?;
                    let width = s.get::<i32>("width").map_err(|_| gst::FlowError::Error)?;
                    let height = s.get::<i32>("height").map_err(|_| gst::FlowError::Error)?;
                    let len = width as usize * height as usize * 4;

                    let map = buffer.map_readable().map_err(|_| gst::FlowError::Error)?;
                    let data = map.as_slice().get(..len).ok_or(gst::FlowError::Error)?;

                    let mut frame = frame_ref.lock().map_err(|_| gst::FlowError::Error)?;
                    frame.width = width as u32;
                    frame.height = height as u32;
                    frame.pixels.clear();
                    frame.pixels.extend_from_slice(data);
                    upload_frame_ref.store(true, Ordering::SeqCst);

                    Ok(())
                })();

                match pulled {
                    Ok(()) => {}
                    Err(gst::FlowError::Error) => error!("error pulling frame"),
                    // flushing or at end of stream, the sink returns without waiting
                    Err(_) => std::thread::park_timeout(pull_backoff(started.elapsed())),
                }
            }
        });

        Ok(Pipeline {
            bus,
            source: pipeline,
            alive,
            worker: Some(worker),
            frame,
            upload_frame,
            paused,
            parked,
            is_eos: false,
            failed: false,
        })
    }

    fn set_state(&mut self, state: gst::State) -> Result<(), Error> {
        self.source.set_state(state)?;
        self.paused
            .store(state != gst::State::Playing, Ordering::SeqCst);
        self.parked.store(worker_parks(state), Ordering::SeqCst);
        if let Some(worker) = &self.worker {
            worker.thread().unpark();
        }
        Ok(())
    }

    fn drain_bus(&mut self) {
        for msg in self.bus.iter() {
            match msg.view() {
                gst::MessageView::Error(err) => {
                    error!("bus returned an error: {err}");
                    self.failed = true;
                }
                gst::MessageView::Eos(_) => self.is_eos = true,
                _ => {}
            }
        }
    }

    fn state(&mut self) -> PlaybackState {
        self.drain_bus();
        if self.failed {
            return PlaybackState::Error;
        }
        if self.is_eos {
            return PlaybackState::Ended;
        }
        // an async change in flight counts as already done
        let (_, current, pending) = self.source.state(gst::ClockTime::ZERO);
        let target = if pending == gst::State::VoidPending {
            current
        } else {
            pending
        };
        match target {
            gst::State::Playing => PlaybackState::Playing,
            gst::State::Paused => PlaybackState::Paused,
            _ => PlaybackState::Stopped,
        }
    }
}

impl Drop for Pipeline {
    fn drop(&mut self) {
        if let Err(err) = self.source.set_state(gst::State::Null) {
            warn!("failed to shut down pipeline: {err}");
        }

        self.alive.store(false, Ordering::SeqCst);
        if let Some(worker) = self.worker.take() {
            worker.thread().unpark();
            if worker.join().is_err() {
                error!("failed to stop video thread");
            }
        }
    }
}

/// [`MediaHandle`] backed by a GStreamer `playbin`.
pub struct GstHandle {
    pipeline: Option<Pipeline>,
    volume: u8,
}

impl Default for GstHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl GstHandle {
    pub fn new() -> Self {
        GstHandle {
            pipeline: None,
            volume: 100,
        }
    }

    fn pipeline(&mut self) -> Result<&mut Pipeline, Error> {
        self.pipeline.as_mut().ok_or(Error::NoMedia)
    }

    fn apply_volume(&self) {
        if let Some(pipeline) = &self.pipeline {
            pipeline
                .source
                .set_property("volume", f64::from(self.volume) / 100.0);
            // gstreamer unmutes when changing volume
            let muted: bool = pipeline.source.property("mute");
            pipeline.source.set_property("mute", muted);
        }
    }

    fn query_ms(&self, duration: bool) -> i64 {
        let Some(pipeline) = &self.pipeline else {
            return 0;
        };
        let value = if duration {
            pipeline.source.query_duration::<gst::ClockTime>()
        } else {
            pipeline.source.query_position::<gst::ClockTime>()
        };
        value.map_or(0, |t| t.mseconds() as i64)
    }
}

impl MediaHandle for GstHandle {
    fn load(&mut self, uri: &url::Url) -> Result<(), Error> {
        gst::init()?;
        // tear the old pipeline down before the new one claims the audio device
        self.pipeline = None;
        self.pipeline = Some(Pipeline::launch(uri)?);
        self.apply_volume();
        Ok(())
    }

    fn play(&mut self) -> Result<(), Error> {
        let pipeline = self.pipeline()?;
        if pipeline.is_eos {
            pipeline.is_eos = false;
            pipeline.source.seek_simple(
                gst::SeekFlags::FLUSH | gst::SeekFlags::KEY_UNIT,
                gst::ClockTime::ZERO,
            )?;
        }
        pipeline.set_state(gst::State::Playing)
    }

    fn pause(&mut self) -> Result<(), Error> {
        self.pipeline()?.set_state(gst::State::Paused)
    }

    fn stop(&mut self) -> Result<(), Error> {
        let pipeline = self.pipeline()?;
        pipeline.is_eos = false;
        pipeline.set_state(gst::State::Ready)
    }

    fn set_position(&mut self, fraction: f64) -> Result<(), Error> {
        let pipeline = self.pipeline()?;
        let Some(duration) = pipeline.source.query_duration::<gst::ClockTime>() else {
            // live or not yet prerolled; nothing to seek within
            return Ok(());
        };
        let target = (duration.nseconds() as f64 * fraction.clamp(0.0, 1.0)) as u64;
        pipeline.source.seek_simple(
            gst::SeekFlags::FLUSH | gst::SeekFlags::KEY_UNIT,
            gst::ClockTime::from_nseconds(target),
        )?;
        pipeline.is_eos = false;
        Ok(())
    }

    fn position(&self) -> f64 {
        let length = self.length_ms();
        if length <= 0 {
            return 0.0;
        }
        (self.time_ms() as f64 / length as f64).clamp(0.0, 1.0)
    }

    fn time_ms(&self) -> i64 {
        self.query_ms(false)
    }

    fn length_ms(&self) -> i64 {
        self.query_ms(true)
    }

    fn set_volume(&mut self, percent: u8) {
        self.volume = percent.min(100);
        self.apply_volume();
    }

    fn volume(&self) -> u8 {
        self.volume
    }

    fn state(&mut self) -> PlaybackState {
        self.pipeline
            .as_mut()
            .map_or(PlaybackState::Stopped, Pipeline::state)
    }

    fn take_frame(&mut self) -> Option<Frame> {
        let pipeline = self.pipeline.as_ref()?;
        if !pipeline.upload_frame.swap(false, Ordering::SeqCst) {
            return None;
        }
        match pipeline.frame.lock() {
            Ok(frame) => Some(frame.clone()),
            Err(_) => {
                error!("frame buffer lock poisoned");
                None
            }
        }
    }
}

/// The window's view of the media engine.
///
/// Every call forwards to the [`MediaHandle`]; the session only remembers which media is
/// bound, the requested volume and the last snapshot it read back.
pub struct PlaybackSession<H: MediaHandle = GstHandle> {
    handle: H,
    uri: Option<url::Url>,
    volume: u8,
    duration_ms: i64,
}

impl<H: MediaHandle> PlaybackSession<H> {
    pub fn new(handle: H, volume: u8) -> Self {
        PlaybackSession {
            handle,
            uri: None,
            volume: volume.min(100),
            duration_ms: 0,
        }
    }

    /// Binds the file at `path`. Playback is started separately with [`Self::play_pause`].
    pub fn open(&mut self, path: &Path) -> Result<(), Error> {
        let path = path.canonicalize()?;
        let uri = url::Url::from_file_path(&path).map_err(|_| Error::Uri)?;

        self.uri = None;
        self.duration_ms = 0;

        self.handle.load(&uri)?;
        self.handle.set_volume(self.volume);
        self.uri = Some(uri);
        Ok(())
    }

    /// Pauses if the engine reports playing, plays otherwise. Returns whether playback is
    /// now running; `false` without media.
    pub fn play_pause(&mut self) -> Result<bool, Error> {
        if self.uri.is_none() {
            return Ok(false);
        }
        if self.handle.state() == PlaybackState::Playing {
            self.handle.pause()?;
            Ok(false)
        } else {
            self.handle.play()?;
            Ok(true)
        }
    }

    pub fn stop(&mut self) -> Result<(), Error> {
        if self.uri.is_none() {
            return Ok(());
        }
        self.handle.stop()
    }

    pub fn seek(&mut self, fraction: f64) -> Result<(), Error> {
        if self.uri.is_none() {
            return Ok(());
        }
        self.handle.set_position(fraction.clamp(0.0, 1.0))
    }

    pub fn set_volume(&mut self, percent: u8) {
        self.volume = percent.min(100);
        self.handle.set_volume(self.volume);
    }

    pub fn volume(&self) -> u8 {
        self.volume
    }

    pub fn position_fraction(&self) -> f64 {
        self.handle.position()
    }

    pub fn elapsed_ms(&self) -> i64 {
        self.handle.time_ms()
    }

    pub fn duration_ms(&mut self) -> i64 {
        self.duration_ms = self.handle.length_ms();
        self.duration_ms
    }

    pub fn state(&mut self) -> PlaybackState {
        if self.uri.is_none() {
            return PlaybackState::Stopped;
        }
        self.handle.state()
    }

    pub fn take_frame(&mut self) -> Option<Frame> {
        self.handle.take_frame()
    }

    pub fn uri(&self) -> Option<&url::Url> {
        self.uri.as_ref()
    }

    pub fn has_media(&self) -> bool {
        self.uri.is_some()
    }

    /// Last length read by [`Self::duration_ms`].
    pub fn last_duration_ms(&self) -> i64 {
        self.duration_ms
    }

    pub fn handle(&self) -> &H {
        &self.handle
    }

    pub fn handle_mut(&mut self) -> &mut H {
        &mut self.handle
    }
}
