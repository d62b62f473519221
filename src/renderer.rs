//! Lifecycle of a mounted particle field: context acquisition, the frame
//! loop, debounced resizes and teardown.

use std::time::{Duration, Instant};

use rand::Rng;
use tracing::{debug, warn};

use crate::{
    canvas::{Canvas, SurfaceSize},
    error::Result,
    field::ParticleField,
    schedule::{Debouncer, FrameToken, DEFAULT_RESIZE_QUIET},
};

/// What the renderer needs from its environment.
pub trait Host {
    type Canvas: Canvas;

    /// Current viewport in CSS pixels, including the device pixel ratio.
    fn viewport(&self) -> SurfaceSize;

    /// The only fallible step of the lifecycle.
    fn acquire_canvas(&mut self) -> Result<Self::Canvas>;

    /// Schedules one callback at the next display refresh.
    fn request_frame(&mut self) -> FrameToken;

    fn cancel_frame(&mut self, token: FrameToken);

    fn subscribe_resize(&mut self);

    fn unsubscribe_resize(&mut self);
}

enum State<C> {
    Idle,
    Running { canvas: C, pending: Option<FrameToken> },
    Stopped,
}

/// Handle to one particle field mounted on a host.
pub struct FieldRenderer<H: Host, R = rand_chacha::ChaCha8Rng> {
    host: H,
    field: ParticleField<R>,
    state: State<H::Canvas>,
    resize: Debouncer<SurfaceSize>,
}

impl<H: Host, R: Rng> FieldRenderer<H, R> {
    pub fn new(host: H, field: ParticleField<R>) -> Self {
        Self::with_resize_quiet(host, field, DEFAULT_RESIZE_QUIET)
    }

    pub fn with_resize_quiet(host: H, field: ParticleField<R>, quiet: Duration) -> Self {
        Self {
            host,
            field,
            state: State::Idle,
            resize: Debouncer::new(quiet),
        }
    }

    /// Mounts the field and schedules the first frame. If the host has no
    /// drawing context the renderer stays idle and nothing is scheduled.
    pub fn start(&mut self) {
        if self.is_running() {
            return;
        }
        let mut canvas = match self.host.acquire_canvas() {
            Ok(canvas) => canvas,
            Err(err) => {
                warn!(%err, "particle field disabled");
                return;
            },
        };
        let size = self.host.viewport();
        canvas.resize(size);
        self.field.initialize(size);
        self.host.subscribe_resize();
        let pending = Some(self.host.request_frame());
        debug!(
            count = self.field.particles().len(),
            width = size.width,
            height = size.height,
            pixel_ratio = size.pixel_ratio,
            "particle field started"
        );
        self.state = State::Running { canvas, pending };
    }

    /// Runs one frame if `token` is the outstanding request, then asks for
    /// the next one. Stale or foreign tokens are ignored.
    pub fn on_frame(&mut self, token: FrameToken) -> bool {
        let State::Running { canvas, pending } = &mut self.state else {
            return false;
        };
        if *pending != Some(token) {
            return false;
        }
        self.field.advance_frame(canvas);
        *pending = Some(self.host.request_frame());
        true
    }

    /// Records a viewport change; it is applied by [`Self::on_timer`] once
    /// the resize events stop for the quiet period. Empty viewports (a
    /// minimised window) are ignored so the field keeps its last real size.
    pub fn on_resize(&mut self, size: SurfaceSize, now: Instant) {
        if !self.is_running() {
            return;
        }
        if size.is_empty() {
            debug!(width = size.width, height = size.height, "ignoring empty viewport");
            return;
        }
        self.resize.notify(size, now);
    }

    /// Applies a due resize. Returns whether the surface changed.
    pub fn on_timer(&mut self, now: Instant) -> bool {
        let State::Running { canvas, .. } = &mut self.state else {
            return false;
        };
        match self.resize.poll(now) {
            Some(size) => {
                canvas.resize(size);
                self.field.apply_resize(size);
                debug!(width = size.width, height = size.height, "particle field resized");
                true
            },
            None => false,
        }
    }

    /// When the host should call [`Self::on_timer`] next.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.resize.deadline()
    }

    /// Cancels the pending frame and resize, and drops the resize
    /// subscription. Safe to call repeatedly or before [`Self::start`].
    pub fn stop(&mut self) {
        self.resize.cancel();
        match std::mem::replace(&mut self.state, State::Stopped) {
            State::Running { pending, .. } => {
                if let Some(token) = pending {
                    self.host.cancel_frame(token);
                }
                self.host.unsubscribe_resize();
                debug!(frames = self.field.frames(), "particle field stopped");
            },
            State::Idle | State::Stopped => {},
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, State::Running { .. })
    }

    /// Token of the frame the renderer is waiting for.
    pub fn pending_frame(&self) -> Option<FrameToken> {
        match &self.state {
            State::Running { pending, .. } => *pending,
            _ => None,
        }
    }

    pub fn canvas(&self) -> Option<&H::Canvas> {
        match &self.state {
            State::Running { canvas, .. } => Some(canvas),
            _ => None,
        }
    }

    pub fn field(&self) -> &ParticleField<R> {
        &self.field
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }
}

impl<H: Host, R> Drop for FieldRenderer<H, R> {
    fn drop(&mut self) {
        if let State::Running { pending, .. } = &mut self.state {
            if let Some(token) = pending.take() {
                self.host.cancel_frame(token);
            }
            self.host.unsubscribe_resize();
        }
    }
}
