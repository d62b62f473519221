use std::collections::BTreeSet;

use crate::{
    canvas::{DisplayList, SurfaceSize},
    error::{Error, Result},
    renderer::Host,
    schedule::FrameToken,
};

/// Host without a window: frames are requested into a set the caller drains
/// and the canvas is a [`DisplayList`].
#[derive(Debug, Clone)]
pub struct HeadlessHost {
    viewport: SurfaceSize,
    context_available: bool,
    next_token: u64,
    requested: BTreeSet<FrameToken>,
    cancelled: Vec<FrameToken>,
    resize_subscribed: bool,
    frame_requests: u64,
}

impl HeadlessHost {
    pub fn new(viewport: SurfaceSize) -> Self {
        Self {
            viewport,
            context_available: true,
            next_token: 0,
            requested: BTreeSet::new(),
            cancelled: Vec::new(),
            resize_subscribed: false,
            frame_requests: 0,
        }
    }

    /// A host whose drawing context can never be acquired.
    pub fn without_context(viewport: SurfaceSize) -> Self {
        Self {
            context_available: false,
            ..Self::new(viewport)
        }
    }

    pub fn set_viewport(&mut self, viewport: SurfaceSize) {
        self.viewport = viewport;
    }

    /// Frames requested and neither fired nor cancelled.
    pub fn outstanding(&self) -> impl Iterator<Item = FrameToken> + '_ {
        self.requested.iter().copied()
    }

    /// Removes and returns the oldest outstanding request, as if the display
    /// refreshed.
    pub fn fire(&mut self) -> Option<FrameToken> {
        self.requested.pop_first()
    }

    pub fn cancelled(&self) -> &[FrameToken] {
        &self.cancelled
    }

    pub fn is_resize_subscribed(&self) -> bool {
        self.resize_subscribed
    }

    /// Total number of `request_frame` calls.
    pub fn frame_requests(&self) -> u64 {
        self.frame_requests
    }
}

impl Host for HeadlessHost {
    type Canvas = DisplayList;

    fn viewport(&self) -> SurfaceSize {
        self.viewport
    }

    fn acquire_canvas(&mut self) -> Result<DisplayList> {
        if self.context_available {
            Ok(DisplayList::new())
        } else {
            Err(Error::ContextUnavailable("headless host has no 2d context".to_string()))
        }
    }

    fn request_frame(&mut self) -> FrameToken {
        let token = FrameToken(self.next_token);
        self.next_token += 1;
        self.frame_requests += 1;
        self.requested.insert(token);
        token
    }

    fn cancel_frame(&mut self, token: FrameToken) {
        if self.requested.remove(&token) {
            self.cancelled.push(token);
        }
    }

    fn subscribe_resize(&mut self) {
        self.resize_subscribed = true;
    }

    fn unsubscribe_resize(&mut self) {
        self.resize_subscribed = false;
    }
}
