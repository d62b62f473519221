//! Falling, twinkling particle fields for decorative backgrounds.
//!
//! A [`ParticleField`] owns a fixed pool of particles and advances it one
//! frame at a time; a [`FieldRenderer`] mounts a field on a [`Host`] that
//! schedules frames, reports resizes and hands out the [`Canvas`] to paint
//! on. With the `native` feature the crate also ships a winit + wgpu host.

pub mod canvas;
pub mod config;
pub mod error;
pub mod field;
pub mod headless;
pub mod particle;
pub mod renderer;
pub mod schedule;

#[cfg(feature = "native")]
pub mod gpu;
#[cfg(feature = "native")]
pub mod native;

pub use canvas::{Canvas, DisplayList, DrawCommand, Paint, Point, SurfaceSize};
pub use config::{Color, FieldConfig, Preset, Span};
pub use error::{Error, Result};
pub use field::ParticleField;
pub use headless::HeadlessHost;
pub use particle::Particle;
pub use renderer::{FieldRenderer, Host};
pub use schedule::{Debouncer, FrameToken};
