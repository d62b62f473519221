//! The 2D drawing surface a particle field paints onto.
//!
//! Coordinates are CSS pixels; [`SurfaceSize::pixel_ratio`] tells the
//! backend how many device pixels back each of them.

use crate::config::Color;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSize {
    pub width: f32,
    pub height: f32,
    pub pixel_ratio: f32,
}

impl SurfaceSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self::with_pixel_ratio(width, height, 1.0)
    }

    pub fn with_pixel_ratio(width: f32, height: f32, pixel_ratio: f32) -> Self {
        let pixel_ratio = if pixel_ratio.is_finite() && pixel_ratio > 0.0 { pixel_ratio } else { 1.0 };
        let extent = |v: f32| if v.is_finite() { v.max(0.0) } else { 0.0 };
        Self {
            width: extent(width),
            height: extent(height),
            pixel_ratio,
        }
    }

    /// True when there is nothing to draw on, e.g. a minimised window.
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Device pixel width of the backing buffer, never zero.
    pub fn backing_width(&self) -> u32 {
        ((self.width * self.pixel_ratio).round() as u32).max(1)
    }

    pub fn backing_height(&self) -> u32 {
        ((self.height * self.pixel_ratio).round() as u32).max(1)
    }
}

/// Style shared by fills and strokes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Paint {
    pub color: Color,
    pub alpha: f32,
    /// Blur radius of the halo, 0 for none.
    pub glow: f32,
    pub line_width: f32,
}

pub trait Canvas {
    /// Reallocates the backing buffer for `size`.
    fn resize(&mut self, size: SurfaceSize);
    fn clear(&mut self);
    fn fill_circle(&mut self, center: Point, radius: f32, paint: &Paint);
    fn stroke_line(&mut self, from: Point, to: Point, paint: &Paint);
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Circle { center: Point, radius: f32, paint: Paint },
    Line { from: Point, to: Point, paint: Paint },
}

/// Canvas that records one frame worth of commands. `clear` starts a new
/// frame; `resize` keeps the commands but remembers the new backing size.
#[derive(Debug, Clone, Default)]
pub struct DisplayList {
    commands: Vec<DrawCommand>,
    size: Option<SurfaceSize>,
    clears: u64,
    resizes: u64,
}

impl DisplayList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn size(&self) -> Option<SurfaceSize> {
        self.size
    }

    pub fn circle_count(&self) -> usize {
        self.commands.iter().filter(|c| matches!(c, DrawCommand::Circle { .. })).count()
    }

    pub fn line_count(&self) -> usize {
        self.commands.iter().filter(|c| matches!(c, DrawCommand::Line { .. })).count()
    }

    /// Number of frames started so far.
    pub fn clears(&self) -> u64 {
        self.clears
    }

    /// Number of backing buffer reallocations so far.
    pub fn resizes(&self) -> u64 {
        self.resizes
    }
}

impl Canvas for DisplayList {
    fn resize(&mut self, size: SurfaceSize) {
        self.size = Some(size);
        self.resizes += 1;
    }

    fn clear(&mut self) {
        self.commands.clear();
        self.clears += 1;
    }

    fn fill_circle(&mut self, center: Point, radius: f32, paint: &Paint) {
        self.commands.push(DrawCommand::Circle { center, radius, paint: *paint });
    }

    fn stroke_line(&mut self, from: Point, to: Point, paint: &Paint) {
        self.commands.push(DrawCommand::Line { from, to, paint: *paint });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backing_size_accounts_for_pixel_ratio() {
        let size = SurfaceSize::with_pixel_ratio(1024.0, 768.0, 2.0);
        assert_eq!((size.backing_width(), size.backing_height()), (2048, 1536));

        let odd = SurfaceSize::with_pixel_ratio(333.0, 10.0, 1.5);
        assert_eq!((odd.backing_width(), odd.backing_height()), (500, 15));

        let empty = SurfaceSize::with_pixel_ratio(0.0, 0.0, f32::NAN);
        assert_eq!(empty.pixel_ratio, 1.0);
        assert_eq!((empty.backing_width(), empty.backing_height()), (1, 1));
        assert!(empty.is_empty());
    }

    #[test]
    fn non_finite_extents_collapse_to_zero() {
        let size = SurfaceSize::with_pixel_ratio(f32::INFINITY, f32::NAN, 2.0);
        assert_eq!((size.width, size.height), (0.0, 0.0));
        assert!(size.is_empty());

        let size = SurfaceSize::new(f32::NEG_INFINITY, 768.0);
        assert_eq!(size.width, 0.0);
        assert!(!SurfaceSize::new(1.0, 1.0).is_empty());
    }

    #[test]
    fn display_list_records_a_frame() {
        let paint = Paint { color: Color::WHITE, alpha: 0.5, glow: 2.0, line_width: 0.5 };
        let mut list = DisplayList::new();
        list.fill_circle(Point::new(1.0, 2.0), 3.0, &paint);
        list.stroke_line(Point::new(0.0, 0.0), Point::new(4.0, 0.0), &paint);
        assert_eq!((list.circle_count(), list.line_count()), (1, 1));

        list.clear();
        assert!(list.commands().is_empty());
        assert_eq!(list.clears(), 1);

        list.resize(SurfaceSize::new(10.0, 10.0));
        assert_eq!(list.size(), Some(SurfaceSize::new(10.0, 10.0)));
        assert_eq!(list.resizes(), 1);
    }
}
