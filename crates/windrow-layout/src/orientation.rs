//! Scroll-orientation-based major/minor axis accessors.
//!
//! The flow engine is written once in terms of a *major* axis (the scroll
//! direction, along which lines stack) and a *minor* axis (the direction
//! items flow within a line). [`ScrollOrientation`] maps those roles onto
//! concrete x/y coordinates so the algorithm never branches on direction.

use windrow_geometry::{Point, Rect, Size};

/// The axis along which the host scrolls, i.e. the major axis of the layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollOrientation {
    /// Scrolls vertically: major axis is y/height, minor axis is x/width.
    Vertical,

    /// Scrolls horizontally: major axis is x/width, minor axis is y/height.
    Horizontal,
}

impl ScrollOrientation {
    /// Returns the opposite orientation.
    #[inline]
    pub fn flipped(self) -> Self {
        match self {
            ScrollOrientation::Vertical => ScrollOrientation::Horizontal,
            ScrollOrientation::Horizontal => ScrollOrientation::Vertical,
        }
    }

    /// Returns true if this is the vertical orientation.
    #[inline]
    pub fn is_vertical(self) -> bool {
        matches!(self, ScrollOrientation::Vertical)
    }

    #[inline]
    pub fn major_size(self, size: Size) -> f32 {
        match self {
            ScrollOrientation::Vertical => size.height,
            ScrollOrientation::Horizontal => size.width,
        }
    }

    #[inline]
    pub fn minor_size(self, size: Size) -> f32 {
        match self {
            ScrollOrientation::Vertical => size.width,
            ScrollOrientation::Horizontal => size.height,
        }
    }

    #[inline]
    pub fn major_start(self, rect: Rect) -> f32 {
        match self {
            ScrollOrientation::Vertical => rect.y,
            ScrollOrientation::Horizontal => rect.x,
        }
    }

    #[inline]
    pub fn major_end(self, rect: Rect) -> f32 {
        match self {
            ScrollOrientation::Vertical => rect.y + rect.height,
            ScrollOrientation::Horizontal => rect.x + rect.width,
        }
    }

    #[inline]
    pub fn minor_start(self, rect: Rect) -> f32 {
        match self {
            ScrollOrientation::Vertical => rect.x,
            ScrollOrientation::Horizontal => rect.y,
        }
    }

    #[inline]
    pub fn minor_end(self, rect: Rect) -> f32 {
        match self {
            ScrollOrientation::Vertical => rect.x + rect.width,
            ScrollOrientation::Horizontal => rect.y + rect.height,
        }
    }

    #[inline]
    pub fn rect_major_size(self, rect: Rect) -> f32 {
        self.major_size(rect.size())
    }

    #[inline]
    pub fn rect_minor_size(self, rect: Rect) -> f32 {
        self.minor_size(rect.size())
    }

    #[inline]
    pub fn set_major_start(self, rect: &mut Rect, value: f32) {
        match self {
            ScrollOrientation::Vertical => rect.y = value,
            ScrollOrientation::Horizontal => rect.x = value,
        }
    }

    #[inline]
    pub fn set_minor_start(self, rect: &mut Rect, value: f32) {
        match self {
            ScrollOrientation::Vertical => rect.x = value,
            ScrollOrientation::Horizontal => rect.y = value,
        }
    }

    #[inline]
    pub fn set_major_size(self, rect: &mut Rect, value: f32) {
        match self {
            ScrollOrientation::Vertical => rect.height = value,
            ScrollOrientation::Horizontal => rect.width = value,
        }
    }

    #[inline]
    pub fn set_minor_size(self, rect: &mut Rect, value: f32) {
        match self {
            ScrollOrientation::Vertical => rect.width = value,
            ScrollOrientation::Horizontal => rect.height = value,
        }
    }

    /// Builds a point from minor/major coordinates.
    #[inline]
    pub fn minor_major_point(self, minor: f32, major: f32) -> Point {
        match self {
            ScrollOrientation::Vertical => Point::new(minor, major),
            ScrollOrientation::Horizontal => Point::new(major, minor),
        }
    }

    /// Builds a size from minor/major extents.
    #[inline]
    pub fn minor_major_size(self, minor: f32, major: f32) -> Size {
        match self {
            ScrollOrientation::Vertical => Size::new(minor, major),
            ScrollOrientation::Horizontal => Size::new(major, minor),
        }
    }

    /// Builds a rect from minor/major origin and extents.
    #[inline]
    pub fn minor_major_rect(self, minor: f32, major: f32, minor_size: f32, major_size: f32) -> Rect {
        Rect::from_origin_size(
            self.minor_major_point(minor, major),
            self.minor_major_size(minor_size, major_size),
        )
    }
}
