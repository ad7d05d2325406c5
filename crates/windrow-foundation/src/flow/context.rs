//! Layout context capability traits and adapters.
//!
//! A host exposes its item collection to the engine through one of two
//! shapes: a virtualizing context that creates elements on demand for a
//! realization window, or a non-virtualizing context that hands the engine a
//! fully materialized child collection. The adapter pair lets a layout
//! written against one shape run unmodified against the other, so the flow
//! algorithm itself is written once.

use windrow_geometry::{Point, Rect, Size};

/// Opaque handle to a live element minted by the host.
///
/// The engine never owns elements; it tracks handles and asks the host to
/// measure, arrange, and recycle them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ElementId(u64);

impl ElementId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Creation options for [`VirtualizingLayoutContext::get_or_create_element_at`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ElementRealizationOptions {
    /// Bypass any host-side element cache and create a fresh binding.
    pub force_create: bool,

    /// Keep the element alive even if the host's own cleanup pass would
    /// otherwise reclaim it before the next measure.
    pub suppress_auto_recycle: bool,
}

impl ElementRealizationOptions {
    /// The combination used during window generation: force-create with
    /// auto-recycle suppressed.
    pub const FORCED: Self = Self {
        force_create: true,
        suppress_auto_recycle: true,
    };
}

/// Host capabilities for a virtualizing layout: item count plus on-demand
/// element creation and recycling keyed by a realization window.
pub trait VirtualizingLayoutContext {
    /// Total number of items in the data source, realized or not.
    fn item_count(&self) -> usize;

    /// The viewport-plus-buffer window within which elements must be kept
    /// realized. May be infinite in one or both dimensions.
    fn realization_rect(&self) -> Rect;

    /// Index the host would like used as the generation anchor, if any
    /// (e.g. the target of a bring-into-view request).
    fn recommended_anchor_index(&self) -> Option<usize> {
        None
    }

    /// Origin of the layout's extent in the host's coordinate space.
    fn layout_origin(&self) -> Point;

    /// Updates the extent origin. Called once per measure pass after extent
    /// estimation.
    fn set_layout_origin(&mut self, origin: Point);

    /// Realizes (or retrieves) the element for `index`.
    fn get_or_create_element_at(
        &mut self,
        index: usize,
        options: ElementRealizationOptions,
    ) -> ElementId;

    /// Returns an element to the host for reuse. After this call the handle
    /// is dead to the engine.
    fn recycle_element(&mut self, element: ElementId);

    /// Measures a live element at `available_size` and returns its desired
    /// size.
    fn measure_element(&mut self, element: ElementId, available_size: Size) -> Size;

    /// Arranges a live element at its final bounds.
    fn arrange_element(&mut self, element: ElementId, bounds: Rect);
}

/// Host capabilities for a non-virtualizing layout: a fully materialized
/// child collection.
pub trait NonVirtualizingLayoutContext {
    /// Number of children. Every child is always live.
    fn child_count(&self) -> usize;

    /// The child at `index`. Takes `&mut self` so adapted virtualizing
    /// hosts can realize the child on first access.
    fn child_at(&mut self, index: usize) -> ElementId;

    /// Measures a child at `available_size` and returns its desired size.
    fn measure_element(&mut self, element: ElementId, available_size: Size) -> Size;

    /// Arranges a child at its final bounds.
    fn arrange_element(&mut self, element: ElementId, bounds: Rect);
}

/// Presents a non-virtualizing host as a virtualizing context whose window
/// is infinite: every child is permanently realized, recycling is a no-op.
///
/// This is what lets the flow algorithm treat both host shapes uniformly -
/// an infinite realization rect makes it realize the whole collection.
pub struct VirtualizingAdapter<'a> {
    inner: &'a mut dyn NonVirtualizingLayoutContext,
    // Non-virtualizing hosts have no scrollable extent; the origin is
    // accepted and ignored.
    layout_origin: Point,
}

impl<'a> VirtualizingAdapter<'a> {
    pub fn new(inner: &'a mut dyn NonVirtualizingLayoutContext) -> Self {
        Self {
            inner,
            layout_origin: Point::ZERO,
        }
    }
}

impl VirtualizingLayoutContext for VirtualizingAdapter<'_> {
    fn item_count(&self) -> usize {
        self.inner.child_count()
    }

    fn realization_rect(&self) -> Rect {
        Rect::INFINITE
    }

    fn layout_origin(&self) -> Point {
        self.layout_origin
    }

    fn set_layout_origin(&mut self, origin: Point) {
        self.layout_origin = origin;
    }

    fn get_or_create_element_at(
        &mut self,
        index: usize,
        _options: ElementRealizationOptions,
    ) -> ElementId {
        self.inner.child_at(index)
    }

    fn recycle_element(&mut self, _element: ElementId) {
        // Children outlive the window; there is nothing to return.
    }

    fn measure_element(&mut self, element: ElementId, available_size: Size) -> Size {
        self.inner.measure_element(element, available_size)
    }

    fn arrange_element(&mut self, element: ElementId, bounds: Rect) {
        self.inner.arrange_element(element, bounds)
    }
}

/// Presents a virtualizing host as a plain child collection. Children are
/// realized on access with default options.
pub struct NonVirtualizingAdapter<'a> {
    inner: &'a mut dyn VirtualizingLayoutContext,
}

impl<'a> NonVirtualizingAdapter<'a> {
    pub fn new(inner: &'a mut dyn VirtualizingLayoutContext) -> Self {
        Self { inner }
    }
}

impl NonVirtualizingLayoutContext for NonVirtualizingAdapter<'_> {
    fn child_count(&self) -> usize {
        self.inner.item_count()
    }

    fn child_at(&mut self, index: usize) -> ElementId {
        self.inner
            .get_or_create_element_at(index, ElementRealizationOptions::default())
    }

    fn measure_element(&mut self, element: ElementId, available_size: Size) -> Size {
        self.inner.measure_element(element, available_size)
    }

    fn arrange_element(&mut self, element: ElementId, bounds: Rect) {
        self.inner.arrange_element(element, bounds)
    }
}
