//! Layout traits and mode dispatch.
//!
//! A layout is written against one context shape; the [`Layout`] dispatch
//! enum routes generic measure/arrange calls to the matching code path and
//! bridges mismatched pairings through the adapter pair, so every
//! (layout, host) combination is valid by construction.

use windrow_geometry::Size;

use super::context::{
    NonVirtualizingAdapter, NonVirtualizingLayoutContext, VirtualizingAdapter,
    VirtualizingLayoutContext,
};

/// A change to the layout's item source, reported by the host between
/// passes. Processing is deferred to the next measure; nothing is handled
/// inline (single-threaded, frame-driven model).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ItemsChange {
    Added { index: usize, count: usize },
    Removed { index: usize, count: usize },
    Reset,
}

/// A layout that realizes elements on demand within a realization window.
pub trait VirtualizingLayout {
    /// Called when the layout is attached to a host context.
    fn initialize_for_context(&mut self, context: &mut dyn VirtualizingLayoutContext);

    /// Called when the layout is detached; every realized element must be
    /// recycled and per-context state dropped.
    fn uninitialize_for_context(&mut self, context: &mut dyn VirtualizingLayoutContext);

    fn measure(
        &mut self,
        context: &mut dyn VirtualizingLayoutContext,
        available_size: Size,
    ) -> Size;

    fn arrange(&mut self, context: &mut dyn VirtualizingLayoutContext, final_size: Size) -> Size;

    /// Reports a collection change; the layout updates its window state and
    /// re-evaluates anchoring on the next measure.
    fn on_items_changed(
        &mut self,
        context: &mut dyn VirtualizingLayoutContext,
        change: ItemsChange,
    );
}

/// A layout over a fully materialized child collection.
pub trait NonVirtualizingLayout {
    fn initialize_for_context(&mut self, context: &mut dyn NonVirtualizingLayoutContext);

    fn uninitialize_for_context(&mut self, context: &mut dyn NonVirtualizingLayoutContext);

    fn measure(
        &mut self,
        context: &mut dyn NonVirtualizingLayoutContext,
        available_size: Size,
    ) -> Size;

    fn arrange(&mut self, context: &mut dyn NonVirtualizingLayoutContext, final_size: Size)
        -> Size;
}

/// The context shape a host presents for one pass.
pub enum LayoutContext<'a> {
    Virtualizing(&'a mut dyn VirtualizingLayoutContext),
    NonVirtualizing(&'a mut dyn NonVirtualizingLayoutContext),
}

/// Mode-dispatch glue: owns a layout of either flavor and routes generic
/// measure/arrange calls, adapting the context when the shapes differ.
pub enum Layout {
    Virtualizing(Box<dyn VirtualizingLayout>),
    NonVirtualizing(Box<dyn NonVirtualizingLayout>),
}

impl Layout {
    pub fn measure(&mut self, context: LayoutContext<'_>, available_size: Size) -> Size {
        match (self, context) {
            (Layout::Virtualizing(layout), LayoutContext::Virtualizing(context)) => {
                layout.measure(context, available_size)
            }
            (Layout::Virtualizing(layout), LayoutContext::NonVirtualizing(context)) => {
                let mut adapter = VirtualizingAdapter::new(context);
                layout.measure(&mut adapter, available_size)
            }
            (Layout::NonVirtualizing(layout), LayoutContext::NonVirtualizing(context)) => {
                layout.measure(context, available_size)
            }
            (Layout::NonVirtualizing(layout), LayoutContext::Virtualizing(context)) => {
                let mut adapter = NonVirtualizingAdapter::new(context);
                layout.measure(&mut adapter, available_size)
            }
        }
    }

    pub fn arrange(&mut self, context: LayoutContext<'_>, final_size: Size) -> Size {
        match (self, context) {
            (Layout::Virtualizing(layout), LayoutContext::Virtualizing(context)) => {
                layout.arrange(context, final_size)
            }
            (Layout::Virtualizing(layout), LayoutContext::NonVirtualizing(context)) => {
                let mut adapter = VirtualizingAdapter::new(context);
                layout.arrange(&mut adapter, final_size)
            }
            (Layout::NonVirtualizing(layout), LayoutContext::NonVirtualizing(context)) => {
                layout.arrange(context, final_size)
            }
            (Layout::NonVirtualizing(layout), LayoutContext::Virtualizing(context)) => {
                let mut adapter = NonVirtualizingAdapter::new(context);
                layout.arrange(&mut adapter, final_size)
            }
        }
    }
}
