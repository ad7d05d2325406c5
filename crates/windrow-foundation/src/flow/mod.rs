//! Flow layout system for Windrow.
//!
//! This module provides the virtualizing flow-layout engine: the layout
//! context capability traits that connect the engine to its host, the
//! element window manager that owns the realized range, and the
//! measure/arrange driver that generates elements around a stable anchor.
//!
//! # Architecture
//!
//! - [`VirtualizingLayoutContext`] / [`NonVirtualizingLayoutContext`] -
//!   capability traits the host implements
//! - [`ElementManager`] - realized-window bookkeeping and recycling
//! - [`FlowLayoutAlgorithm`] - anchor resolution + dual-direction generation
//! - [`FlowLayout`] - the concrete wrapped-lines layout with line-size
//!   estimation
//! - [`Layout`] - mode dispatch between virtualizing and non-virtualizing
//!   hosts
//!
//! # Example
//!
//! ```rust,ignore
//! use windrow_foundation::flow::{FlowLayout, VirtualizingLayout};
//!
//! let mut layout = FlowLayout::new();
//! layout.set_min_item_spacing(4.0);
//! let desired = layout.measure(&mut host, available_size);
//! layout.arrange(&mut host, desired);
//! ```

mod algorithm;
mod context;
mod element_manager;
mod flow_layout;
mod virtual_layout;

#[cfg(test)]
pub(crate) mod test_support;

pub use algorithm::*;
pub use context::*;
pub use element_manager::*;
pub use flow_layout::*;
pub use virtual_layout::*;
