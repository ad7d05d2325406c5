//! Virtualizing flow-layout engine for Windrow.
//!
//! The engine realizes only the items intersecting the host's realization
//! window, positions them into wrapped lines, and keeps the window stable
//! and incrementally updatable as the host scrolls or the collection
//! changes. Hosts plug in through the layout-context traits in
//! [`flow::VirtualizingLayoutContext`] / [`flow::NonVirtualizingLayoutContext`].

pub mod events;
pub mod flow;

pub use events::{EventSource, EventToken};
