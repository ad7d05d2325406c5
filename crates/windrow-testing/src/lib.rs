//! Testing utilities and harness for Windrow.
//!
//! [`TestHost`] is a scriptable virtualizing layout context: per-item
//! desired sizes, a settable realization window, anchor suggestions, and
//! full bookkeeping of every element the engine creates, recycles, and
//! arranges. [`StaticHost`] is its non-virtualizing counterpart.

mod host;

pub use host::*;
