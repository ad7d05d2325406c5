//! The concrete wrapped-lines layout.
//!
//! [`FlowLayout`] owns a [`FlowLayoutAlgorithm`] instance plus the line-size
//! estimation state that powers anchor and extent extrapolation for the
//! unrealized region. It implements the algorithm delegate itself: items
//! measure at the available size, lines break when the minor axis runs out,
//! and completed lines feed a running average used to estimate everything
//! the engine has not seen.

use windrow_geometry::{Rect, Size};
use windrow_layout::{LineAlignment, ScrollOrientation};

use crate::events::{EventSource, EventToken};

use super::algorithm::{
    FlowLayoutAlgorithm, FlowLayoutAlgorithmDelegate, FlowLayoutAnchorInfo, FlowMeasureOptions,
    RealizedEdge,
};
use super::context::VirtualizingLayoutContext;
use super::virtual_layout::{ItemsChange, VirtualizingLayout};

/// Estimated line size used until the first line has been arranged.
/// 48.0 is a common list row height.
const DEFAULT_LINE_SIZE_ESTIMATE: f32 = 48.0;

/// Number of recently arranged lines tracked for estimation. Lines hash into
/// the buffer by start index, so re-arranged lines replace their own slot
/// instead of skewing the running totals.
const ESTIMATION_BUFFER_LEN: usize = 100;

/// Direction items flow within a line. Lines stack along (and the host
/// scrolls on) the perpendicular axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Orientation {
    /// Items flow left to right; lines wrap downward (vertical scrolling).
    Horizontal,
    /// Items flow top to bottom; lines wrap rightward (horizontal scrolling).
    Vertical,
}

impl Orientation {
    /// The scroll (major) axis implied by this flow direction.
    pub fn scroll_orientation(self) -> ScrollOrientation {
        match self {
            Orientation::Horizontal => ScrollOrientation::Vertical,
            Orientation::Vertical => ScrollOrientation::Horizontal,
        }
    }
}

/// Running averages over recently arranged lines.
#[derive(Debug)]
pub(crate) struct LineSizeEstimation {
    line_sizes: Vec<f64>,
    items_per_line: Vec<f64>,
    total_line_size: f64,
    total_items_per_line: f64,
    total_lines_measured: usize,
}

impl LineSizeEstimation {
    fn new() -> Self {
        Self {
            line_sizes: vec![0.0; ESTIMATION_BUFFER_LEN],
            items_per_line: vec![0.0; ESTIMATION_BUFFER_LEN],
            total_line_size: 0.0,
            total_items_per_line: 0.0,
            total_lines_measured: 0,
        }
    }

    fn on_line_arranged(&mut self, start_index: usize, count_in_line: usize, line_size: f32) {
        let slot = start_index % ESTIMATION_BUFFER_LEN;
        let previous_size = self.line_sizes[slot];
        let previous_count = self.items_per_line[slot];
        if previous_size == 0.0 {
            self.total_lines_measured += 1;
        }
        self.total_line_size += f64::from(line_size) - previous_size;
        self.total_items_per_line += count_in_line as f64 - previous_count;
        self.line_sizes[slot] = f64::from(line_size);
        self.items_per_line[slot] = count_in_line as f64;
    }

    fn average_line_size(&self, fallback: f32) -> f32 {
        if self.total_lines_measured > 0 {
            (self.total_line_size / self.total_lines_measured as f64) as f32
        } else {
            fallback
        }
    }

    fn average_items_per_line(&self) -> f32 {
        if self.total_lines_measured > 0 {
            ((self.total_items_per_line / self.total_lines_measured as f64) as f32).max(1.0)
        } else {
            1.0
        }
    }

    fn reset(&mut self) {
        self.line_sizes.iter_mut().for_each(|slot| *slot = 0.0);
        self.items_per_line.iter_mut().for_each(|slot| *slot = 0.0);
        self.total_line_size = 0.0;
        self.total_items_per_line = 0.0;
        self.total_lines_measured = 0;
    }
}

/// Algorithm-private state persisted across passes for one layout instance:
/// the realized range (inside the algorithm) and the estimation caches.
#[derive(Debug)]
struct FlowLayoutState {
    algorithm: FlowLayoutAlgorithm,
    estimation: LineSizeEstimation,
}

impl FlowLayoutState {
    fn new() -> Self {
        Self {
            algorithm: FlowLayoutAlgorithm::new(),
            estimation: LineSizeEstimation::new(),
        }
    }
}

/// A virtualizing layout that positions items in wrapped lines.
pub struct FlowLayout {
    layout_id: String,
    orientation: Orientation,
    min_item_spacing: f32,
    min_line_spacing: f32,
    line_alignment: LineAlignment,
    maximum_items_per_line: Option<usize>,
    virtualization_enabled: bool,
    state: FlowLayoutState,
    measure_invalidated: EventSource<()>,
    arrange_invalidated: EventSource<()>,
}

impl Default for FlowLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl FlowLayout {
    pub fn new() -> Self {
        Self::with_layout_id("FlowLayout")
    }

    /// Creates a layout with an id used to tag its log output.
    pub fn with_layout_id(layout_id: impl Into<String>) -> Self {
        Self {
            layout_id: layout_id.into(),
            orientation: Orientation::Horizontal,
            min_item_spacing: 0.0,
            min_line_spacing: 0.0,
            line_alignment: LineAlignment::Start,
            maximum_items_per_line: None,
            virtualization_enabled: true,
            state: FlowLayoutState::new(),
            measure_invalidated: EventSource::new(),
            arrange_invalidated: EventSource::new(),
        }
    }

    pub fn layout_id(&self) -> &str {
        &self.layout_id
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn set_orientation(&mut self, orientation: Orientation) {
        if self.orientation != orientation {
            self.orientation = orientation;
            self.invalidate_measure();
        }
    }

    pub fn min_item_spacing(&self) -> f32 {
        self.min_item_spacing
    }

    pub fn set_min_item_spacing(&mut self, spacing: f32) {
        if self.min_item_spacing != spacing {
            self.min_item_spacing = spacing;
            self.invalidate_measure();
        }
    }

    pub fn min_line_spacing(&self) -> f32 {
        self.min_line_spacing
    }

    pub fn set_min_line_spacing(&mut self, spacing: f32) {
        if self.min_line_spacing != spacing {
            self.min_line_spacing = spacing;
            self.invalidate_measure();
        }
    }

    pub fn line_alignment(&self) -> LineAlignment {
        self.line_alignment
    }

    pub fn set_line_alignment(&mut self, alignment: LineAlignment) {
        if self.line_alignment != alignment {
            self.line_alignment = alignment;
            self.invalidate_arrange();
        }
    }

    pub fn maximum_items_per_line(&self) -> Option<usize> {
        self.maximum_items_per_line
    }

    pub fn set_maximum_items_per_line(&mut self, maximum: Option<usize>) {
        if self.maximum_items_per_line != maximum {
            self.maximum_items_per_line = maximum;
            self.invalidate_measure();
        }
    }

    pub fn virtualization_enabled(&self) -> bool {
        self.virtualization_enabled
    }

    pub fn set_virtualization_enabled(&mut self, enabled: bool) {
        if self.virtualization_enabled != enabled {
            self.virtualization_enabled = enabled;
            self.invalidate_measure();
        }
    }

    /// Extent estimated by the last measure pass.
    pub fn last_extent(&self) -> Rect {
        self.state.algorithm.last_extent()
    }

    /// Realized range of the last pass as `(first, last)` data indices.
    pub fn realized_range(&self) -> Option<(usize, usize)> {
        let manager = self.state.algorithm.element_manager();
        Some((
            manager.first_realized_data_index()?,
            manager.last_realized_data_index()?,
        ))
    }

    pub fn subscribe_measure_invalidated(
        &mut self,
        listener: impl FnMut(&()) + 'static,
    ) -> EventToken {
        self.measure_invalidated.subscribe(listener)
    }

    pub fn revoke_measure_invalidated(&mut self, token: EventToken) -> bool {
        self.measure_invalidated.revoke(token)
    }

    pub fn subscribe_arrange_invalidated(
        &mut self,
        listener: impl FnMut(&()) + 'static,
    ) -> EventToken {
        self.arrange_invalidated.subscribe(listener)
    }

    pub fn revoke_arrange_invalidated(&mut self, token: EventToken) -> bool {
        self.arrange_invalidated.revoke(token)
    }

    fn invalidate_measure(&mut self) {
        self.measure_invalidated.raise(&());
    }

    fn invalidate_arrange(&mut self) {
        self.arrange_invalidated.raise(&());
    }

    fn measure_options(&self) -> FlowMeasureOptions {
        FlowMeasureOptions {
            is_wrapping: true,
            min_item_spacing: self.min_item_spacing,
            line_spacing: self.min_line_spacing,
            max_items_per_line: self.maximum_items_per_line.unwrap_or(usize::MAX).max(1),
            disable_virtualization: !self.virtualization_enabled,
        }
    }
}

impl VirtualizingLayout for FlowLayout {
    fn initialize_for_context(&mut self, _context: &mut dyn VirtualizingLayoutContext) {
        // Fresh per-context state; the previous attachment (if any) already
        // recycled its elements through uninitialize_for_context.
        self.state = FlowLayoutState::new();
        self.state
            .algorithm
            .set_scroll_orientation(self.orientation.scroll_orientation());
    }

    fn uninitialize_for_context(&mut self, context: &mut dyn VirtualizingLayoutContext) {
        self.state.algorithm.uninitialize_for_context(context);
        self.state.estimation.reset();
    }

    fn measure(
        &mut self,
        context: &mut dyn VirtualizingLayoutContext,
        available_size: Size,
    ) -> Size {
        let scroll_orientation = self.orientation.scroll_orientation();
        let options = self.measure_options();
        let FlowLayoutState {
            algorithm,
            estimation,
        } = &mut self.state;
        algorithm.set_scroll_orientation(scroll_orientation);
        let mut delegate = FlowLayoutDelegate {
            orientation: scroll_orientation,
            line_spacing: options.line_spacing,
            last_extent: algorithm.last_extent(),
            estimation,
        };
        algorithm.measure(context, &mut delegate, available_size, &options, &self.layout_id)
    }

    fn arrange(&mut self, context: &mut dyn VirtualizingLayoutContext, final_size: Size) -> Size {
        self.state.algorithm.arrange(
            context,
            final_size,
            true,
            self.line_alignment,
            &self.layout_id,
        )
    }

    fn on_items_changed(
        &mut self,
        context: &mut dyn VirtualizingLayoutContext,
        change: ItemsChange,
    ) {
        self.state.algorithm.on_items_changed(context, change);
        // Stale line averages would anchor the next pass wrongly.
        self.state.estimation.reset();
        self.invalidate_measure();
    }
}

/// Per-pass delegate view over the layout's estimation state.
struct FlowLayoutDelegate<'a> {
    orientation: ScrollOrientation,
    line_spacing: f32,
    last_extent: Rect,
    estimation: &'a mut LineSizeEstimation,
}

impl FlowLayoutDelegate<'_> {
    fn average_line_pitch(&self) -> f32 {
        self.estimation.average_line_size(DEFAULT_LINE_SIZE_ESTIMATE) + self.line_spacing
    }
}

impl FlowLayoutAlgorithmDelegate for FlowLayoutDelegate<'_> {
    fn get_measure_size(
        &mut self,
        _index: usize,
        available_size: Size,
        _context: &mut dyn VirtualizingLayoutContext,
    ) -> Size {
        available_size
    }

    fn get_provisional_arrange_size(
        &mut self,
        _index: usize,
        _measure_size: Size,
        desired_size: Size,
        _context: &mut dyn VirtualizingLayoutContext,
    ) -> Size {
        desired_size
    }

    fn should_break_line(&self, _index: usize, remaining_space: f32) -> bool {
        remaining_space < 0.0
    }

    fn get_anchor_for_realization_rect(
        &mut self,
        _available_size: Size,
        context: &mut dyn VirtualizingLayoutContext,
    ) -> FlowLayoutAnchorInfo {
        let item_count = context.item_count();
        if item_count == 0 {
            return FlowLayoutAnchorInfo::NONE;
        }
        let orientation = self.orientation;
        let window = context.realization_rect();
        let pitch = self.average_line_pitch();
        let items_per_line = self.estimation.average_items_per_line();
        let relative_offset = orientation.major_start(window) - orientation.major_start(self.last_extent);
        let mut line = (relative_offset / pitch).floor().max(0.0);
        let mut index = (line * items_per_line).floor() as usize;
        if index >= item_count {
            index = item_count - 1;
            line = (index as f32 / items_per_line).floor();
        }
        let offset = line * pitch + orientation.major_start(self.last_extent);
        FlowLayoutAnchorInfo::new(index, offset)
    }

    fn get_anchor_for_target_element(
        &mut self,
        target_index: usize,
        _available_size: Size,
        context: &mut dyn VirtualizingLayoutContext,
    ) -> FlowLayoutAnchorInfo {
        let item_count = context.item_count();
        if item_count == 0 {
            return FlowLayoutAnchorInfo::NONE;
        }
        let orientation = self.orientation;
        let pitch = self.average_line_pitch();
        let items_per_line = self.estimation.average_items_per_line();
        let line = (target_index as f32 / items_per_line).floor();
        let line_start = ((line * items_per_line).floor() as usize).min(target_index);
        let offset = orientation.major_start(self.last_extent) + line * pitch;
        FlowLayoutAnchorInfo::new(line_start, offset)
    }

    fn get_extent(
        &mut self,
        available_size: Size,
        context: &mut dyn VirtualizingLayoutContext,
        first: Option<RealizedEdge>,
        last: Option<RealizedEdge>,
    ) -> Rect {
        let item_count = context.item_count();
        if item_count == 0 {
            return Rect::ZERO;
        }
        let orientation = self.orientation;
        let pitch = self.average_line_pitch();
        let items_per_line = self.estimation.average_items_per_line();
        let minor_available = orientation.minor_size(available_size);
        match (first, last) {
            (Some(first), Some(last)) => {
                let lines_before = (first.index as f32 / items_per_line).floor();
                let extent_major_start =
                    orientation.major_start(first.bounds) - lines_before * pitch;
                let remaining_items = (item_count - last.index - 1) as f32;
                let lines_after = (remaining_items / items_per_line).ceil();
                let major_size =
                    orientation.major_end(last.bounds) - extent_major_start + lines_after * pitch;
                let minor_size = if minor_available.is_finite() {
                    minor_available
                } else {
                    orientation.minor_end(last.bounds)
                };
                orientation.minor_major_rect(0.0, extent_major_start, minor_size, major_size)
            }
            _ => {
                // Nothing realized: extrapolate the whole collection.
                let lines = (item_count as f32 / items_per_line).ceil();
                let major_size = (lines * pitch - self.line_spacing).max(0.0);
                let minor_size = if minor_available.is_finite() {
                    minor_available
                } else {
                    0.0
                };
                orientation.minor_major_rect(0.0, 0.0, minor_size, major_size)
            }
        }
    }

    fn on_line_arranged(
        &mut self,
        start_index: usize,
        count_in_line: usize,
        line_size: f32,
        _context: &mut dyn VirtualizingLayoutContext,
    ) {
        self.estimation
            .on_line_arranged(start_index, count_in_line, line_size);
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::TestContext;
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;
    use windrow_geometry::Rect;

    #[test]
    fn test_estimation_running_average() {
        let mut estimation = LineSizeEstimation::new();
        estimation.on_line_arranged(0, 2, 40.0);
        estimation.on_line_arranged(2, 2, 60.0);
        assert_eq!(estimation.average_line_size(0.0), 50.0);
        assert_eq!(estimation.average_items_per_line(), 2.0);
    }

    #[test]
    fn test_estimation_rearranged_line_replaces_slot() {
        let mut estimation = LineSizeEstimation::new();
        estimation.on_line_arranged(0, 2, 40.0);
        estimation.on_line_arranged(0, 3, 80.0);
        // The same line start replaces its own slot instead of accumulating.
        assert_eq!(estimation.average_line_size(0.0), 80.0);
        assert_eq!(estimation.average_items_per_line(), 3.0);
    }

    #[test]
    fn test_estimation_fallback_before_first_line() {
        let estimation = LineSizeEstimation::new();
        assert_eq!(estimation.average_line_size(48.0), 48.0);
        assert_eq!(estimation.average_items_per_line(), 1.0);
    }

    #[test]
    fn test_property_setters_raise_invalidation() {
        let mut layout = FlowLayout::new();
        let measures = Rc::new(Cell::new(0));
        let arranges = Rc::new(Cell::new(0));
        let measures_clone = Rc::clone(&measures);
        let arranges_clone = Rc::clone(&arranges);
        layout.subscribe_measure_invalidated(move |_| {
            measures_clone.set(measures_clone.get() + 1)
        });
        layout.subscribe_arrange_invalidated(move |_| {
            arranges_clone.set(arranges_clone.get() + 1)
        });

        layout.set_min_item_spacing(4.0);
        layout.set_min_line_spacing(2.0);
        layout.set_line_alignment(LineAlignment::Center);
        // Setting the same value again is not a change.
        layout.set_min_item_spacing(4.0);

        assert_eq!(measures.get(), 2);
        assert_eq!(arranges.get(), 1);
    }

    #[test]
    fn test_revoked_listener_stops_firing() {
        let mut layout = FlowLayout::new();
        let measures = Rc::new(Cell::new(0));
        let measures_clone = Rc::clone(&measures);
        let token = layout.subscribe_measure_invalidated(move |_| {
            measures_clone.set(measures_clone.get() + 1)
        });
        layout.set_min_item_spacing(1.0);
        assert!(layout.revoke_measure_invalidated(token));
        layout.set_min_item_spacing(2.0);
        assert_eq!(measures.get(), 1);
    }

    #[test]
    fn test_measure_fills_window_and_estimates_extent() {
        // 100 items of 100x50 in a 100-wide window: one item per line.
        let mut context = TestContext::with_uniform_items(100, Size::new(100.0, 50.0));
        context.set_realization_rect(Rect::new(0.0, 0.0, 100.0, 250.0));
        let mut layout = FlowLayout::new();
        layout.initialize_for_context(&mut context);

        let desired = layout.measure(&mut context, Size::new(100.0, 250.0));

        let (first, last) = layout.realized_range().unwrap();
        assert_eq!(first, 0);
        assert!(last >= 4, "window of 5 rows realized only through {last}");
        // Extent is extrapolated over all 100 rows.
        assert!((desired.height - 5000.0).abs() < 1.0, "got {}", desired.height);
        assert_eq!(desired.width, 100.0);
    }

    #[test]
    fn test_uninitialize_recycles_everything() {
        let mut context = TestContext::with_uniform_items(50, Size::new(100.0, 50.0));
        context.set_realization_rect(Rect::new(0.0, 0.0, 100.0, 200.0));
        let mut layout = FlowLayout::new();
        layout.initialize_for_context(&mut context);
        layout.measure(&mut context, Size::new(100.0, 200.0));
        assert!(layout.realized_range().is_some());

        layout.uninitialize_for_context(&mut context);
        assert!(layout.realized_range().is_none());
        assert_eq!(context.live_count(), 0);
        context.assert_recycled_at_most_once();
    }

    #[test]
    fn test_virtualization_disabled_realizes_all() {
        let mut context = TestContext::with_uniform_items(20, Size::new(100.0, 50.0));
        context.set_realization_rect(Rect::new(0.0, 0.0, 100.0, 100.0));
        let mut layout = FlowLayout::new();
        layout.set_virtualization_enabled(false);
        layout.initialize_for_context(&mut context);

        layout.measure(&mut context, Size::new(100.0, 100.0));

        assert_eq!(layout.realized_range(), Some((0, 19)));
    }
}
