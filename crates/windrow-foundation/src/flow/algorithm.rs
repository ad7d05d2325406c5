//! Core measure/arrange driver for the flow engine.
//!
//! One measure pass resolves a stable anchor, generates elements forward and
//! backward from it until the realization window is filled, wraps them into
//! lines, and estimates the total extent. The arrange pass walks the
//! realized range one line at a time, applies line alignment, and hands the
//! final bounds to the host. The algorithm is written once against the
//! virtualizing context shape; non-virtualizing hosts run through the
//! adapter with an infinite realization window.

use web_time::{Duration, Instant};
use windrow_geometry::{Point, Rect, Size};
use windrow_layout::{LineAlignment, ScrollOrientation};

use super::context::{ElementId, ElementRealizationOptions, VirtualizingLayoutContext};
use super::element_manager::ElementManager;

/// Wall-clock budget for a single generation direction.
///
/// Guards against pathological hosts (zero-size items against an infinite
/// realization window). When tripped the pass stops early with a warning;
/// the window is simply under-filled, never corrupt.
const GENERATION_TIME_BUDGET: Duration = Duration::from_millis(50);

/// Hard cap on elements realized by one generation direction, in addition
/// to the time budget, to bound memory in extreme cases.
const MAX_ELEMENTS_PER_PASS: usize = 10_000;

/// Direction of window generation relative to the anchor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GenerateDirection {
    Forward,
    Backward,
}

/// An anchor resolution produced by the layout delegate: the data index to
/// start generation from and its major-axis offset in extent space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FlowLayoutAnchorInfo {
    pub index: Option<usize>,
    pub offset: f32,
}

impl FlowLayoutAnchorInfo {
    pub fn new(index: usize, offset: f32) -> Self {
        Self {
            index: Some(index),
            offset,
        }
    }

    pub const NONE: Self = Self {
        index: None,
        offset: 0.0,
    };
}

/// A realized element at one edge of the range, handed to
/// [`FlowLayoutAlgorithmDelegate::get_extent`] for extrapolation.
#[derive(Clone, Copy, Debug)]
pub struct RealizedEdge {
    pub element: ElementId,
    pub index: usize,
    pub bounds: Rect,
}

/// Layout-specific policy supplied by the owning layout.
pub trait FlowLayoutAlgorithmDelegate {
    /// Size to measure the item at `index` with.
    fn get_measure_size(
        &mut self,
        index: usize,
        available_size: Size,
        context: &mut dyn VirtualizingLayoutContext,
    ) -> Size;

    /// Size to position the item with during generation, given its measured
    /// desired size.
    fn get_provisional_arrange_size(
        &mut self,
        index: usize,
        measure_size: Size,
        desired_size: Size,
        context: &mut dyn VirtualizingLayoutContext,
    ) -> Size;

    /// Line-break policy: `remaining_space` is the minor-axis space left in
    /// the current line if the item at `index` were appended.
    fn should_break_line(&self, index: usize, remaining_space: f32) -> bool;

    /// Anchor derived purely from the realization window's position. Must
    /// work when nothing is realized.
    fn get_anchor_for_realization_rect(
        &mut self,
        available_size: Size,
        context: &mut dyn VirtualizingLayoutContext,
    ) -> FlowLayoutAnchorInfo;

    /// Resolves a target item to the first item of its line.
    fn get_anchor_for_target_element(
        &mut self,
        target_index: usize,
        available_size: Size,
        context: &mut dyn VirtualizingLayoutContext,
    ) -> FlowLayoutAnchorInfo;

    /// Estimates the total logical extent from the realized edges.
    fn get_extent(
        &mut self,
        available_size: Size,
        context: &mut dyn VirtualizingLayoutContext,
        first: Option<RealizedEdge>,
        last: Option<RealizedEdge>,
    ) -> Rect;

    /// Notification after each element measure.
    fn on_element_measured(
        &mut self,
        _element: ElementId,
        _index: usize,
        _available_size: Size,
        _measure_size: Size,
        _desired_size: Size,
        _provisional_arrange_size: Size,
        _context: &mut dyn VirtualizingLayoutContext,
    ) {
    }

    /// Notification for every completed line, including the last.
    fn on_line_arranged(
        &mut self,
        _start_index: usize,
        _count_in_line: usize,
        _line_size: f32,
        _context: &mut dyn VirtualizingLayoutContext,
    ) {
    }
}

/// Per-pass measure parameters supplied by the owning layout.
#[derive(Clone, Copy, Debug)]
pub struct FlowMeasureOptions {
    /// Whether items wrap into multiple lines. Non-wrapping layouts keep a
    /// single line and stretch the minor axis during arrange.
    pub is_wrapping: bool,

    /// Minor-axis spacing between items within a line.
    pub min_item_spacing: f32,

    /// Major-axis spacing between lines.
    pub line_spacing: f32,

    /// Upper bound on items per line.
    pub max_items_per_line: usize,

    /// When set, the whole collection is treated as inside the window.
    pub disable_virtualization: bool,
}

impl Default for FlowMeasureOptions {
    fn default() -> Self {
        Self {
            is_wrapping: true,
            min_item_spacing: 0.0,
            line_spacing: 0.0,
            max_items_per_line: usize::MAX,
            disable_virtualization: false,
        }
    }
}

/// The stateful measure/arrange driver. One instance persists per layout
/// attachment; detaching clears the realized range and resets the anchor
/// caches.
#[derive(Debug)]
pub struct FlowLayoutAlgorithm {
    element_manager: ElementManager,
    orientation: ScrollOrientation,
    last_extent: Rect,
    scroll_orientation_same_as_flow: bool,
    collection_change_pending: bool,
    last_available_size: Size,
    last_item_spacing: f32,
}

impl Default for FlowLayoutAlgorithm {
    fn default() -> Self {
        Self::new()
    }
}

impl FlowLayoutAlgorithm {
    pub fn new() -> Self {
        Self {
            element_manager: ElementManager::new(),
            orientation: ScrollOrientation::Vertical,
            last_extent: Rect::ZERO,
            scroll_orientation_same_as_flow: false,
            collection_change_pending: false,
            last_available_size: Size::ZERO,
            last_item_spacing: 0.0,
        }
    }

    /// Sets the major axis. Owned by the layout; changing it invalidates
    /// nothing by itself - the layout is expected to raise invalidation.
    pub fn set_scroll_orientation(&mut self, orientation: ScrollOrientation) {
        self.orientation = orientation;
    }

    pub fn scroll_orientation(&self) -> ScrollOrientation {
        self.orientation
    }

    /// Extent estimated by the last measure pass, in logical extent space.
    pub fn last_extent(&self) -> Rect {
        self.last_extent
    }

    pub fn element_manager(&self) -> &ElementManager {
        &self.element_manager
    }

    /// Detach: recycle everything and reset the anchor-selection caches.
    pub fn uninitialize_for_context(&mut self, context: &mut dyn VirtualizingLayoutContext) {
        self.element_manager.clear_realized_range(context);
        self.last_extent = Rect::ZERO;
        self.last_available_size = Size::ZERO;
        self.last_item_spacing = 0.0;
        self.collection_change_pending = false;
    }

    /// Forwards a collection change to the window manager and forces anchor
    /// column re-evaluation on the next pass.
    pub fn on_items_changed(
        &mut self,
        context: &mut dyn VirtualizingLayoutContext,
        change: super::ItemsChange,
    ) {
        match change {
            super::ItemsChange::Added { index, count } => {
                self.element_manager.on_items_added(context, index, count)
            }
            super::ItemsChange::Removed { index, count } => {
                self.element_manager.on_items_removed(context, index, count)
            }
            super::ItemsChange::Reset => self.element_manager.on_reset(context),
        }
        self.collection_change_pending = true;
    }

    /// Runs one full measure cycle and returns the desired size (the
    /// estimated extent).
    pub fn measure(
        &mut self,
        context: &mut dyn VirtualizingLayoutContext,
        delegate: &mut dyn FlowLayoutAlgorithmDelegate,
        available_size: Size,
        options: &FlowMeasureOptions,
        layout_id: &str,
    ) -> Size {
        let orientation = self.orientation;
        // An unbounded minor axis means a single line that already fills the
        // axis; no cross-axis alignment applies.
        self.scroll_orientation_same_as_flow =
            orientation.minor_size(available_size).is_infinite();

        if Self::is_virtualizing_context(context) && !options.disable_virtualization {
            // Release elements that left the window before generation so
            // they are available for reuse during this pass.
            let window = context.realization_rect();
            self.element_manager
                .discard_elements_outside_window_rect(context, window, orientation);
        }

        // A suggested anchor that is not realized must be realized before
        // resolution, from its line start onward.
        if let Some(suggested) = context.recommended_anchor_index() {
            if self.element_manager.is_index_valid_in_data(context, suggested)
                && !self.element_manager.is_data_index_realized(suggested)
            {
                self.make_anchor(context, delegate, suggested, available_size);
            }
        }

        let anchor_index =
            self.get_anchor_index(context, delegate, available_size, options, layout_id);

        self.generate(
            context,
            delegate,
            GenerateDirection::Forward,
            anchor_index,
            available_size,
            options,
            layout_id,
        );
        self.generate(
            context,
            delegate,
            GenerateDirection::Backward,
            anchor_index,
            available_size,
            options,
            layout_id,
        );

        if options.is_wrapping && self.is_reflow_required() {
            // The first item is realized but not at the minor origin; snap
            // it there and rebuild forward so stale wrap positions heal.
            log::debug!("{layout_id}: reflow required, regenerating forward from item 0");
            let mut first_bounds = self.element_manager.get_layout_bounds_for_data_index(0);
            orientation.set_minor_start(&mut first_bounds, 0.0);
            self.element_manager
                .set_layout_bounds_for_data_index(0, first_bounds);
            self.generate(
                context,
                delegate,
                GenerateDirection::Forward,
                Some(0),
                available_size,
                options,
                layout_id,
            );
        }

        self.raise_line_arranged(context, delegate, options);
        self.collection_change_pending = false;
        self.last_available_size = available_size;
        self.last_item_spacing = options.min_item_spacing;
        self.last_extent = self.estimate_extent(context, delegate, available_size, layout_id);
        self.set_layout_origin_on_context(context, options);

        Size::new(self.last_extent.width, self.last_extent.height)
    }

    /// Arranges the realized range produced by the last measure. Reads the
    /// bounds table without mutating it, so repeated arranges with the same
    /// measure results are idempotent.
    pub fn arrange(
        &mut self,
        context: &mut dyn VirtualizingLayoutContext,
        final_size: Size,
        is_wrapping: bool,
        line_alignment: LineAlignment,
        layout_id: &str,
    ) -> Size {
        log::trace!(
            "{layout_id}: arrange {} element(s)",
            self.element_manager.realized_element_count()
        );
        self.arrange_virtualizing_layout(context, final_size, is_wrapping, line_alignment);
        Size::new(
            final_size.width.max(self.last_extent.width),
            final_size.height.max(self.last_extent.height),
        )
    }

    fn is_virtualizing_context(context: &dyn VirtualizingLayoutContext) -> bool {
        !context.realization_rect().has_infinite_size()
    }

    /// The window generation fills against: the host's realization rect for
    /// virtualizing hosts, unbounded otherwise.
    fn realization_window(
        context: &dyn VirtualizingLayoutContext,
        options: &FlowMeasureOptions,
    ) -> Rect {
        if Self::is_virtualizing_context(context) && !options.disable_virtualization {
            context.realization_rect()
        } else {
            Rect::INFINITE
        }
    }

    /// Measures one element through the delegate's sizing policy and
    /// returns its provisional arrange size.
    fn measure_element(
        context: &mut dyn VirtualizingLayoutContext,
        delegate: &mut dyn FlowLayoutAlgorithmDelegate,
        element: ElementId,
        index: usize,
        available_size: Size,
    ) -> Size {
        let measure_size = delegate.get_measure_size(index, available_size, context);
        let desired_size = context.measure_element(element, measure_size);
        let provisional =
            delegate.get_provisional_arrange_size(index, measure_size, desired_size, context);
        delegate.on_element_measured(
            element,
            index,
            available_size,
            measure_size,
            desired_size,
            provisional,
            context,
        );
        provisional
    }

    /// Force-realizes a suggested anchor by walking from its line start to
    /// the target in forward order, measuring each item.
    fn make_anchor(
        &mut self,
        context: &mut dyn VirtualizingLayoutContext,
        delegate: &mut dyn FlowLayoutAlgorithmDelegate,
        target_index: usize,
        available_size: Size,
    ) {
        self.element_manager.clear_realized_range(context);
        let anchor_info =
            delegate.get_anchor_for_target_element(target_index, available_size, context);
        let line_start = anchor_info.index.unwrap_or(target_index);
        debug_assert!(line_start <= target_index, "line start past its target");
        let line_start = line_start.min(target_index);
        for data_index in line_start..=target_index {
            // No bounds yet: the anchor can sit at the origin for now since
            // the extent is free to grow in any direction.
            let element =
                context.get_or_create_element_at(data_index, ElementRealizationOptions::FORCED);
            self.element_manager.add(element, data_index);
            Self::measure_element(context, delegate, element, data_index, available_size);
        }
    }

    /// Resolves the anchor for this pass (priority order per the measure
    /// cycle), materializes it if needed, and stamps its bounds at the
    /// resolved position. Returns `None` only when no valid anchor exists
    /// (empty collection), in which case the range has been cleared.
    fn get_anchor_index(
        &mut self,
        context: &mut dyn VirtualizingLayoutContext,
        delegate: &mut dyn FlowLayoutAlgorithmDelegate,
        available_size: Size,
        options: &FlowMeasureOptions,
        layout_id: &str,
    ) -> Option<usize> {
        let orientation = self.orientation;
        let item_count = context.item_count();
        let mut anchor_index: Option<usize> = None;
        let mut anchor_position = Point::ZERO;

        if !Self::is_virtualizing_context(context) || options.disable_virtualization {
            anchor_index = if item_count > 0 { Some(0) } else { None };
        } else {
            let realization_rect = context.realization_rect();
            let realized_suggestion = context.recommended_anchor_index().filter(|&index| {
                index < item_count && self.element_manager.is_data_index_realized(index)
            });

            if let Some(suggested_index) = realized_suggestion {
                // The suggestion may land mid-line; resolve to the line
                // start the pass can generate from.
                let anchor_info =
                    delegate.get_anchor_for_target_element(suggested_index, available_size, context);
                if let Some(line_start) = anchor_info.index.filter(|&index| index < item_count) {
                    anchor_index = Some(line_start);
                    if self.element_manager.is_data_index_realized(line_start) {
                        let bounds =
                            self.element_manager.get_layout_bounds_for_data_index(line_start);
                        // A line start sits at the minor origin even if a
                        // width change invalidated the stored minor position.
                        anchor_position = orientation
                            .minor_major_point(0.0, orientation.major_start(bounds));
                    } else {
                        // Realize the gap down to the line start so the
                        // range stays contiguous.
                        if let Some(first_realized) =
                            self.element_manager.first_realized_data_index()
                        {
                            let mut index = first_realized;
                            while index > line_start {
                                index -= 1;
                                self.element_manager.ensure_element_realized(
                                    context, false, index, layout_id,
                                );
                                let element = self.element_manager.get_realized_element(index);
                                Self::measure_element(
                                    context,
                                    delegate,
                                    element,
                                    index,
                                    available_size,
                                );
                            }
                        }
                        anchor_position =
                            orientation.minor_major_point(0.0, anchor_info.offset);
                    }
                }
            } else if self.needs_anchor_column_reevaluation(available_size, options)
                || !self.element_manager.is_window_connected(
                    realization_rect,
                    orientation,
                    self.scroll_orientation_same_as_flow,
                )
            {
                // Disconnected window or stale column layout: derive the
                // anchor purely from the realization window's position.
                let anchor_info =
                    delegate.get_anchor_for_realization_rect(available_size, context);
                anchor_index = anchor_info.index.filter(|&index| index < item_count);
                anchor_position = orientation.minor_major_point(0.0, anchor_info.offset);
                log::debug!(
                    "{layout_id}: re-anchoring from realization window at {:?}",
                    anchor_index
                );
            } else if self.element_manager.realized_element_count() > 0 {
                // Steady-state scrolling: reuse the first realized element.
                let first = self.element_manager.data_index_from_realized_range_index(0);
                let bounds = self.element_manager.get_layout_bounds_for_realized_index(0);
                anchor_index = Some(first);
                anchor_position = bounds.origin();
            }
        }

        match anchor_index {
            Some(index) => {
                if !self.element_manager.is_data_index_realized(index) {
                    // Fresh anchor: nothing realized is connected to it.
                    self.element_manager.clear_realized_range(context);
                    let element = context
                        .get_or_create_element_at(index, ElementRealizationOptions::FORCED);
                    self.element_manager.add(element, index);
                }
                // Freeze the anchor's bounds before either generation
                // direction runs.
                let element = self.element_manager.get_realized_element(index);
                let provisional =
                    Self::measure_element(context, delegate, element, index, available_size);
                self.element_manager.set_layout_bounds_for_data_index(
                    index,
                    Rect::from_origin_size(anchor_position, provisional),
                );
            }
            None => {
                self.element_manager.clear_realized_range(context);
            }
        }
        anchor_index
    }

    fn needs_anchor_column_reevaluation(
        &self,
        available_size: Size,
        options: &FlowMeasureOptions,
    ) -> bool {
        options.is_wrapping
            && (self.orientation.minor_size(available_size)
                != self.orientation.minor_size(self.last_available_size)
                || options.min_item_spacing != self.last_item_spacing
                || self.collection_change_pending)
    }

    /// Walks data indices away from the anchor, realizing and positioning
    /// elements until the window is filled or the data runs out, then trims
    /// the stale tail on the generated side.
    fn generate(
        &mut self,
        context: &mut dyn VirtualizingLayoutContext,
        delegate: &mut dyn FlowLayoutAlgorithmDelegate,
        direction: GenerateDirection,
        anchor_index: Option<usize>,
        available_size: Size,
        options: &FlowMeasureOptions,
        layout_id: &str,
    ) {
        let Some(anchor_index) = anchor_index else {
            return;
        };
        let orientation = self.orientation;
        let anchor_bounds = self
            .element_manager
            .get_layout_bounds_for_data_index(anchor_index);
        let mut line_offset = orientation.major_start(anchor_bounds);
        let mut line_major_size = orientation.rect_major_size(anchor_bounds);
        // Major size of the element that opened the current line; keeps the
        // line's far edge fixed when a backward line is re-stamped.
        let mut line_anchor_major = line_major_size;
        let mut count_in_line: usize = 1;
        let mut line_needs_reposition = false;

        let item_count = context.item_count();
        let start_time = Instant::now();
        let mut generated: usize = 0;
        let mut previous_index = anchor_index;

        loop {
            let current_index = match direction {
                GenerateDirection::Forward => previous_index + 1,
                GenerateDirection::Backward => {
                    if previous_index == 0 {
                        break;
                    }
                    previous_index - 1
                }
            };
            if current_index >= item_count {
                break;
            }
            if !self.should_continue_filling_up_space(context, options, previous_index, direction) {
                break;
            }
            if generated >= MAX_ELEMENTS_PER_PASS {
                log::warn!(
                    "{layout_id}: generation hit the {MAX_ELEMENTS_PER_PASS}-element safety cap; \
                     the window may be under-filled"
                );
                break;
            }
            if start_time.elapsed() > GENERATION_TIME_BUDGET {
                log::warn!(
                    "{layout_id}: generation exceeded its {GENERATION_TIME_BUDGET:?} budget at \
                     index {current_index}; stopping early"
                );
                break;
            }

            self.element_manager.ensure_element_realized(
                context,
                direction == GenerateDirection::Forward,
                current_index,
                layout_id,
            );
            let element = self.element_manager.get_realized_element(current_index);
            let desired_size =
                Self::measure_element(context, delegate, element, current_index, available_size);
            let desired_major = orientation.major_size(desired_size);
            let desired_minor = orientation.minor_size(desired_size);

            let previous_bounds = self
                .element_manager
                .get_layout_bounds_for_data_index(previous_index);
            let mut current_bounds = Rect::from_size(desired_size);

            match direction {
                GenerateDirection::Forward => {
                    let remaining_space = orientation.minor_size(available_size)
                        - (orientation.minor_end(previous_bounds)
                            + options.min_item_spacing
                            + desired_minor);
                    if count_in_line >= options.max_items_per_line
                        || delegate.should_break_line(current_index, remaining_space)
                    {
                        // Wrap to the next line.
                        orientation.set_minor_start(&mut current_bounds, 0.0);
                        orientation.set_major_start(
                            &mut current_bounds,
                            line_offset + line_major_size + options.line_spacing,
                        );
                        if line_needs_reposition {
                            // The finished line's members get the final
                            // (max) line size now that it is known.
                            for member_offset in 0..count_in_line {
                                let member = current_index - 1 - member_offset;
                                let mut bounds = self
                                    .element_manager
                                    .get_layout_bounds_for_data_index(member);
                                orientation.set_major_size(&mut bounds, line_major_size);
                                self.element_manager
                                    .set_layout_bounds_for_data_index(member, bounds);
                            }
                        }
                        line_offset = orientation.major_start(current_bounds);
                        line_major_size = desired_major;
                        line_anchor_major = desired_major;
                        count_in_line = 1;
                        line_needs_reposition = false;
                    } else {
                        orientation.set_minor_start(
                            &mut current_bounds,
                            orientation.minor_end(previous_bounds) + options.min_item_spacing,
                        );
                        orientation.set_major_start(&mut current_bounds, line_offset);
                        line_needs_reposition |= desired_major != line_major_size;
                        line_major_size = line_major_size.max(desired_major);
                        count_in_line += 1;
                    }
                }
                GenerateDirection::Backward => {
                    let remaining_space = orientation.minor_start(previous_bounds)
                        - (desired_minor + options.min_item_spacing);
                    if count_in_line >= options.max_items_per_line
                        || delegate.should_break_line(current_index, remaining_space)
                    {
                        // Wrap to the previous line: the new element ends a
                        // line whose trailing edge is the available minor
                        // extent.
                        let available_minor = orientation.minor_size(available_size);
                        let minor_start = if available_minor.is_finite() {
                            (available_minor - desired_minor).max(0.0)
                        } else {
                            0.0
                        };
                        orientation.set_minor_start(&mut current_bounds, minor_start);
                        if line_needs_reposition {
                            // Keep the finished line's far edge fixed where
                            // it first abutted the following line; grow the
                            // line upward to its final size.
                            let corrected_start =
                                line_offset + line_anchor_major - line_major_size;
                            for member_offset in 0..count_in_line {
                                let member = current_index + 1 + member_offset;
                                let mut bounds = self
                                    .element_manager
                                    .get_layout_bounds_for_data_index(member);
                                orientation.set_major_start(&mut bounds, corrected_start);
                                orientation.set_major_size(&mut bounds, line_major_size);
                                self.element_manager
                                    .set_layout_bounds_for_data_index(member, bounds);
                            }
                            line_offset = corrected_start;
                        }
                        orientation.set_major_start(
                            &mut current_bounds,
                            line_offset - desired_major - options.line_spacing,
                        );
                        line_offset = orientation.major_start(current_bounds);
                        line_major_size = desired_major;
                        line_anchor_major = desired_major;
                        count_in_line = 1;
                        line_needs_reposition = false;
                    } else {
                        orientation.set_minor_start(
                            &mut current_bounds,
                            orientation.minor_start(previous_bounds)
                                - desired_minor
                                - options.min_item_spacing,
                        );
                        orientation.set_major_start(&mut current_bounds, line_offset);
                        line_needs_reposition |= desired_major != line_major_size;
                        line_major_size = line_major_size.max(desired_major);
                        count_in_line += 1;
                    }
                }
            }

            self.element_manager
                .set_layout_bounds_for_data_index(current_index, current_bounds);
            generated += 1;
            previous_index = current_index;
        }

        // One extra element may have been realized before the window edge
        // was detected; it stays. Everything beyond it is stale from an
        // earlier pass and goes back to the host.
        match direction {
            GenerateDirection::Forward => {
                self.element_manager.discard_elements_outside_window(
                    context,
                    true,
                    previous_index + 1,
                );
            }
            GenerateDirection::Backward => {
                if previous_index > 0 {
                    self.element_manager.discard_elements_outside_window(
                        context,
                        false,
                        previous_index - 1,
                    );
                }
            }
        }
    }

    /// Direction-aware fill predicate: compares the last generated element's
    /// bounds against the realization window on both axes.
    fn should_continue_filling_up_space(
        &self,
        context: &dyn VirtualizingLayoutContext,
        options: &FlowMeasureOptions,
        index: usize,
        direction: GenerateDirection,
    ) -> bool {
        let window = Self::realization_window(context, options);
        if window.has_infinite_size() {
            return true;
        }
        let orientation = self.orientation;
        let bounds = self.element_manager.get_layout_bounds_for_data_index(index);
        match direction {
            GenerateDirection::Forward => {
                orientation.major_start(bounds) < orientation.major_end(window)
                    && orientation.minor_start(bounds) < orientation.minor_end(window)
            }
            GenerateDirection::Backward => {
                orientation.major_end(bounds) > orientation.major_start(window)
                    && orientation.minor_end(bounds) > orientation.minor_start(window)
            }
        }
    }

    /// True when item 0 is realized away from the minor origin: a stale
    /// wrap layout that needs one forward regeneration to heal.
    fn is_reflow_required(&self) -> bool {
        self.element_manager.realized_element_count() > 0
            && self.element_manager.first_realized_data_index() == Some(0)
            && self
                .orientation
                .minor_start(self.element_manager.get_layout_bounds_for_realized_index(0))
                != 0.0
    }

    /// Walks the realized range grouping by shared major start and raises
    /// the per-line completion callback, including for the last line.
    fn raise_line_arranged(
        &mut self,
        context: &mut dyn VirtualizingLayoutContext,
        delegate: &mut dyn FlowLayoutAlgorithmDelegate,
        options: &FlowMeasureOptions,
    ) {
        let window = Self::realization_window(context, options);
        if window.is_empty() {
            return;
        }
        let count = self.element_manager.realized_element_count();
        if count == 0 {
            return;
        }
        let orientation = self.orientation;
        let start_index = self.element_manager.data_index_from_realized_range_index(0);
        let mut count_in_line: usize = 0;
        let mut line_offset = orientation
            .major_start(self.element_manager.get_layout_bounds_for_realized_index(0));
        let mut line_size: f32 = 0.0;
        for realized_index in 0..count {
            let bounds = self
                .element_manager
                .get_layout_bounds_for_realized_index(realized_index);
            if orientation.major_start(bounds) != line_offset {
                delegate.on_line_arranged(
                    start_index + realized_index - count_in_line,
                    count_in_line,
                    line_size,
                    context,
                );
                count_in_line = 0;
                line_offset = orientation.major_start(bounds);
                line_size = 0.0;
            }
            line_size = line_size.max(orientation.rect_major_size(bounds));
            count_in_line += 1;
        }
        delegate.on_line_arranged(start_index + count - count_in_line, count_in_line, line_size, context);
    }

    fn estimate_extent(
        &mut self,
        context: &mut dyn VirtualizingLayoutContext,
        delegate: &mut dyn FlowLayoutAlgorithmDelegate,
        available_size: Size,
        layout_id: &str,
    ) -> Rect {
        let (first, last) = if self.element_manager.realized_element_count() > 0 {
            let first_index = self.element_manager.data_index_from_realized_range_index(0);
            let last_index = self
                .element_manager
                .last_realized_data_index()
                .unwrap_or(first_index);
            (
                Some(RealizedEdge {
                    element: self.element_manager.get_realized_element(first_index),
                    index: first_index,
                    bounds: self
                        .element_manager
                        .get_layout_bounds_for_data_index(first_index),
                }),
                Some(RealizedEdge {
                    element: self.element_manager.get_realized_element(last_index),
                    index: last_index,
                    bounds: self
                        .element_manager
                        .get_layout_bounds_for_data_index(last_index),
                }),
            )
        } else {
            (None, None)
        };
        let extent = delegate.get_extent(available_size, context, first, last);
        log::trace!("{layout_id}: extent estimated {extent:?}");
        extent
    }

    fn set_layout_origin_on_context(
        &self,
        context: &mut dyn VirtualizingLayoutContext,
        options: &FlowMeasureOptions,
    ) {
        if Self::is_virtualizing_context(context) && !options.disable_virtualization {
            context.set_layout_origin(Point::new(self.last_extent.x, self.last_extent.y));
        } else {
            debug_assert!(
                self.last_extent.x == 0.0 && self.last_extent.y == 0.0,
                "non-virtualizing extent must originate at zero"
            );
        }
    }

    fn arrange_virtualizing_layout(
        &mut self,
        context: &mut dyn VirtualizingLayoutContext,
        final_size: Size,
        is_wrapping: bool,
        line_alignment: LineAlignment,
    ) {
        let count = self.element_manager.realized_element_count();
        if count == 0 {
            return;
        }
        let orientation = self.orientation;
        let minor_final = orientation.minor_size(final_size);
        let mut count_in_line: usize = 1;
        let mut previous_bounds = self.element_manager.get_layout_bounds_for_realized_index(0);
        let mut line_offset = orientation.major_start(previous_bounds);
        let mut space_at_line_start = orientation.minor_start(previous_bounds);
        for realized_index in 1..count {
            let current_bounds = self
                .element_manager
                .get_layout_bounds_for_realized_index(realized_index);
            if orientation.major_start(current_bounds) != line_offset {
                let space_at_line_end = minor_final - orientation.minor_end(previous_bounds);
                self.perform_line_alignment(
                    context,
                    realized_index - count_in_line,
                    count_in_line,
                    space_at_line_start,
                    space_at_line_end,
                    line_alignment,
                    is_wrapping,
                    final_size,
                );
                space_at_line_start = orientation.minor_start(current_bounds);
                count_in_line = 0;
                line_offset = orientation.major_start(current_bounds);
            }
            count_in_line += 1;
            previous_bounds = current_bounds;
        }
        let space_at_line_end = minor_final - orientation.minor_end(previous_bounds);
        self.perform_line_alignment(
            context,
            count - count_in_line,
            count_in_line,
            space_at_line_start,
            space_at_line_end,
            line_alignment,
            is_wrapping,
            final_size,
        );
    }

    #[allow(clippy::too_many_arguments)]
    fn perform_line_alignment(
        &mut self,
        context: &mut dyn VirtualizingLayoutContext,
        line_start_realized_index: usize,
        count_in_line: usize,
        space_at_line_start: f32,
        space_at_line_end: f32,
        line_alignment: LineAlignment,
        is_wrapping: bool,
        final_size: Size,
    ) {
        let orientation = self.orientation;
        for offset_in_line in 0..count_in_line {
            let realized_index = line_start_realized_index + offset_in_line;
            // Work on a copy; the persisted bounds stay untouched so the
            // next arrange starts from the same measure results.
            let mut bounds = self
                .element_manager
                .get_layout_bounds_for_realized_index(realized_index);

            if !self.scroll_orientation_same_as_flow {
                let shift = line_alignment.minor_shift(
                    space_at_line_start,
                    space_at_line_end,
                    count_in_line,
                    offset_in_line,
                );
                let new_minor_start = orientation.minor_start(bounds) + shift;
                orientation.set_minor_start(&mut bounds, new_minor_start);
            }

            // From logical extent space to arrange space starting at zero.
            bounds = bounds.translate(-self.last_extent.x, -self.last_extent.y);

            if !is_wrapping {
                let stretched = orientation
                    .rect_minor_size(bounds)
                    .max(orientation.minor_size(final_size));
                orientation.set_minor_size(&mut bounds, stretched);
            }

            let element = self.element_manager.get_at(realized_index);
            context.arrange_element(element, bounds);
        }
    }
}
