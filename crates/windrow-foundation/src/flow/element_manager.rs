//! Element window management for the flow engine.
//!
//! [`ElementManager`] is the single source of truth for which data indices
//! are currently realized and where each realized element last landed
//! on-axis. It performs window sliding: elements whose index falls outside
//! the post-pass window are recycled back to the host, one by one, while the
//! realized range stays contiguous in data-index order.

use windrow_geometry::Rect;
use windrow_layout::ScrollOrientation;

use super::context::{ElementId, ElementRealizationOptions, VirtualizingLayoutContext};

/// Owns the realized contiguous range of data indices.
///
/// Realized index `i` maps to data index `first_realized_data_index + i`;
/// the mapping is O(1) in both directions and realized indices are strictly
/// increasing in data-index order by construction.
#[derive(Debug, Default)]
pub struct ElementManager {
    realized_elements: Vec<ElementId>,
    realized_bounds: Vec<Rect>,
    first_realized_data_index: Option<usize>,
}

impl ElementManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of currently realized elements.
    pub fn realized_element_count(&self) -> usize {
        self.realized_elements.len()
    }

    /// Data index of the first realized element, if any.
    pub fn first_realized_data_index(&self) -> Option<usize> {
        self.first_realized_data_index
    }

    /// Data index of the last realized element, if any.
    pub fn last_realized_data_index(&self) -> Option<usize> {
        self.first_realized_data_index
            .map(|first| first + self.realized_elements.len() - 1)
    }

    pub fn is_data_index_realized(&self, data_index: usize) -> bool {
        match self.first_realized_data_index {
            Some(first) => {
                data_index >= first && data_index < first + self.realized_elements.len()
            }
            None => false,
        }
    }

    /// Returns true if `data_index` names an existing item.
    pub fn is_index_valid_in_data(
        &self,
        context: &dyn VirtualizingLayoutContext,
        data_index: usize,
    ) -> bool {
        data_index < context.item_count()
    }

    pub fn data_index_from_realized_range_index(&self, realized_index: usize) -> usize {
        self.check_realized_index(realized_index);
        self.first_realized_data_index.unwrap_or(0) + realized_index
    }

    fn realized_index_from_data_index(&self, data_index: usize) -> usize {
        debug_assert!(self.is_data_index_realized(data_index));
        data_index - self.first_realized_data_index.unwrap_or(0)
    }

    /// The realized element at realized-range position `realized_index`.
    pub fn get_at(&self, realized_index: usize) -> ElementId {
        self.check_realized_index(realized_index);
        self.realized_elements[realized_index]
    }

    pub fn get_realized_element(&self, data_index: usize) -> ElementId {
        self.realized_elements[self.realized_index_from_data_index(data_index)]
    }

    pub fn get_layout_bounds_for_data_index(&self, data_index: usize) -> Rect {
        self.realized_bounds[self.realized_index_from_data_index(data_index)]
    }

    pub fn set_layout_bounds_for_data_index(&mut self, data_index: usize, bounds: Rect) {
        let realized_index = self.realized_index_from_data_index(data_index);
        self.realized_bounds[realized_index] = bounds;
    }

    pub fn get_layout_bounds_for_realized_index(&self, realized_index: usize) -> Rect {
        self.check_realized_index(realized_index);
        self.realized_bounds[realized_index]
    }

    /// Inserts a newly realized element. The data index must extend the
    /// range at one of its edges (or start a new range); the realized range
    /// is contiguous by construction and a non-adjacent insert is a
    /// programmer error.
    pub fn add(&mut self, element: ElementId, data_index: usize) {
        match self.first_realized_data_index {
            None => {
                self.first_realized_data_index = Some(data_index);
                self.realized_elements.push(element);
                self.realized_bounds.push(Rect::ZERO);
            }
            Some(first) => {
                debug_assert!(!self.is_data_index_realized(data_index));
                if data_index == first + self.realized_elements.len() {
                    self.realized_elements.push(element);
                    self.realized_bounds.push(Rect::ZERO);
                } else if first > 0 && data_index == first - 1 {
                    self.realized_elements.insert(0, element);
                    self.realized_bounds.insert(0, Rect::ZERO);
                    self.first_realized_data_index = Some(data_index);
                } else {
                    panic!(
                        "add: data index {data_index} is not adjacent to realized range \
                         [{first}, {}]",
                        first + self.realized_elements.len() - 1
                    );
                }
            }
        }
    }

    /// Realizes `data_index` at the window edge indicated by `forward` if it
    /// is not already realized. Used exclusively during window generation;
    /// anchor resolution realizes through its own path.
    pub fn ensure_element_realized(
        &mut self,
        context: &mut dyn VirtualizingLayoutContext,
        forward: bool,
        data_index: usize,
        layout_id: &str,
    ) {
        if !self.is_data_index_realized(data_index) {
            let element =
                context.get_or_create_element_at(data_index, ElementRealizationOptions::FORCED);
            self.add(element, data_index);
            log::trace!("{layout_id}: realized index {data_index} (forward: {forward})");
        }
    }

    /// Recycles every live element and empties the range.
    pub fn clear_realized_range(&mut self, context: &mut dyn VirtualizingLayoutContext) {
        let count = self.realized_elements.len();
        self.clear_realized_range_at(context, 0, count);
    }

    /// Recycles `count` elements starting at realized index `realized_index`.
    fn clear_realized_range_at(
        &mut self,
        context: &mut dyn VirtualizingLayoutContext,
        realized_index: usize,
        count: usize,
    ) {
        assert!(
            realized_index + count <= self.realized_elements.len(),
            "clear_realized_range_at: range [{realized_index}, {}) exceeds realized count {}",
            realized_index + count,
            self.realized_elements.len()
        );
        for element in self
            .realized_elements
            .drain(realized_index..realized_index + count)
        {
            context.recycle_element(element);
        }
        self.realized_bounds
            .drain(realized_index..realized_index + count);

        if self.realized_elements.is_empty() {
            self.first_realized_data_index = None;
        } else if realized_index == 0 {
            // Trimmed the low edge; the range now starts `count` later.
            self.first_realized_data_index =
                self.first_realized_data_index.map(|first| first + count);
        }
    }

    /// Trims the realized range on one side after a generation pass.
    ///
    /// With `forward == true`, every realized data index `>= boundary` is
    /// recycled; with `forward == false`, every realized data index
    /// `<= boundary` is recycled. Data indices for which no element is
    /// realized are ignored.
    pub fn discard_elements_outside_window(
        &mut self,
        context: &mut dyn VirtualizingLayoutContext,
        forward: bool,
        boundary_data_index: usize,
    ) {
        if !self.is_data_index_realized(boundary_data_index) {
            return;
        }
        let range_index = self.realized_index_from_data_index(boundary_data_index);
        let (start, count) = if forward {
            (range_index, self.realized_elements.len() - range_index)
        } else {
            (0, range_index + 1)
        };
        if count > 0 {
            log::trace!(
                "window slide: discarding {count} element(s) {} data index {boundary_data_index}",
                if forward { "from" } else { "through" }
            );
            self.clear_realized_range_at(context, start, count);
        }
    }

    /// Recycles realized elements whose bounds no longer intersect `window`
    /// on the major axis, trimming only from the range edges so the realized
    /// range stays contiguous. Run at the start of every virtualizing
    /// measure pass so fast pans release elements for reuse early.
    pub fn discard_elements_outside_window_rect(
        &mut self,
        context: &mut dyn VirtualizingLayoutContext,
        window: Rect,
        orientation: ScrollOrientation,
    ) {
        if self.realized_elements.is_empty() {
            return;
        }
        let window_start = orientation.major_start(window);
        let window_end = orientation.major_end(window);
        let intersects = |bounds: &Rect| {
            orientation.major_end(*bounds) >= window_start
                && orientation.major_start(*bounds) <= window_end
        };

        let first_in_window = self.realized_bounds.iter().position(intersects);
        match first_in_window {
            None => self.clear_realized_range(context),
            Some(first_keep) => {
                let last_keep = self
                    .realized_bounds
                    .iter()
                    .rposition(intersects)
                    .unwrap_or(first_keep);
                let trailing = self.realized_elements.len() - last_keep - 1;
                if trailing > 0 {
                    self.clear_realized_range_at(context, last_keep + 1, trailing);
                }
                if first_keep > 0 {
                    self.clear_realized_range_at(context, 0, first_keep);
                }
            }
        }
    }

    /// Reports whether the realized range still overlaps `window` on the
    /// effective scroll axis. When false the window has jumped: the caller
    /// must discard the range and re-anchor from the realization rect alone.
    pub fn is_window_connected(
        &self,
        window: Rect,
        orientation: ScrollOrientation,
        scroll_orientation_same_as_flow: bool,
    ) -> bool {
        if self.realized_bounds.is_empty() {
            return false;
        }
        // When scrolling along the flow axis there is a single line; the
        // connectedness test moves to the minor axis.
        let effective = if scroll_orientation_same_as_flow {
            orientation.flipped()
        } else {
            orientation
        };
        let first = self.realized_bounds[0];
        let last = self.realized_bounds[self.realized_bounds.len() - 1];
        effective.major_start(first) <= effective.major_end(window)
            && effective.major_end(last) >= effective.major_start(window)
    }

    /// Adjusts the window for an insertion of `count` items at `index`.
    ///
    /// Insertions before the window shift it; insertions inside it truncate
    /// (and recycle) the suffix from the insertion point, which keeps the
    /// contiguity invariant and lets the next measure pass re-realize.
    pub fn on_items_added(
        &mut self,
        context: &mut dyn VirtualizingLayoutContext,
        index: usize,
        count: usize,
    ) {
        let Some(first) = self.first_realized_data_index else {
            return;
        };
        let last = first + self.realized_elements.len() - 1;
        if index <= first {
            self.first_realized_data_index = Some(first + count);
        } else if index <= last {
            let truncate_from = index - first;
            let truncate_count = self.realized_elements.len() - truncate_from;
            self.clear_realized_range_at(context, truncate_from, truncate_count);
        }
    }

    /// Adjusts the window for a removal of `count` items starting at
    /// `index`. Realized elements inside the removed span are recycled along
    /// with everything after them; removals before the window shift it.
    pub fn on_items_removed(
        &mut self,
        context: &mut dyn VirtualizingLayoutContext,
        index: usize,
        count: usize,
    ) {
        let Some(first) = self.first_realized_data_index else {
            return;
        };
        let last = first + self.realized_elements.len() - 1;
        if index + count <= first {
            self.first_realized_data_index = Some(first - count);
        } else if index <= last {
            let truncate_from = index.saturating_sub(first);
            let truncate_count = self.realized_elements.len() - truncate_from;
            self.clear_realized_range_at(context, truncate_from, truncate_count);
        }
    }

    /// The source was reset wholesale; nothing realized is meaningful.
    pub fn on_reset(&mut self, context: &mut dyn VirtualizingLayoutContext) {
        self.clear_realized_range(context);
    }

    fn check_realized_index(&self, realized_index: usize) {
        assert!(
            realized_index < self.realized_elements.len(),
            "realized index {realized_index} out of range (count {})",
            self.realized_elements.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::TestContext;
    use super::*;
    use windrow_geometry::Size;

    fn realize_range(
        manager: &mut ElementManager,
        context: &mut TestContext,
        range: std::ops::Range<usize>,
    ) {
        for data_index in range {
            manager.ensure_element_realized(context, true, data_index, "test");
            manager.set_layout_bounds_for_data_index(
                data_index,
                Rect::new(0.0, data_index as f32 * 50.0, 100.0, 50.0),
            );
        }
    }

    #[test]
    fn test_add_and_lookup() {
        let mut context = TestContext::with_uniform_items(10, Size::new(100.0, 50.0));
        let mut manager = ElementManager::new();
        realize_range(&mut manager, &mut context, 3..6);

        assert_eq!(manager.realized_element_count(), 3);
        assert_eq!(manager.first_realized_data_index(), Some(3));
        assert_eq!(manager.last_realized_data_index(), Some(5));
        assert!(manager.is_data_index_realized(4));
        assert!(!manager.is_data_index_realized(6));
        assert_eq!(manager.data_index_from_realized_range_index(1), 4);
        assert_eq!(
            manager.get_layout_bounds_for_data_index(4),
            Rect::new(0.0, 200.0, 100.0, 50.0)
        );
    }

    #[test]
    fn test_prepend_at_low_edge() {
        let mut context = TestContext::with_uniform_items(10, Size::new(100.0, 50.0));
        let mut manager = ElementManager::new();
        realize_range(&mut manager, &mut context, 5..7);
        manager.ensure_element_realized(&mut context, false, 4, "test");

        assert_eq!(manager.first_realized_data_index(), Some(4));
        assert_eq!(manager.realized_element_count(), 3);
        // Ordering invariant: realized index i < j implies data index i < j.
        for i in 1..manager.realized_element_count() {
            assert!(
                manager.data_index_from_realized_range_index(i - 1)
                    < manager.data_index_from_realized_range_index(i)
            );
        }
    }

    #[test]
    #[should_panic(expected = "not adjacent")]
    fn test_non_adjacent_add_panics() {
        let mut manager = ElementManager::new();
        manager.add(ElementId::new(1), 3);
        manager.add(ElementId::new(2), 7);
    }

    #[test]
    fn test_clear_recycles_every_element_once() {
        let mut context = TestContext::with_uniform_items(10, Size::new(100.0, 50.0));
        let mut manager = ElementManager::new();
        realize_range(&mut manager, &mut context, 0..5);

        manager.clear_realized_range(&mut context);
        assert_eq!(manager.realized_element_count(), 0);
        assert_eq!(manager.first_realized_data_index(), None);
        assert_eq!(context.recycled().len(), 5);
        context.assert_recycled_at_most_once();
    }

    #[test]
    fn test_discard_forward_trims_high_side() {
        let mut context = TestContext::with_uniform_items(20, Size::new(100.0, 50.0));
        let mut manager = ElementManager::new();
        realize_range(&mut manager, &mut context, 2..10);

        manager.discard_elements_outside_window(&mut context, true, 6);

        // No realized data index >= 6 remains.
        assert_eq!(manager.last_realized_data_index(), Some(5));
        assert_eq!(manager.first_realized_data_index(), Some(2));
        assert_eq!(context.recycled().len(), 4);
        context.assert_recycled_at_most_once();
    }

    #[test]
    fn test_discard_backward_trims_low_side() {
        let mut context = TestContext::with_uniform_items(20, Size::new(100.0, 50.0));
        let mut manager = ElementManager::new();
        realize_range(&mut manager, &mut context, 2..10);

        manager.discard_elements_outside_window(&mut context, false, 4);

        // No realized data index <= 4 remains.
        assert_eq!(manager.first_realized_data_index(), Some(5));
        assert_eq!(manager.last_realized_data_index(), Some(9));
        assert_eq!(context.recycled().len(), 3);
    }

    #[test]
    fn test_discard_with_unrealized_boundary_is_noop() {
        let mut context = TestContext::with_uniform_items(20, Size::new(100.0, 50.0));
        let mut manager = ElementManager::new();
        realize_range(&mut manager, &mut context, 2..5);

        manager.discard_elements_outside_window(&mut context, true, 15);
        assert_eq!(manager.realized_element_count(), 3);
        assert!(context.recycled().is_empty());
    }

    #[test]
    fn test_discard_outside_window_rect() {
        let mut context = TestContext::with_uniform_items(100, Size::new(100.0, 50.0));
        let mut manager = ElementManager::new();
        realize_range(&mut manager, &mut context, 0..10);

        // Window covers items 4..8 (y in [200, 400)).
        manager.discard_elements_outside_window_rect(
            &mut context,
            Rect::new(0.0, 200.0, 100.0, 199.0),
            ScrollOrientation::Vertical,
        );

        assert_eq!(manager.first_realized_data_index(), Some(4));
        assert_eq!(manager.last_realized_data_index(), Some(7));
        context.assert_recycled_at_most_once();
    }

    #[test]
    fn test_discard_outside_window_rect_disjoint_clears_all() {
        let mut context = TestContext::with_uniform_items(100, Size::new(100.0, 50.0));
        let mut manager = ElementManager::new();
        realize_range(&mut manager, &mut context, 0..5);

        manager.discard_elements_outside_window_rect(
            &mut context,
            Rect::new(0.0, 5000.0, 100.0, 300.0),
            ScrollOrientation::Vertical,
        );
        assert_eq!(manager.realized_element_count(), 0);
        assert_eq!(context.recycled().len(), 5);
    }

    #[test]
    fn test_is_window_connected() {
        let mut context = TestContext::with_uniform_items(100, Size::new(100.0, 50.0));
        let mut manager = ElementManager::new();
        realize_range(&mut manager, &mut context, 0..5);

        let orientation = ScrollOrientation::Vertical;
        assert!(manager.is_window_connected(
            Rect::new(0.0, 100.0, 100.0, 300.0),
            orientation,
            false
        ));
        assert!(!manager.is_window_connected(
            Rect::new(0.0, 5000.0, 100.0, 300.0),
            orientation,
            false
        ));
        // Empty range is never connected.
        manager.clear_realized_range(&mut context);
        assert!(!manager.is_window_connected(
            Rect::new(0.0, 0.0, 100.0, 300.0),
            orientation,
            false
        ));
    }

    #[test]
    fn test_items_added_before_window_shifts() {
        let mut context = TestContext::with_uniform_items(20, Size::new(100.0, 50.0));
        let mut manager = ElementManager::new();
        realize_range(&mut manager, &mut context, 5..8);

        manager.on_items_added(&mut context, 2, 3);
        assert_eq!(manager.first_realized_data_index(), Some(8));
        assert_eq!(manager.realized_element_count(), 3);
    }

    #[test]
    fn test_items_added_inside_window_truncates_suffix() {
        let mut context = TestContext::with_uniform_items(20, Size::new(100.0, 50.0));
        let mut manager = ElementManager::new();
        realize_range(&mut manager, &mut context, 5..10);

        manager.on_items_added(&mut context, 7, 1);
        assert_eq!(manager.first_realized_data_index(), Some(5));
        assert_eq!(manager.last_realized_data_index(), Some(6));
        assert_eq!(context.recycled().len(), 3);
    }

    #[test]
    fn test_items_removed_before_window_shifts() {
        let mut context = TestContext::with_uniform_items(20, Size::new(100.0, 50.0));
        let mut manager = ElementManager::new();
        realize_range(&mut manager, &mut context, 5..8);

        manager.on_items_removed(&mut context, 0, 2);
        assert_eq!(manager.first_realized_data_index(), Some(3));
    }

    #[test]
    fn test_items_removed_overlapping_window_truncates() {
        let mut context = TestContext::with_uniform_items(20, Size::new(100.0, 50.0));
        let mut manager = ElementManager::new();
        realize_range(&mut manager, &mut context, 5..10);

        manager.on_items_removed(&mut context, 7, 5);
        assert_eq!(manager.first_realized_data_index(), Some(5));
        assert_eq!(manager.last_realized_data_index(), Some(6));
        assert_eq!(context.recycled().len(), 3);
    }

    #[test]
    fn test_removal_spanning_whole_window_clears() {
        let mut context = TestContext::with_uniform_items(20, Size::new(100.0, 50.0));
        let mut manager = ElementManager::new();
        realize_range(&mut manager, &mut context, 5..10);

        manager.on_items_removed(&mut context, 3, 10);
        assert_eq!(manager.realized_element_count(), 0);
        assert_eq!(manager.first_realized_data_index(), None);
    }
}
