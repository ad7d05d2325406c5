//! Scriptable layout hosts for driving the flow engine in tests.

use std::collections::HashMap;

use windrow_foundation::flow::{
    ElementId, ElementRealizationOptions, NonVirtualizingLayoutContext, VirtualizingLayoutContext,
};
use windrow_geometry::{Point, Rect, Size};

/// A virtualizing host with scripted item sizes and full bookkeeping.
///
/// Elements are minted with fresh ids on every realization, so recycle
/// accounting is exact: an element recycled twice, or recycled while not
/// live, fails immediately.
pub struct TestHost {
    item_sizes: Vec<Size>,
    realization_rect: Rect,
    recommended_anchor: Option<usize>,
    layout_origin: Point,
    next_element: u64,
    live: HashMap<ElementId, usize>,
    created: Vec<usize>,
    recycled: Vec<ElementId>,
    arranged_by_index: HashMap<usize, Rect>,
}

impl TestHost {
    pub fn with_uniform_items(count: usize, size: Size) -> Self {
        Self::with_item_sizes(vec![size; count])
    }

    pub fn with_item_sizes(item_sizes: Vec<Size>) -> Self {
        Self {
            item_sizes,
            realization_rect: Rect::INFINITE,
            recommended_anchor: None,
            layout_origin: Point::ZERO,
            next_element: 0,
            live: HashMap::new(),
            created: Vec::new(),
            recycled: Vec::new(),
            arranged_by_index: HashMap::new(),
        }
    }

    /// Moves the realization window, as a host scroller would between frames.
    pub fn set_realization_rect(&mut self, rect: Rect) {
        self.realization_rect = rect;
    }

    pub fn set_recommended_anchor(&mut self, index: Option<usize>) {
        self.recommended_anchor = index;
    }

    /// Replaces the item collection with `count` uniform items. The layout
    /// must be told separately via `on_items_changed`.
    pub fn set_item_count(&mut self, count: usize, size: Size) {
        self.item_sizes = vec![size; count];
    }

    /// Data indices passed to `get_or_create_element_at`, in call order.
    pub fn created(&self) -> &[usize] {
        &self.created
    }

    /// Elements handed back through `recycle_element`, in call order.
    pub fn recycled(&self) -> &[ElementId] {
        &self.recycled
    }

    /// Number of elements currently realized and not recycled.
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn layout_origin(&self) -> Point {
        self.layout_origin
    }

    /// Bounds the last arrange pass gave the element for `data_index`.
    pub fn arranged_bounds(&self, data_index: usize) -> Option<Rect> {
        self.arranged_by_index.get(&data_index).copied()
    }

    /// Sorted snapshot of every arranged element's final bounds.
    pub fn arranged_snapshot(&self) -> Vec<(usize, Rect)> {
        let mut snapshot: Vec<_> = self
            .arranged_by_index
            .iter()
            .map(|(&index, &bounds)| (index, bounds))
            .collect();
        snapshot.sort_by_key(|(index, _)| *index);
        snapshot
    }

    pub fn clear_arranged(&mut self) {
        self.arranged_by_index.clear();
    }

    /// Panics if any element was recycled more than once.
    pub fn assert_recycled_at_most_once(&self) {
        let mut seen = std::collections::HashSet::new();
        for element in &self.recycled {
            assert!(
                seen.insert(*element),
                "element {element:?} recycled more than once"
            );
        }
    }
}

impl VirtualizingLayoutContext for TestHost {
    fn item_count(&self) -> usize {
        self.item_sizes.len()
    }

    fn realization_rect(&self) -> Rect {
        self.realization_rect
    }

    fn recommended_anchor_index(&self) -> Option<usize> {
        self.recommended_anchor
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
        assert!(index < self.item_sizes.len(), "realizing index {index} out of range");
        let element = ElementId::new(self.next_element);
        self.next_element += 1;
        self.live.insert(element, index);
        self.created.push(index);
        element
    }

    fn recycle_element(&mut self, element: ElementId) {
        assert!(
            self.live.remove(&element).is_some(),
            "recycled element {element:?} was not live"
        );
        self.recycled.push(element);
    }

    fn measure_element(&mut self, element: ElementId, _available_size: Size) -> Size {
        let index = self.live[&element];
        self.item_sizes[index]
    }

    fn arrange_element(&mut self, element: ElementId, bounds: Rect) {
        let index = self.live[&element];
        self.arranged_by_index.insert(index, bounds);
    }
}

/// A non-virtualizing host: a fixed child collection, every child live for
/// the host's whole lifetime.
pub struct StaticHost {
    children: Vec<Size>,
    arranged_by_index: HashMap<usize, Rect>,
}

impl StaticHost {
    pub fn with_uniform_children(count: usize, size: Size) -> Self {
        Self {
            children: vec![size; count],
            arranged_by_index: HashMap::new(),
        }
    }

    pub fn arranged_bounds(&self, index: usize) -> Option<Rect> {
        self.arranged_by_index.get(&index).copied()
    }
}

impl NonVirtualizingLayoutContext for StaticHost {
    fn child_count(&self) -> usize {
        self.children.len()
    }

    fn child_at(&mut self, index: usize) -> ElementId {
        assert!(index < self.children.len());
        ElementId::new(index as u64)
    }

    fn measure_element(&mut self, element: ElementId, _available_size: Size) -> Size {
        self.children[element.raw() as usize]
    }

    fn arrange_element(&mut self, element: ElementId, bounds: Rect) {
        self.arranged_by_index
            .insert(element.raw() as usize, bounds);
    }
}
