//! Shared in-crate test host for the flow engine's unit tests.

use std::collections::HashMap;

use windrow_geometry::{Point, Rect, Size};

use super::context::{
    ElementId, ElementRealizationOptions, NonVirtualizingLayoutContext, VirtualizingLayoutContext,
};

/// A scriptable virtualizing host: per-item desired sizes, a settable
/// realization rect, and create/recycle/arrange logs.
pub(crate) struct TestContext {
    item_sizes: Vec<Size>,
    realization_rect: Rect,
    recommended_anchor: Option<usize>,
    layout_origin: Point,
    next_element: u64,
    live: HashMap<ElementId, usize>,
    created: Vec<usize>,
    recycled: Vec<ElementId>,
    arranged: HashMap<ElementId, Rect>,
}

impl TestContext {
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
            arranged: HashMap::new(),
        }
    }

    pub fn set_realization_rect(&mut self, rect: Rect) {
        self.realization_rect = rect;
    }

    pub fn set_recommended_anchor(&mut self, index: Option<usize>) {
        self.recommended_anchor = index;
    }

    pub fn recycled(&self) -> &[ElementId] {
        &self.recycled
    }

    pub fn created(&self) -> &[usize] {
        &self.created
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn origin(&self) -> Point {
        self.layout_origin
    }

    pub fn arranged_bounds(&self, element: ElementId) -> Option<Rect> {
        self.arranged.get(&element).copied()
    }

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

impl VirtualizingLayoutContext for TestContext {
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
        self.arranged.insert(element, bounds);
    }
}

/// A static child collection for non-virtualizing paths.
pub(crate) struct StaticTestContext {
    children: Vec<(ElementId, Size)>,
    arranged: HashMap<ElementId, Rect>,
}

impl StaticTestContext {
    pub fn with_uniform_children(count: usize, size: Size) -> Self {
        Self {
            children: (0..count as u64)
                .map(|raw| (ElementId::new(raw), size))
                .collect(),
            arranged: HashMap::new(),
        }
    }

    pub fn arranged_bounds(&self, element: ElementId) -> Option<Rect> {
        self.arranged.get(&element).copied()
    }
}

impl NonVirtualizingLayoutContext for StaticTestContext {
    fn child_count(&self) -> usize {
        self.children.len()
    }

    fn child_at(&mut self, index: usize) -> ElementId {
        self.children[index].0
    }

    fn measure_element(&mut self, element: ElementId, _available_size: Size) -> Size {
        self.children
            .iter()
            .find(|(id, _)| *id == element)
            .map(|(_, size)| *size)
            .expect("unknown child")
    }

    fn arrange_element(&mut self, element: ElementId, bounds: Rect) {
        self.arranged.insert(element, bounds);
    }
}
