//! Steady-state scrolling benchmark for the flow measure pass.

use std::collections::HashMap;

use criterion::{criterion_group, criterion_main, Criterion};
use windrow_foundation::flow::{
    ElementId, ElementRealizationOptions, FlowLayout, VirtualizingLayout,
    VirtualizingLayoutContext,
};
use windrow_geometry::{Point, Rect, Size};

struct BenchHost {
    item_count: usize,
    realization_rect: Rect,
    layout_origin: Point,
    next_element: u64,
    live: HashMap<ElementId, usize>,
}

impl BenchHost {
    fn new(item_count: usize) -> Self {
        Self {
            item_count,
            realization_rect: Rect::new(0.0, 0.0, 400.0, 1200.0),
            layout_origin: Point::ZERO,
            next_element: 0,
            live: HashMap::new(),
        }
    }
}

impl VirtualizingLayoutContext for BenchHost {
    fn item_count(&self) -> usize {
        self.item_count
    }

    fn realization_rect(&self) -> Rect {
        self.realization_rect
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
        element
    }

    fn recycle_element(&mut self, element: ElementId) {
        self.live.remove(&element);
    }

    fn measure_element(&mut self, element: ElementId, _available_size: Size) -> Size {
        let index = self.live[&element];
        Size::new(120.0, if index % 2 == 0 { 80.0 } else { 100.0 })
    }

    fn arrange_element(&mut self, _element: ElementId, _bounds: Rect) {}
}

fn bench_steady_scroll(c: &mut Criterion) {
    c.bench_function("measure_steady_scroll_100k_items", |b| {
        let mut host = BenchHost::new(100_000);
        let mut layout = FlowLayout::new();
        layout.set_min_item_spacing(8.0);
        layout.set_min_line_spacing(8.0);
        layout.initialize_for_context(&mut host);
        let available = Size::new(400.0, 1200.0);
        layout.measure(&mut host, available);

        let mut offset = 0.0f32;
        b.iter(|| {
            offset += 90.0;
            host.realization_rect = Rect::new(0.0, offset, 400.0, 1200.0);
            layout.measure(&mut host, available)
        });
    });
}

fn bench_disconnected_jump(c: &mut Criterion) {
    c.bench_function("measure_disconnected_jump", |b| {
        let mut host = BenchHost::new(100_000);
        let mut layout = FlowLayout::new();
        layout.initialize_for_context(&mut host);
        let available = Size::new(400.0, 1200.0);
        layout.measure(&mut host, available);

        let mut near = false;
        b.iter(|| {
            near = !near;
            let offset = if near { 0.0 } else { 1_000_000.0 };
            host.realization_rect = Rect::new(0.0, offset, 400.0, 1200.0);
            layout.measure(&mut host, available)
        });
    });
}

criterion_group!(benches, bench_steady_scroll, bench_disconnected_jump);
criterion_main!(benches);
