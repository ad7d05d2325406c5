//! Drives a [`FlowLayout`] over a 10,000-item collection with a simulated
//! scroller and prints what the engine realizes each frame.

use std::collections::HashMap;

use windrow_foundation::flow::{
    ElementId, ElementRealizationOptions, FlowLayout, ItemsChange, VirtualizingLayout,
    VirtualizingLayoutContext,
};
use windrow_geometry::{Point, Rect, Size};
use windrow_layout::LineAlignment;

const ITEM_COUNT: usize = 10_000;
const VIEWPORT: Size = Size::new(400.0, 600.0);
/// Buffer realized beyond the viewport on each side, as a scroller would.
const WINDOW_BUFFER: f32 = 300.0;

/// A minimal host: items are cards of varying height, elements are plain
/// ids, and a pool counts how many live elements the engine keeps around.
struct DemoHost {
    item_count: usize,
    scroll_offset: f32,
    layout_origin: Point,
    next_element: u64,
    live: HashMap<ElementId, usize>,
    total_created: usize,
    total_recycled: usize,
}

impl DemoHost {
    fn new(item_count: usize) -> Self {
        Self {
            item_count,
            scroll_offset: 0.0,
            layout_origin: Point::ZERO,
            next_element: 0,
            live: HashMap::new(),
            total_created: 0,
            total_recycled: 0,
        }
    }

    fn item_size(index: usize) -> Size {
        // Three card heights, deterministically varied.
        let height = match index % 3 {
            0 => 80.0,
            1 => 120.0,
            _ => 100.0,
        };
        Size::new(190.0, height)
    }
}

impl VirtualizingLayoutContext for DemoHost {
    fn item_count(&self) -> usize {
        self.item_count
    }

    fn realization_rect(&self) -> Rect {
        Rect::new(
            0.0,
            self.scroll_offset - WINDOW_BUFFER,
            VIEWPORT.width,
            VIEWPORT.height + 2.0 * WINDOW_BUFFER,
        )
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
        self.total_created += 1;
        element
    }

    fn recycle_element(&mut self, element: ElementId) {
        self.live.remove(&element);
        self.total_recycled += 1;
    }

    fn measure_element(&mut self, element: ElementId, _available_size: Size) -> Size {
        Self::item_size(self.live[&element])
    }

    fn arrange_element(&mut self, _element: ElementId, _bounds: Rect) {}
}

fn run_frame(layout: &mut FlowLayout, host: &mut DemoHost, label: &str) {
    let desired = layout.measure(host, VIEWPORT);
    layout.arrange(host, VIEWPORT);
    let (first, last) = layout.realized_range().unwrap_or((0, 0));
    log::info!(
        "{label}: scroll={:>8.0} realized=[{first:>5}, {last:>5}] live={:<3} extent={:.0} \
         created={} recycled={}",
        host.scroll_offset,
        host.live.len(),
        desired.height,
        host.total_created,
        host.total_recycled,
    );
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    println!("=== Windrow Flow Layout Demo ===");
    println!("Simulating a scroller over {ITEM_COUNT} items:");
    println!("  - smooth scrolling reuses the anchor and slides the window");
    println!("  - a long jump disconnects the window and re-anchors");
    println!("  - a collection change forces anchor re-evaluation");
    println!();

    let mut host = DemoHost::new(ITEM_COUNT);
    let mut layout = FlowLayout::new();
    layout.set_min_item_spacing(10.0);
    layout.set_min_line_spacing(10.0);
    layout.set_line_alignment(LineAlignment::SpaceBetween);
    layout.initialize_for_context(&mut host);
    layout.subscribe_measure_invalidated(|_| log::debug!("measure invalidated"));

    run_frame(&mut layout, &mut host, "initial");

    // Smooth scrolling.
    for _ in 0..20 {
        host.scroll_offset += 180.0;
        run_frame(&mut layout, &mut host, "scroll");
    }

    // One long jump with no overlap.
    host.scroll_offset = 200_000.0;
    run_frame(&mut layout, &mut host, "jump");

    // The collection shrinks under the window.
    host.item_count = ITEM_COUNT / 2;
    layout.on_items_changed(
        &mut host,
        ItemsChange::Removed {
            index: ITEM_COUNT / 2,
            count: ITEM_COUNT / 2,
        },
    );
    run_frame(&mut layout, &mut host, "shrink");

    layout.uninitialize_for_context(&mut host);
    println!();
    println!(
        "done: {} elements created, {} recycled, {} still live",
        host.total_created,
        host.total_recycled,
        host.live.len()
    );
}
