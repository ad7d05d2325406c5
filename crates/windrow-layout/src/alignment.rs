//! Alignment strategies for distributing a wrapped line along the minor axis

/// How a completed line distributes leftover minor-axis space among its
/// members during arrange.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineAlignment {
    /// Pack members against the leading edge.
    Start,
    /// Pack members against the trailing edge.
    End,
    /// Center the members as a block.
    Center,
    /// Distribute the slack around every member, edges getting half shares.
    SpaceAround,
    /// Distribute the slack between members only.
    SpaceBetween,
    /// Distribute the slack before, between, and after members evenly.
    SpaceEvenly,
}

impl LineAlignment {
    /// Computes the minor-axis shift for one member of a completed line.
    ///
    /// `space_at_start`/`space_at_end` are the gaps between the line's
    /// occupied span and the arrange bounds on each side;
    /// `index_in_line` is the member's position within the line,
    /// `count_in_line` the line's member count. The returned value is added
    /// to the member's minor start.
    ///
    /// The distribution modes recover exactly
    /// `space_at_start + space_at_end` across the line: summing the per-gap
    /// increments leaves no leftover and introduces no overlap.
    pub fn minor_shift(
        self,
        space_at_start: f32,
        space_at_end: f32,
        count_in_line: usize,
        index_in_line: usize,
    ) -> f32 {
        debug_assert!(index_in_line < count_in_line);
        let total_space = space_at_start + space_at_end;
        match self {
            LineAlignment::Start => -space_at_start,
            LineAlignment::End => space_at_end,
            LineAlignment::Center => -space_at_start + total_space / 2.0,
            LineAlignment::SpaceAround => {
                let inter_item_space = total_space / (count_in_line as f32 * 2.0);
                -space_at_start + inter_item_space * (index_in_line as f32 * 2.0 + 1.0)
            }
            LineAlignment::SpaceBetween => {
                let inter_item_space = if count_in_line > 1 {
                    total_space / (count_in_line as f32 - 1.0)
                } else {
                    0.0
                };
                -space_at_start + inter_item_space * index_in_line as f32
            }
            LineAlignment::SpaceEvenly => {
                let inter_item_space = total_space / (count_in_line as f32 + 1.0);
                -space_at_start + inter_item_space * (index_in_line as f32 + 1.0)
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/alignment_tests.rs"]
mod tests;
