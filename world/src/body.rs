//! Ordered chain of occupied cells making up one actor's body.

use std::collections::VecDeque;

use cubesnake_core::{GridCell, Heading, Orientation, DEGENERATE_LENGTH};

/// Occupied cells ordered from head (index 0) to tail.
///
/// Moving recycles the tail cell as the new head, so every committed move
/// costs O(1) regardless of length.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BodyChain {
    cells: VecDeque<GridCell>,
}

impl BodyChain {
    /// Creates a straight body of `length` cells that trails behind `head`
    /// along `trailing`.
    #[must_use]
    pub fn seeded(head: GridCell, trailing: Heading, length: usize) -> Self {
        let mut cells = VecDeque::with_capacity(length.max(1));
        let mut cell = head;
        cells.push_back(cell);
        for _ in 1..length {
            cell = cell.offset(trailing);
            cells.push_back(cell);
        }
        Self { cells }
    }

    /// Creates a body from explicit cells ordered head first.
    ///
    /// An empty list yields a single segment at the origin.
    #[must_use]
    pub fn from_cells(cells: impl IntoIterator<Item = GridCell>) -> Self {
        let mut cells: VecDeque<GridCell> = cells.into_iter().collect();
        if cells.is_empty() {
            cells.push_back(GridCell::ORIGIN);
        }
        Self { cells }
    }

    /// Cell occupied by the head segment.
    #[must_use]
    pub fn head(&self) -> GridCell {
        self.cells.front().copied().unwrap_or_default()
    }

    /// Cell occupied by the tail segment.
    #[must_use]
    pub fn tail(&self) -> GridCell {
        self.cells.back().copied().unwrap_or_default()
    }

    /// Number of segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always `false`; a body keeps at least its head.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Iterator over the cells from head to tail.
    pub fn iter(&self) -> impl Iterator<Item = GridCell> + '_ {
        self.cells.iter().copied()
    }

    /// Copies the cells into a vector ordered head first.
    #[must_use]
    pub fn to_vec(&self) -> Vec<GridCell> {
        self.cells.iter().copied().collect()
    }

    /// Moves the body one cell along `heading`, returning the new head cell.
    pub fn advance(&mut self, heading: Heading) -> GridCell {
        let next_head = self.head().offset(heading);
        let _ = self.cells.pop_back();
        self.cells.push_front(next_head);
        next_head
    }

    /// Appends a segment on top of the current tail.
    ///
    /// The new segment separates from the tail on the next move, so no other
    /// segment changes position this tick.
    pub fn grow(&mut self) {
        let tail = self.tail();
        self.cells.push_back(tail);
    }

    /// Reverses the body so the old tail leads, then grows it.
    ///
    /// The returned orientation faces away from the body along the step
    /// between the two trailing segments, or opposite to the old facing when
    /// those segments coincide. The old up vector is kept when it stays
    /// perpendicular to the new facing.
    #[must_use]
    pub fn reverse_and_grow(&mut self, orientation: Orientation) -> Orientation {
        let tail = self.tail();
        let before_tail = self
            .cells
            .len()
            .checked_sub(2)
            .and_then(|index| self.cells.get(index).copied())
            .unwrap_or(tail);

        let trailing = tail.to_vec3() - before_tail.to_vec3();
        let facing = if trailing.length() < DEGENERATE_LENGTH {
            -orientation.facing()
        } else {
            trailing
        };

        self.cells.make_contiguous().reverse();
        self.grow();

        Orientation::new(facing, orientation.up())
    }
}
