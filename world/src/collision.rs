//! Classification of candidate head cells against walls and bodies.

use cubesnake_core::{Collision, GridCell};

use crate::body::BodyChain;

/// Read access to the cells a body occupies.
pub trait Segments {
    /// Reports whether any segment occupies `cell`.
    fn occupies(&self, cell: GridCell) -> bool;

    /// Reports whether any segment other than the head occupies `cell`.
    fn occupies_behind_head(&self, cell: GridCell) -> bool;
}

impl Segments for [GridCell] {
    fn occupies(&self, cell: GridCell) -> bool {
        self.contains(&cell)
    }

    fn occupies_behind_head(&self, cell: GridCell) -> bool {
        self.iter().skip(1).any(|segment| *segment == cell)
    }
}

impl Segments for BodyChain {
    fn occupies(&self, cell: GridCell) -> bool {
        self.iter().any(|segment| segment == cell)
    }

    fn occupies_behind_head(&self, cell: GridCell) -> bool {
        self.iter().skip(1).any(|segment| segment == cell)
    }
}

/// Classifies the cell an actor's head would enter next.
///
/// Returns `None` when the cell is inside the arena and unoccupied. Walls are
/// checked first, then the actor's own body (excluding the current head),
/// then every other body in order.
#[must_use]
pub fn classify<S>(
    next_head: GridCell,
    half_extent: u32,
    own_body: &S,
    other_bodies: &[&S],
) -> Option<Collision>
where
    S: Segments + ?Sized,
{
    if next_head.extent() > half_extent {
        return Some(Collision::Wall);
    }
    if own_body.occupies_behind_head(next_head) {
        return Some(Collision::OwnBody);
    }
    if other_bodies.iter().any(|body| body.occupies(next_head)) {
        return Some(Collision::Opponent);
    }
    None
}
