mod common;
mod shelf;

pub use common::{ShelfGhost, ShelfGhostLayer};
pub use shelf::{ShelfState, ShelfView, shelf_view};
