use super::grid::{Cell, Grid};

/// Type of collision that occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionType {
    /// Snake left the grid
    Wall,
    /// Snake ran into its own body
    SelfCollision,
}

/// Decide whether moving the head to `head` ends the game.
///
/// `body` must be the body before this tick's move, tail included: entering
/// the cell the tail is about to vacate still counts as a self collision.
pub fn check(head: Cell, body: &[Cell], grid: &Grid) -> Option<CollisionType> {
    if !grid.in_bounds(head) {
        return Some(CollisionType::Wall);
    }

    if body.contains(&head) {
        return Some(CollisionType::SelfCollision);
    }

    None
}

pub fn is_fatal(head: Cell, body: &[Cell], grid: &Grid) -> bool {
    check(head, body, grid).is_some()
}
