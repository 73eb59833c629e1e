//! Ordering Engine planner
//!
//! Sibling items (lists under a board, cards under a list) carry an integer
//! `order` used purely as a sort key. This module computes, from a snapshot
//! of the siblings, the exact set of order assignments an operation needs.
//! It performs no I/O: a store loads the snapshot and writes the returned
//! assignments as one atomic unit (see `backend::store`).
//!
//! # Operations
//!
//! - **append**: `max(order) + 1`, or `0` for an empty parent
//! - **move within parent**: shifts every sibling between the old and the
//!   new position by one, then places the item; targets past the end are
//!   clamped to the last position
//! - **bulk reorder**: applies caller-supplied orders after checking every
//!   item belongs to the parent
//!
//! Cross-parent card moves need no plan: the card is placed at the requested
//! order and neither list is renumbered. Deletes never renumber either.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use crate::shared::error::BoardError;
use crate::shared::model::{BoardList, Card};

/// Container whose children are ordered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Parent {
    /// Lists of a board
    Board(Uuid),
    /// Cards of a list
    List(Uuid),
}

impl Parent {
    pub fn id(&self) -> Uuid {
        match self {
            Parent::Board(id) | Parent::List(id) => *id,
        }
    }

    /// Lists keep unique orders; cards tolerate collisions from cross-list moves
    pub fn requires_unique_orders(&self) -> bool {
        matches!(self, Parent::Board(_))
    }
}

/// Snapshot of one sibling's position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sibling {
    pub id: Uuid,
    pub order: i64,
}

/// One `(item, order)` pair to write
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OrderAssignment {
    pub id: Uuid,
    pub order: i64,
}

/// Ordering operation on a single parent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderingOp {
    MoveWithin { item: Uuid, new_order: i64 },
    BulkReorder(Vec<OrderAssignment>),
}

/// Largest order a caller may assign
///
/// Keeps `max + 1` on append far away from `i64` overflow.
pub const MAX_ORDER: i64 = i32::MAX as i64;

/// Reject orders outside `0..=MAX_ORDER`
pub fn validate_order(order: i64) -> Result<(), BoardError> {
    if order < 0 {
        return Err(BoardError::validation("order", "Order cannot be negative"));
    }
    if order > MAX_ORDER {
        return Err(BoardError::validation(
            "order",
            format!("Order cannot exceed {MAX_ORDER}"),
        ));
    }
    Ok(())
}

/// Order for a newly appended child of `parent`
pub fn append_position(parent: Parent, siblings: &[Sibling]) -> Result<i64, BoardError> {
    match siblings.iter().map(|s| s.order).max() {
        None => Ok(0),
        Some(max) => max
            .checked_add(1)
            .filter(|next| *next <= MAX_ORDER)
            .ok_or(BoardError::OrderingConflict { parent: parent.id() }),
    }
}

/// Compute the assignments `op` needs, given the current `siblings`
///
/// Only siblings whose order actually changes are returned, so an empty
/// vector means the operation is a no-op.
pub fn plan(
    parent: Parent,
    siblings: &[Sibling],
    op: &OrderingOp,
) -> Result<Vec<OrderAssignment>, BoardError> {
    let assignments = match op {
        OrderingOp::MoveWithin { item, new_order } => {
            plan_move_within(parent, siblings, *item, *new_order)?
        }
        OrderingOp::BulkReorder(batch) => plan_bulk_reorder(parent, siblings, batch)?,
    };
    tracing::debug!(
        parent = %parent.id(),
        changes = assignments.len(),
        "ordering plan computed"
    );
    Ok(assignments)
}

fn plan_move_within(
    parent: Parent,
    siblings: &[Sibling],
    item: Uuid,
    new_order: i64,
) -> Result<Vec<OrderAssignment>, BoardError> {
    if new_order < 0 {
        return Err(BoardError::validation("order", "Order cannot be negative"));
    }
    let old_order = siblings
        .iter()
        .find(|s| s.id == item)
        .map(|s| s.order)
        .ok_or(BoardError::OrderingMismatch {
            item,
            parent: parent.id(),
        })?;

    // The item itself is a sibling, so `max` is always defined here
    let max_order = siblings.iter().map(|s| s.order).max().unwrap_or(old_order);
    let target = new_order.min(max_order);
    if target == old_order {
        return Ok(Vec::new());
    }

    let mut changes: Vec<OrderAssignment> = siblings
        .iter()
        .filter(|s| s.id != item)
        .filter_map(|s| {
            if target > old_order && s.order > old_order && s.order <= target {
                Some(OrderAssignment {
                    id: s.id,
                    order: s.order - 1,
                })
            } else if target < old_order && s.order >= target && s.order < old_order {
                Some(OrderAssignment {
                    id: s.id,
                    order: s.order + 1,
                })
            } else {
                None
            }
        })
        .collect();
    changes.push(OrderAssignment {
        id: item,
        order: target,
    });
    Ok(changes)
}

fn plan_bulk_reorder(
    parent: Parent,
    siblings: &[Sibling],
    batch: &[OrderAssignment],
) -> Result<Vec<OrderAssignment>, BoardError> {
    let current: HashMap<Uuid, i64> = siblings.iter().map(|s| (s.id, s.order)).collect();
    let mut seen_items = HashSet::new();
    let mut seen_orders = HashSet::new();

    for assignment in batch {
        if !current.contains_key(&assignment.id) {
            return Err(BoardError::OrderingMismatch {
                item: assignment.id,
                parent: parent.id(),
            });
        }
        validate_order(assignment.order)?;
        if !seen_items.insert(assignment.id) {
            return Err(BoardError::validation(
                "items",
                format!("Item {} appears more than once", assignment.id),
            ));
        }
        if !seen_orders.insert(assignment.order) {
            return Err(BoardError::validation(
                "items",
                format!("Order {} assigned more than once", assignment.order),
            ));
        }
    }

    if parent.requires_unique_orders() {
        let mut final_orders = current.clone();
        for assignment in batch {
            final_orders.insert(assignment.id, assignment.order);
        }
        let distinct: HashSet<i64> = final_orders.values().copied().collect();
        if distinct.len() != final_orders.len() {
            return Err(BoardError::OrderingConflict { parent: parent.id() });
        }
    }

    Ok(batch
        .iter()
        .filter(|a| current.get(&a.id) != Some(&a.order))
        .copied()
        .collect())
}

/// Items that sort by `(order, created_at, id)` for display
pub trait Ordered {
    fn sort_key(&self) -> (i64, DateTime<Utc>, Uuid);
}

impl Ordered for BoardList {
    fn sort_key(&self) -> (i64, DateTime<Utc>, Uuid) {
        (self.order, self.created_at, self.id)
    }
}

impl Ordered for Card {
    fn sort_key(&self) -> (i64, DateTime<Utc>, Uuid) {
        (self.order, self.created_at, self.id)
    }
}

/// Stable display order; ties on `order` fall back to creation time, then id
pub fn sort_for_display<T: Ordered>(items: &mut [T]) {
    items.sort_by_key(|item| item.sort_key());
}
