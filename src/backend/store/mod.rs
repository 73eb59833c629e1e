//! Store Module
//!
//! The persistence seam of the backend. The board service talks to a
//! [`BoardStore`]; two implementations exist:
//!
//! - **`memory`** - everything behind one `tokio::sync::RwLock`, used when no
//!   database is configured and in tests
//! - **`postgres`** - sqlx/PostgreSQL, row locks on the parent serialise
//!   ordering writes
//!
//! # Atomicity
//!
//! `append_list`, `append_card`, `apply_ordering` and `relocate_card` each
//! read the sibling set and write the resulting orders as one unit. Other
//! requests observe either the full state before or the full state after a
//! call, never a mix.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::backend::error::BackendResult;
use crate::shared::{
    Board, BoardList, Card, Membership, OrderAssignment, OrderingOp, Parent, Role,
};

/// In-memory store
pub mod memory;

/// PostgreSQL store
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Lookup and atomic mutation of boards and their contents
#[async_trait]
pub trait BoardStore: Send + Sync {
    async fn insert_board(&self, board: &Board) -> BackendResult<()>;

    async fn get_board(&self, board_id: Uuid) -> BackendResult<Option<Board>>;

    /// Persist title, visibility, archive flag and last activity
    async fn update_board(&self, board: &Board) -> BackendResult<()>;

    /// Delete a board with its memberships, lists and cards
    async fn delete_board(&self, board_id: Uuid) -> BackendResult<()>;

    /// Bump `last_activity`
    async fn touch_board(&self, board_id: Uuid, at: DateTime<Utc>) -> BackendResult<()>;

    async fn get_membership(
        &self,
        board_id: Uuid,
        user_id: Uuid,
    ) -> BackendResult<Option<Membership>>;

    async fn list_memberships(&self, board_id: Uuid) -> BackendResult<Vec<Membership>>;

    /// Insert a membership; fails with `MembershipExists` for a duplicate pair
    async fn insert_membership(&self, membership: &Membership) -> BackendResult<()>;

    /// Apply only the given fields, atomically, and return the stored row
    ///
    /// A new role rewrites permissions in the same write. Fields left as
    /// `None` keep whatever a concurrent update stored.
    async fn update_membership(
        &self,
        board_id: Uuid,
        user_id: Uuid,
        role: Option<Role>,
        is_active: Option<bool>,
    ) -> BackendResult<Membership>;

    /// Returns false when no membership existed
    async fn delete_membership(&self, board_id: Uuid, user_id: Uuid) -> BackendResult<bool>;

    /// Insert `list` at the end of its board
    async fn append_list(&self, list: BoardList) -> BackendResult<BoardList>;

    async fn get_list(&self, list_id: Uuid) -> BackendResult<Option<BoardList>>;

    /// Every list of a board, archived included, in no particular order
    async fn lists_for_board(&self, board_id: Uuid) -> BackendResult<Vec<BoardList>>;

    /// Persist title and archive flag
    async fn update_list(&self, list: &BoardList) -> BackendResult<()>;

    /// Delete a list and its cards; siblings are not renumbered
    async fn delete_list(&self, list_id: Uuid) -> BackendResult<()>;

    /// Insert `card` at the end of its list
    async fn append_card(&self, card: Card) -> BackendResult<Card>;

    async fn get_card(&self, card_id: Uuid) -> BackendResult<Option<Card>>;

    /// Every card of a list, archived included, in no particular order
    async fn cards_for_list(&self, list_id: Uuid) -> BackendResult<Vec<Card>>;

    /// Every card of a board, archived included, in no particular order
    async fn cards_for_board(&self, board_id: Uuid) -> BackendResult<Vec<Card>>;

    /// Persist title, description and archive flag
    async fn update_card(&self, card: &Card) -> BackendResult<()>;

    /// Delete a card; siblings are not renumbered
    async fn delete_card(&self, card_id: Uuid) -> BackendResult<()>;

    /// Plan `op` against the current children of `parent` and write every
    /// resulting assignment atomically. Returns the assignments applied.
    async fn apply_ordering(
        &self,
        parent: Parent,
        op: OrderingOp,
    ) -> BackendResult<Vec<OrderAssignment>>;

    /// Move a card to another list of the same board at `order`, leaving
    /// both lists' other cards untouched
    async fn relocate_card(&self, card_id: Uuid, to_list: Uuid, order: i64)
        -> BackendResult<Card>;
}
