//! Store wrapper that slows down membership reads
//!
//! Widens the window between a service reading a membership and writing
//! it back, so lost-update races show up deterministically.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;
use taskdeck::backend::error::BackendResult;
use taskdeck::backend::{BoardStore, MemoryStore};
use taskdeck::shared::{
    Board, BoardList, Card, Membership, OrderAssignment, OrderingOp, Parent, Role,
};
use uuid::Uuid;

pub struct SlowMembershipReads {
    inner: MemoryStore,
    delay: Duration,
}

impl SlowMembershipReads {
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: MemoryStore::new(),
            delay,
        }
    }
}

#[async_trait]
impl BoardStore for SlowMembershipReads {
    async fn insert_board(&self, board: &Board) -> BackendResult<()> {
        self.inner.insert_board(board).await
    }

    async fn get_board(&self, board_id: Uuid) -> BackendResult<Option<Board>> {
        self.inner.get_board(board_id).await
    }

    async fn update_board(&self, board: &Board) -> BackendResult<()> {
        self.inner.update_board(board).await
    }

    async fn delete_board(&self, board_id: Uuid) -> BackendResult<()> {
        self.inner.delete_board(board_id).await
    }

    async fn touch_board(&self, board_id: Uuid, at: DateTime<Utc>) -> BackendResult<()> {
        self.inner.touch_board(board_id, at).await
    }

    async fn get_membership(
        &self,
        board_id: Uuid,
        user_id: Uuid,
    ) -> BackendResult<Option<Membership>> {
        let membership = self.inner.get_membership(board_id, user_id).await;
        tokio::time::sleep(self.delay).await;
        membership
    }

    async fn list_memberships(&self, board_id: Uuid) -> BackendResult<Vec<Membership>> {
        self.inner.list_memberships(board_id).await
    }

    async fn insert_membership(&self, membership: &Membership) -> BackendResult<()> {
        self.inner.insert_membership(membership).await
    }

    async fn update_membership(
        &self,
        board_id: Uuid,
        user_id: Uuid,
        role: Option<Role>,
        is_active: Option<bool>,
    ) -> BackendResult<Membership> {
        self.inner
            .update_membership(board_id, user_id, role, is_active)
            .await
    }

    async fn delete_membership(&self, board_id: Uuid, user_id: Uuid) -> BackendResult<bool> {
        self.inner.delete_membership(board_id, user_id).await
    }

    async fn append_list(&self, list: BoardList) -> BackendResult<BoardList> {
        self.inner.append_list(list).await
    }

    async fn get_list(&self, list_id: Uuid) -> BackendResult<Option<BoardList>> {
        self.inner.get_list(list_id).await
    }

    async fn lists_for_board(&self, board_id: Uuid) -> BackendResult<Vec<BoardList>> {
        self.inner.lists_for_board(board_id).await
    }

    async fn update_list(&self, list: &BoardList) -> BackendResult<()> {
        self.inner.update_list(list).await
    }

    async fn delete_list(&self, list_id: Uuid) -> BackendResult<()> {
        self.inner.delete_list(list_id).await
    }

    async fn append_card(&self, card: Card) -> BackendResult<Card> {
        self.inner.append_card(card).await
    }

    async fn get_card(&self, card_id: Uuid) -> BackendResult<Option<Card>> {
        self.inner.get_card(card_id).await
    }

    async fn cards_for_list(&self, list_id: Uuid) -> BackendResult<Vec<Card>> {
        self.inner.cards_for_list(list_id).await
    }

    async fn cards_for_board(&self, board_id: Uuid) -> BackendResult<Vec<Card>> {
        self.inner.cards_for_board(board_id).await
    }

    async fn update_card(&self, card: &Card) -> BackendResult<()> {
        self.inner.update_card(card).await
    }

    async fn delete_card(&self, card_id: Uuid) -> BackendResult<()> {
        self.inner.delete_card(card_id).await
    }

    async fn apply_ordering(
        &self,
        parent: Parent,
        op: OrderingOp,
    ) -> BackendResult<Vec<OrderAssignment>> {
        self.inner.apply_ordering(parent, op).await
    }

    async fn relocate_card(
        &self,
        card_id: Uuid,
        to_list: Uuid,
        order: i64,
    ) -> BackendResult<Card> {
        self.inner.relocate_card(card_id, to_list, order).await
    }
}
