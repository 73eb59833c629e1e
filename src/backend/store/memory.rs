/**
 * In-Memory Store
 *
 * Keeps every table in one `Tables` value behind a `tokio::sync::RwLock`.
 * Each mutating call holds the write guard for its whole read-plan-write
 * cycle and never awaits while holding it, so calls are serialised and
 * all-or-nothing.
 *
 * Used when `DATABASE_URL` is not configured, and by the test suite.
 */

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::backend::error::BackendResult;
use crate::backend::store::BoardStore;
use crate::shared::ordering::{self, Sibling};
use crate::shared::{
    Board, BoardError, BoardList, Card, Membership, OrderAssignment, OrderingOp, Parent, Role,
};

#[derive(Default)]
struct Tables {
    boards: HashMap<Uuid, Board>,
    memberships: HashMap<(Uuid, Uuid), Membership>,
    lists: HashMap<Uuid, BoardList>,
    cards: HashMap<Uuid, Card>,
}

impl Tables {
    fn siblings(&self, parent: Parent) -> Vec<Sibling> {
        match parent {
            Parent::Board(board_id) => self
                .lists
                .values()
                .filter(|l| l.board_id() == board_id)
                .map(|l| Sibling {
                    id: l.id,
                    order: l.order,
                })
                .collect(),
            Parent::List(list_id) => self
                .cards
                .values()
                .filter(|c| c.list_id() == list_id)
                .map(|c| Sibling {
                    id: c.id,
                    order: c.order,
                })
                .collect(),
        }
    }

    fn parent_exists(&self, parent: Parent) -> bool {
        match parent {
            Parent::Board(id) => self.boards.contains_key(&id),
            Parent::List(id) => self.lists.contains_key(&id),
        }
    }

    fn set_order(&mut self, parent: Parent, assignment: &OrderAssignment) {
        match parent {
            Parent::Board(_) => {
                if let Some(list) = self.lists.get_mut(&assignment.id) {
                    list.order = assignment.order;
                }
            }
            Parent::List(_) => {
                if let Some(card) = self.cards.get_mut(&assignment.id) {
                    card.order = assignment.order;
                }
            }
        }
    }
}

/// Store keeping all state in process memory
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BoardStore for MemoryStore {
    async fn insert_board(&self, board: &Board) -> BackendResult<()> {
        self.tables
            .write()
            .await
            .boards
            .insert(board.id, board.clone());
        Ok(())
    }

    async fn get_board(&self, board_id: Uuid) -> BackendResult<Option<Board>> {
        Ok(self.tables.read().await.boards.get(&board_id).cloned())
    }

    async fn update_board(&self, board: &Board) -> BackendResult<()> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .boards
            .get_mut(&board.id)
            .ok_or(BoardError::not_found("board", board.id))?;
        stored.title = board.title.clone();
        stored.is_public = board.is_public;
        stored.is_archived = board.is_archived;
        stored.last_activity = board.last_activity;
        Ok(())
    }

    async fn delete_board(&self, board_id: Uuid) -> BackendResult<()> {
        let mut tables = self.tables.write().await;
        tables.boards.remove(&board_id);
        tables.memberships.retain(|(board, _), _| *board != board_id);
        tables.lists.retain(|_, l| l.board_id() != board_id);
        tables.cards.retain(|_, c| c.board_id() != board_id);
        Ok(())
    }

    async fn touch_board(&self, board_id: Uuid, at: DateTime<Utc>) -> BackendResult<()> {
        if let Some(board) = self.tables.write().await.boards.get_mut(&board_id) {
            board.touch(at);
        }
        Ok(())
    }

    async fn get_membership(
        &self,
        board_id: Uuid,
        user_id: Uuid,
    ) -> BackendResult<Option<Membership>> {
        Ok(self
            .tables
            .read()
            .await
            .memberships
            .get(&(board_id, user_id))
            .cloned())
    }

    async fn list_memberships(&self, board_id: Uuid) -> BackendResult<Vec<Membership>> {
        let tables = self.tables.read().await;
        let mut members: Vec<Membership> = tables
            .memberships
            .values()
            .filter(|m| m.board_id() == board_id)
            .cloned()
            .collect();
        members.sort_by_key(|m| m.invited_at);
        Ok(members)
    }

    async fn insert_membership(&self, membership: &Membership) -> BackendResult<()> {
        let mut tables = self.tables.write().await;
        let key = (membership.board_id(), membership.user_id());
        if tables.memberships.contains_key(&key) {
            return Err(BoardError::MembershipExists {
                board: key.0,
                user: key.1,
            }
            .into());
        }
        tables.memberships.insert(key, membership.clone());
        Ok(())
    }

    async fn update_membership(
        &self,
        board_id: Uuid,
        user_id: Uuid,
        role: Option<Role>,
        is_active: Option<bool>,
    ) -> BackendResult<Membership> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .memberships
            .get_mut(&(board_id, user_id))
            .ok_or(BoardError::not_found("membership", user_id))?;
        if let Some(role) = role {
            stored.set_role(role);
        }
        if let Some(is_active) = is_active {
            stored.is_active = is_active;
        }
        Ok(stored.clone())
    }

    async fn delete_membership(&self, board_id: Uuid, user_id: Uuid) -> BackendResult<bool> {
        Ok(self
            .tables
            .write()
            .await
            .memberships
            .remove(&(board_id, user_id))
            .is_some())
    }

    async fn append_list(&self, mut list: BoardList) -> BackendResult<BoardList> {
        let mut tables = self.tables.write().await;
        let parent = Parent::Board(list.board_id());
        if !tables.parent_exists(parent) {
            return Err(BoardError::not_found("board", parent.id()).into());
        }
        list.order = ordering::append_position(parent, &tables.siblings(parent))?;
        tables.lists.insert(list.id, list.clone());
        Ok(list)
    }

    async fn get_list(&self, list_id: Uuid) -> BackendResult<Option<BoardList>> {
        Ok(self.tables.read().await.lists.get(&list_id).cloned())
    }

    async fn lists_for_board(&self, board_id: Uuid) -> BackendResult<Vec<BoardList>> {
        Ok(self
            .tables
            .read()
            .await
            .lists
            .values()
            .filter(|l| l.board_id() == board_id)
            .cloned()
            .collect())
    }

    async fn update_list(&self, list: &BoardList) -> BackendResult<()> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .lists
            .get_mut(&list.id)
            .ok_or(BoardError::not_found("list", list.id))?;
        stored.title = list.title.clone();
        stored.is_archived = list.is_archived;
        Ok(())
    }

    async fn delete_list(&self, list_id: Uuid) -> BackendResult<()> {
        let mut tables = self.tables.write().await;
        tables.lists.remove(&list_id);
        tables.cards.retain(|_, c| c.list_id() != list_id);
        Ok(())
    }

    async fn append_card(&self, mut card: Card) -> BackendResult<Card> {
        let mut tables = self.tables.write().await;
        let parent = Parent::List(card.list_id());
        if !tables.parent_exists(parent) {
            return Err(BoardError::not_found("list", parent.id()).into());
        }
        card.order = ordering::append_position(parent, &tables.siblings(parent))?;
        tables.cards.insert(card.id, card.clone());
        Ok(card)
    }

    async fn get_card(&self, card_id: Uuid) -> BackendResult<Option<Card>> {
        Ok(self.tables.read().await.cards.get(&card_id).cloned())
    }

    async fn cards_for_list(&self, list_id: Uuid) -> BackendResult<Vec<Card>> {
        Ok(self
            .tables
            .read()
            .await
            .cards
            .values()
            .filter(|c| c.list_id() == list_id)
            .cloned()
            .collect())
    }

    async fn cards_for_board(&self, board_id: Uuid) -> BackendResult<Vec<Card>> {
        Ok(self
            .tables
            .read()
            .await
            .cards
            .values()
            .filter(|c| c.board_id() == board_id)
            .cloned()
            .collect())
    }

    async fn update_card(&self, card: &Card) -> BackendResult<()> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .cards
            .get_mut(&card.id)
            .ok_or(BoardError::not_found("card", card.id))?;
        stored.title = card.title.clone();
        stored.description = card.description.clone();
        stored.is_archived = card.is_archived;
        Ok(())
    }

    async fn delete_card(&self, card_id: Uuid) -> BackendResult<()> {
        self.tables.write().await.cards.remove(&card_id);
        Ok(())
    }

    async fn apply_ordering(
        &self,
        parent: Parent,
        op: OrderingOp,
    ) -> BackendResult<Vec<OrderAssignment>> {
        let mut tables = self.tables.write().await;
        if !tables.parent_exists(parent) {
            let entity = match parent {
                Parent::Board(_) => "board",
                Parent::List(_) => "list",
            };
            return Err(BoardError::not_found(entity, parent.id()).into());
        }
        let changes = ordering::plan(parent, &tables.siblings(parent), &op)?;
        for change in &changes {
            tables.set_order(parent, change);
        }
        Ok(changes)
    }

    async fn relocate_card(
        &self,
        card_id: Uuid,
        to_list: Uuid,
        order: i64,
    ) -> BackendResult<Card> {
        let mut tables = self.tables.write().await;
        let list = tables
            .lists
            .get(&to_list)
            .cloned()
            .ok_or(BoardError::not_found("list", to_list))?;
        let card = tables
            .cards
            .get_mut(&card_id)
            .ok_or(BoardError::not_found("card", card_id))?;
        card.move_to(&list, order)?;
        Ok(card.clone())
    }
}
