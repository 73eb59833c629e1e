/**
 * Board Service
 *
 * Every board, membership, list and card operation goes through here.
 * Each call loads the board, resolves the acting user into an [`Actor`]
 * once, checks the required capability with [`authorize`], and only then
 * touches the store. Board-level mutations bump `lastActivity`.
 *
 * # Capabilities
 *
 * | operation | capability |
 * |---|---|
 * | reads | `read` |
 * | update board | `editBoard` |
 * | delete board | `deleteBoard` |
 * | invite / change role | `inviteMembers` |
 * | (de)activate / remove member | `removeMembers` (self-removal always allowed) |
 * | create / edit / delete list | `createLists` / `editLists` / `deleteLists` |
 * | move / reorder lists | `editLists` |
 * | create / edit / delete card | `createCards` / `editCards` / `deleteCards` |
 * | move / reorder cards | `moveCards` |
 */

use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::backend::boards::types::{
    BoardDetails, CreateBoardRequest, CreateCardRequest, ListWithCards, MoveCardRequest,
    UpdateBoardRequest, UpdateCardRequest, UpdateListRequest,
};
use crate::backend::error::BackendResult;
use crate::backend::store::BoardStore;
use crate::shared::model::validate_title;
use crate::shared::ordering::{self, sort_for_display};
use crate::shared::{
    authorize, Actor, Board, BoardError, BoardList, Capability, Card, EffectiveRole, Membership,
    OrderAssignment, OrderingOp, Parent, Role,
};

/// Board operations with access control applied
#[derive(Clone)]
pub struct BoardService {
    store: Arc<dyn BoardStore>,
}

impl BoardService {
    pub fn new(store: Arc<dyn BoardStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn BoardStore> {
        &self.store
    }

    async fn load_board(&self, board_id: Uuid) -> BackendResult<Board> {
        Ok(self
            .store
            .get_board(board_id)
            .await?
            .ok_or(BoardError::not_found("board", board_id))?)
    }

    /// Resolve who `user` is on `board`
    async fn load_actor(&self, board: &Board, user: Option<Uuid>) -> BackendResult<Actor> {
        let membership = match user {
            Some(user_id) if !board.is_owned_by(user_id) => {
                self.store.get_membership(board.id, user_id).await?
            }
            _ => None,
        };
        Ok(Actor::resolve(board, user, membership))
    }

    /// Load the board and check `capability` for `user`
    async fn authorized(
        &self,
        board_id: Uuid,
        user: Option<Uuid>,
        capability: Capability,
    ) -> BackendResult<(Board, Actor, EffectiveRole)> {
        let board = self.load_board(board_id).await?;
        let actor = self.load_actor(&board, user).await?;
        let role = authorize(&actor, &board, capability)?;
        Ok((board, actor, role))
    }

    async fn touch(&self, board_id: Uuid) -> BackendResult<()> {
        self.store.touch_board(board_id, Utc::now()).await
    }

    /// Load a list that must live on `board_id`
    async fn board_list(&self, board_id: Uuid, list_id: Uuid) -> BackendResult<BoardList> {
        match self.store.get_list(list_id).await? {
            Some(list) if list.board_id() == board_id => Ok(list),
            _ => Err(BoardError::not_found("list", list_id).into()),
        }
    }

    /// Load a card that must live on `board_id`
    async fn board_card(&self, board_id: Uuid, card_id: Uuid) -> BackendResult<Card> {
        match self.store.get_card(card_id).await? {
            Some(card) if card.board_id() == board_id => Ok(card),
            _ => Err(BoardError::not_found("card", card_id).into()),
        }
    }

    // ----- Boards -----

    /// Create a board owned by `user`
    pub async fn create_board(
        &self,
        user: Uuid,
        request: CreateBoardRequest,
    ) -> BackendResult<Board> {
        let title = validate_title(&request.title)?;
        let board = Board::new(user, title, request.is_public);
        self.store.insert_board(&board).await?;
        tracing::info!("Board {} created by {}", board.id, user);
        Ok(board)
    }

    /// Board with its visible lists and cards, in display order
    pub async fn get_board(&self, user: Option<Uuid>, board_id: Uuid) -> BackendResult<BoardDetails> {
        let (board, _, role) = self.authorized(board_id, user, Capability::Read).await?;

        let mut lists: Vec<BoardList> = self
            .store
            .lists_for_board(board_id)
            .await?
            .into_iter()
            .filter(|l| !l.is_archived)
            .collect();
        sort_for_display(&mut lists);

        let mut cards_by_list: HashMap<Uuid, Vec<Card>> = HashMap::new();
        for card in self.store.cards_for_board(board_id).await? {
            if !card.is_archived {
                cards_by_list.entry(card.list_id()).or_default().push(card);
            }
        }

        let lists = lists
            .into_iter()
            .map(|list| {
                let mut cards = cards_by_list.remove(&list.id).unwrap_or_default();
                sort_for_display(&mut cards);
                ListWithCards { list, cards }
            })
            .collect();

        Ok(BoardDetails { board, role, lists })
    }

    pub async fn update_board(
        &self,
        user: Uuid,
        board_id: Uuid,
        request: UpdateBoardRequest,
    ) -> BackendResult<Board> {
        let (mut board, _, _) = self
            .authorized(board_id, Some(user), Capability::EditBoard)
            .await?;

        if let Some(title) = request.title {
            board.title = validate_title(&title)?;
        }
        if let Some(is_public) = request.is_public {
            board.is_public = is_public;
        }
        if let Some(is_archived) = request.is_archived {
            board.is_archived = is_archived;
        }
        board.touch(Utc::now());

        self.store.update_board(&board).await?;
        tracing::info!("Board {} updated by {}", board_id, user);
        Ok(board)
    }

    /// Delete a board together with its memberships, lists and cards
    pub async fn delete_board(&self, user: Uuid, board_id: Uuid) -> BackendResult<()> {
        self.authorized(board_id, Some(user), Capability::DeleteBoard)
            .await?;
        self.store.delete_board(board_id).await?;
        tracing::info!("Board {} deleted by {}", board_id, user);
        Ok(())
    }

    // ----- Members -----

    pub async fn list_members(
        &self,
        user: Option<Uuid>,
        board_id: Uuid,
    ) -> BackendResult<Vec<Membership>> {
        self.authorized(board_id, user, Capability::Read).await?;
        self.store.list_memberships(board_id).await
    }

    /// Invite `member` to the board with `role`
    ///
    /// # Errors
    ///
    /// * `ValidationError` - if `member` is the board owner
    /// * `MembershipExists` - if `member` already has a membership
    pub async fn invite_member(
        &self,
        user: Uuid,
        board_id: Uuid,
        member: Uuid,
        role: Role,
    ) -> BackendResult<Membership> {
        let (board, _, _) = self
            .authorized(board_id, Some(user), Capability::InviteMembers)
            .await?;

        if board.is_owned_by(member) {
            return Err(BoardError::validation("userId", "The board owner cannot be invited").into());
        }

        let membership = Membership::invite(board_id, member, role, user);
        self.store.insert_membership(&membership).await?;
        self.touch(board_id).await?;
        tracing::info!(
            "User {} invited to board {} as {} by {}",
            member,
            board_id,
            role,
            user
        );
        Ok(membership)
    }

    /// Change a member's role and/or active flag
    ///
    /// A role change needs `inviteMembers`, toggling `isActive` needs
    /// `removeMembers`. Permissions are re-derived from the new role in the
    /// same write.
    pub async fn update_member(
        &self,
        user: Uuid,
        board_id: Uuid,
        member: Uuid,
        role: Option<Role>,
        is_active: Option<bool>,
    ) -> BackendResult<Membership> {
        if role.is_none() && is_active.is_none() {
            return Err(BoardError::validation("body", "Nothing to update").into());
        }

        let board = self.load_board(board_id).await?;
        let actor = self.load_actor(&board, Some(user)).await?;
        if role.is_some() {
            authorize(&actor, &board, Capability::InviteMembers)?;
        }
        if is_active.is_some() {
            authorize(&actor, &board, Capability::RemoveMembers)?;
        }

        let membership = self
            .store
            .update_membership(board_id, member, role, is_active)
            .await?;
        self.touch(board_id).await?;
        tracing::info!(
            "Membership of {} on board {} updated by {}: role={}, active={}",
            member,
            board_id,
            user,
            membership.role(),
            membership.is_active
        );
        Ok(membership)
    }

    /// Remove a member; members may always remove themselves
    pub async fn remove_member(&self, user: Uuid, board_id: Uuid, member: Uuid) -> BackendResult<()> {
        let board = self.load_board(board_id).await?;
        if user != member {
            let actor = self.load_actor(&board, Some(user)).await?;
            authorize(&actor, &board, Capability::RemoveMembers)?;
        }

        if !self.store.delete_membership(board_id, member).await? {
            return Err(BoardError::not_found("membership", member).into());
        }
        self.touch(board_id).await?;
        tracing::info!("User {} removed from board {} by {}", member, board_id, user);
        Ok(())
    }

    // ----- Lists -----

    /// Lists of a board in display order
    pub async fn list_lists(
        &self,
        user: Option<Uuid>,
        board_id: Uuid,
        include_archived: bool,
    ) -> BackendResult<Vec<BoardList>> {
        self.authorized(board_id, user, Capability::Read).await?;
        self.visible_lists(board_id, include_archived).await
    }

    async fn visible_lists(
        &self,
        board_id: Uuid,
        include_archived: bool,
    ) -> BackendResult<Vec<BoardList>> {
        let mut lists: Vec<BoardList> = self
            .store
            .lists_for_board(board_id)
            .await?
            .into_iter()
            .filter(|l| include_archived || !l.is_archived)
            .collect();
        sort_for_display(&mut lists);
        Ok(lists)
    }

    /// Append a new list at the end of the board
    pub async fn create_list(
        &self,
        user: Uuid,
        board_id: Uuid,
        title: &str,
    ) -> BackendResult<BoardList> {
        self.authorized(board_id, Some(user), Capability::CreateLists)
            .await?;
        let list = BoardList::new(board_id, validate_title(title)?);
        let list = self.store.append_list(list).await?;
        self.touch(board_id).await?;
        tracing::info!("List {} created on board {} at {}", list.id, board_id, list.order);
        Ok(list)
    }

    pub async fn update_list(
        &self,
        user: Uuid,
        board_id: Uuid,
        list_id: Uuid,
        request: UpdateListRequest,
    ) -> BackendResult<BoardList> {
        self.authorized(board_id, Some(user), Capability::EditLists)
            .await?;
        let mut list = self.board_list(board_id, list_id).await?;

        if let Some(title) = request.title {
            list.title = validate_title(&title)?;
        }
        if let Some(is_archived) = request.is_archived {
            list.is_archived = is_archived;
        }

        self.store.update_list(&list).await?;
        self.touch(board_id).await?;
        Ok(list)
    }

    /// Delete a list and its cards; remaining siblings keep their orders
    pub async fn delete_list(&self, user: Uuid, board_id: Uuid, list_id: Uuid) -> BackendResult<()> {
        self.authorized(board_id, Some(user), Capability::DeleteLists)
            .await?;
        self.board_list(board_id, list_id).await?;
        self.store.delete_list(list_id).await?;
        self.touch(board_id).await?;
        tracing::info!("List {} deleted from board {} by {}", list_id, board_id, user);
        Ok(())
    }

    /// Move one list to `order`, shifting the lists in between
    pub async fn move_list(
        &self,
        user: Uuid,
        board_id: Uuid,
        list_id: Uuid,
        order: i64,
    ) -> BackendResult<Vec<BoardList>> {
        self.authorized(board_id, Some(user), Capability::EditLists)
            .await?;
        self.board_list(board_id, list_id).await?;

        let changes = self
            .store
            .apply_ordering(
                Parent::Board(board_id),
                OrderingOp::MoveWithin {
                    item: list_id,
                    new_order: order,
                },
            )
            .await?;
        self.touch(board_id).await?;
        tracing::info!(
            "List {} moved to {} on board {} ({} changes)",
            list_id,
            order,
            board_id,
            changes.len()
        );
        self.visible_lists(board_id, false).await
    }

    /// Apply a batch of list orders as one unit
    pub async fn reorder_lists(
        &self,
        user: Uuid,
        board_id: Uuid,
        items: Vec<OrderAssignment>,
    ) -> BackendResult<Vec<BoardList>> {
        self.authorized(board_id, Some(user), Capability::EditLists)
            .await?;

        let changes = self
            .store
            .apply_ordering(Parent::Board(board_id), OrderingOp::BulkReorder(items))
            .await?;
        self.touch(board_id).await?;
        tracing::info!("Lists reordered on board {} ({} changes)", board_id, changes.len());
        self.visible_lists(board_id, false).await
    }

    // ----- Cards -----

    /// Cards of a list in display order
    pub async fn list_cards(
        &self,
        user: Option<Uuid>,
        board_id: Uuid,
        list_id: Uuid,
        include_archived: bool,
    ) -> BackendResult<Vec<Card>> {
        self.authorized(board_id, user, Capability::Read).await?;
        self.board_list(board_id, list_id).await?;
        self.visible_cards(list_id, include_archived).await
    }

    async fn visible_cards(&self, list_id: Uuid, include_archived: bool) -> BackendResult<Vec<Card>> {
        let mut cards: Vec<Card> = self
            .store
            .cards_for_list(list_id)
            .await?
            .into_iter()
            .filter(|c| include_archived || !c.is_archived)
            .collect();
        sort_for_display(&mut cards);
        Ok(cards)
    }

    /// Append a new card at the end of a list
    pub async fn create_card(
        &self,
        user: Uuid,
        board_id: Uuid,
        list_id: Uuid,
        request: CreateCardRequest,
    ) -> BackendResult<Card> {
        self.authorized(board_id, Some(user), Capability::CreateCards)
            .await?;
        let list = self.board_list(board_id, list_id).await?;

        let title = validate_title(&request.title)?;
        let description = request.description.filter(|d| !d.trim().is_empty());
        let card = self
            .store
            .append_card(Card::new(&list, title, description))
            .await?;
        self.touch(board_id).await?;
        tracing::info!("Card {} created in list {} at {}", card.id, list_id, card.order);
        Ok(card)
    }

    pub async fn update_card(
        &self,
        user: Uuid,
        board_id: Uuid,
        card_id: Uuid,
        request: UpdateCardRequest,
    ) -> BackendResult<Card> {
        self.authorized(board_id, Some(user), Capability::EditCards)
            .await?;
        let mut card = self.board_card(board_id, card_id).await?;

        if let Some(title) = request.title {
            card.title = validate_title(&title)?;
        }
        if let Some(description) = request.description {
            card.description = Some(description).filter(|d| !d.trim().is_empty());
        }
        if let Some(is_archived) = request.is_archived {
            card.is_archived = is_archived;
        }

        self.store.update_card(&card).await?;
        self.touch(board_id).await?;
        Ok(card)
    }

    pub async fn delete_card(&self, user: Uuid, board_id: Uuid, card_id: Uuid) -> BackendResult<()> {
        self.authorized(board_id, Some(user), Capability::DeleteCards)
            .await?;
        self.board_card(board_id, card_id).await?;
        self.store.delete_card(card_id).await?;
        self.touch(board_id).await?;
        tracing::info!("Card {} deleted from board {} by {}", card_id, board_id, user);
        Ok(())
    }

    /// Move a card within its list or into another list of the same board
    ///
    /// A move within the list shifts the cards in between. A move into
    /// another list only sets the card's list and order; the old list keeps
    /// its gap and the new list is not renumbered.
    pub async fn move_card(
        &self,
        user: Uuid,
        board_id: Uuid,
        card_id: Uuid,
        request: MoveCardRequest,
    ) -> BackendResult<Card> {
        self.authorized(board_id, Some(user), Capability::MoveCards)
            .await?;
        let card = self.board_card(board_id, card_id).await?;
        let target_list = request.list_id.unwrap_or(card.list_id());

        if target_list == card.list_id() {
            let order = request.order.ok_or(BoardError::validation(
                "order",
                "Order is required when moving within a list",
            ))?;
            let changes = self
                .store
                .apply_ordering(
                    Parent::List(target_list),
                    OrderingOp::MoveWithin {
                        item: card_id,
                        new_order: order,
                    },
                )
                .await?;
            tracing::info!(
                "Card {} moved to {} in list {} ({} changes)",
                card_id,
                order,
                target_list,
                changes.len()
            );
        } else {
            let order = request.order.unwrap_or(0);
            ordering::validate_order(order)?;
            self.store.relocate_card(card_id, target_list, order).await?;
            tracing::info!(
                "Card {} moved from list {} to list {} at {}",
                card_id,
                card.list_id(),
                target_list,
                order
            );
        }

        self.touch(board_id).await?;
        self.board_card(board_id, card_id).await
    }

    /// Apply a batch of card orders within one list as one unit
    pub async fn reorder_cards(
        &self,
        user: Uuid,
        board_id: Uuid,
        list_id: Uuid,
        items: Vec<OrderAssignment>,
    ) -> BackendResult<Vec<Card>> {
        self.authorized(board_id, Some(user), Capability::MoveCards)
            .await?;
        self.board_list(board_id, list_id).await?;

        let changes = self
            .store
            .apply_ordering(Parent::List(list_id), OrderingOp::BulkReorder(items))
            .await?;
        self.touch(board_id).await?;
        tracing::info!("Cards reordered in list {} ({} changes)", list_id, changes.len());
        self.visible_cards(list_id, false).await
    }
}
