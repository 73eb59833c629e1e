//! PostgreSQL store tests
//!
//! Skipped unless `DATABASE_URL` points at a PostgreSQL database.

use crate::common::database::test_store;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use taskdeck::backend::BoardStore;
use taskdeck::shared::{
    Board, BoardError, BoardList, Card, Membership, OrderAssignment, OrderingOp, Parent, Role,
};
use uuid::Uuid;

async fn board_with_list(store: &dyn BoardStore) -> (Board, BoardList) {
    let board = Board::new(Uuid::new_v4(), "Roadmap", false);
    store.insert_board(&board).await.unwrap();
    let list = store
        .append_list(BoardList::new(board.id, "Todo"))
        .await
        .unwrap();
    (board, list)
}

async fn orders(store: &dyn BoardStore, list_id: Uuid) -> Vec<(String, i64)> {
    let mut cards = store.cards_for_list(list_id).await.unwrap();
    taskdeck::shared::ordering::sort_for_display(&mut cards);
    cards.into_iter().map(|c| (c.title, c.order)).collect()
}

#[tokio::test]
async fn test_pg_concurrent_appends() {
    let Some(store) = test_store().await else {
        return;
    };
    let store: Arc<dyn BoardStore> = Arc::new(store);
    let (_, list) = board_with_list(store.as_ref()).await;

    let mut handles = Vec::new();
    for i in 0..20 {
        let store = store.clone();
        let list = list.clone();
        handles.push(tokio::spawn(async move {
            store
                .append_card(Card::new(&list, format!("Card {i}"), None))
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let found: Vec<i64> = orders(store.as_ref(), list.id)
        .await
        .into_iter()
        .map(|(_, order)| order)
        .collect();
    assert_eq!(found, (0..20).collect::<Vec<i64>>());
}

#[tokio::test]
async fn test_pg_move_within_list() {
    let Some(store) = test_store().await else {
        return;
    };
    let (_, list) = board_with_list(&store).await;
    for title in ["A", "C"] {
        store
            .append_card(Card::new(&list, title, None))
            .await
            .unwrap();
    }
    let d = store
        .append_card(Card::new(&list, "D", None))
        .await
        .unwrap();

    store
        .apply_ordering(
            Parent::List(list.id),
            OrderingOp::MoveWithin {
                item: d.id,
                new_order: 0,
            },
        )
        .await
        .unwrap();

    assert_eq!(
        orders(&store, list.id).await,
        vec![
            ("D".to_string(), 0),
            ("A".to_string(), 1),
            ("C".to_string(), 2)
        ]
    );
}

#[tokio::test]
async fn test_pg_bulk_reorder_mismatch_rolls_back() {
    let Some(store) = test_store().await else {
        return;
    };
    let (board, list) = board_with_list(&store).await;
    let other = store
        .append_list(BoardList::new(board.id, "Done"))
        .await
        .unwrap();
    let a = store
        .append_card(Card::new(&list, "A", None))
        .await
        .unwrap();
    let b = store
        .append_card(Card::new(&list, "B", None))
        .await
        .unwrap();
    let x = store
        .append_card(Card::new(&other, "X", None))
        .await
        .unwrap();

    let err = store
        .apply_ordering(
            Parent::List(list.id),
            OrderingOp::BulkReorder(vec![
                OrderAssignment { id: b.id, order: 0 },
                OrderAssignment { id: a.id, order: 1 },
                OrderAssignment { id: x.id, order: 2 },
            ]),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err.board_error(),
        Some(BoardError::OrderingMismatch { .. })
    ));
    assert_eq!(
        orders(&store, list.id).await,
        vec![("A".to_string(), 0), ("B".to_string(), 1)]
    );
}

#[tokio::test]
async fn test_pg_list_swap_passes_deferred_constraint() {
    let Some(store) = test_store().await else {
        return;
    };
    let (board, first) = board_with_list(&store).await;
    let second = store
        .append_list(BoardList::new(board.id, "Done"))
        .await
        .unwrap();

    store
        .apply_ordering(
            Parent::Board(board.id),
            OrderingOp::BulkReorder(vec![
                OrderAssignment {
                    id: first.id,
                    order: 1,
                },
                OrderAssignment {
                    id: second.id,
                    order: 0,
                },
            ]),
        )
        .await
        .unwrap();

    let mut lists = store.lists_for_board(board.id).await.unwrap();
    taskdeck::shared::ordering::sort_for_display(&mut lists);
    let titles: Vec<String> = lists.into_iter().map(|l| l.title).collect();
    assert_eq!(titles, vec!["Done", "Todo"]);
}

#[tokio::test]
async fn test_pg_relocate_card() {
    let Some(store) = test_store().await else {
        return;
    };
    let (board, list) = board_with_list(&store).await;
    let other = store
        .append_list(BoardList::new(board.id, "Done"))
        .await
        .unwrap();
    let card = store
        .append_card(Card::new(&list, "A", None))
        .await
        .unwrap();

    let moved = store.relocate_card(card.id, other.id, 4).await.unwrap();
    assert_eq!(moved.list_id(), other.id);
    assert_eq!(moved.order, 4);

    let stored = store.get_card(card.id).await.unwrap().unwrap();
    assert_eq!(stored.list_id(), other.id);
}

#[tokio::test]
async fn test_pg_membership_roundtrip_and_uniqueness() {
    let Some(store) = test_store().await else {
        return;
    };
    let (board, _) = board_with_list(&store).await;
    let user = Uuid::new_v4();
    let membership = Membership::invite(board.id, user, Role::Viewer, board.owner_id());
    store.insert_membership(&membership).await.unwrap();

    let err = store.insert_membership(&membership).await.unwrap_err();
    assert!(matches!(
        err.board_error(),
        Some(BoardError::MembershipExists { .. })
    ));

    let updated = store
        .update_membership(board.id, user, Some(Role::Admin), None)
        .await
        .unwrap();
    assert_eq!(updated.role(), Role::Admin);
    let stored = store
        .get_membership(board.id, user)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored, updated);
    assert!(stored.permissions().delete_lists);

    assert!(store.delete_membership(board.id, user).await.unwrap());
    assert!(!store.delete_membership(board.id, user).await.unwrap());
}

#[tokio::test]
async fn test_pg_delete_board_cascades() {
    let Some(store) = test_store().await else {
        return;
    };
    let (board, list) = board_with_list(&store).await;
    let card = store
        .append_card(Card::new(&list, "A", None))
        .await
        .unwrap();

    store.delete_board(board.id).await.unwrap();
    assert!(store.get_board(board.id).await.unwrap().is_none());
    assert!(store.get_list(list.id).await.unwrap().is_none());
    assert!(store.get_card(card.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_pg_membership_updates_touch_only_their_fields() {
    let Some(store) = test_store().await else {
        return;
    };
    let (board, _) = board_with_list(&store).await;
    let user = Uuid::new_v4();
    store
        .insert_membership(&Membership::invite(
            board.id,
            user,
            Role::Viewer,
            board.owner_id(),
        ))
        .await
        .unwrap();

    store
        .update_membership(board.id, user, None, Some(false))
        .await
        .unwrap();
    let stored = store
        .update_membership(board.id, user, Some(Role::Editor), None)
        .await
        .unwrap();

    assert!(!stored.is_active);
    assert_eq!(stored.role(), Role::Editor);
    assert_eq!(*stored.permissions(), taskdeck::shared::resolve(Role::Editor));

    let err = store
        .update_membership(board.id, Uuid::new_v4(), Some(Role::Admin), None)
        .await
        .unwrap_err();
    assert!(matches!(err.board_error(), Some(BoardError::NotFound { .. })));
}
