//! Property-based tests for ordering applied through the in-memory store

use proptest::prelude::*;
use taskdeck::backend::{BoardStore, MemoryStore};
use taskdeck::shared::{Board, BoardList, Card, OrderingOp, Parent};
use uuid::Uuid;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_move_sequences_keep_cards_dense(
        n in 1usize..10,
        moves in prop::collection::vec((0usize..10, 0i64..12), 0..20),
    ) {
        let orders = tokio_test::block_on(async {
            let store = MemoryStore::new();
            let board = Board::new(Uuid::new_v4(), "Board", false);
            store.insert_board(&board).await.unwrap();
            let list = store.append_list(BoardList::new(board.id, "Todo")).await.unwrap();

            let mut ids = Vec::new();
            for i in 0..n {
                let card = store
                    .append_card(Card::new(&list, format!("Card {i}"), None))
                    .await
                    .unwrap();
                ids.push(card.id);
            }

            for (pick, target) in &moves {
                store
                    .apply_ordering(
                        Parent::List(list.id),
                        OrderingOp::MoveWithin { item: ids[pick % n], new_order: *target },
                    )
                    .await
                    .unwrap();
            }

            let mut orders: Vec<i64> = store
                .cards_for_list(list.id)
                .await
                .unwrap()
                .into_iter()
                .map(|c| c.order)
                .collect();
            orders.sort();
            orders
        });

        prop_assert_eq!(orders, (0..n as i64).collect::<Vec<i64>>());
    }
}
