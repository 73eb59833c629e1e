//! Concurrent requests against one parent

use crate::common::slow_store::SlowMembershipReads;
use crate::common::*;
use pretty_assertions::assert_eq;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use taskdeck::backend::boards::types::{CreateCardRequest, MoveCardRequest};
use taskdeck::backend::BoardService;
use taskdeck::shared::Role;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_appends_get_distinct_orders() {
    let service = memory_service();
    let seeded = Arc::new(seed_board(&service, false).await);
    let list = seed_list(&service, &seeded, "Todo").await;

    let mut handles = Vec::new();
    for i in 0..50 {
        let service = service.clone();
        let seeded = seeded.clone();
        let list_id = list.id;
        handles.push(tokio::spawn(async move {
            service
                .create_card(
                    seeded.owner,
                    seeded.id(),
                    list_id,
                    CreateCardRequest {
                        title: format!("Card {i}"),
                        description: None,
                    },
                )
                .await
        }));
    }
    for handle in handles {
        assert_ok!(handle.await.unwrap());
    }

    let orders: Vec<i64> = card_orders(&service, &seeded, &list)
        .await
        .into_iter()
        .map(|(_, order)| order)
        .collect();
    assert_eq!(orders, (0..50).collect::<Vec<i64>>());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_moves_keep_a_permutation() {
    let service = memory_service();
    let seeded = Arc::new(seed_board(&service, false).await);
    let list = seed_list(&service, &seeded, "Todo").await;
    let mut cards = Vec::new();
    for i in 0..10 {
        cards.push(seed_card(&service, &seeded, &list, &format!("Card {i}")).await);
    }

    let mut handles = Vec::new();
    for (i, card) in cards.iter().enumerate() {
        let service = service.clone();
        let seeded = seeded.clone();
        let card_id = card.id;
        let target = ((i * 7) % 10) as i64;
        handles.push(tokio::spawn(async move {
            service
                .move_card(
                    seeded.owner,
                    seeded.id(),
                    card_id,
                    MoveCardRequest {
                        list_id: None,
                        order: Some(target),
                    },
                )
                .await
        }));
    }
    for handle in handles {
        assert_ok!(handle.await.unwrap());
    }

    let orders: Vec<i64> = card_orders(&service, &seeded, &list)
        .await
        .into_iter()
        .map(|(_, order)| order)
        .collect();
    assert_eq!(orders, (0..10).collect::<Vec<i64>>());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_list_appends_stay_unique() {
    let service = memory_service();
    let seeded = Arc::new(seed_board(&service, false).await);

    let mut handles = Vec::new();
    for i in 0..20 {
        let service = service.clone();
        let seeded = seeded.clone();
        handles.push(tokio::spawn(async move {
            service
                .create_list(seeded.owner, seeded.id(), &format!("List {i}"))
                .await
        }));
    }

    let mut orders = HashSet::new();
    for handle in handles {
        let list = assert_ok!(handle.await.unwrap());
        assert!(orders.insert(list.order), "duplicate order {}", list.order);
    }
    assert_eq!(orders.len(), 20);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_role_updates_never_split_role_and_permissions() {
    let service = memory_service();
    let seeded = Arc::new(seed_board(&service, false).await);
    let member = seed_member(&service, &seeded, Role::Viewer).await;

    let mut handles = Vec::new();
    for i in 0..30 {
        let service = service.clone();
        let seeded = seeded.clone();
        let role = Role::ALL[i % Role::ALL.len()];
        handles.push(tokio::spawn(async move {
            service
                .update_member(seeded.owner, seeded.id(), member, Some(role), None)
                .await
        }));
    }
    for handle in handles {
        assert_ok!(handle.await.unwrap());
    }

    let stored = service
        .store()
        .get_membership(seeded.id(), member)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        *stored.permissions(),
        taskdeck::shared::resolve(stored.role())
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_deactivation_survives_a_concurrent_role_change() {
    let service = BoardService::new(Arc::new(SlowMembershipReads::new(
        Duration::from_millis(50),
    )));
    let seeded = Arc::new(seed_board(&service, false).await);
    let member = seed_member(&service, &seeded, Role::Viewer).await;

    let deactivate = {
        let service = service.clone();
        let seeded = seeded.clone();
        tokio::spawn(async move {
            service
                .update_member(seeded.owner, seeded.id(), member, None, Some(false))
                .await
        })
    };
    let promote = {
        let service = service.clone();
        let seeded = seeded.clone();
        tokio::spawn(async move {
            service
                .update_member(seeded.owner, seeded.id(), member, Some(Role::Admin), None)
                .await
        })
    };
    assert_ok!(deactivate.await.unwrap());
    assert_ok!(promote.await.unwrap());

    let stored = service
        .store()
        .get_membership(seeded.id(), member)
        .await
        .unwrap()
        .unwrap();
    assert!(!stored.is_active, "deactivation was lost");
    assert_eq!(stored.role(), Role::Admin);
    assert_eq!(
        *stored.permissions(),
        taskdeck::shared::resolve(Role::Admin)
    );

    assert_denied!(
        service
            .list_lists(Some(member), seeded.id(), false)
            .await
    );
}
