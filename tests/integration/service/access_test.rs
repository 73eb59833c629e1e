//! Access control through the board service

use crate::common::*;
use pretty_assertions::assert_eq;
use taskdeck::backend::boards::types::{CreateCardRequest, UpdateBoardRequest};
use taskdeck::shared::{BoardError, EffectiveRole, Role};
use uuid::Uuid;

#[tokio::test]
async fn test_owner_has_every_capability() {
    let service = memory_service();
    let seeded = seed_board(&service, false).await;
    let list = seed_list(&service, &seeded, "Todo").await;
    let card = seed_card(&service, &seeded, &list, "Write docs").await;

    let details = assert_ok!(service.get_board(Some(seeded.owner), seeded.id()).await);
    assert_eq!(details.role, EffectiveRole::Owner);

    assert_ok!(
        service
            .update_board(
                seeded.owner,
                seeded.id(),
                UpdateBoardRequest {
                    title: Some("Renamed".to_string()),
                    ..Default::default()
                },
            )
            .await
    );
    assert_ok!(service.delete_card(seeded.owner, seeded.id(), card.id).await);
    assert_ok!(service.delete_list(seeded.owner, seeded.id(), list.id).await);
    assert_ok!(service.delete_board(seeded.owner, seeded.id()).await);

    assert_board_err!(
        service.get_board(Some(seeded.owner), seeded.id()).await,
        BoardError::NotFound { entity: "board", .. }
    );
}

#[tokio::test]
async fn test_public_board_allows_anonymous_reads_only() {
    let service = memory_service();
    let seeded = seed_board(&service, true).await;
    let list = seed_list(&service, &seeded, "Todo").await;
    seed_card(&service, &seeded, &list, "Visible").await;

    let details = assert_ok!(service.get_board(None, seeded.id()).await);
    assert_eq!(details.role, EffectiveRole::PublicReader);
    assert_eq!(details.lists.len(), 1);
    assert_eq!(details.lists[0].cards.len(), 1);

    let stranger = Uuid::new_v4();
    assert_ok!(service.list_lists(Some(stranger), seeded.id(), false).await);
    assert_board_err!(
        service.create_list(stranger, seeded.id(), "Sneaky").await,
        BoardError::AccessDenied
    );
    assert_board_err!(
        service
            .update_board(stranger, seeded.id(), UpdateBoardRequest::default())
            .await,
        BoardError::AccessDenied
    );
}

#[tokio::test]
async fn test_private_board_denies_non_members() {
    let service = memory_service();
    let seeded = seed_board(&service, false).await;
    let stranger = Uuid::new_v4();

    assert_board_err!(
        service.get_board(None, seeded.id()).await,
        BoardError::AccessDenied
    );
    assert_board_err!(
        service.get_board(Some(stranger), seeded.id()).await,
        BoardError::AccessDenied
    );
    assert_board_err!(
        service.list_members(Some(stranger), seeded.id()).await,
        BoardError::AccessDenied
    );
}

#[tokio::test]
async fn test_viewer_reads_but_cannot_mutate() {
    let service = memory_service();
    let seeded = seed_board(&service, false).await;
    let viewer = seed_member(&service, &seeded, Role::Viewer).await;
    let list = seed_list(&service, &seeded, "Todo").await;

    let details = assert_ok!(service.get_board(Some(viewer), seeded.id()).await);
    assert_eq!(details.role, EffectiveRole::Viewer);

    assert_board_err!(
        service.create_list(viewer, seeded.id(), "Nope").await,
        BoardError::InsufficientPermission { .. }
    );
    assert_board_err!(
        service
            .create_card(
                viewer,
                seeded.id(),
                list.id,
                CreateCardRequest {
                    title: "Nope".to_string(),
                    description: None,
                },
            )
            .await,
        BoardError::InsufficientPermission { .. }
    );
}

#[tokio::test]
async fn test_editor_edits_but_cannot_delete() {
    let service = memory_service();
    let seeded = seed_board(&service, false).await;
    let editor = seed_member(&service, &seeded, Role::Editor).await;

    let list = assert_ok!(service.create_list(editor, seeded.id(), "Doing").await);
    assert_board_err!(
        service.delete_list(editor, seeded.id(), list.id).await,
        BoardError::InsufficientPermission { .. }
    );
    assert_board_err!(
        service
            .invite_member(editor, seeded.id(), Uuid::new_v4(), Role::Viewer)
            .await,
        BoardError::InsufficientPermission { .. }
    );
}

#[tokio::test]
async fn test_admin_cannot_delete_board() {
    let service = memory_service();
    let seeded = seed_board(&service, false).await;
    let admin = seed_member(&service, &seeded, Role::Admin).await;

    assert_denied!(service.delete_board(admin, seeded.id()).await);
    assert_ok!(service.get_board(Some(admin), seeded.id()).await);
}

#[tokio::test]
async fn test_role_change_flips_permissions_with_the_role() {
    let service = memory_service();
    let seeded = seed_board(&service, false).await;
    let member = seed_member(&service, &seeded, Role::Viewer).await;
    let list = seed_list(&service, &seeded, "Todo").await;

    assert_board_err!(
        service.delete_list(member, seeded.id(), list.id).await,
        BoardError::InsufficientPermission { .. }
    );

    let updated = assert_ok!(
        service
            .update_member(seeded.owner, seeded.id(), member, Some(Role::Admin), None)
            .await
    );
    assert_eq!(updated.role(), Role::Admin);
    assert!(updated.permissions().delete_lists);

    let stored = service
        .store()
        .get_membership(seeded.id(), member)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.role(), Role::Admin);
    assert_eq!(*stored.permissions(), taskdeck::shared::resolve(Role::Admin));

    assert_ok!(service.delete_list(member, seeded.id(), list.id).await);
}

#[tokio::test]
async fn test_deactivated_member_is_denied() {
    let service = memory_service();
    let seeded = seed_board(&service, true).await;
    let admin = seed_member(&service, &seeded, Role::Admin).await;

    assert_ok!(
        service
            .update_member(seeded.owner, seeded.id(), admin, None, Some(false))
            .await
    );

    assert_board_err!(
        service.create_list(admin, seeded.id(), "Todo").await,
        BoardError::AccessDenied
    );
    // public reads still work, at public-reader level
    let details = assert_ok!(service.get_board(Some(admin), seeded.id()).await);
    assert_eq!(details.role, EffectiveRole::PublicReader);
}

#[tokio::test]
async fn test_role_change_needs_invite_and_activation_needs_remove() {
    let service = memory_service();
    let seeded = seed_board(&service, false).await;
    let editor = seed_member(&service, &seeded, Role::Editor).await;
    let viewer = seed_member(&service, &seeded, Role::Viewer).await;

    assert_board_err!(
        service
            .update_member(editor, seeded.id(), viewer, Some(Role::Editor), None)
            .await,
        BoardError::InsufficientPermission { .. }
    );
    assert_board_err!(
        service
            .update_member(editor, seeded.id(), viewer, None, Some(false))
            .await,
        BoardError::InsufficientPermission { .. }
    );
}

#[tokio::test]
async fn test_member_removal_rules() {
    let service = memory_service();
    let seeded = seed_board(&service, false).await;
    let admin = seed_member(&service, &seeded, Role::Admin).await;
    let editor = seed_member(&service, &seeded, Role::Editor).await;
    let viewer = seed_member(&service, &seeded, Role::Viewer).await;

    assert_board_err!(
        service.remove_member(editor, seeded.id(), viewer).await,
        BoardError::InsufficientPermission { .. }
    );
    assert_ok!(service.remove_member(viewer, seeded.id(), viewer).await);
    assert_ok!(service.remove_member(admin, seeded.id(), editor).await);

    let remaining: Vec<Uuid> = service
        .list_members(Some(seeded.owner), seeded.id())
        .await
        .unwrap()
        .iter()
        .map(|m| m.user_id())
        .collect();
    assert_eq!(remaining, vec![admin]);

    assert_board_err!(
        service.remove_member(admin, seeded.id(), editor).await,
        BoardError::NotFound { .. }
    );
}

#[tokio::test]
async fn test_duplicate_invite_is_rejected() {
    let service = memory_service();
    let seeded = seed_board(&service, false).await;
    let member = seed_member(&service, &seeded, Role::Viewer).await;

    assert_board_err!(
        service
            .invite_member(seeded.owner, seeded.id(), member, Role::Editor)
            .await,
        BoardError::MembershipExists { .. }
    );
}
