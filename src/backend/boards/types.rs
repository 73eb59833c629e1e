/**
 * Board API Types
 *
 * Request and response bodies for the board endpoints. Bodies use camelCase
 * on the wire.
 */

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::{Board, BoardList, Card, EffectiveRole, OrderAssignment};

/// Create board request
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CreateBoardRequest {
    pub title: String,
    #[serde(default)]
    pub is_public: bool,
}

/// Partial board update; absent fields are left alone
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBoardRequest {
    pub title: Option<String>,
    pub is_public: Option<bool>,
    pub is_archived: Option<bool>,
}

/// Invite member request
///
/// `role` stays a string so an unknown value surfaces as `InvalidRole`
/// rather than a body rejection.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct InviteMemberRequest {
    pub user_id: Uuid,
    pub role: String,
}

/// Membership update: role change and/or (de)activation
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMemberRequest {
    pub role: Option<String>,
    pub is_active: Option<bool>,
}

/// Create list request
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CreateListRequest {
    pub title: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateListRequest {
    pub title: Option<String>,
    pub is_archived: Option<bool>,
}

/// Create card request
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CreateCardRequest {
    pub title: String,
    pub description: Option<String>,
}

/// Partial card update
///
/// An empty `description` clears it.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCardRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_archived: Option<bool>,
}

/// Single-item move of a list
#[derive(Deserialize, Serialize, Debug, Clone, Copy)]
#[serde(rename_all = "camelCase")]
pub struct MoveListRequest {
    pub order: i64,
}

/// Card move
///
/// With `listId` naming another list this is a cross-list move and `order`
/// defaults to 0. Otherwise it is a move within the current list and `order`
/// is required.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, Default)]
#[serde(rename_all = "camelCase")]
pub struct MoveCardRequest {
    pub list_id: Option<Uuid>,
    pub order: Option<i64>,
}

/// Bulk reorder request for lists or cards
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ReorderRequest {
    pub items: Vec<OrderAssignment>,
}

/// Listing query string
#[derive(Deserialize, Debug, Clone, Copy, Default)]
#[serde(rename_all = "camelCase")]
pub struct ListingQuery {
    #[serde(default)]
    pub include_archived: bool,
}

/// A list together with its visible cards
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ListWithCards {
    #[serde(flatten)]
    pub list: BoardList,
    pub cards: Vec<Card>,
}

/// Full board view returned by `GET /api/boards/{board_id}`
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BoardDetails {
    #[serde(flatten)]
    pub board: Board,
    /// Role the caller holds on this board
    pub role: EffectiveRole,
    pub lists: Vec<ListWithCards>,
}
