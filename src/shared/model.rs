//! Board, membership, list and card aggregates
//!
//! These types own identity, parent references and lifecycle flags. Parent
//! references that must not change are private and only readable through
//! accessors; a card's list is the one reference that moves.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::BoardError;
use crate::shared::permissions::{resolve, PermissionSet, Role};

/// Project board
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: Uuid,
    owner_id: Uuid,
    pub title: String,
    pub is_public: bool,
    pub is_archived: bool,
    pub last_activity: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Board {
    pub fn new(owner_id: Uuid, title: impl Into<String>, is_public: bool) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_id,
            title: title.into(),
            is_public,
            is_archived: false,
            last_activity: now,
            created_at: now,
        }
    }

    /// Rebuild a board read back from storage
    pub fn restore(
        id: Uuid,
        owner_id: Uuid,
        title: String,
        is_public: bool,
        is_archived: bool,
        last_activity: DateTime<Utc>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            owner_id,
            title,
            is_public,
            is_archived,
            last_activity,
            created_at,
        }
    }

    pub fn owner_id(&self) -> Uuid {
        self.owner_id
    }

    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.owner_id == user_id
    }

    pub fn touch(&mut self, at: DateTime<Utc>) {
        self.last_activity = at;
    }
}

/// Binds one user to one board with a role-derived permission set
///
/// `role` and `permissions` can only change together through
/// [`Membership::set_role`].
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    pub id: Uuid,
    board_id: Uuid,
    user_id: Uuid,
    role: Role,
    permissions: PermissionSet,
    pub is_active: bool,
    pub invited_by: Uuid,
    pub invited_at: DateTime<Utc>,
    pub joined_at: Option<DateTime<Utc>>,
}

impl Membership {
    /// Create the membership produced by an invite
    pub fn invite(board_id: Uuid, user_id: Uuid, role: Role, invited_by: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            board_id,
            user_id,
            role,
            permissions: resolve(role),
            is_active: true,
            invited_by,
            invited_at: now,
            joined_at: Some(now),
        }
    }

    /// Rebuild a membership read back from storage
    ///
    /// Permissions are re-derived from the stored role rather than trusted.
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: Uuid,
        board_id: Uuid,
        user_id: Uuid,
        role: Role,
        is_active: bool,
        invited_by: Uuid,
        invited_at: DateTime<Utc>,
        joined_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            board_id,
            user_id,
            role,
            permissions: resolve(role),
            is_active,
            invited_by,
            invited_at,
            joined_at,
        }
    }

    pub fn board_id(&self) -> Uuid {
        self.board_id
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn permissions(&self) -> &PermissionSet {
        &self.permissions
    }

    /// Replace role and permissions in one step
    pub fn set_role(&mut self, role: Role) {
        self.role = role;
        self.permissions = resolve(role);
    }
}

/// A list (column) on a board
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BoardList {
    pub id: Uuid,
    board_id: Uuid,
    pub title: String,
    pub order: i64,
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
}

impl BoardList {
    /// New list; `order` is assigned by the store on append
    pub fn new(board_id: Uuid, title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            board_id,
            title: title.into(),
            order: 0,
            is_archived: false,
            created_at: Utc::now(),
        }
    }

    pub fn restore(
        id: Uuid,
        board_id: Uuid,
        title: String,
        order: i64,
        is_archived: bool,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            board_id,
            title,
            order,
            is_archived,
            created_at,
        }
    }

    pub fn board_id(&self) -> Uuid {
        self.board_id
    }
}

/// A card inside a list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: Uuid,
    list_id: Uuid,
    board_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub order: i64,
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
}

impl Card {
    /// New card on `list`; the board reference is copied from the list
    pub fn new(list: &BoardList, title: impl Into<String>, description: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            list_id: list.id,
            board_id: list.board_id(),
            title: title.into(),
            description,
            order: 0,
            is_archived: false,
            created_at: Utc::now(),
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: Uuid,
        list_id: Uuid,
        board_id: Uuid,
        title: String,
        description: Option<String>,
        order: i64,
        is_archived: bool,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            list_id,
            board_id,
            title,
            description,
            order,
            is_archived,
            created_at,
        }
    }

    pub fn list_id(&self) -> Uuid {
        self.list_id
    }

    pub fn board_id(&self) -> Uuid {
        self.board_id
    }

    /// Reassign the card to `list`, which must live on the card's board
    pub fn move_to(&mut self, list: &BoardList, order: i64) -> Result<(), BoardError> {
        if list.board_id() != self.board_id {
            return Err(BoardError::CrossBoardMoveNotAllowed {
                card: self.id,
                list: list.id,
            });
        }
        crate::shared::ordering::validate_order(order)?;
        self.list_id = list.id;
        self.order = order;
        Ok(())
    }
}

/// Validate a user-supplied title
pub fn validate_title(title: &str) -> Result<String, BoardError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(BoardError::validation("title", "Title cannot be empty"));
    }
    if trimmed.chars().count() > 200 {
        return Err(BoardError::validation(
            "title",
            "Title cannot exceed 200 characters",
        ));
    }
    Ok(trimmed.to_string())
}
