//! Roles, capabilities and the permission resolver
//!
//! A membership's permission set is never stored independently of its role:
//! it is always the value [`resolve`] returns for that role. The board owner
//! is not a role; ownership is a board attribute handled by the access
//! evaluator, and [`PermissionSet::all`] is only used for that bypass.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::shared::error::BoardError;

/// Membership role
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Editor,
    Viewer,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Editor, Role::Viewer];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Editor => "editor",
            Role::Viewer => "viewer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "editor" => Ok(Role::Editor),
            "viewer" => Ok(Role::Viewer),
            other => Err(BoardError::InvalidRole {
                role: other.to_string(),
            }),
        }
    }
}

/// A single named permission bit
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum Capability {
    /// Read-shaped access; the only capability the public-board bypass grants
    Read,
    EditBoard,
    DeleteBoard,
    InviteMembers,
    RemoveMembers,
    CreateLists,
    EditLists,
    DeleteLists,
    CreateCards,
    EditCards,
    DeleteCards,
    MoveCards,
    Comment,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Read => "read",
            Capability::EditBoard => "editBoard",
            Capability::DeleteBoard => "deleteBoard",
            Capability::InviteMembers => "inviteMembers",
            Capability::RemoveMembers => "removeMembers",
            Capability::CreateLists => "createLists",
            Capability::EditLists => "editLists",
            Capability::DeleteLists => "deleteLists",
            Capability::CreateCards => "createCards",
            Capability::EditCards => "editCards",
            Capability::DeleteCards => "deleteCards",
            Capability::MoveCards => "moveCards",
            Capability::Comment => "comment",
        }
    }

    /// Whether this capability only observes state
    pub fn is_read(&self) -> bool {
        matches!(self, Capability::Read)
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed-shape set of capability flags carried by a membership
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PermissionSet {
    pub edit_board: bool,
    pub delete_board: bool,
    pub invite_members: bool,
    pub remove_members: bool,
    pub create_lists: bool,
    pub edit_lists: bool,
    pub delete_lists: bool,
    pub create_cards: bool,
    pub edit_cards: bool,
    pub delete_cards: bool,
    pub move_cards: bool,
    pub comment: bool,
}

impl PermissionSet {
    /// Every capability, including `deleteBoard`. Owner bypass only.
    pub fn all() -> Self {
        Self {
            edit_board: true,
            delete_board: true,
            invite_members: true,
            remove_members: true,
            create_lists: true,
            edit_lists: true,
            delete_lists: true,
            create_cards: true,
            edit_cards: true,
            delete_cards: true,
            move_cards: true,
            comment: true,
        }
    }

    /// Look up one capability. Any membership may read its board.
    pub fn allows(&self, capability: Capability) -> bool {
        match capability {
            Capability::Read => true,
            Capability::EditBoard => self.edit_board,
            Capability::DeleteBoard => self.delete_board,
            Capability::InviteMembers => self.invite_members,
            Capability::RemoveMembers => self.remove_members,
            Capability::CreateLists => self.create_lists,
            Capability::EditLists => self.edit_lists,
            Capability::DeleteLists => self.delete_lists,
            Capability::CreateCards => self.create_cards,
            Capability::EditCards => self.edit_cards,
            Capability::DeleteCards => self.delete_cards,
            Capability::MoveCards => self.move_cards,
            Capability::Comment => self.comment,
        }
    }
}

/// Map a role to its canonical permission set
pub fn resolve(role: Role) -> PermissionSet {
    match role {
        Role::Admin => PermissionSet {
            edit_board: true,
            delete_board: false,
            invite_members: true,
            remove_members: true,
            create_lists: true,
            edit_lists: true,
            delete_lists: true,
            create_cards: true,
            edit_cards: true,
            delete_cards: true,
            move_cards: true,
            comment: true,
        },
        Role::Editor => PermissionSet {
            edit_board: false,
            delete_board: false,
            invite_members: false,
            remove_members: false,
            create_lists: true,
            edit_lists: true,
            delete_lists: false,
            create_cards: true,
            edit_cards: true,
            delete_cards: false,
            move_cards: true,
            comment: true,
        },
        Role::Viewer => PermissionSet::default(),
    }
}

/// Resolve an unvalidated role name
pub fn resolve_named(role: &str) -> Result<PermissionSet, BoardError> {
    role.parse::<Role>().map(resolve)
}
