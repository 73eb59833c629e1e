//! Access evaluation
//!
//! The single place that answers "can user X do Y on board Z". The caller
//! resolves an [`Actor`] once per request and then asks [`authorize`] for
//! each capability.
//!
//! Evaluation order, first match wins:
//! 1. the board owner may do anything
//! 2. a read on a public board is allowed for anyone
//! 3. no active membership means `AccessDenied`
//! 4. otherwise the membership's permission bit decides, failing with
//!    `InsufficientPermission`

use serde::Serialize;
use uuid::Uuid;

use crate::shared::error::BoardError;
use crate::shared::model::{Board, Membership};
use crate::shared::permissions::{Capability, Role};

/// Who is acting on a board, resolved once per request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Actor {
    Owner(Uuid),
    Member(Membership),
    /// Unauthenticated, or authenticated without any membership row
    Anonymous(Option<Uuid>),
}

impl Actor {
    /// Resolve the actor for `user` on `board`
    ///
    /// `membership` must be the (board, user) membership if one exists,
    /// active or not.
    pub fn resolve(board: &Board, user: Option<Uuid>, membership: Option<Membership>) -> Self {
        match (user, membership) {
            (Some(user_id), _) if board.is_owned_by(user_id) => Actor::Owner(user_id),
            (Some(user_id), Some(m)) if m.user_id() == user_id && m.board_id() == board.id => {
                Actor::Member(m)
            }
            (user, _) => Actor::Anonymous(user),
        }
    }

    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            Actor::Owner(id) => Some(*id),
            Actor::Member(m) => Some(m.user_id()),
            Actor::Anonymous(id) => *id,
        }
    }
}

/// Role the actor effectively holds after a successful check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EffectiveRole {
    Owner,
    Admin,
    Editor,
    Viewer,
    /// Non-member reading a public board
    PublicReader,
}

impl From<Role> for EffectiveRole {
    fn from(role: Role) -> Self {
        match role {
            Role::Admin => EffectiveRole::Admin,
            Role::Editor => EffectiveRole::Editor,
            Role::Viewer => EffectiveRole::Viewer,
        }
    }
}

/// Check `capability` for `actor` on `board`
pub fn authorize(
    actor: &Actor,
    board: &Board,
    capability: Capability,
) -> Result<EffectiveRole, BoardError> {
    if let Actor::Owner(user_id) = actor {
        if board.is_owned_by(*user_id) {
            return Ok(EffectiveRole::Owner);
        }
    }

    if capability.is_read() && board.is_public {
        return Ok(match actor {
            Actor::Member(m) if m.is_active => m.role().into(),
            _ => EffectiveRole::PublicReader,
        });
    }

    let membership = match actor {
        Actor::Member(m) if m.is_active && m.board_id() == board.id => m,
        _ => {
            tracing::warn!(
                board_id = %board.id,
                user_id = ?actor.user_id(),
                capability = %capability,
                "access denied: no active membership"
            );
            return Err(BoardError::AccessDenied);
        }
    };

    if membership.permissions().allows(capability) {
        Ok(membership.role().into())
    } else {
        tracing::warn!(
            board_id = %board.id,
            user_id = %membership.user_id(),
            role = %membership.role(),
            capability = %capability,
            "access denied: insufficient permission"
        );
        Err(BoardError::InsufficientPermission {
            capability: capability.as_str().to_string(),
        })
    }
}

/// Boolean form of [`authorize`]
pub fn can_act(actor: &Actor, board: &Board, capability: Capability) -> bool {
    authorize(actor, board, capability).is_ok()
}

/// Read access check, returning the role the reader holds
pub fn require_access(actor: &Actor, board: &Board) -> Result<EffectiveRole, BoardError> {
    authorize(actor, board, Capability::Read)
}
