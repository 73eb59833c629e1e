/**
 * PostgreSQL Store
 *
 * sqlx-backed implementation of `BoardStore`.
 *
 * # Concurrency
 *
 * Every ordering mutation runs in its own transaction that begins by taking
 * `SELECT ... FOR UPDATE` on the parent row (the board for lists, the list
 * for cards). Two requests touching the same parent therefore queue behind
 * each other, and the sibling snapshot the planner sees cannot change before
 * the transaction commits. Cross-list card moves lock both lists in id
 * order so opposite moves cannot deadlock.
 *
 * Lists additionally carry a deferred `UNIQUE (board_id, position)`
 * constraint. Unique violations, serialization failures and deadlocks are
 * reported as `OrderingConflict`, which the caller may retry.
 */

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Row, Transaction};
use uuid::Uuid;

use crate::backend::error::{BackendError, BackendResult};
use crate::backend::store::BoardStore;
use crate::shared::ordering::{self, Sibling};
use crate::shared::{
    resolve, Board, BoardError, BoardList, Card, Membership, OrderAssignment, OrderingOp, Parent,
    Role,
};

const UNIQUE_VIOLATION: &str = "23505";
const SERIALIZATION_FAILURE: &str = "40001";
const DEADLOCK_DETECTED: &str = "40P01";

/// Store backed by a PostgreSQL pool
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run the embedded migrations
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!().run(&self.pool).await
    }
}

/// Translate contention errors on `parent` into `OrderingConflict`
fn ordering_error(parent: Uuid, err: sqlx::Error) -> BackendError {
    if let sqlx::Error::Database(db_err) = &err {
        if matches!(
            db_err.code().as_deref(),
            Some(UNIQUE_VIOLATION) | Some(SERIALIZATION_FAILURE) | Some(DEADLOCK_DETECTED)
        ) {
            tracing::warn!("Ordering conflict under {}: {}", parent, db_err);
            return BoardError::OrderingConflict { parent }.into();
        }
    }
    tracing::error!("Ordering write failed under {}: {:?}", parent, err);
    err.into()
}

fn board_from_row(row: &PgRow) -> Board {
    Board::restore(
        row.get("id"),
        row.get("owner_id"),
        row.get("title"),
        row.get("is_public"),
        row.get("is_archived"),
        row.get("last_activity"),
        row.get("created_at"),
    )
}

fn membership_from_row(row: &PgRow) -> BackendResult<Membership> {
    let role: Role = row.get::<String, _>("role").parse()?;
    Ok(Membership::restore(
        row.get("id"),
        row.get("board_id"),
        row.get("user_id"),
        role,
        row.get("is_active"),
        row.get("invited_by"),
        row.get("invited_at"),
        row.get("joined_at"),
    ))
}

fn list_from_row(row: &PgRow) -> BoardList {
    BoardList::restore(
        row.get("id"),
        row.get("board_id"),
        row.get("title"),
        row.get("position"),
        row.get("is_archived"),
        row.get("created_at"),
    )
}

fn card_from_row(row: &PgRow) -> Card {
    Card::restore(
        row.get("id"),
        row.get("list_id"),
        row.get("board_id"),
        row.get("title"),
        row.get("description"),
        row.get("position"),
        row.get("is_archived"),
        row.get("created_at"),
    )
}

const BOARD_COLUMNS: &str = "id, owner_id, title, is_public, is_archived, last_activity, created_at";
const MEMBERSHIP_COLUMNS: &str =
    "id, board_id, user_id, role, is_active, invited_by, invited_at, joined_at";
const LIST_COLUMNS: &str = "id, board_id, title, position, is_archived, created_at";
const CARD_COLUMNS: &str =
    "id, list_id, board_id, title, description, position, is_archived, created_at";

/// Lock the parent row for the rest of the transaction
async fn lock_parent(tx: &mut Transaction<'_, Postgres>, parent: Parent) -> BackendResult<()> {
    let (sql, entity) = match parent {
        Parent::Board(_) => ("SELECT id FROM boards WHERE id = $1 FOR UPDATE", "board"),
        Parent::List(_) => ("SELECT id FROM board_lists WHERE id = $1 FOR UPDATE", "list"),
    };
    sqlx::query(sql)
        .bind(parent.id())
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| ordering_error(parent.id(), e))?
        .ok_or(BoardError::not_found(entity, parent.id()))?;
    Ok(())
}

async fn load_siblings(
    tx: &mut Transaction<'_, Postgres>,
    parent: Parent,
) -> BackendResult<Vec<Sibling>> {
    let sql = match parent {
        Parent::Board(_) => "SELECT id, position FROM board_lists WHERE board_id = $1",
        Parent::List(_) => "SELECT id, position FROM cards WHERE list_id = $1",
    };
    let rows = sqlx::query(sql)
        .bind(parent.id())
        .fetch_all(&mut **tx)
        .await?;
    Ok(rows
        .iter()
        .map(|row| Sibling {
            id: row.get("id"),
            order: row.get("position"),
        })
        .collect())
}

#[async_trait]
impl BoardStore for PgStore {
    async fn insert_board(&self, board: &Board) -> BackendResult<()> {
        sqlx::query(
            r#"
            INSERT INTO boards (id, owner_id, title, is_public, is_archived, last_activity, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(board.id)
        .bind(board.owner_id())
        .bind(&board.title)
        .bind(board.is_public)
        .bind(board.is_archived)
        .bind(board.last_activity)
        .bind(board.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_board(&self, board_id: Uuid) -> BackendResult<Option<Board>> {
        let row = sqlx::query(&format!("SELECT {BOARD_COLUMNS} FROM boards WHERE id = $1"))
            .bind(board_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(board_from_row))
    }

    async fn update_board(&self, board: &Board) -> BackendResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE boards
            SET title = $1, is_public = $2, is_archived = $3, last_activity = $4
            WHERE id = $5
            "#,
        )
        .bind(&board.title)
        .bind(board.is_public)
        .bind(board.is_archived)
        .bind(board.last_activity)
        .bind(board.id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(BoardError::not_found("board", board.id).into());
        }
        Ok(())
    }

    async fn delete_board(&self, board_id: Uuid) -> BackendResult<()> {
        // memberships, lists and cards cascade
        sqlx::query("DELETE FROM boards WHERE id = $1")
            .bind(board_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn touch_board(&self, board_id: Uuid, at: DateTime<Utc>) -> BackendResult<()> {
        sqlx::query("UPDATE boards SET last_activity = GREATEST(last_activity, $1) WHERE id = $2")
            .bind(at)
            .bind(board_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_membership(
        &self,
        board_id: Uuid,
        user_id: Uuid,
    ) -> BackendResult<Option<Membership>> {
        let row = sqlx::query(&format!(
            "SELECT {MEMBERSHIP_COLUMNS} FROM board_memberships WHERE board_id = $1 AND user_id = $2"
        ))
        .bind(board_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(membership_from_row).transpose()
    }

    async fn list_memberships(&self, board_id: Uuid) -> BackendResult<Vec<Membership>> {
        let rows = sqlx::query(&format!(
            "SELECT {MEMBERSHIP_COLUMNS} FROM board_memberships WHERE board_id = $1 ORDER BY invited_at ASC"
        ))
        .bind(board_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(membership_from_row).collect()
    }

    async fn insert_membership(&self, membership: &Membership) -> BackendResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO board_memberships
                (id, board_id, user_id, role, permissions, is_active, invited_by, invited_at, joined_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(membership.id)
        .bind(membership.board_id())
        .bind(membership.user_id())
        .bind(membership.role().as_str())
        .bind(Json(*membership.permissions()))
        .bind(membership.is_active)
        .bind(membership.invited_by)
        .bind(membership.invited_at)
        .bind(membership.joined_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err))
                if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) =>
            {
                Err(BoardError::MembershipExists {
                    board: membership.board_id(),
                    user: membership.user_id(),
                }
                .into())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn update_membership(
        &self,
        board_id: Uuid,
        user_id: Uuid,
        role: Option<Role>,
        is_active: Option<bool>,
    ) -> BackendResult<Membership> {
        // untouched columns keep their current value, so concurrent updates
        // of different fields cannot undo each other
        let row = sqlx::query(&format!(
            r#"
            UPDATE board_memberships
            SET role = COALESCE($1, role),
                permissions = COALESCE($2, permissions),
                is_active = COALESCE($3, is_active)
            WHERE board_id = $4 AND user_id = $5
            RETURNING {MEMBERSHIP_COLUMNS}
            "#
        ))
        .bind(role.map(|r| r.as_str()))
        .bind(role.map(|r| Json(resolve(r))))
        .bind(is_active)
        .bind(board_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        match row {
            Some(row) => membership_from_row(&row),
            None => Err(BoardError::not_found("membership", user_id).into()),
        }
    }

    async fn delete_membership(&self, board_id: Uuid, user_id: Uuid) -> BackendResult<bool> {
        let result = sqlx::query("DELETE FROM board_memberships WHERE board_id = $1 AND user_id = $2")
            .bind(board_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn append_list(&self, mut list: BoardList) -> BackendResult<BoardList> {
        let parent = Parent::Board(list.board_id());
        let mut tx = self.pool.begin().await?;
        lock_parent(&mut tx, parent).await?;
        list.order = ordering::append_position(parent, &load_siblings(&mut tx, parent).await?)?;

        sqlx::query(
            r#"
            INSERT INTO board_lists (id, board_id, title, position, is_archived, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(list.id)
        .bind(list.board_id())
        .bind(&list.title)
        .bind(list.order)
        .bind(list.is_archived)
        .bind(list.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| ordering_error(parent.id(), e))?;

        tx.commit()
            .await
            .map_err(|e| ordering_error(parent.id(), e))?;
        Ok(list)
    }

    async fn get_list(&self, list_id: Uuid) -> BackendResult<Option<BoardList>> {
        let row = sqlx::query(&format!("SELECT {LIST_COLUMNS} FROM board_lists WHERE id = $1"))
            .bind(list_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(list_from_row))
    }

    async fn lists_for_board(&self, board_id: Uuid) -> BackendResult<Vec<BoardList>> {
        let rows = sqlx::query(&format!(
            "SELECT {LIST_COLUMNS} FROM board_lists WHERE board_id = $1"
        ))
        .bind(board_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(list_from_row).collect())
    }

    async fn update_list(&self, list: &BoardList) -> BackendResult<()> {
        let result = sqlx::query("UPDATE board_lists SET title = $1, is_archived = $2 WHERE id = $3")
            .bind(&list.title)
            .bind(list.is_archived)
            .bind(list.id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(BoardError::not_found("list", list.id).into());
        }
        Ok(())
    }

    async fn delete_list(&self, list_id: Uuid) -> BackendResult<()> {
        sqlx::query("DELETE FROM board_lists WHERE id = $1")
            .bind(list_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn append_card(&self, mut card: Card) -> BackendResult<Card> {
        let parent = Parent::List(card.list_id());
        let mut tx = self.pool.begin().await?;
        lock_parent(&mut tx, parent).await?;
        card.order = ordering::append_position(parent, &load_siblings(&mut tx, parent).await?)?;

        sqlx::query(
            r#"
            INSERT INTO cards (id, list_id, board_id, title, description, position, is_archived, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(card.id)
        .bind(card.list_id())
        .bind(card.board_id())
        .bind(&card.title)
        .bind(&card.description)
        .bind(card.order)
        .bind(card.is_archived)
        .bind(card.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| ordering_error(parent.id(), e))?;

        tx.commit()
            .await
            .map_err(|e| ordering_error(parent.id(), e))?;
        Ok(card)
    }

    async fn get_card(&self, card_id: Uuid) -> BackendResult<Option<Card>> {
        let row = sqlx::query(&format!("SELECT {CARD_COLUMNS} FROM cards WHERE id = $1"))
            .bind(card_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(card_from_row))
    }

    async fn cards_for_list(&self, list_id: Uuid) -> BackendResult<Vec<Card>> {
        let rows = sqlx::query(&format!("SELECT {CARD_COLUMNS} FROM cards WHERE list_id = $1"))
            .bind(list_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(card_from_row).collect())
    }

    async fn cards_for_board(&self, board_id: Uuid) -> BackendResult<Vec<Card>> {
        let rows = sqlx::query(&format!("SELECT {CARD_COLUMNS} FROM cards WHERE board_id = $1"))
            .bind(board_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(card_from_row).collect())
    }

    async fn update_card(&self, card: &Card) -> BackendResult<()> {
        let result = sqlx::query(
            "UPDATE cards SET title = $1, description = $2, is_archived = $3 WHERE id = $4",
        )
        .bind(&card.title)
        .bind(&card.description)
        .bind(card.is_archived)
        .bind(card.id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(BoardError::not_found("card", card.id).into());
        }
        Ok(())
    }

    async fn delete_card(&self, card_id: Uuid) -> BackendResult<()> {
        sqlx::query("DELETE FROM cards WHERE id = $1")
            .bind(card_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn apply_ordering(
        &self,
        parent: Parent,
        op: OrderingOp,
    ) -> BackendResult<Vec<OrderAssignment>> {
        let mut tx = self.pool.begin().await?;
        lock_parent(&mut tx, parent).await?;
        let siblings = load_siblings(&mut tx, parent).await?;
        let changes = ordering::plan(parent, &siblings, &op)?;

        let sql = match parent {
            Parent::Board(_) => "UPDATE board_lists SET position = $1 WHERE id = $2",
            Parent::List(_) => "UPDATE cards SET position = $1 WHERE id = $2",
        };
        for change in &changes {
            sqlx::query(sql)
                .bind(change.order)
                .bind(change.id)
                .execute(&mut *tx)
                .await
                .map_err(|e| ordering_error(parent.id(), e))?;
        }

        tx.commit()
            .await
            .map_err(|e| ordering_error(parent.id(), e))?;
        Ok(changes)
    }

    async fn relocate_card(
        &self,
        card_id: Uuid,
        to_list: Uuid,
        order: i64,
    ) -> BackendResult<Card> {
        let mut tx = self.pool.begin().await?;

        let from_list: Uuid = sqlx::query("SELECT list_id FROM cards WHERE id = $1")
            .bind(card_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(BoardError::not_found("card", card_id))?
            .get("list_id");

        let mut lock_ids = vec![from_list, to_list];
        lock_ids.sort();
        lock_ids.dedup();
        sqlx::query("SELECT id FROM board_lists WHERE id = ANY($1) ORDER BY id FOR UPDATE")
            .bind(lock_ids.as_slice())
            .fetch_all(&mut *tx)
            .await
            .map_err(|e| ordering_error(to_list, e))?;

        let mut card = sqlx::query(&format!(
            "SELECT {CARD_COLUMNS} FROM cards WHERE id = $1 FOR UPDATE"
        ))
        .bind(card_id)
        .fetch_optional(&mut *tx)
        .await?
        .as_ref()
        .map(card_from_row)
        .ok_or(BoardError::not_found("card", card_id))?;
        if card.list_id() != from_list {
            // moved by someone else between the read and the lock
            return Err(BoardError::OrderingConflict { parent: from_list }.into());
        }

        let list = sqlx::query(&format!("SELECT {LIST_COLUMNS} FROM board_lists WHERE id = $1"))
            .bind(to_list)
            .fetch_optional(&mut *tx)
            .await?
            .as_ref()
            .map(list_from_row)
            .ok_or(BoardError::not_found("list", to_list))?;
        card.move_to(&list, order)?;

        sqlx::query("UPDATE cards SET list_id = $1, position = $2 WHERE id = $3")
            .bind(card.list_id())
            .bind(card.order)
            .bind(card.id)
            .execute(&mut *tx)
            .await
            .map_err(|e| ordering_error(to_list, e))?;

        tx.commit().await.map_err(|e| ordering_error(to_list, e))?;
        Ok(card)
    }
}
