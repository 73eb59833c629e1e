/**
 * API Route Handlers
 *
 * Wires the board handlers to their paths.
 *
 * # Routes
 *
 * ## Boards
 * - `POST /api/boards`
 * - `GET|PATCH|DELETE /api/boards/{board_id}`
 *
 * ## Members
 * - `GET|POST /api/boards/{board_id}/members`
 * - `PATCH|DELETE /api/boards/{board_id}/members/{user_id}`
 *
 * ## Lists
 * - `GET|POST /api/boards/{board_id}/lists`
 * - `PUT /api/boards/{board_id}/lists/reorder`
 * - `PATCH|DELETE /api/boards/{board_id}/lists/{list_id}`
 * - `PUT /api/boards/{board_id}/lists/{list_id}/position`
 *
 * ## Cards
 * - `GET|POST /api/boards/{board_id}/lists/{list_id}/cards`
 * - `PUT /api/boards/{board_id}/lists/{list_id}/cards/reorder`
 * - `PATCH|DELETE /api/boards/{board_id}/cards/{card_id}`
 * - `PUT /api/boards/{board_id}/cards/{card_id}/position`
 */

use axum::{
    routing::{get, patch, post, put},
    Router,
};

use crate::backend::boards::handlers::{
    create_board, create_card, create_list, delete_board, delete_card, delete_list, get_board,
    invite_member, list_cards, list_lists, list_members, move_card, move_list, remove_member,
    reorder_cards, reorder_lists, update_board, update_card, update_list, update_member,
};
use crate::backend::server::state::AppState;

/// Configure API routes
///
/// # Arguments
///
/// * `router` - The router to add routes to
///
/// # Returns
///
/// Router with API routes configured
///
/// # Authentication
///
/// `GET` routes accept anonymous callers, which only succeeds on public
/// boards. Every other route requires a JWT in the `Authorization` header.
pub fn configure_api_routes(router: Router<AppState>) -> Router<AppState> {
    router
        // Boards
        .route("/api/boards", post(create_board))
        .route(
            "/api/boards/{board_id}",
            get(get_board).patch(update_board).delete(delete_board),
        )
        // Members
        .route(
            "/api/boards/{board_id}/members",
            get(list_members).post(invite_member),
        )
        .route(
            "/api/boards/{board_id}/members/{user_id}",
            patch(update_member).delete(remove_member),
        )
        // Lists
        .route(
            "/api/boards/{board_id}/lists",
            get(list_lists).post(create_list),
        )
        .route("/api/boards/{board_id}/lists/reorder", put(reorder_lists))
        .route(
            "/api/boards/{board_id}/lists/{list_id}",
            patch(update_list).delete(delete_list),
        )
        .route(
            "/api/boards/{board_id}/lists/{list_id}/position",
            put(move_list),
        )
        // Cards
        .route(
            "/api/boards/{board_id}/lists/{list_id}/cards",
            get(list_cards).post(create_card),
        )
        .route(
            "/api/boards/{board_id}/lists/{list_id}/cards/reorder",
            put(reorder_cards),
        )
        .route(
            "/api/boards/{board_id}/cards/{card_id}",
            patch(update_card).delete(delete_card),
        )
        .route(
            "/api/boards/{board_id}/cards/{card_id}/position",
            put(move_card),
        )
}
