use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::{create_item, delete_item, get_item, list_items, update_item};

pub fn init_catalog_router() -> Router<AppState> {
    Router::new()
        .route("/{family}", get(list_items).post(create_item))
        .route(
            "/{family}/{id}",
            get(get_item).put(update_item).delete(delete_item),
        )
}
