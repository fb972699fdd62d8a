use axum::routing::get;
use axum::Router;

use crate::ServiceState;

pub mod create;
pub mod delete;
pub mod lookup;
pub mod update;

pub fn router(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .route(
            "/annotations/",
            get(lookup::handler)
                .post(create::handler)
                .put(update::handler)
                .delete(delete::handler),
        )
        .with_state(state)
}
