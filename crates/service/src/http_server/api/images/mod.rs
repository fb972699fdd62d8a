use axum::routing::get;
use axum::Router;

use crate::ServiceState;

pub mod delete;
pub mod lookup;
pub mod upload;

pub fn router(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .route(
            "/images/",
            get(lookup::handler)
                .post(upload::handler)
                .delete(delete::handler),
        )
        .with_state(state)
}
