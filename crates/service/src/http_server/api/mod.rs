use axum::routing::get;
use axum::Router;

use crate::ServiceState;

pub mod annotations;
pub mod export;
pub mod images;
pub mod ping;
pub mod schema;

pub fn router(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .route("/ping", get(ping::handler))
        .merge(images::router(state.clone()))
        .merge(annotations::router(state.clone()))
        .route("/schema/", get(schema::handler))
        .route("/export_data", get(export::handler))
        .with_state(state)
}
