use axum::Router;

use crate::features::{competitions, essays, leaderboard, scoring};
use crate::state::AppState;

pub fn api_routes() -> Router<AppState> {
    let admin = Router::new()
        .nest("/essays", essays::routes::admin_routes())
        .nest(
            "/competitions",
            competitions::routes::admin_routes().merge(scoring::routes::admin_routes()),
        );

    let api = Router::new()
        .nest(
            "/essays",
            essays::routes::routes().merge(scoring::routes::essay_routes()),
        )
        .nest(
            "/competitions",
            competitions::routes::routes().merge(leaderboard::routes::routes()),
        )
        .nest("/admin", admin);

    Router::new().nest("/api", api)
}
