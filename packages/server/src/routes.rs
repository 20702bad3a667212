use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers;
use crate::state::AppState;

pub fn post_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::post::list_posts,
            handlers::post::create_post
        ))
        .routes(routes!(
            handlers::post::get_post,
            handlers::post::update_post,
            handlers::post::delete_post
        ))
}
