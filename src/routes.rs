use axum::http::header::CACHE_CONTROL;
use axum::http::HeaderValue;
use axum::{
    middleware,
    routing::{get, post, MethodRouter},
    Router,
};
use tower::ServiceBuilder;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::config::HELLO_PATH;
use crate::handlers;
use crate::models::AppState;

/// Gated GET routes a client may be sent back to after logging in.
pub const PROTECTED_GET_ROUTES: [&str; 1] = [HELLO_PATH];

pub fn is_protected_get_route(path: &str) -> bool {
    PROTECTED_GET_ROUTES.contains(&path)
}

/// Route table for the whole service, with the authentication gate layered
/// over every route, static mount and the fallback.
pub fn build_router(state: AppState) -> Router {
    let config = state.config.clone();

    let logout: MethodRouter<AppState> = if config.csrf_protection {
        post(handlers::auth::logout)
    } else {
        get(handlers::auth::logout).post(handlers::auth::logout)
    };

    let mut router = Router::new()
        .route(HELLO_PATH, get(handlers::hello::hello))
        .route(&config.logout_url, logout);

    router = if config.login_page == config.login_processing_url {
        router.route(
            &config.login_page,
            get(handlers::auth::login_get).post(handlers::auth::login_post),
        )
    } else {
        router
            .route(&config.login_page, get(handlers::auth::login_get))
            .route(&config.login_processing_url, post(handlers::auth::login_post))
    };

    for prefix in &config.exempt_prefixes {
        let mount = prefix.trim_end_matches('/');
        let dir = config.static_dir.join(mount.trim_start_matches('/'));
        router = router.nest_service(
            mount,
            ServiceBuilder::new()
                .layer(SetResponseHeaderLayer::if_not_present(
                    CACHE_CONTROL,
                    HeaderValue::from_static("public, max-age=3600"),
                ))
                .service(ServeDir::new(dir)),
        );
    }

    router
        .fallback(handlers::system::not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            handlers::middleware::auth_gate,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
