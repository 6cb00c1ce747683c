//! HTTP handlers and route configuration.

mod auth;
mod categories;
mod health;
mod locations;
mod params;
mod posts;
mod users;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use actix_web::web;
use portal_core::ports::{RateLimiter, TokenService};

use crate::middleware::error::AppError;
use crate::middleware::rate_limit::RateLimitMiddleware;
use crate::state::AppState;

/// Register shared data, extractor settings and every route.
pub fn configure_app(state: AppState) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        let tokens: Arc<dyn TokenService> = state.tokens.clone();
        let login_limiter = state.login_limiter.clone();

        cfg.app_data(web::Data::new(state))
            .app_data(web::Data::new(tokens))
            .app_data(web::JsonConfig::default().error_handler(|err, _req| {
                AppError::BadRequest(format!("Invalid JSON body: {err}")).into()
            }))
            .app_data(web::QueryConfig::default().error_handler(|err, _req| {
                AppError::BadRequest(format!("Invalid query parameters: {err}")).into()
            }))
            .app_data(web::PathConfig::default().error_handler(|err, _req| {
                AppError::BadRequest(format!("Invalid path parameter: {err}")).into()
            }));

        configure_routes(cfg, login_limiter);
    }
}

/// Configure all application routes.
///
/// Literal segments are registered before `/{id}` so they are not captured.
fn configure_routes(cfg: &mut web::ServiceConfig, login_limiter: Option<Arc<dyn RateLimiter>>) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(health::health_check))
            .service(
                web::scope("/auth")
                    .service(
                        web::resource("/login")
                            .wrap(RateLimitMiddleware::new(login_limiter))
                            .route(web::post().to(auth::login)),
                    )
                    .route("/logout", web::post().to(auth::logout))
                    .route("/check", web::get().to(auth::check))
                    .route("/me", web::get().to(auth::me)),
            )
            .service(
                web::scope("/categories")
                    .route("", web::get().to(categories::list))
                    .route("", web::post().to(categories::create))
                    .route("/locations", web::get().to(categories::location_categories))
                    .route("/posts", web::get().to(categories::post_categories))
                    .route("/check", web::get().to(categories::check))
                    .route("/{id}/force", web::delete().to(categories::force_delete))
                    .route("/{id}", web::get().to(categories::get))
                    .route("/{id}", web::put().to(categories::update))
                    .route("/{id}", web::delete().to(categories::delete)),
            )
            .service(
                web::scope("/locations")
                    .route("", web::get().to(locations::list))
                    .route("", web::post().to(locations::create))
                    .route("/simple", web::get().to(locations::list_simple))
                    .route("/with-coordinates", web::get().to(locations::with_coordinates))
                    .route("/with-phone", web::get().to(locations::with_phone))
                    .route("/bounds", web::get().to(locations::within_bounds))
                    .route(
                        "/category/{category_id}/count",
                        web::get().to(locations::count_by_category),
                    )
                    .route("/{id}/permanent", web::delete().to(locations::delete_permanently))
                    .route("/{id}", web::get().to(locations::get))
                    .route("/{id}", web::put().to(locations::update))
                    .route("/{id}", web::delete().to(locations::soft_delete)),
            )
            .service(
                web::scope("/posts")
                    .route("", web::get().to(posts::list))
                    .route("", web::post().to(posts::create))
                    .route("/featured", web::get().to(posts::featured))
                    .route("/urgent", web::get().to(posts::urgent))
                    .route("/recent", web::get().to(posts::recent))
                    .route("/popular", web::get().to(posts::popular))
                    .route("/top-viewed", web::get().to(posts::top_viewed))
                    .route("/stats", web::get().to(posts::stats))
                    .route(
                        "/category/{category_id}/latest",
                        web::get().to(posts::latest_in_category),
                    )
                    .route(
                        "/category/{category_id}/count",
                        web::get().to(posts::count_by_category),
                    )
                    .route("/{id}/preview", web::get().to(posts::preview))
                    .route("/{id}", web::get().to(posts::view))
                    .route("/{id}", web::put().to(posts::update))
                    .route("/{id}", web::delete().to(posts::delete)),
            )
            .service(
                web::scope("/users")
                    .route("", web::get().to(users::list))
                    .route("", web::post().to(users::create))
                    .route("/stats", web::get().to(users::stats))
                    .route("/{id}/password", web::put().to(users::change_password))
                    .route("/{id}/toggle-active", web::put().to(users::toggle_active))
                    .route("/{id}", web::get().to(users::get))
                    .route("/{id}", web::put().to(users::update))
                    .route("/{id}", web::delete().to(users::delete)),
            ),
    );
}
