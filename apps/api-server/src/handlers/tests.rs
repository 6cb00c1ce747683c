use std::sync::Arc;

use actix_web::{App, http::StatusCode, test};
use serde_json::{Value, json};
use uuid::Uuid;

use async_trait::async_trait;
use portal_core::UserService;
use portal_core::domain::{Actor, NewUser, User, UserRole};
use portal_core::error::RepoError;
use portal_core::ports::{BaseRepository, PasswordService, TokenService, UserRepository};
use portal_infra::{Argon2PasswordService, JwtConfig, JwtTokenService};

use super::configure_app;
use crate::observability::{REQUEST_ID_HEADER, RequestIdMiddleware};
use crate::state::AppState;

macro_rules! test_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .wrap(RequestIdMiddleware)
                .configure(configure_app($state.clone())),
        )
        .await
    };
}

fn state() -> AppState {
    let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(JwtConfig {
        secret: "endpoint-test-secret".to_string(),
        ..JwtConfig::default()
    }));
    let passwords: Arc<dyn PasswordService> = Arc::new(Argon2PasswordService::new());
    AppState::in_memory(tokens, passwords)
}

async fn bootstrapped_state() -> AppState {
    let state = state();
    state.users.bootstrap_default_admin().await.unwrap();
    state
}

/// Any signed token is enough for content writes.
fn editor_bearer(state: &AppState) -> String {
    let token = state
        .tokens
        .generate_token(Uuid::new_v4(), "bientap", UserRole::Admin)
        .unwrap();
    format!("Bearer {token}")
}

async fn bearer_for(state: &AppState, username: &str) -> String {
    let user = state.users.find_by_username(username).await.unwrap().unwrap();
    let token = state
        .tokens
        .generate_token(user.id, &user.username, user.role)
        .unwrap();
    format!("Bearer {token}")
}

#[actix_web::test]
async fn test_health_reports_in_memory_storage() {
    let state = state();
    let app = test_app!(state);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/api/health").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["storage"], "memory");
}

#[actix_web::test]
async fn test_login_issues_token_usable_on_me() {
    let state = bootstrapped_state().await;
    let app = test_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({"username": "admin", "password": "admin123"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["tokenType"], "Bearer");
    assert_eq!(body["user"]["role"], "SUPER_ADMIN");
    let token = body["accessToken"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri("/api/auth/me")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["username"], "admin");
    assert!(body["lastLogin"].is_string());
    assert!(body.get("passwordHash").is_none());
}

#[actix_web::test]
async fn test_login_with_wrong_password_is_rejected() {
    let state = bootstrapped_state().await;
    let app = test_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({"username": "admin", "password": "wrong-password"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert!(body.get("accessToken").is_none());
}

#[actix_web::test]
async fn test_auth_check_never_fails() {
    let state = state();
    let app = test_app!(state);

    let req = test::TestRequest::get()
        .uri("/api/auth/check")
        .insert_header(("Authorization", "Bearer not-a-token"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["authenticated"], false);
}

#[actix_web::test]
async fn test_auth_check_for_deleted_account_is_unauthenticated() {
    let state = state();
    let app = test_app!(state);

    let req = test::TestRequest::get()
        .uri("/api/auth/check")
        .insert_header(("Authorization", editor_bearer(&state)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["authenticated"], false);
}

/// User table that is never reachable.
struct UnreachableUsers;

fn offline<T>() -> Result<T, RepoError> {
    Err(RepoError::Connection("connection refused".to_string()))
}

#[async_trait]
impl BaseRepository<User, Uuid> for UnreachableUsers {
    async fn find_by_id(&self, _id: Uuid) -> Result<Option<User>, RepoError> {
        offline()
    }
    async fn insert(&self, _entity: User) -> Result<User, RepoError> {
        offline()
    }
    async fn update(&self, _entity: User) -> Result<User, RepoError> {
        offline()
    }
    async fn delete(&self, _id: Uuid) -> Result<bool, RepoError> {
        offline()
    }
    async fn exists(&self, _id: Uuid) -> Result<bool, RepoError> {
        offline()
    }
}

#[async_trait]
impl UserRepository for UnreachableUsers {
    async fn find_by_username(&self, _username: &str) -> Result<Option<User>, RepoError> {
        offline()
    }
    async fn find_active_by_username(&self, _username: &str) -> Result<Option<User>, RepoError> {
        offline()
    }
    async fn list_newest_first(&self) -> Result<Vec<User>, RepoError> {
        offline()
    }
    async fn find_by_role(&self, _role: UserRole) -> Result<Vec<User>, RepoError> {
        offline()
    }
    async fn count(&self) -> Result<u64, RepoError> {
        offline()
    }
    async fn count_active(&self) -> Result<u64, RepoError> {
        offline()
    }
    async fn exists_by_username(&self, _username: &str) -> Result<bool, RepoError> {
        offline()
    }
}

#[actix_web::test]
async fn test_auth_check_surfaces_storage_failure() {
    let mut state = state();
    state.users = UserService::new(
        Arc::new(UnreachableUsers),
        Arc::new(Argon2PasswordService::new()),
    );
    let app = test_app!(state);

    let req = test::TestRequest::get()
        .uri("/api/auth/check")
        .insert_header(("Authorization", editor_bearer(&state)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "INTERNAL");
    assert!(body.get("authenticated").is_none());
}

#[actix_web::test]
async fn test_write_without_token_is_unauthenticated_and_echoes_request_id() {
    let state = state();
    let app = test_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/categories")
        .insert_header((REQUEST_ID_HEADER, "req-42"))
        .set_json(json!({"name": "Tin tức", "type": "POST"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(resp.headers().get("x-request-id").unwrap(), "req-42");
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "UNAUTHENTICATED");
    assert_eq!(body["requestId"], "req-42");
}

#[actix_web::test]
async fn test_category_duplicate_and_delete_policies() {
    let state = state();
    let app = test_app!(state);
    let bearer = editor_bearer(&state);

    let req = test::TestRequest::post()
        .uri("/api/categories")
        .insert_header(("Authorization", bearer.clone()))
        .set_json(json!({"name": "Chợ", "type": "LOCATION", "icon": "shop"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let category: Value = test::read_body_json(resp).await;
    let category_id = category["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri("/api/categories")
        .insert_header(("Authorization", bearer.clone()))
        .set_json(json!({"name": "Chợ", "type": "LOCATION"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "DUPLICATE");

    let req = test::TestRequest::post()
        .uri("/api/locations")
        .insert_header(("Authorization", bearer.clone()))
        .set_json(json!({
            "name": "Chợ Trung tâm",
            "address": "Đường Trần Phú",
            "categoryId": category_id,
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let location: Value = test::read_body_json(resp).await;
    let location_id = location["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::delete()
        .uri(&format!("/api/categories/{category_id}"))
        .insert_header(("Authorization", bearer.clone()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "CONFLICT");

    let req = test::TestRequest::delete()
        .uri(&format!("/api/categories/{category_id}/force"))
        .insert_header(("Authorization", bearer))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri(&format!("/api/locations/{location_id}"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_category_check_reports_existence() {
    let state = state();
    let app = test_app!(state);
    let bearer = editor_bearer(&state);

    let req = test::TestRequest::post()
        .uri("/api/categories")
        .insert_header(("Authorization", bearer))
        .set_json(json!({"name": "Thông báo", "type": "POST"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

    let req = test::TestRequest::get()
        .uri("/api/categories/check?name=Th%C3%B4ng%20b%C3%A1o&type=POST")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["exists"], true);

    let req = test::TestRequest::get()
        .uri("/api/categories/check?name=Th%C3%B4ng%20b%C3%A1o&type=LOCATION")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["exists"], false);
}

#[actix_web::test]
async fn test_post_view_counts_and_preview_does_not() {
    let state = state();
    let app = test_app!(state);
    let bearer = editor_bearer(&state);

    let req = test::TestRequest::post()
        .uri("/api/categories")
        .insert_header(("Authorization", bearer.clone()))
        .set_json(json!({"name": "Tin tức", "type": "POST"}))
        .to_request();
    let category: Value = test::call_and_read_body_json(&app, req).await;

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .insert_header(("Authorization", bearer))
        .set_json(json!({
            "title": "Lịch tiếp công dân",
            "content": "Nội dung",
            "categoryId": category["id"],
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let post: Value = test::read_body_json(resp).await;
    assert_eq!(post["author"], "UBND Phường Móng Cái 1");
    let post_id = post["id"].as_str().unwrap().to_string();

    for expected in 1..=2 {
        let req = test::TestRequest::get()
            .uri(&format!("/api/posts/{post_id}"))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["viewCount"], expected);
    }

    let req = test::TestRequest::get()
        .uri(&format!("/api/posts/{post_id}/preview"))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["viewCount"], 2);
}

#[actix_web::test]
async fn test_post_in_location_category_is_an_argument_error() {
    let state = state();
    let app = test_app!(state);
    let bearer = editor_bearer(&state);

    let req = test::TestRequest::post()
        .uri("/api/categories")
        .insert_header(("Authorization", bearer.clone()))
        .set_json(json!({"name": "Khách sạn", "type": "LOCATION"}))
        .to_request();
    let category: Value = test::call_and_read_body_json(&app, req).await;

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .insert_header(("Authorization", bearer))
        .set_json(json!({
            "title": "Sai danh mục",
            "content": "Nội dung",
            "categoryId": category["id"],
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "INVALID_ARGUMENT");
}

#[actix_web::test]
async fn test_post_listing_filter_precedence() {
    let state = state();
    let app = test_app!(state);
    let bearer = editor_bearer(&state);

    let req = test::TestRequest::post()
        .uri("/api/categories")
        .insert_header(("Authorization", bearer.clone()))
        .set_json(json!({"name": "Sự kiện", "type": "POST"}))
        .to_request();
    let category: Value = test::call_and_read_body_json(&app, req).await;
    let category_id = category["id"].as_str().unwrap().to_string();

    for (title, featured) in [("Lễ hội", true), ("Hội chợ", false)] {
        let req = test::TestRequest::post()
            .uri("/api/posts")
            .insert_header(("Authorization", bearer.clone()))
            .set_json(json!({
                "title": title,
                "content": "Nội dung",
                "categoryId": category_id,
                "isFeatured": featured,
            }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);
    }

    let req = test::TestRequest::get().uri("/api/posts?featured=true").to_request();
    let page: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(page["totalElements"], 1);
    assert_eq!(page["content"][0]["title"], "Lễ hội");

    let req = test::TestRequest::get()
        .uri(&format!("/api/posts?categoryId={category_id}&featured=true"))
        .to_request();
    let page: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(page["totalElements"], 2);
    assert_eq!(page["size"], 10);

    let req = test::TestRequest::get().uri("/api/posts?sortBy=rating").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::get()
        .uri("/api/posts?startDate=2020-01-01T00:00:00&endDate=2019-01-01T00:00:00")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_bounds_query_returns_locations_inside_box() {
    let state = state();
    let app = test_app!(state);
    let bearer = editor_bearer(&state);

    let req = test::TestRequest::post()
        .uri("/api/categories")
        .insert_header(("Authorization", bearer.clone()))
        .set_json(json!({"name": "Di tích", "type": "LOCATION"}))
        .to_request();
    let category: Value = test::call_and_read_body_json(&app, req).await;

    for (name, lat, lng) in [("Đình Trà Cổ", 21.47, 108.05), ("Hà Nội", 21.02, 105.85)] {
        let req = test::TestRequest::post()
            .uri("/api/locations")
            .insert_header(("Authorization", bearer.clone()))
            .set_json(json!({
                "name": name,
                "address": "Quảng Ninh",
                "categoryId": category["id"],
                "latitude": lat,
                "longitude": lng,
            }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);
    }

    let req = test::TestRequest::get()
        .uri("/api/locations/bounds?minLat=21.4&maxLat=21.6&minLng=107.9&maxLng=108.1")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Đình Trà Cổ"]);

    let req = test::TestRequest::get()
        .uri("/api/locations/bounds?minLat=22&maxLat=21&minLng=107&maxLng=108")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_admin_role_cannot_manage_users_but_can_read_self() {
    let state = bootstrapped_state().await;
    let super_admin = state.users.find_by_username("admin").await.unwrap().unwrap();
    let editor = state
        .users
        .create(
            &Actor::new(super_admin.id, "admin", UserRole::SuperAdmin),
            NewUser {
                username: "bientap".to_string(),
                password: "matkhau1".to_string(),
                full_name: None,
                email: None,
                role: UserRole::Admin,
            },
        )
        .await
        .unwrap();
    let app = test_app!(state);
    let bearer = bearer_for(&state, "bientap").await;

    let req = test::TestRequest::get()
        .uri("/api/users")
        .insert_header(("Authorization", bearer.clone()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "FORBIDDEN");

    let req = test::TestRequest::get()
        .uri(&format!("/api/users/{}", editor.id))
        .insert_header(("Authorization", bearer.clone()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::put()
        .uri(&format!("/api/users/{}", editor.id))
        .insert_header(("Authorization", bearer))
        .set_json(json!({"role": "SUPER_ADMIN"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn test_super_admin_cannot_delete_own_account() {
    let state = bootstrapped_state().await;
    let admin = state.users.find_by_username("admin").await.unwrap().unwrap();
    let app = test_app!(state);
    let bearer = bearer_for(&state, "admin").await;

    let req = test::TestRequest::delete()
        .uri(&format!("/api/users/{}", admin.id))
        .insert_header(("Authorization", bearer.clone()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::get()
        .uri("/api/users/stats")
        .insert_header(("Authorization", bearer))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["totalUsers"], 1);
    assert_eq!(body["activeUsers"], 1);
}

#[cfg(feature = "rate-limit")]
#[actix_web::test]
async fn test_login_is_rate_limited_per_client() {
    use portal_infra::{InMemoryRateLimiter, RateLimitConfig};
    use std::time::Duration;

    let mut state = state();
    state.login_limiter = Some(Arc::new(
        InMemoryRateLimiter::new(RateLimitConfig {
            max_requests: 1,
            window: Duration::from_secs(60),
        })
        .unwrap(),
    ));
    let app = test_app!(state);

    let login = || {
        test::TestRequest::post()
            .uri("/api/auth/login")
            .peer_addr("10.0.0.7:40000".parse().unwrap())
            .set_json(json!({"username": "ghost", "password": "whatever"}))
            .to_request()
    };

    let resp = test::call_service(&app, login()).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = test::call_service(&app, login()).await;
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(resp.headers().contains_key("retry-after"));
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "RATE_LIMITED");
}
