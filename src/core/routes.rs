// HTTP routes configuration

use crate::core::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Events
        .route("/events", post(crate::handlers::event_create::event_create_handler))
        .route("/events/delete", get(crate::handlers::event_delete::event_delete_handler))

        // Session
        .route("/login", post(crate::handlers::auth::login_handler))
        .route("/logout", post(crate::handlers::auth::logout_handler))
        .route("/user", get(crate::handlers::current_user::current_user_handler))

        .route("/health", get(crate::handlers::health::health_handler))

        // 404 fallback for all unmatched routes
        .fallback(crate::handlers::fallback::fallback_handler)

        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Config;
    use crate::handlers::health::HealthResponse;
    use crate::models::event::NewEvent;
    use crate::models::permission::PermissionLevel;
    use crate::models::responses::CurrentUserResponse;
    use crate::models::user::NewUser;
    use crate::stores::database::Database;
    use crate::stores::{EventStore, UserStore};
    use crate::utils::auth::hash_password;
    use axum::body::Body;
    use axum::http::{header, Request, Response, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn create_test_config(anon_permission: PermissionLevel) -> Config {
        let mut config = Config::from_toml(
            r#"
            [server]
            port = 8080
            num_threads = 2

            [database]
            path = ":memory:"

            [logging]
            level = "info"
            format = "console"
            "#,
        )
        .unwrap();
        config.permissions.anon_permission = anon_permission;
        config
    }

    fn create_test_state(anon_permission: PermissionLevel) -> Arc<AppState> {
        let db = Database::in_memory().unwrap();
        Arc::new(AppState::new(create_test_config(anon_permission), db))
    }

    fn add_user(state: &AppState, username: &str, password: &str) -> i64 {
        state
            .db
            .insert_user(&NewUser {
                username: username.to_string(),
                password_hash: hash_password(password),
                admin: false,
                password_editable: true,
                default_cid: 1,
                timezone: Some("Europe/Berlin".to_string()),
                language: None,
            })
            .unwrap()
    }

    fn add_event(state: &AppState, subject: &str) -> i64 {
        state
            .db
            .insert_event(&NewEvent {
                cid: 1,
                owner_uid: 1,
                subject: subject.to_string(),
                description: String::new(),
            })
            .unwrap()
    }

    async fn send(state: &Arc<AppState>, request: Request<Body>) -> Response<Body> {
        build_router(state.clone()).oneshot(request).await.unwrap()
    }

    fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::empty()).unwrap()
    }

    fn post_form(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn body_string(response: Response<Body>) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    /// `name=value` part of the Set-Cookie header
    fn session_cookie(response: &Response<Body>) -> String {
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .expect("session cookie")
            .to_str()
            .unwrap();
        set_cookie.split(';').next().unwrap().to_string()
    }

    async fn login(state: &Arc<AppState>, username: &str, password: &str) -> String {
        let body = format!("username={}&password={}", username, password);
        let response = send(state, post_form("/login", &body, None)).await;
        assert_eq!(response.status(), StatusCode::OK);
        session_cookie(&response)
    }

    #[tokio::test]
    async fn test_anonymous_delete_refused() {
        let state = create_test_state(PermissionLevel::Create);
        let id = add_event(&state, "keep me");

        let response = send(&state, get(&format!("/events/delete?id={}", id), None)).await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(body_string(response)
            .await
            .contains("You do not have permission to delete events."));
        assert!(state.db.event_exists(id).unwrap());
    }

    #[tokio::test]
    async fn test_anonymous_delete_refusal_localized() {
        let state = create_test_state(PermissionLevel::None);

        let response = send(&state, get("/events/delete?id=1&lang=de", None)).await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(body_string(response)
            .await
            .contains("Sie dürfen keine Termine löschen."));
    }

    #[tokio::test]
    async fn test_refused_delete_still_keeps_language() {
        let state = create_test_state(PermissionLevel::None);

        let response = send(&state, get("/events/delete?id=1&lang=de", None)).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let cookie = session_cookie(&response);

        let response = send(&state, get("/user", Some(&cookie))).await;
        let body: CurrentUserResponse =
            serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body.locale, "de");
        assert_eq!(state.sessions.len(), 1);
    }

    #[tokio::test]
    async fn test_anonymous_reads_leave_no_sessions() {
        let state = create_test_state(PermissionLevel::None);

        for _ in 0..1000 {
            let response = send(&state, get("/events/delete?id=1", None)).await;
            assert_eq!(response.status(), StatusCode::FORBIDDEN);
            assert!(response.headers().get(header::SET_COOKIE).is_none());
        }

        assert!(state.sessions.is_empty());
    }

    #[tokio::test]
    async fn test_anonymous_delete_allowed_at_modify() {
        let state = create_test_state(PermissionLevel::Modify);
        let id = add_event(&state, "drop me");

        let response = send(&state, get(&format!("/events/delete?id={}", id), None)).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_string(response).await,
            format!("<div class=\"box\" style=\"width: 50%\"><p>Removed item: {}</p></div>", id)
        );
        assert!(!state.db.event_exists(id).unwrap());
    }

    #[tokio::test]
    async fn test_logged_in_user_deletes_in_order() {
        let state = create_test_state(PermissionLevel::None);
        add_user(&state, "alice", "wonderland");
        let id = add_event(&state, "standup");
        let cookie = login(&state, "alice", "wonderland").await;

        let uri = format!("/events/delete?id={}&bogus=1&id=9999&id={}", id, id);
        let response = send(&state, get(&uri, Some(&cookie))).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;
        assert_eq!(
            body,
            format!(
                "<div class=\"box\" style=\"width: 50%\"><p>Removed item: {id}</p>\
                 <p>Could not remove item: 9999</p><p>Could not remove item: {id}</p></div>"
            )
        );
    }

    #[tokio::test]
    async fn test_delete_without_ids() {
        let state = create_test_state(PermissionLevel::Modify);

        let response = send(&state, get("/events/delete?bogus=1", None)).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_string(response).await,
            "<div class=\"box\" style=\"width: 50%\"><p>No items selected.</p></div>"
        );
    }

    #[tokio::test]
    async fn test_delete_escapes_values() {
        let state = create_test_state(PermissionLevel::Modify);

        let response = send(&state, get("/events/delete?id=%3Cb%3E", None)).await;

        let body = body_string(response).await;
        assert!(body.contains("<p>Could not remove item: &lt;b&gt;</p>"));
    }

    #[tokio::test]
    async fn test_login_with_wrong_password() {
        let state = create_test_state(PermissionLevel::None);
        add_user(&state, "alice", "wonderland");

        let response = send(
            &state,
            post_form("/login", "username=alice&password=guess", None),
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(body_string(response)
            .await
            .contains("Sorry, your username or password is incorrect."));
    }

    #[tokio::test]
    async fn test_login_unknown_user() {
        let state = create_test_state(PermissionLevel::None);

        let response = send(
            &state,
            post_form("/login", "username=ghost&password=boo", None),
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_login_disabled_user() {
        let state = create_test_state(PermissionLevel::None);
        let uid = add_user(&state, "mallory", "password1");
        state.db.set_user_disabled(uid, true).unwrap();

        let response = send(
            &state,
            post_form("/login", "username=mallory&password=password1", None),
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_disabled_after_login_becomes_anonymous() {
        let state = create_test_state(PermissionLevel::None);
        let uid = add_user(&state, "bob", "builder1");
        let cookie = login(&state, "bob", "builder1").await;
        state.db.set_user_disabled(uid, true).unwrap();

        let response = send(&state, get("/events/delete?id=1", Some(&cookie))).await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_logout_drops_authentication() {
        let state = create_test_state(PermissionLevel::None);
        add_user(&state, "alice", "wonderland");
        let cookie = login(&state, "alice", "wonderland").await;

        let response = send(&state, post_form("/logout", "", Some(&cookie))).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = send(&state, get("/events/delete?id=1", Some(&cookie))).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_current_user_anonymous() {
        let state = create_test_state(PermissionLevel::None);

        let response = send(&state, get("/user?tz=Asia/Tokyo&lang=de", None)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let cookie = session_cookie(&response);
        let body: CurrentUserResponse =
            serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body.uid, 0);
        assert!(!body.authenticated);
        assert_eq!(body.timezone.as_deref(), Some("Asia/Tokyo"));
        assert_eq!(body.locale, "de");

        // The language sticks to the session, the timezone does not
        let response = send(&state, get("/user", Some(&cookie))).await;
        assert!(response.headers().get(header::SET_COOKIE).is_none());
        let body: CurrentUserResponse =
            serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body.locale, "de");
        assert_eq!(body.timezone, None);
    }

    #[tokio::test]
    async fn test_current_user_logged_in_with_groups() {
        let state = create_test_state(PermissionLevel::None);
        let uid = add_user(&state, "carol", "secret123");
        let gid = state.db.insert_group(1, "editors").unwrap();
        state.db.add_user_to_group(uid, gid).unwrap();
        let cookie = login(&state, "carol", "secret123").await;

        let response = send(&state, get("/user", Some(&cookie))).await;

        let body: CurrentUserResponse =
            serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body.uid, uid);
        assert_eq!(body.username, "carol");
        assert!(body.authenticated);
        assert_eq!(body.timezone.as_deref(), Some("Europe/Berlin"));
        assert_eq!(body.locale, "en");
        assert_eq!(body.groups.len(), 1);
        assert_eq!(body.groups[0].name, "editors");
    }

    #[tokio::test]
    async fn test_create_event_logged_in() {
        let state = create_test_state(PermissionLevel::None);
        add_user(&state, "alice", "wonderland");
        let cookie = login(&state, "alice", "wonderland").await;

        let response = send(
            &state,
            post_form("/events", "cid=1&subject=Planning", Some(&cookie)),
        )
        .await;

        assert_eq!(response.status(), StatusCode::CREATED);
        assert!(body_string(response).await.contains("Created item: 1"));
        assert!(state.db.event_exists(1).unwrap());
    }

    #[tokio::test]
    async fn test_create_event_anonymous_refused() {
        let state = create_test_state(PermissionLevel::None);

        let response = send(&state, post_form("/events", "cid=1&subject=Spam", None)).await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(!state.db.event_exists(1).unwrap());
    }

    #[tokio::test]
    async fn test_create_event_empty_subject() {
        let state = create_test_state(PermissionLevel::Create);

        let response = send(&state, post_form("/events", "cid=1&subject=+", None)).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_health() {
        let state = create_test_state(PermissionLevel::None);

        let response = send(&state, get("/health", None)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let health: HealthResponse = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(health.status, "ok");
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let state = create_test_state(PermissionLevel::None);

        let response = send(&state, get("/announce", None)).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body_string(response)
            .await
            .contains("The page you requested does not exist."));
    }

    #[tokio::test]
    async fn test_unknown_route_localized() {
        let state = create_test_state(PermissionLevel::None);

        let response = send(&state, get("/nowhere?lang=de", None)).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body_string(response)
            .await
            .contains("Die angeforderte Seite existiert nicht."));
    }

    #[tokio::test]
    async fn test_failed_login_keeps_language_of_session() {
        let state = create_test_state(PermissionLevel::None);
        let response = send(&state, get("/user?lang=de", None)).await;
        let cookie = session_cookie(&response);

        let response = send(
            &state,
            post_form("/login", "username=ghost&password=boo", Some(&cookie)),
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(body_string(response)
            .await
            .contains("Benutzername oder Passwort ist falsch."));
    }
}
