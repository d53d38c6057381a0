#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::{Path, State};
    use axum::http::{HeaderMap, StatusCode};
    use axum::response::{IntoResponse, Response};
    use axum::routing::{get, post, put};
    use axum::{Json, Router};
    use ox_profile_api::{
        ApiError, LoginRequest, PasswordChange, PasswordReset, ProfileClient, RegisterRequest, SessionManager,
    };
    use serde_json::{json, Map, Value};
    use tokio::net::TcpListener;

    const TOKEN: &str = "tok-1";

    #[derive(Clone, Default)]
    struct Backend {
        last_update: Arc<Mutex<Option<Value>>>,
    }

    fn authorized(headers: &HeaderMap) -> bool {
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map_or(false, |v| v == format!("Bearer {}", TOKEN))
    }

    fn unauthorized() -> Response {
        (StatusCode::UNAUTHORIZED, Json(json!({ "message": "Unauthorized" }))).into_response()
    }

    async fn login(Json(body): Json<Value>) -> Response {
        if body["username"] == "asha" && body["password"] == "secret1" {
            Json(json!({ "token": TOKEN, "userId": 7, "username": "asha" })).into_response()
        } else {
            (StatusCode::UNAUTHORIZED, Json(json!({ "message": "Invalid username or password" }))).into_response()
        }
    }

    async fn register(Json(body): Json<Value>) -> Response {
        if body["username"] == "taken" {
            (StatusCode::BAD_REQUEST, Json(json!({ "message": "Username already exists" }))).into_response()
        } else {
            Json(json!({ "message": "Registered" })).into_response()
        }
    }

    async fn list(headers: HeaderMap) -> Response {
        if !authorized(&headers) {
            return unauthorized();
        }
        Json(json!([
            { "id": 1, "name": "Asha", "password": "pw", "skills": "js,go" },
            { "id": 2, "name": "Bo", "password": "pw", "skills": "" }
        ]))
        .into_response()
    }

    async fn by_user(headers: HeaderMap, Path(user_id): Path<i64>) -> Response {
        if !authorized(&headers) {
            return unauthorized();
        }
        Json(json!({ "id": 1, "userId": user_id, "name": "Asha" })).into_response()
    }

    async fn update(
        State(backend): State<Backend>,
        headers: HeaderMap,
        Path(id): Path<i64>,
        Json(body): Json<Value>,
    ) -> Response {
        if !authorized(&headers) {
            return unauthorized();
        }
        *backend.last_update.lock().unwrap() = Some(body.clone());
        Json(json!({ "id": id, "updated": true })).into_response()
    }

    async fn remove(headers: HeaderMap, Path(_id): Path<i64>) -> Response {
        if !authorized(&headers) {
            return unauthorized();
        }
        StatusCode::NO_CONTENT.into_response()
    }

    async fn change_password(headers: HeaderMap, Path(_user_id): Path<i64>, Json(body): Json<Value>) -> Response {
        if !authorized(&headers) {
            return unauthorized();
        }
        if body["currentPassword"] != "secret1" {
            return (StatusCode::BAD_REQUEST, Json(json!({ "message": "Current password is incorrect" }))).into_response();
        }
        Json(json!({ "message": "Password updated successfully!" })).into_response()
    }

    async fn forgot_password(headers: HeaderMap) -> Response {
        if headers.contains_key("authorization") {
            return (StatusCode::BAD_REQUEST, Json(json!({ "message": "unexpected token" }))).into_response();
        }
        Json(json!({ "message": "Password changed" })).into_response()
    }

    async fn spawn_backend(backend: Backend) -> String {
        let app = Router::new()
            .route("/api/auth/login", post(login))
            .route("/api/auth/register", post(register))
            .route("/api/auth/:user_id/password", put(change_password))
            .route("/api/auth/forgot-password", post(forgot_password))
            .route("/api/forms", get(list))
            .route("/api/forms/user/:user_id", get(by_user))
            .route("/api/forms/:id", put(update).delete(remove))
            .with_state(backend);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/api", addr)
    }

    fn credentials(password: &str) -> LoginRequest {
        LoginRequest {
            username: "asha".to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_login_stores_session() {
        let base = spawn_backend(Backend::default()).await;
        let client = ProfileClient::new(&base, Arc::new(SessionManager::in_memory()));

        let result = client.login(&credentials("secret1")).await;
        assert!(result.is_ok());
        assert_eq!(result.unwrap().user_id, 7);
        assert!(client.session().is_authenticated());
        assert_eq!(client.session().token().as_deref(), Some(TOKEN));
    }

    #[tokio::test]
    async fn test_failed_login_surfaces_backend_message() {
        let base = spawn_backend(Backend::default()).await;
        let client = ProfileClient::new(&base, Arc::new(SessionManager::in_memory()));

        let err = client.login(&credentials("wrong")).await.unwrap_err();
        assert_eq!(err.user_message(), "Invalid username or password");
        assert!(!client.session().is_authenticated());
    }

    #[tokio::test]
    async fn test_unauthorized_clears_session() {
        let base = spawn_backend(Backend::default()).await;
        let session = Arc::new(SessionManager::in_memory());
        session.establish("stale-token", 7, "asha").unwrap();
        let client = ProfileClient::new(&base, session.clone());

        let result = client.list_records().await;
        assert!(matches!(result, Err(ApiError::Unauthorized)));
        assert!(!session.is_authenticated());
        assert_eq!(session.token(), None);
    }

    #[tokio::test]
    async fn test_record_calls_use_bearer_token() {
        let backend = Backend::default();
        let base = spawn_backend(backend.clone()).await;
        let client = ProfileClient::new(&base, Arc::new(SessionManager::in_memory()));
        client.login(&credentials("secret1")).await.unwrap();

        let records = client.list_records().await.unwrap();
        assert_eq!(records.len(), 2);

        let mine = client.get_record_by_user(7).await.unwrap();
        assert_eq!(mine["userId"], json!(7));

        let mut payload = Map::new();
        payload.insert("Id".to_string(), json!(1));
        payload.insert("Name".to_string(), json!("Asha K"));
        client.update_record(1, &payload).await.unwrap();
        assert_eq!(backend.last_update.lock().unwrap().clone(), Some(Value::Object(payload)));

        assert!(client.delete_record(2).await.is_ok());
    }

    #[tokio::test]
    async fn test_register_and_login_stops_on_first_failure() {
        let base = spawn_backend(Backend::default()).await;
        let client = ProfileClient::new(&base, Arc::new(SessionManager::in_memory()));

        let taken = RegisterRequest {
            username: "taken".to_string(),
            email: "t@example.com".to_string(),
            password: "secret1".to_string(),
            name: None,
        };
        let err = client.register_and_login(&taken).await.unwrap_err();
        assert!(matches!(err, ApiError::Status { status: 400, .. }));
        assert!(!client.session().is_authenticated());

        let fresh = RegisterRequest {
            username: "asha".to_string(),
            ..taken
        };
        let login = client.register_and_login(&fresh).await.unwrap();
        assert_eq!(login.username, "asha");
        assert!(client.session().is_authenticated());
    }

    #[tokio::test]
    async fn test_password_flows() {
        let base = spawn_backend(Backend::default()).await;
        let client = ProfileClient::new(&base, Arc::new(SessionManager::in_memory()));
        client.login(&credentials("secret1")).await.unwrap();

        let change = PasswordChange {
            current_password: "secret1".to_string(),
            new_password: "secret2".to_string(),
            confirm_password: "secret2".to_string(),
        };
        let message = client.edit_password(7, &change).await.unwrap();
        assert_eq!(message.as_deref(), Some("Password updated successfully!"));

        let reset = PasswordReset {
            email: "asha@example.com".to_string(),
            new_password: "secret3".to_string(),
            confirm_password: "secret3".to_string(),
        };
        let message = client.reset_password(&reset).await.unwrap();
        assert_eq!(message.as_deref(), Some("Password changed"));
    }
}
