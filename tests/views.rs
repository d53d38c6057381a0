#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::{Path, State};
    use axum::http::StatusCode;
    use axum::response::{IntoResponse, Response};
    use axum::routing::{get, post, put};
    use axum::{Json, Router};
    use ox_profile::config::ApiConfig;
    use ox_profile::views::{self, App, ViewError};
    use ox_profile::ProfileConfig;
    use ox_profile_api::{ApiError, Route, SessionManager};
    use serde_json::{json, Value};
    use tokio::net::TcpListener;

    #[derive(Clone, Default)]
    struct Backend {
        updates: Arc<Mutex<Vec<Value>>>,
    }

    fn saved_record() -> Value {
        json!({
            "id": 1,
            "userId": 7,
            "name": "Asha",
            "email": "asha@example.com",
            "password": "pw",
            "description": "Likes trains",
            "age": 31,
            "date": "1990-04-12T00:00:00",
            "gender": "Female",
            "country": "Canada",
            "skills": "JavaScript,Go",
            "subscribe": true
        })
    }

    async fn list() -> Json<Value> {
        Json(json!([saved_record()]))
    }

    async fn by_user(Path(_user_id): Path<i64>) -> Json<Value> {
        Json(saved_record())
    }

    async fn update(State(backend): State<Backend>, Path(_id): Path<i64>, Json(body): Json<Value>) -> Json<Value> {
        backend.updates.lock().unwrap().push(body);
        Json(json!({ "ok": true }))
    }

    async fn forgot_password() -> Response {
        (StatusCode::OK, Json(json!({ "message": "done" }))).into_response()
    }

    async fn spawn_backend(backend: Backend) -> String {
        let app = Router::new()
            .route("/api/forms", get(list))
            .route("/api/forms/user/:user_id", get(by_user))
            .route("/api/forms/:id", put(update))
            .route("/api/auth/forgot-password", post(forgot_password))
            .with_state(backend);
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/api", addr)
    }

    async fn app(backend: Backend, logged_in: bool) -> App {
        let base_url = spawn_backend(backend).await;
        let session = Arc::new(SessionManager::in_memory());
        if logged_in {
            session.establish("tok", 7, "asha").unwrap();
        }
        let config = ProfileConfig {
            api: ApiConfig { base_url },
            ..Default::default()
        };
        App::with_session(config, session).unwrap()
    }

    #[tokio::test]
    async fn test_dashboard_shows_labels_without_credentials() {
        let app = app(Backend::default(), true).await;
        let outcome = views::dashboard(&app).await.unwrap();

        assert_eq!(outcome.message, "Profile of asha");
        let value_of = |name: &str| outcome.rows.iter().find(|r| r.name == name).map(|r| r.value.clone());
        assert_eq!(value_of("password"), None);
        assert_eq!(value_of("gender").as_deref(), Some("Female"));
        assert_eq!(value_of("country").as_deref(), Some("Canada"));
        assert_eq!(value_of("skills").as_deref(), Some("JavaScript, Go"));
        assert_eq!(value_of("birthday").as_deref(), Some("1990-04-12T00:00:00"));
    }

    #[tokio::test]
    async fn test_edit_sends_update_without_password() {
        let backend = Backend::default();
        let app = app(backend.clone(), true).await;
        let edits = vec![("name".to_string(), "Asha K".to_string())];

        let outcome = views::edit(&app, 1, &edits).await.unwrap();
        assert_eq!(outcome.navigate, Some(Route::Dashboard(1)));

        let updates = backend.updates.lock().unwrap();
        assert_eq!(updates.len(), 1);
        let body = &updates[0];
        assert_eq!(body["Id"], json!(1));
        assert_eq!(body["Name"], json!("Asha K"));
        assert_eq!(body["Birthday"], json!("1990-04-12"));
        assert_eq!(body["Gender"], json!("Female"));
        assert_eq!(body["Country"], json!("Canada"));
        assert_eq!(body["Skills"], json!("JavaScript,Go"));
        assert!(body.get("Password").is_none());
    }

    #[tokio::test]
    async fn test_edit_of_unknown_record_is_blocked_by_validation() {
        let backend = Backend::default();
        let app = app(backend.clone(), true).await;

        let result = views::edit(&app, 99, &[]).await;
        match result {
            Err(ViewError::Form(e)) => assert!(e.field_errors().iter().any(|f| f.field == "name")),
            other => panic!("expected a validation error, got {:?}", other.map(|o| o.message)),
        }
        assert!(backend.updates.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_guarded_views_redirect_to_login() {
        let app = app(Backend::default(), false).await;
        let outcome = views::records(&app).await.unwrap();
        assert_eq!(outcome.navigate, Some(Route::Login));

        let outcome = views::dashboard(&app).await.unwrap();
        assert_eq!(outcome.navigate, Some(Route::Login));
    }

    #[tokio::test]
    async fn test_login_validation_happens_before_any_request() {
        let app = app(Backend::default(), false).await;
        let result = views::login(&app, "ab", "").await;
        match result {
            Err(ViewError::Form(e)) => assert_eq!(e.field_errors().len(), 2),
            other => panic!("expected a validation error, got {:?}", other.map(|o| o.message)),
        }
    }

    #[tokio::test]
    async fn test_password_reset_clears_session() {
        let app = app(Backend::default(), true).await;
        let outcome = views::password_reset(&app, "asha@example.com", "secret9", "secret9").await.unwrap();
        assert_eq!(outcome.navigate, Some(Route::Login));
        assert!(!app.session.is_authenticated());
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_an_http_error() {
        let session = Arc::new(SessionManager::in_memory());
        session.establish("tok", 7, "asha").unwrap();
        let config = ProfileConfig {
            api: ApiConfig {
                base_url: "http://127.0.0.1:1/api".to_string(),
            },
            ..Default::default()
        };
        let app = App::with_session(config, session).unwrap();

        let result = views::records(&app).await;
        assert!(matches!(result, Err(ViewError::Api(ApiError::Http(_)))));
    }
}
