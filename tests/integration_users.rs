mod common;

use std::time::Duration;

use axum::http::StatusCode;
use common::{PASSWORD, basic, delete, get, json, setup_test_app, setup_with, short_deadline};
use serde_json::json;
use userhub_auth::roles;
use userhub_db::{MemoryUserRepository, UserRepository};
use userhub_models::UserView;
use uuid::Uuid;

fn new_user_body(email: &str) -> serde_json::Value {
    json!({
        "name": "Grace Hopper",
        "email": email,
        "roles": ["user"],
        "password": "gophers",
        "password_confirm": "gophers"
    })
}

#[tokio::test]
async fn test_admin_creates_user() {
    let app = setup_test_app();
    let admin = app.seed_user("admin@x.com", &[roles::ADMIN]).await;

    let (status, body) = app
        .send(json(
            "POST",
            "/v1/users",
            Some(&app.bearer(&admin)),
            new_user_body("grace@x.com"),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body.get("password_hash").is_none());

    let view: UserView = serde_json::from_value(body).unwrap();
    assert_eq!(view.email, "grace@x.com");
    assert_eq!(view.roles, vec!["user"]);
    assert_eq!(view.date_created, view.date_updated);

    // The new user can log in with the password they were created with.
    let (status, _) = app
        .send(basic("/v1/users/token", "grace@x.com", "gophers"))
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_create_missing_field_lists_it() {
    let app = setup_test_app();
    let admin = app.seed_user("admin@x.com", &[roles::ADMIN]).await;

    let mut body = new_user_body("grace@x.com");
    body.as_object_mut().unwrap().remove("name");

    let (status, body) = app
        .send(json("POST", "/v1/users", Some(&app.bearer(&admin)), body))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "data validation error");

    let fields = body["fields"].as_array().unwrap();
    assert!(fields.iter().any(|f| f["field"] == "name"));
    assert_eq!(app.repo.len().await, 1);
}

#[tokio::test]
async fn test_create_rejects_unknown_fields_and_bad_json() {
    let app = setup_test_app();
    let admin = app.seed_user("admin@x.com", &[roles::ADMIN]).await;
    let bearer = app.bearer(&admin);

    let mut body = new_user_body("grace@x.com");
    body["is_admin"] = json!(true);
    let (status, body) = app.send(json("POST", "/v1/users", Some(&bearer), body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.get("fields").is_none());

    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/v1/users")
        .header("authorization", &bearer)
        .body(axum::body::Body::from("{not json"))
        .unwrap();
    let (status, _) = app.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_duplicate_email_is_internal_error() {
    let app = setup_test_app();
    let admin = app.seed_user("admin@x.com", &[roles::ADMIN]).await;

    let (status, body) = app
        .send(json(
            "POST",
            "/v1/users",
            Some(&app.bearer(&admin)),
            new_user_body("admin@x.com"),
        ))
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Internal Server Error"}));
}

#[tokio::test]
async fn test_admin_lists_users() {
    let app = setup_test_app();
    let admin = app.seed_user("admin@x.com", &[roles::ADMIN]).await;
    app.seed_user("a@x.com", &[roles::USER]).await;

    let (status, body) = app.send(get("/v1/users", Some(&app.bearer(&admin)))).await;
    assert_eq!(status, StatusCode::OK);

    let users: Vec<UserView> = serde_json::from_value(body).unwrap();
    let mut emails: Vec<&str> = users.iter().map(|u| u.email.as_str()).collect();
    emails.sort();
    assert_eq!(emails, vec!["a@x.com", "admin@x.com"]);
}

#[tokio::test]
async fn test_user_reads_self_but_not_others() {
    let app = setup_test_app();
    let u1 = app.seed_user("u1@x.com", &[roles::USER]).await;
    let u2 = app.seed_user("u2@x.com", &[roles::USER]).await;
    let bearer = app.bearer(&u1);

    let (status, body) = app
        .send(get(&format!("/v1/users/{}", u1.id), Some(&bearer)))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "u1@x.com");

    let (status, body) = app
        .send(get(&format!("/v1/users/{}", u2.id), Some(&bearer)))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "attempted action is not allowed");
}

#[tokio::test]
async fn test_non_admin_cannot_distinguish_missing_users() {
    let app = setup_test_app();
    let u1 = app.seed_user("u1@x.com", &[roles::USER]).await;

    let (status, _) = app
        .send(get(&format!("/v1/users/{}", Uuid::new_v4()), Some(&app.bearer(&u1))))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_reads_anyone_and_gets_not_found() {
    let app = setup_test_app();
    let admin = app.seed_user("admin@x.com", &[roles::ADMIN]).await;
    let u1 = app.seed_user("u1@x.com", &[roles::USER]).await;
    let bearer = app.bearer(&admin);

    let (status, _) = app
        .send(get(&format!("/v1/users/{}", u1.id), Some(&bearer)))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .send(get(&format!("/v1/users/{}", Uuid::new_v4()), Some(&bearer)))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not found");
}

#[tokio::test]
async fn test_malformed_id_is_bad_request() {
    let app = setup_test_app();
    let admin = app.seed_user("admin@x.com", &[roles::ADMIN]).await;

    let (status, body) = app
        .send(get("/v1/users/not-a-uuid", Some(&app.bearer(&admin))))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "ID is not in its proper form");
}

#[tokio::test]
async fn test_user_updates_self() {
    let app = setup_test_app();
    let u1 = app.seed_user("u1@x.com", &[roles::USER]).await;

    let (status, body) = app
        .send(json(
            "PUT",
            &format!("/v1/users/{}", u1.id),
            Some(&app.bearer(&u1)),
            json!({"name": "Renamed", "password": "new-pw", "password_confirm": "new-pw"}),
        ))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, serde_json::Value::Null);

    let stored = app.repo.query_by_id(u1.id).await.unwrap();
    assert_eq!(stored.name, "Renamed");
    assert_eq!(stored.email, u1.email);
    assert_eq!(stored.date_created, u1.date_created);
    assert!(stored.date_updated >= u1.date_updated);

    let (status, _) = app.send(basic("/v1/users/token", "u1@x.com", PASSWORD)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = app.send(basic("/v1/users/token", "u1@x.com", "new-pw")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_update_validates_present_fields() {
    let app = setup_test_app();
    let u1 = app.seed_user("u1@x.com", &[roles::USER]).await;

    let (status, body) = app
        .send(json(
            "PUT",
            &format!("/v1/users/{}", u1.id),
            Some(&app.bearer(&u1)),
            json!({"email": "nope"}),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["fields"][0]["field"], "email");
}

#[tokio::test]
async fn test_user_cannot_update_or_delete_others() {
    let app = setup_test_app();
    let u1 = app.seed_user("u1@x.com", &[roles::USER]).await;
    let u2 = app.seed_user("u2@x.com", &[roles::USER]).await;
    let bearer = app.bearer(&u1);

    let (status, _) = app
        .send(json(
            "PUT",
            &format!("/v1/users/{}", u2.id),
            Some(&bearer),
            json!({"name": "Hijacked"}),
        ))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .send(delete(&format!("/v1/users/{}", u2.id), Some(&bearer)))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    assert_eq!(app.repo.query_by_id(u2.id).await.unwrap().name, "Test User");
}

#[tokio::test]
async fn test_admin_deletes_user() {
    let app = setup_test_app();
    let admin = app.seed_user("admin@x.com", &[roles::ADMIN]).await;
    let u1 = app.seed_user("u1@x.com", &[roles::USER]).await;

    let (status, _) = app
        .send(delete(&format!("/v1/users/{}", u1.id), Some(&app.bearer(&admin))))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(app.repo.len().await, 1);
}

#[tokio::test]
async fn test_slow_store_hits_request_deadline() {
    let app = setup_with(
        MemoryUserRepository::new().with_latency(Duration::from_millis(500)),
        short_deadline(),
    );
    let admin = app.auth.issue_claims(
        Uuid::new_v4().to_string(),
        vec![roles::ADMIN.to_string()],
        userhub_auth::jwt::now_unix(),
    );
    let bearer = format!("Bearer {}", app.auth.generate_token(&admin).unwrap());

    let (status, body) = app.send(get("/v1/users", Some(&bearer))).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "request deadline exceeded");
}

#[tokio::test]
async fn test_health_endpoints() {
    let app = setup_test_app();

    let (status, body) = app.send(get("/v1/liveness", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "up");

    let (status, body) = app.send(get("/v1/readiness", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    app.repo.set_available(false);
    let (status, body) = app.send(get("/v1/readiness", None)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Internal Server Error"}));
}

#[tokio::test]
async fn test_user_cannot_grant_self_admin() {
    let app = setup_test_app();
    let u1 = app.seed_user("u1@x.com", &[roles::USER]).await;

    let (status, body) = app
        .send(json(
            "PUT",
            &format!("/v1/users/{}", u1.id),
            Some(&app.bearer(&u1)),
            json!({"roles": ["admin", "user"]}),
        ))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "attempted action is not allowed");
    assert_eq!(app.repo.query_by_id(u1.id).await.unwrap().roles, vec!["user"]);

    // A token issued after the attempt still carries only the old roles.
    let (_, body) = app.send(basic("/v1/users/token", "u1@x.com", PASSWORD)).await;
    let bearer = format!("Bearer {}", body["token"].as_str().unwrap());
    let (status, _) = app.send(get("/v1/users", Some(&bearer))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_changes_roles() {
    let app = setup_test_app();
    let admin = app.seed_user("admin@x.com", &[roles::ADMIN]).await;
    let u1 = app.seed_user("u1@x.com", &[roles::USER]).await;

    let (status, _) = app
        .send(json(
            "PUT",
            &format!("/v1/users/{}", u1.id),
            Some(&app.bearer(&admin)),
            json!({"roles": ["admin", "user"]}),
        ))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(
        app.repo.query_by_id(u1.id).await.unwrap().roles,
        vec!["admin", "user"]
    );
}
