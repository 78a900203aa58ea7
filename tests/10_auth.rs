mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let server = common::ensure_server().await?;

    let res = reqwest::get(server.url("/health")).await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<Value>().await?;
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["database"], "ok");
    Ok(())
}

#[tokio::test]
async fn account_creation_is_public() -> Result<()> {
    let server = common::ensure_server().await?;
    let user = common::create_user(server, "newcomer", "").await?;

    assert_eq!(user["role"], "employee", "default role applies: {}", user);
    assert!(user["createdAt"].is_string());
    Ok(())
}

#[tokio::test]
async fn login_issues_token_for_known_handle() -> Result<()> {
    let server = common::ensure_server().await?;
    let user = common::create_user(server, "login", "admin").await?;

    let res = reqwest::Client::new()
        .post(server.url("/login"))
        .json(&json!({ "user_id": user["user_id"] }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<Value>().await?;
    assert_eq!(body["status"], "success");
    assert_eq!(body["description"], "Login successful");
    assert!(body["data"]["token"].as_str().map_or(false, |t| !t.is_empty()));
    assert_eq!(body["data"]["user"]["id"], user["id"]);
    Ok(())
}

#[tokio::test]
async fn login_rejects_unknown_handle() -> Result<()> {
    let server = common::ensure_server().await?;

    let res = reqwest::Client::new()
        .post(server.url("/login"))
        .json(&json!({ "user_id": common::unique("ghost") }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let body = res.json::<Value>().await?;
    assert_eq!(body["status"], "fail");
    assert_eq!(body["description"], "Invalid credentials");
    Ok(())
}

#[tokio::test]
async fn login_rejects_malformed_body() -> Result<()> {
    let server = common::ensure_server().await?;

    let res = reqwest::Client::new()
        .post(server.url("/login"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>().await?["status"], "fail");
    Ok(())
}

#[tokio::test]
async fn protected_routes_require_bearer_token() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    for path in ["/dashboard", "/users", "/projects", "/tasks"] {
        let res = client.get(server.url(path)).send().await?;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "GET {}", path);
        let body = res.json::<Value>().await?;
        assert_eq!(body["status"], "fail");
    }

    let res = client
        .get(server.url("/dashboard"))
        .bearer_auth("not.a.token")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .get(server.url("/dashboard"))
        .header("authorization", "Basic dXNlcjpwYXNz")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn token_for_deleted_user_is_rejected() -> Result<()> {
    let server = common::ensure_server().await?;
    let account = common::register(server, "leaver", "employee").await?;

    let res = reqwest::Client::new()
        .delete(server.url(&format!("/users/{}", account.id)))
        .bearer_auth(&account.token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = reqwest::Client::new()
        .get(server.url("/dashboard"))
        .bearer_auth(&account.token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = reqwest::Client::new()
        .get(server.url("/users"))
        .bearer_auth(&account.token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn unknown_route_uses_envelope() -> Result<()> {
    let server = common::ensure_server().await?;

    let res = reqwest::get(server.url("/nowhere")).await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.json::<Value>().await?["status"], "fail");
    Ok(())
}
