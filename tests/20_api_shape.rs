mod common;

use anyhow::Result;
use reqwest::StatusCode;

#[tokio::test]
async fn revalidation_registry_is_exposed() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/revalidation", server.base_url))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["success"], true, "unexpected body: {}", body);
    assert!(body["data"].is_object(), "expected versions map: {}", body);
    Ok(())
}

#[tokio::test]
async fn whoami_without_token_is_rejected() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/auth/whoami", server.base_url))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["success"], false, "unexpected body: {}", body);
    assert!(body["error"].is_string());
    Ok(())
}

#[tokio::test]
async fn failures_use_the_error_envelope() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    // Whatever the database state, a login with unknown credentials must
    // come back as a structured failure, never a panic
    let res = client
        .post(format!("{}/auth/login", server.base_url))
        .json(&serde_json::json!({"email": "nobody@arkiv.local", "password": "wrong"}))
        .send()
        .await?;
    assert!(
        res.status().is_client_error() || res.status().is_server_error(),
        "unexpected status: {}",
        res.status()
    );

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["success"], false, "unexpected body: {}", body);
    assert!(body["error"].is_string(), "missing error message: {}", body);
    Ok(())
}
