mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn health_endpoints_respond() -> Result<()> {
    let gateway = common::spawn_gateway(common::test_config(), common::static_registry(vec![])).await?;
    let client = reqwest::Client::new();

    for url in [
        format!("{}/health", gateway.base_url),
        format!("{}/health", gateway.admin_url),
        format!("{}/admin/health_check", gateway.admin_url),
    ] {
        let res = client.get(&url).send().await?;
        assert_eq!(res.status(), StatusCode::OK, "{}", url);
        let body: Value = res.json().await?;
        assert_eq!(body["success"], true);
        assert_eq!(body["http_code"], 200);
    }
    Ok(())
}

#[tokio::test]
async fn issues_verifiable_token() -> Result<()> {
    let gateway = common::spawn_gateway(common::test_config(), common::static_registry(vec![])).await?;

    let res = reqwest::Client::new()
        .post(format!("{}/admin/token", gateway.admin_url))
        .json(&json!({ "subject": "user-7", "admin": true }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = res.json().await?;
    assert_eq!(body["http_code"], 200);
    assert_eq!(body["success"], true);

    let token = body["token"].as_str().expect("token string");
    let claims = gateway.tokens.verify(token)?;
    assert_eq!(claims.subject, "user-7");
    assert!(claims.admin);
    Ok(())
}

#[tokio::test]
async fn accepts_uid_alias() -> Result<()> {
    let gateway = common::spawn_gateway(common::test_config(), common::static_registry(vec![])).await?;

    let res = reqwest::Client::new()
        .post(format!("{}/admin/token", gateway.admin_url))
        .json(&json!({ "uid": "legacy-user", "admin": false }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = res.json().await?;
    let claims = gateway.tokens.verify(body["token"].as_str().unwrap_or_default())?;
    assert_eq!(claims.subject, "legacy-user");
    assert!(!claims.admin);
    Ok(())
}

#[tokio::test]
async fn rejects_invalid_bodies() -> Result<()> {
    let gateway = common::spawn_gateway(common::test_config(), common::static_registry(vec![])).await?;
    let client = reqwest::Client::new();
    let url = format!("{}/admin/token", gateway.admin_url);

    let bodies = [
        json!({ "subject": "user-1" }),
        json!({ "subject": "user-1", "admin": null }),
        json!({ "subject": "", "admin": false }),
        json!({ "admin": true }),
        json!({ "subject": "user-1", "admin": "yes" }),
    ];
    for body in bodies {
        let res = client.post(&url).json(&body).send().await?;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "body {}", body);
        let envelope: Value = res.json().await?;
        assert_eq!(
            envelope,
            json!({ "http_code": 400, "success": false, "message": "Invalid request body" })
        );
    }

    let res = client
        .post(&url)
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client.post(&url).body("subject=x&admin=true").send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn admin_routes_are_not_on_the_gateway_listener() -> Result<()> {
    let gateway = common::spawn_gateway(common::test_config(), common::static_registry(vec![])).await?;

    let res = reqwest::Client::new()
        .post(format!("{}/admin/token", gateway.base_url))
        .json(&json!({ "subject": "user-1", "admin": true }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}
