mod harness;

use harness::backends::MockBackend;
use harness::config::ConfigBuilder;
use harness::server::TestServer;
use serde_json::json;

async fn login(server: &TestServer, username: &str, password: &str) -> reqwest::Response {
    server
        .client()
        .post(server.url("/token"))
        .form(&[("username", username), ("password", password)])
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn register_login_and_access_protected_routes() {
    let server = TestServer::start(&ConfigBuilder::new().with_auth(false, Vec::new()).build())
        .await
        .unwrap();

    let (status, body) = server
        .post_json(
            "/register",
            &json!({"username": "ada", "password": "analytical", "full_name": "Ada L"}),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["message"], "User created successfully");

    let (status, body) = server
        .post_json("/register", &json!({"username": "ada", "password": "again"}))
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["message"], "Username already registered");

    let resp = login(&server, "ada", "analytical").await;
    assert_eq!(resp.status(), 200);
    let token: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(token["token_type"], "bearer");
    let bearer = format!("Bearer {}", token["access_token"].as_str().unwrap());

    let me: serde_json::Value = server
        .client()
        .get(server.url("/users/me"))
        .header("authorization", &bearer)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(me["username"], "ada");
    assert_eq!(me["full_name"], "Ada L");

    let protected: serde_json::Value = server
        .client()
        .get(server.url("/protected"))
        .header("authorization", &bearer)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(protected["message"], "Hello ada, this is a protected route!");
}

#[tokio::test]
async fn bad_credentials_and_tokens_get_a_bearer_challenge() {
    let server = TestServer::start(&ConfigBuilder::new().with_auth(false, Vec::new()).build())
        .await
        .unwrap();

    let resp = login(&server, "nobody", "nothing").await;
    assert_eq!(resp.status(), 401);
    assert_eq!(resp.headers()["www-authenticate"], "Bearer");

    let resp = server
        .client()
        .get(server.url("/users/me"))
        .header("authorization", "Bearer not-a-jwt")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
    assert_eq!(resp.headers()["www-authenticate"], "Bearer");

    let resp = server.client().get(server.url("/protected")).send().await.unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn required_token_gates_chat_routes() {
    let local = MockBackend::local().await.unwrap();
    let config = ConfigBuilder::new()
        .with_local(&local.base_url())
        .with_auth(true, Vec::new())
        .build();
    let server = TestServer::start(&config).await.unwrap();
    let chat = json!({"messages": [{"role": "user", "content": "hi"}]});

    let (status, _) = server.post_json("/v1/chat", &chat).await;
    assert_eq!(status, 401);
    assert_eq!(local.request_count(), 0);

    server
        .post_json("/register", &json!({"username": "grace", "password": "cobol"}))
        .await;
    let token: serde_json::Value = login(&server, "grace", "cobol").await.json().await.unwrap();

    let resp = server
        .client()
        .post(server.url("/v1/chat"))
        .bearer_auth(token["access_token"].as_str().unwrap())
        .json(&chat)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(local.request_count(), 1);

    // health stays open
    let resp = server.client().get(server.url("/health")).send().await.unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn auth_routes_are_absent_when_disabled() {
    let server = TestServer::start(&ConfigBuilder::new().build()).await.unwrap();

    let resp = login(&server, "ada", "analytical").await;
    assert_eq!(resp.status(), 404);
}
