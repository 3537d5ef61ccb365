use airhouse_infra::AppConfig;
use reqwest::StatusCode;
use serde_json::{Value, json};

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod (in-memory stores), bound to an ephemeral port.
        let config = AppConfig {
            jwt_secret: "test-secret".to_string(),
            low_quantity: 5,
            ..AppConfig::default()
        };
        let app = airhouse_api::app::build_app(&config).await.expect("failed to build app");
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn signup(client: &reqwest::Client, srv: &TestServer, email: &str) -> String {
    let res = client
        .post(srv.url("/signup"))
        .json(&json!({
            "email": email,
            "password1": "password123",
            "password2": "password123",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["user"]["email"], email);
    body["token"].as_str().unwrap().to_string()
}

async fn create_item(client: &reqwest::Client, srv: &TestServer, token: &str, name: &str, quantity: i64) -> String {
    let res = client
        .post(srv.url("/items"))
        .bearer_auth(token)
        .json(&json!({ "name": name, "quantity": quantity }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await.unwrap();
    body["id"].as_str().unwrap().to_string()
}

async fn restock(
    client: &reqwest::Client,
    srv: &TestServer,
    token: &str,
    item_id: &str,
    action: &str,
    amount: i64,
) -> reqwest::Response {
    client
        .post(srv.url("/restock"))
        .bearer_auth(token)
        .json(&json!({ "item_id": item_id, "adjust_amount": amount, "action": action }))
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn health_is_public() {
    let srv = TestServer::spawn().await;
    let res = reqwest::get(srv.url("/health")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn index_names_the_signed_in_user() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client.get(srv.url("/index")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert!(body["user"].is_null());

    let token = signup(&client, &srv, "kim@example.com").await;
    let res = client.get(srv.url("/index")).bearer_auth(&token).send().await.unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["user"]["email"], "kim@example.com");
}

#[tokio::test]
async fn auth_required_for_protected_endpoints() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    for path in ["/dashboard", "/restock", "/categories", "/help", "/logout"] {
        let res = client.get(srv.url(path)).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "{path}");
    }

    let res = client
        .get(srv.url("/dashboard"))
        .bearer_auth("not-a-token")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_with_bad_credentials_is_unauthorized() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    signup(&client, &srv, "alice@example.com").await;

    let res = client
        .post(srv.url("/login"))
        .json(&json!({ "email": "alice@example.com", "password": "wrong-password" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["errors"][0]["message"], "Please enter a correct email and password.");
    assert!(body["errors"][0]["field"].is_null());

    let res = client
        .post(srv.url("/login"))
        .json(&json!({ "email": "ALICE@example.com", "password": "password123" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn signup_validation_errors_are_field_level() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/signup"))
        .json(&json!({ "email": "bob@example.com", "password1": "password123", "password2": "password124" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "validation_error");
    assert_eq!(body["errors"][0]["field"], "password2");

    signup(&client, &srv, "bob@example.com").await;
    let res = client
        .post(srv.url("/signup"))
        .json(&json!({ "email": "Bob@Example.com", "password1": "password123", "password2": "password123" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["errors"][0]["field"], "email");
}

#[tokio::test]
async fn logout_revokes_the_token() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let token = signup(&client, &srv, "carol@example.com").await;

    let res = client.get(srv.url("/dashboard")).bearer_auth(&token).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client.get(srv.url("/logout")).bearer_auth(&token).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client.get(srv.url("/dashboard")).bearer_auth(&token).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn entry_page_logs_the_caller_out() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let token = signup(&client, &srv, "dana@example.com").await;

    let res = client.get(srv.url("/")).bearer_auth(&token).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["logged_out"], true);

    let res = client.get(srv.url("/dashboard")).bearer_auth(&token).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn dashboard_reports_low_stock() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let token = signup(&client, &srv, "erin@example.com").await;

    create_item(&client, &srv, &token, "Plenty", 40).await;
    let res = client.get(srv.url("/dashboard")).bearer_auth(&token).send().await.unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["messages"], json!([]));

    let low = create_item(&client, &srv, &token, "Scarce", 5).await;
    let res = client.get(srv.url("/dashboard")).bearer_auth(&token).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["items"].as_array().unwrap().len(), 2);
    assert_eq!(body["messages"], json!(["1 item has low inventory."]));
    assert_eq!(body["low_stock"]["item_ids"], json!([low]));

    let res = client
        .get(srv.url("/dashboard?name=plen"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["messages"], json!([]));
}

#[tokio::test]
async fn restock_clamps_at_zero_and_adds() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let token = signup(&client, &srv, "frank@example.com").await;

    let first = create_item(&client, &srv, &token, "Bolts", 5).await;
    let res = restock(&client, &srv, &token, &first, "subtract", 8).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["adjusted"]["quantity"], 0);

    let second = create_item(&client, &srv, &token, "Nuts", 5).await;
    let res = restock(&client, &srv, &token, &second, "add", 3).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["adjusted"]["quantity"], 8);

    let res = restock(&client, &srv, &token, &second, "multiply", 3).await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let unknown = "0190b5f4-0000-7000-8000-000000000000";
    let res = restock(&client, &srv, &token, unknown, "add", 1).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn other_users_rows_are_not_found() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let alice = signup(&client, &srv, "alice@example.com").await;
    let bob = signup(&client, &srv, "bob@example.com").await;

    let item = create_item(&client, &srv, &alice, "Widget", 10).await;
    let res = client
        .post(srv.url("/orders"))
        .bearer_auth(&alice)
        .json(&json!({ "reference": "PO-1", "lines": [{ "item": item, "quantity": 2 }] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let order: Value = res.json().await.unwrap();
    let order_id = order["id"].as_str().unwrap().to_string();

    let res = client
        .get(srv.url(&format!("/items/{item}")))
        .bearer_auth(&bob)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .put(srv.url(&format!("/items/{item}/edit")))
        .bearer_auth(&bob)
        .json(&json!({ "name": "Stolen", "quantity": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .delete(srv.url(&format!("/items/{item}/delete")))
        .bearer_auth(&bob)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = restock(&client, &srv, &bob, &item, "subtract", 10).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .get(srv.url(&format!("/orders/{order_id}")))
        .bearer_auth(&bob)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .delete(srv.url(&format!("/orders/{order_id}/delete")))
        .bearer_auth(&bob)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client.get(srv.url("/orders")).bearer_auth(&bob).send().await.unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["orders"], json!([]));

    // Alice still sees her untouched rows.
    let res = client
        .get(srv.url(&format!("/items/{item}")))
        .bearer_auth(&alice)
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["quantity"], 10);
    assert_eq!(body["name"], "Widget");
}

#[tokio::test]
async fn anonymous_order_list_is_empty() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let token = signup(&client, &srv, "gina@example.com").await;
    let item = create_item(&client, &srv, &token, "Widget", 10).await;
    client
        .post(srv.url("/orders"))
        .bearer_auth(&token)
        .json(&json!({ "lines": [{ "item": item, "quantity": 1 }] }))
        .send()
        .await
        .unwrap();

    let res = client.get(srv.url("/orders")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["orders"], json!([]));

    let res = client.get(srv.url("/orders")).bearer_auth(&token).send().await.unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["orders"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn invalid_line_persists_nothing() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let token = signup(&client, &srv, "hank@example.com").await;
    let a = create_item(&client, &srv, &token, "A", 10).await;
    let b = create_item(&client, &srv, &token, "B", 10).await;

    let res = client
        .post(srv.url("/orders"))
        .bearer_auth(&token)
        .json(&json!({
            "reference": "PO-9",
            "lines": [
                { "item": a, "quantity": 2 },
                { "item": b, "quantity": 0 },
            ],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["errors"][0]["field"], "lines[1].quantity");

    let res = client
        .post(srv.url("/orders"))
        .bearer_auth(&token)
        .json(&json!({
            "lines": [
                { "item": "not-an-id", "quantity": 1 },
                { "item": b, "quantity": 0 },
            ],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = res.json().await.unwrap();
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|e| e["field"].as_str())
        .collect();
    assert_eq!(fields, vec!["lines[0].item", "lines[1].quantity"]);

    let res = client.get(srv.url("/orders")).bearer_auth(&token).send().await.unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["orders"], json!([]));
}

#[tokio::test]
async fn order_edit_and_item_delete_cascade() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let token = signup(&client, &srv, "ivy@example.com").await;
    let a = create_item(&client, &srv, &token, "A", 10).await;
    let b = create_item(&client, &srv, &token, "B", 10).await;

    let res = client
        .post(srv.url("/orders"))
        .bearer_auth(&token)
        .json(&json!({ "reference": "PO-1", "lines": [{ "item": a, "quantity": 1 }] }))
        .send()
        .await
        .unwrap();
    let order: Value = res.json().await.unwrap();
    let order_id = order["id"].as_str().unwrap().to_string();
    let line_id = order["lines"][0]["id"].as_str().unwrap().to_string();

    let res = client
        .post(srv.url(&format!("/orders/{order_id}/edit")))
        .bearer_auth(&token)
        .json(&json!({
            "reference": "PO-1 rev",
            "lines": [
                { "id": line_id, "item": a, "quantity": 4 },
                { "item": b, "quantity": 2 },
            ],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let order: Value = res.json().await.unwrap();
    assert_eq!(order["reference"], "PO-1 rev");
    assert_eq!(order["total_quantity"], 6);

    let res = client
        .post(srv.url(&format!("/items/{a}/delete")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = client
        .get(srv.url(&format!("/orders/{order_id}")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let order: Value = res.json().await.unwrap();
    assert_eq!(order["lines"].as_array().unwrap().len(), 1);
    assert_eq!(order["lines"][0]["item"], b);
}

#[tokio::test]
async fn mistyped_body_field_is_a_field_error() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let token = signup(&client, &srv, "lee@example.com").await;
    let item = create_item(&client, &srv, &token, "Widget", 3).await;

    let res = client
        .post(srv.url("/restock"))
        .bearer_auth(&token)
        .json(&json!({ "item_id": item, "adjust_amount": "abc", "action": "add" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "validation_error");
    assert_eq!(body["errors"][0]["field"], "adjust_amount");

    let res = client
        .post(srv.url("/items"))
        .bearer_auth(&token)
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_json");
}

#[tokio::test]
async fn malformed_path_id_is_bad_request() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let token = signup(&client, &srv, "jack@example.com").await;

    let res = client
        .get(srv.url("/items/not-a-uuid"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_id");
}
