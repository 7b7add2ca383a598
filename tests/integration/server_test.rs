use super::common::TestApp;

#[tokio::test]
async fn health_check_works() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .get(format!("{}/health", app.address))
        .send()
        .await
        .expect("Failed to execute request");

    assert!(response.status().is_success());
}

#[tokio::test]
async fn responses_carry_a_request_id() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .get(format!("{}/health", app.address))
        .send()
        .await
        .unwrap();
    let generated = response.headers().get("x-request-id").unwrap();
    assert!(!generated.is_empty());

    let response = app
        .client
        .get(format!("{}/health", app.address))
        .header("x-request-id", "caller-supplied-id")
        .send()
        .await
        .unwrap();
    assert_eq!(response.headers()["x-request-id"], "caller-supplied-id");
}

#[tokio::test]
async fn relay_accepts_get_requests() {
    let app = TestApp::spawn().await;
    app.blobs.put("forms", "notes.txt", "text/plain", b"hello");

    let mut request = app.client.get(format!("{}/api/AnalyzeForm", app.address));
    for (name, value) in app.relay_headers("notes.txt") {
        request = request.header(name, value);
    }
    let response = request.send().await.unwrap();

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["content_type"], "text/plain");
}
