use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, Inspection};
use tower::ServiceExt;

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

fn request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(body.to_string())
        .unwrap()
}

// --- echo ---

#[tokio::test]
async fn echo_returns_body_and_content_type() {
    let req = Request::builder()
        .method("POST")
        .uri("/echo")
        .header(http::header::CONTENT_TYPE, "application/json; charset=utf-8")
        .body(r#"{"a":[1,2]}"#.to_string())
        .unwrap();
    let resp = app().oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers()[http::header::CONTENT_TYPE],
        "application/json; charset=utf-8"
    );
    assert_eq!(&body_bytes(resp).await[..], br#"{"a":[1,2]}"#);
}

#[tokio::test]
async fn echo_without_content_type_sends_none() {
    let resp = app().oneshot(request("PUT", "/echo", "plain")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().get(http::header::CONTENT_TYPE).is_none());
    assert_eq!(&body_bytes(resp).await[..], b"plain");
}

// --- inspect ---

#[tokio::test]
async fn inspect_reports_request() {
    let req = Request::builder()
        .method("PATCH")
        .uri("/inspect?a%5B0%5D=1&b=2")
        .header("x-test", "one")
        .header("x-test", "two")
        .body("payload".to_string())
        .unwrap();
    let resp = app().oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let seen: Inspection = body_json(resp).await;
    assert_eq!(seen.method, "PATCH");
    assert_eq!(seen.path, "/inspect");
    assert_eq!(seen.query.as_deref(), Some("a%5B0%5D=1&b=2"));
    assert_eq!(seen.headers["x-test"], vec!["one".to_string(), "two".to_string()]);
    assert_eq!(seen.body, "payload");
}

#[tokio::test]
async fn inspect_without_query() {
    let resp = app().oneshot(request("GET", "/inspect", "")).await.unwrap();
    let seen: Inspection = body_json(resp).await;
    assert_eq!(seen.query, None);
    assert_eq!(seen.body, "");
}

// --- status ---

#[tokio::test]
async fn status_route_uses_requested_code() {
    for code in [200u16, 201, 404, 418, 500, 504] {
        let resp = app()
            .oneshot(request("GET", &format!("/status/{code}"), ""))
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), code);
        assert_eq!(&body_bytes(resp).await[..], format!("status {code}").as_bytes());
    }
}

#[tokio::test]
async fn status_route_rejects_invalid_code() {
    let resp = app().oneshot(request("GET", "/status/42", "")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = app().oneshot(request("GET", "/status/abc", "")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- redirect ---

#[tokio::test]
async fn redirect_points_to_inspect() {
    let resp = app().oneshot(request("GET", "/redirect", "")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers()[http::header::LOCATION], "/inspect");
}

// --- multi-header ---

#[tokio::test]
async fn multi_header_repeats_values() {
    let resp = app().oneshot(request("GET", "/multi-header", "")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let values: Vec<_> = resp
        .headers()
        .get_all("x-multi")
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect();
    assert_eq!(values, vec!["first", "second"]);

    let id = resp.headers()["x-request-id"].to_str().unwrap();
    assert!(uuid::Uuid::parse_str(id).is_ok());
}

#[tokio::test]
async fn unknown_route_is_404() {
    let resp = app().oneshot(request("GET", "/nope", "")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
