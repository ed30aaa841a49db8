use axum::{
    body::Body,
    http::{self, Request, StatusCode},
};
use http_body_util::BodyExt;
use mock_server::{
    app, Echo, WeiboError, ERROR_API_NOT_FOUND, ERROR_AUTH_FAILED, ERROR_INVALID_TOKEN,
    ERROR_METHOD_NOT_SUPPORTED, ERROR_PARAM,
};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn get(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

fn form_post(uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            http::header::CONTENT_TYPE,
            "application/x-www-form-urlencoded",
        )
        .body(body.to_string())
        .unwrap()
}

const BOUNDARY: &str = "mock-upload-boundary";

/// Text fields followed by one `pic` file part.
fn multipart_body(fields: &[(&str, &str)], pic: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                .as_bytes(),
        );
    }
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"pic\"; filename=\"dot.png\"\r\nContent-Type: image/png\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(pic);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn multipart_post(uri: &str, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            http::header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

// --- reads ---

#[tokio::test]
async fn read_echoes_query_without_token() {
    let resp = app()
        .oneshot(get("/2/users/show.json?uid=1904178193&access_token=2.00tok"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let echo: Echo = body_json(resp).await;
    assert_eq!(echo.request, "/2/users/show.json");
    assert_eq!(echo.method, "GET");
    assert_eq!(echo.params.get("uid").map(String::as_str), Some("1904178193"));
    assert!(!echo.params.contains_key("access_token"));
}

#[tokio::test]
async fn read_accepts_authorization_header() {
    let request = Request::builder()
        .uri("/2/comments/to_me.json?count=5")
        .header(http::header::AUTHORIZATION, "OAuth2 2.00tok")
        .body(String::new())
        .unwrap();
    let resp = app().oneshot(request).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let echo: Echo = body_json(resp).await;
    assert_eq!(echo.params.get("count").map(String::as_str), Some("5"));
}

#[tokio::test]
async fn missing_token_is_auth_failure() {
    let resp = app().oneshot(get("/2/users/show.json?uid=1")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let err: WeiboError = body_json(resp).await;
    assert_eq!(err.error_code, ERROR_AUTH_FAILED);
    assert_eq!(err.request, "/2/users/show.json");
}

#[tokio::test]
async fn unknown_endpoint_returns_404() {
    let resp = app()
        .oneshot(get("/2/users/nope.json?access_token=2.00tok"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let err: WeiboError = body_json(resp).await;
    assert_eq!(err.error_code, ERROR_API_NOT_FOUND);
}

#[tokio::test]
async fn wrong_verb_is_rejected() {
    let resp = app()
        .oneshot(get("/2/statuses/update.json?status=hi&access_token=2.00tok"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let err: WeiboError = body_json(resp).await;
    assert_eq!(err.error_code, ERROR_METHOD_NOT_SUPPORTED);

    let resp = app()
        .oneshot(form_post("/2/users/show.json", "uid=1&access_token=2.00tok"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- writes ---

#[tokio::test]
async fn write_echoes_form_body() {
    let resp = app()
        .oneshot(form_post(
            "/2/comments/create.json",
            "comment=nice+one&id=3424883176420210&comment_ori=0&access_token=2.00tok",
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let echo: Echo = body_json(resp).await;
    assert_eq!(echo.method, "POST");
    assert_eq!(echo.params.get("comment").map(String::as_str), Some("nice one"));
    assert_eq!(echo.params.get("id").map(String::as_str), Some("3424883176420210"));
}

#[tokio::test]
async fn invite_lives_under_messages() {
    let resp = app()
        .oneshot(form_post(
            "/2/messages/invite.json",
            "uid=1&data=%7B%22text%22%3A%22hi%22%7D&access_token=2.00tok",
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let echo: Echo = body_json(resp).await;
    assert_eq!(echo.params.get("data").map(String::as_str), Some(r#"{"text":"hi"}"#));
}

// --- uploads ---

#[tokio::test]
async fn upload_echoes_fields_and_file_part() {
    let pic = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0, 0];
    let resp = app()
        .oneshot(multipart_post(
            "/2/statuses/upload.json",
            multipart_body(
                &[("status", "with a picture"), ("lat", "39.9"), ("access_token", "2.00tok")],
                &pic,
            ),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let echo: Echo = body_json(resp).await;
    assert_eq!(echo.request, "/2/statuses/upload.json");
    assert_eq!(echo.method, "POST");
    assert_eq!(echo.params.get("status").map(String::as_str), Some("with a picture"));
    assert_eq!(echo.params.get("lat").map(String::as_str), Some("39.9"));
    assert!(!echo.params.contains_key("access_token"));

    let part = &echo.files["pic"];
    assert_eq!(part.filename, "dot.png");
    assert_eq!(part.content_type, "image/png");
    assert_eq!(part.len, pic.len());
}

#[tokio::test]
async fn upload_checks_the_token() {
    let body = multipart_body(&[("status", "hi")], b"png");
    let request = multipart_post("/2/statuses/upload.json", body.clone());
    let resp = app().oneshot(request).await.unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let err: WeiboError = body_json(resp).await;
    assert_eq!(err.error_code, ERROR_AUTH_FAILED);

    let mut request = multipart_post("/2/statuses/upload.json", body);
    request.headers_mut().insert(
        http::header::AUTHORIZATION,
        http::HeaderValue::from_static("OAuth2 2.00tok"),
    );
    let resp = app().oneshot(request).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn upload_rejects_get_and_form_bodies() {
    let resp = app()
        .oneshot(get("/2/statuses/upload.json?status=hi&access_token=2.00tok"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let err: WeiboError = body_json(resp).await;
    assert_eq!(err.error_code, ERROR_METHOD_NOT_SUPPORTED);

    let resp = app()
        .oneshot(form_post("/2/statuses/upload.json", "status=hi&access_token=2.00tok"))
        .await
        .unwrap();
    assert!(resp.status().is_client_error());
}

#[tokio::test]
async fn truncated_multipart_is_a_param_error() {
    let mut body = multipart_body(&[("access_token", "2.00tok")], b"png");
    body.truncate(body.len() - 8);
    let resp = app()
        .oneshot(multipart_post("/2/statuses/upload.json", body))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let err: WeiboError = body_json(resp).await;
    assert_eq!(err.error_code, ERROR_PARAM);
}

// --- revoke lifecycle ---

#[tokio::test]
async fn revoke_lifecycle() {
    use tower::Service;

    let mut app = app().into_service();

    // token works
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get("/2/users/show.json?uid=1&access_token=2.00tok"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // revoke it
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(form_post("/oauth2/revokeoauth2", "access_token=2.00tok"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["result"], "true");

    // same token now rejected, body kept as Weibo error
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get("/2/users/show.json?uid=1&access_token=2.00tok"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let err: WeiboError = body_json(resp).await;
    assert_eq!(err.error_code, ERROR_INVALID_TOKEN);

    // revoking twice fails too
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(form_post("/oauth2/revokeoauth2", "access_token=2.00tok"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(!body_bytes(resp).await.is_empty());

    // other tokens unaffected
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get("/2/users/show.json?uid=1&access_token=2.00other"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}
