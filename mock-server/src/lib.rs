use std::{
    collections::{BTreeMap, HashSet},
    sync::Arc,
};

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};

pub const READ_ENDPOINTS: &[&str] = &[
    "comments/to_me.json",
    "comments/by_me.json",
    "comments/show.json",
    "comments/timeline.json",
    "comments/mentions.json",
    "comments/show_batch.json",
    "statuses/friends_timeline.json",
    "statuses/mentions.json",
    "users/show.json",
    "users/domain_show.json",
    "users/counts.json",
];

pub const WRITE_ENDPOINTS: &[&str] = &[
    "comments/create.json",
    "comments/destroy.json",
    "comments/sdestroy_batch.json",
    "comments/reply.json",
    "statuses/update.json",
    "statuses/repost.json",
    "statuses/upload.json",
    "statuses/upload_url_text.json",
    "messages/invite.json",
];

/// Multipart endpoint, routed on its own.
pub const UPLOAD_ENDPOINT: &str = "/2/statuses/upload.json";

/// Largest upload body accepted; pictures are capped at 5 MiB plus form fields.
const UPLOAD_BODY_LIMIT: usize = 6 * 1024 * 1024;

pub const ERROR_PARAM: u32 = 10008;
pub const ERROR_AUTH_FAILED: u32 = 21301;
pub const ERROR_INVALID_TOKEN: u32 = 21332;
pub const ERROR_API_NOT_FOUND: u32 = 10020;
pub const ERROR_METHOD_NOT_SUPPORTED: u32 = 10021;

/// What the server saw, returned for every accepted call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Echo {
    pub request: String,
    pub method: String,
    /// Parameters minus `access_token`.
    pub params: BTreeMap<String, String>,
    /// File parts of a multipart upload, by field name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub files: BTreeMap<String, FilePart>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilePart {
    pub filename: String,
    pub content_type: String,
    pub len: usize,
}

/// Weibo's error body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeiboError {
    pub error: String,
    pub error_code: u32,
    pub request: String,
}

#[derive(Clone, Default)]
pub struct AppState {
    revoked: Arc<RwLock<HashSet<String>>>,
}

pub fn app() -> Router {
    Router::new()
        .route(
            UPLOAD_ENDPOINT,
            post(upload)
                .get(upload_wrong_verb)
                .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route("/2/{group}/{action}", get(read).post(write))
        .route("/oauth2/revokeoauth2", post(revoke))
        .with_state(AppState::default())
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn read(
    State(state): State<AppState>,
    Path((group, action)): Path<(String, String)>,
    headers: HeaderMap,
    Query(params): Query<BTreeMap<String, String>>,
) -> Response {
    handle(&state, Method::GET, &group, &action, &headers, params).await
}

async fn write(
    State(state): State<AppState>,
    Path((group, action)): Path<(String, String)>,
    headers: HeaderMap,
    Form(params): Form<BTreeMap<String, String>>,
) -> Response {
    handle(&state, Method::POST, &group, &action, &headers, params).await
}

async fn handle(
    state: &AppState,
    method: Method,
    group: &str,
    action: &str,
    headers: &HeaderMap,
    mut params: BTreeMap<String, String>,
) -> Response {
    let endpoint = format!("{group}/{action}");
    let request = format!("/2/{endpoint}");
    tracing::debug!(%method, %request, "mock request");

    let expected = if READ_ENDPOINTS.contains(&endpoint.as_str()) {
        Method::GET
    } else if WRITE_ENDPOINTS.contains(&endpoint.as_str()) {
        Method::POST
    } else {
        return weibo_error(
            StatusCode::NOT_FOUND,
            ERROR_API_NOT_FOUND,
            "Request Api not found!",
            &request,
        );
    };
    if method != expected {
        return weibo_error(
            StatusCode::BAD_REQUEST,
            ERROR_METHOD_NOT_SUPPORTED,
            "HTTP METHOD is not suported for this request!",
            &request,
        );
    }

    let token = take_token(headers, &mut params);
    if let Err(response) = check_token(state, token.as_deref(), &request).await {
        return response;
    }

    Json(Echo {
        request,
        method: method.to_string(),
        params,
        files: BTreeMap::new(),
    })
    .into_response()
}

async fn upload(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    tracing::debug!(request = UPLOAD_ENDPOINT, "mock upload");
    let mut params = BTreeMap::new();
    let mut files = BTreeMap::new();
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(err) => return param_error(&err.body_text()),
        };
        let name = field.name().unwrap_or_default().to_string();
        match field.file_name().map(str::to_string) {
            Some(filename) => {
                let content_type = field.content_type().unwrap_or_default().to_string();
                let bytes = match field.bytes().await {
                    Ok(bytes) => bytes,
                    Err(err) => return param_error(&err.body_text()),
                };
                files.insert(
                    name,
                    FilePart {
                        filename,
                        content_type,
                        len: bytes.len(),
                    },
                );
            }
            None => match field.text().await {
                Ok(text) => {
                    params.insert(name, text);
                }
                Err(err) => return param_error(&err.body_text()),
            },
        }
    }

    let token = take_token(&headers, &mut params);
    if let Err(response) = check_token(&state, token.as_deref(), UPLOAD_ENDPOINT).await {
        return response;
    }

    Json(Echo {
        request: UPLOAD_ENDPOINT.to_string(),
        method: Method::POST.to_string(),
        params,
        files,
    })
    .into_response()
}

async fn upload_wrong_verb() -> Response {
    weibo_error(
        StatusCode::BAD_REQUEST,
        ERROR_METHOD_NOT_SUPPORTED,
        "HTTP METHOD is not suported for this request!",
        UPLOAD_ENDPOINT,
    )
}

fn param_error(detail: &str) -> Response {
    weibo_error(
        StatusCode::BAD_REQUEST,
        ERROR_PARAM,
        &format!("param error: {detail}"),
        UPLOAD_ENDPOINT,
    )
}

async fn revoke(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(mut params): Form<BTreeMap<String, String>>,
) -> Response {
    let request = "/oauth2/revokeoauth2";
    let token = take_token(&headers, &mut params);
    if let Err(response) = check_token(&state, token.as_deref(), request).await {
        return response;
    }
    if let Some(token) = token {
        state.revoked.write().await.insert(token);
    }
    Json(serde_json::json!({ "result": "true" })).into_response()
}

/// Token from the `access_token` parameter or an `Authorization: OAuth2` header.
fn take_token(headers: &HeaderMap, params: &mut BTreeMap<String, String>) -> Option<String> {
    if let Some(token) = params.remove("access_token") {
        return Some(token);
    }
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("OAuth2 "))
        .map(str::to_string)
}

async fn check_token(state: &AppState, token: Option<&str>, request: &str) -> Result<(), Response> {
    match token {
        None | Some("") => Err(weibo_error(
            StatusCode::FORBIDDEN,
            ERROR_AUTH_FAILED,
            "auth faild!",
            request,
        )),
        Some(token) if state.revoked.read().await.contains(token) => Err(weibo_error(
            StatusCode::UNAUTHORIZED,
            ERROR_INVALID_TOKEN,
            "invalid_access_token",
            request,
        )),
        Some(_) => Ok(()),
    }
}

fn weibo_error(status: StatusCode, code: u32, message: &str, request: &str) -> Response {
    (
        status,
        Json(WeiboError {
            error: message.to_string(),
            error_code: code,
            request: request.to_string(),
        }),
    )
        .into_response()
}
