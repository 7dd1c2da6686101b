//! Request handlers. Every form action redirects back to `/`.

use axum::{
    extract::{Multipart, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
};
use rxscan_core::{intake, report, SessionId};

use super::cookie;
use super::page;
use super::server::AppState;

const IMAGE_FIELD: &str = "image";

/// Resolve the caller's session, creating one when the cookie is missing or stale.
async fn session(state: &AppState, headers: &HeaderMap) -> (SessionId, bool) {
    state
        .sessions
        .ensure(cookie::session_id(headers).as_deref())
        .await
}

/// Attach the session cookie when the session is new.
fn with_cookie(resp: impl IntoResponse, id: &str, created: bool) -> Response {
    let mut resp = resp.into_response();
    if created {
        resp.headers_mut()
            .insert(header::SET_COOKIE, cookie::set_cookie(id));
    }
    resp
}

fn back_home(id: &str, created: bool) -> Response {
    with_cookie(Redirect::to("/"), id, created)
}

/// `GET /` — render the page for this session.
pub async fn index(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let (id, created) = session(&state, &headers).await;
    let notice = state.sessions.take_notice(&id).await;
    let snapshot = state.sessions.snapshot(&id).await.unwrap_or_default();

    let html = page::render(&page::PageView {
        session: &snapshot,
        notice: notice.as_deref(),
        upload: &state.config.upload,
        provider: state.extractor.spec().kind.as_str(),
    });
    with_cookie(Html(html), &id, created)
}

/// `POST /upload` — accept a multipart image upload.
pub async fn upload(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    let (id, created) = session(&state, &headers).await;

    let mut received = None;
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) if field.name() == Some(IMAGE_FIELD) => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                match field.bytes().await {
                    Ok(bytes) => received = Some((file_name, bytes.to_vec())),
                    Err(e) => {
                        set_notice(&state, &id, format!("Upload failed: {e}")).await;
                        return back_home(&id, created);
                    }
                }
                break;
            }
            Ok(Some(_)) => continue,
            Ok(None) => break,
            Err(e) => {
                set_notice(&state, &id, format!("Upload failed: {e}")).await;
                return back_home(&id, created);
            }
        }
    }

    match received {
        Some((file_name, bytes)) => store_upload(&state, &id, &file_name, bytes).await,
        None => set_notice(&state, &id, "No image was selected".to_string()).await,
    }
    back_home(&id, created)
}

/// Validate an upload and make it the session's current image.
///
/// On rejection the previous image and result stay as they were.
pub(crate) async fn store_upload(state: &AppState, id: &str, file_name: &str, bytes: Vec<u8>) {
    match intake::accept_upload(&state.config, file_name, bytes).await {
        Ok(image) => {
            tracing::info!(
                file = %image.file_name,
                width = image.width,
                height = image.height,
                "Image uploaded"
            );
            state.sessions.with_session(id, |s| s.upload(image)).await;
        }
        Err(e) => {
            tracing::warn!("Rejected upload: {e}");
            set_notice(state, id, e.to_string()).await;
        }
    }
}

async fn set_notice(state: &AppState, id: &str, message: String) {
    state
        .sessions
        .with_session(id, |s| s.notice = Some(message))
        .await;
}

/// `GET /image` — the current upload's original bytes.
pub async fn image(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let Some(id) = cookie::session_id(&headers) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    match state.sessions.image(&id).await {
        Some(image) => (
            [
                (header::CONTENT_TYPE, HeaderValue::from_static(image.media_type())),
                (header::CACHE_CONTROL, HeaderValue::from_static("no-store")),
            ],
            image.bytes.clone(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// `POST /extract` — run one extraction on the current image.
pub async fn extract(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let (id, created) = session(&state, &headers).await;

    let Some(image) = state.sessions.image(&id).await else {
        set_notice(&state, &id, "Upload a prescription image first".to_string()).await;
        return back_home(&id, created);
    };

    // The store lock is not held across the model call
    let result = state.extractor.extract(&image).await;
    state.sessions.with_session(&id, |s| s.record(result)).await;

    back_home(&id, created)
}

/// `GET /download` — the current result as a plain-text report.
pub async fn download(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let Some(id) = cookie::session_id(&headers) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let Some(session) = state.sessions.snapshot(&id).await else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let (Some(result), Some(image)) = (session.result.as_ref(), session.image.as_ref()) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let body = report::render(result, &image.file_name);
    let disposition = format!(
        "attachment; filename=\"{}\"",
        report::file_name(chrono::Local::now())
    );
    let disposition = HeaderValue::from_str(&disposition)
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

    (
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/plain; charset=utf-8"),
            ),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response()
}

/// `POST /clear` — forget the result and its timestamp.
pub async fn clear(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let (id, created) = session(&state, &headers).await;
    state.sessions.with_session(&id, |s| s.clear()).await;
    back_home(&id, created)
}
