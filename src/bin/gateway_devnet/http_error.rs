use super::*;

pub(super) fn bad_request(err: anyhow::Error) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({"error": format!("{:#}", err)})),
    )
        .into_response()
}

pub(super) fn redirect(url: &url::Url) -> Response {
    Redirect::to(url.as_str()).into_response()
}
