use super::set_flash_and_redirect;
use crate::{redirect, shortcode, AppState};
use axum::{
    extract::{Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Deserialize)]
pub struct GoQuery {
    /// The full address of the page that loaded, fragment included.
    page: String,
}

/// GET /go?page=<page url>
///
/// Called by the shortener page's load script when its address carries a
/// fragment. A known code with an http(s) destination redirects there;
/// anything else lands back on the shortener page with nothing reported.
pub async fn go(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(query): Query<GoQuery>,
) -> Response {
    let back = state.config.shortener_path.as_str();

    match redirect::resolve_page_load(&state.registry, &query.page).await {
        Ok(Some(url)) => see_other(&url).unwrap_or_else(|| {
            tracing::warn!("Refusing to redirect to '{}'", url.escape_debug());
            Redirect::to(back).into_response()
        }),
        Ok(None) => Redirect::to(back).into_response(),
        Err(e) => {
            tracing::error!("Failed to resolve '{}': {:?}", query.page, e);
            set_flash_and_redirect(jar, None, Some("Could not read saved short links."), back)
        }
    }
}

/// 303 to `url`, or `None` if it is not an http(s) URL or cannot be carried
/// in a `Location` header.
fn see_other(url: &str) -> Option<Response> {
    if !shortcode::is_web_url(url) {
        return None;
    }
    let location = HeaderValue::try_from(url).ok()?;
    Some((StatusCode::SEE_OTHER, [(header::LOCATION, location)]).into_response())
}
