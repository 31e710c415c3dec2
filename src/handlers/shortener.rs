use super::{set_flash_and_redirect, take_flash};
use crate::{
    models::LinkView,
    redirect,
    registry::{self, RegistryError},
    AppState,
};
use askama::Template;
use axum::{
    extract::{Form, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Template)]
#[template(path = "shortener.html")]
struct ShortenerTemplate {
    page_path: String,
    links: Vec<LinkView>,
    flash_success: Option<String>,
    flash_error: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateLinkForm {
    url: String,
}

/// GET {shortener_path}
pub async fn page(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    let flash = take_flash(jar);

    let links = match state.registry.list().await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("Failed to load short links: {:?}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Failed to load short links")
                .into_response();
        }
    };

    let page_url = state.config.shortener_url();
    let links = registry::newest_first(links)
        .iter()
        .map(|l| LinkView::new(l, redirect::short_url(&page_url, &l.short_code)))
        .collect();

    let tmpl = ShortenerTemplate {
        page_path: state.config.shortener_path.clone(),
        links,
        flash_success: flash.success,
        flash_error: flash.error,
    };

    (flash.jar, tmpl).into_response()
}

/// POST {shortener_path}/links
pub async fn create_link(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<CreateLinkForm>,
) -> Response {
    let back = state.config.shortener_path.as_str();

    if form.url.trim().is_empty() {
        return set_flash_and_redirect(jar, None, Some("Please enter a URL."), back);
    }

    match state.registry.shorten(&form.url).await {
        Ok(shortened) => {
            let short_url =
                redirect::short_url(&state.config.shortener_url(), &shortened.link.short_code);
            let msg = if shortened.created {
                format!("Short link created: {short_url}")
            } else {
                format!("Already shortened: {short_url}")
            };
            set_flash_and_redirect(jar, Some(&msg), None, back)
        }
        Err(RegistryError::InvalidUrl(_)) => {
            set_flash_and_redirect(jar, None, Some("Please enter a valid URL."), back)
        }
        Err(e) => {
            tracing::error!("Failed to shorten '{}': {:?}", form.url, e);
            set_flash_and_redirect(
                jar,
                None,
                Some(&format!("Could not save the short link: {e}")),
                back,
            )
        }
    }
}

/// POST {shortener_path}/links/:code/delete
pub async fn delete_link(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Path(code): Path<String>,
) -> Response {
    let back = state.config.shortener_path.as_str();

    match state.registry.delete(&code).await {
        Ok(0) => set_flash_and_redirect(jar, None, Some("Short link not found."), back),
        Ok(_) => set_flash_and_redirect(
            jar,
            Some(&format!("Short link '{code}' deleted.")),
            None,
            back,
        ),
        Err(e) => {
            tracing::error!("Failed to delete short link '{}': {:?}", code, e);
            set_flash_and_redirect(jar, None, Some("Failed to delete short link."), back)
        }
    }
}
