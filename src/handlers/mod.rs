pub mod redirect;
pub mod shortener;
pub mod tools;

use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::{
    cookie::{Cookie, SameSite},
    CookieJar,
};

/// Flash messages read from the request, plus the jar that clears them.
pub struct Flash {
    pub success: Option<String>,
    pub error: Option<String>,
    pub jar: CookieJar,
}

/// Read and clear the flash cookies.
pub fn take_flash(jar: CookieJar) -> Flash {
    let success = jar.get("flash_success").map(|c| c.value().to_owned());
    let error = jar.get("flash_error").map(|c| c.value().to_owned());

    let clear_success = Cookie::build(("flash_success", ""))
        .path("/")
        .max_age(time::Duration::seconds(0))
        .build();
    let clear_error = Cookie::build(("flash_error", ""))
        .path("/")
        .max_age(time::Duration::seconds(0))
        .build();

    Flash {
        success,
        error,
        jar: jar.remove(clear_success).remove(clear_error),
    }
}

/// Set a flash cookie and redirect to the given path.
pub fn set_flash_and_redirect(
    jar: CookieJar,
    success: Option<&str>,
    error: Option<&str>,
    destination: &str,
) -> Response {
    let mut jar = jar;

    for (name, msg) in [("flash_success", success), ("flash_error", error)] {
        if let Some(msg) = msg {
            let c = Cookie::build((name, msg.to_owned()))
                .path("/")
                .http_only(true)
                .same_site(SameSite::Lax)
                .max_age(time::Duration::seconds(30))
                .build();
            jar = jar.add(c);
        }
    }

    (jar, Redirect::to(destination)).into_response()
}
