//! Session marker check for pages behind login.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{Redirect, Response},
};

use crate::domain::entities::{LocalSessionMarker, Route, USER_KEY};
use crate::domain::repositories::LocalStorage;
use crate::infrastructure::storage::CookieLocalStorage;
use crate::state::AppState;

/// Admits requests whose client storage holds a `user` entry.
///
/// # Cookie Format
///
/// ```text
/// Cookie: user=<base64url JSON identity>; token=<base64url token>
/// ```
///
/// On success the parsed [`crate::domain::entities::Identity`] is inserted
/// as a request extension for the handler.
///
/// # Errors
///
/// Returns `Redirect` to `/login` if the `user` entry is missing or does not
/// hold an identity.
pub async fn layer(
    State(st): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, Redirect> {
    let storage = CookieLocalStorage::from_headers(st.login.cookies.clone(), req.headers());

    let identity = storage
        .get_item(USER_KEY)
        .and_then(|raw| LocalSessionMarker::parse_user(&raw));

    match identity {
        Some(identity) => {
            req.extensions_mut().insert(identity);
            Ok(next.run(req).await)
        }
        None => Err(Redirect::to(Route::login().as_str())),
    }
}
