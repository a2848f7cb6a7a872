//! Session middleware: decode, lifecycle guard, presence refresh, write-back
//!
//! Runs on every request, before any route or extractor. Within one
//! request the order is fixed: cookie decode, epoch reconciliation,
//! presence refresh, then the route (whose gates assume the guard already
//! purged stale identities). The middleware never rejects a request; its
//! only effect on errors is an empty session.

use crate::{
    session::{Session, SESSION_COOKIE},
    AppState,
};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use taskdeck_core::{reconcile_epoch, EpochOutcome, SessionData};
use tracing::{debug, warn};

pub async fn session_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let decoded = match jar.get(SESSION_COOKIE) {
        Some(cookie) => state.session_keys.decode(cookie.value()),
        None => SessionData::default(),
    };
    let mut session = decoded.clone();

    // Lifecycle guard: sessions minted under a previous process are
    // cleared (authenticated) or converged in place (anonymous).
    match reconcile_epoch(&session, &state.epoch) {
        EpochOutcome::Unchanged => {}
        EpochOutcome::Cleared => {
            debug!(
                "clearing session from stale epoch {:?}",
                session.server_epoch
            );
            session.clear();
        }
        EpochOutcome::Stamped => session.stamp(&state.epoch),
    }

    // Presence refresh happens on every request carrying a (post-guard)
    // identity, regardless of route.
    if let Some(identity) = &session.identity {
        state.presence.refresh(&identity.username);
    }

    let handle = Session::new(session);
    request.extensions_mut().insert(handle.clone());

    let response = next.run(request).await;

    write_back(&state, jar, decoded, handle.get(), response)
}

/// Persist the session to the client iff it changed during the request.
/// An empty session becomes a cookie removal.
fn write_back(
    state: &AppState,
    jar: CookieJar,
    decoded: SessionData,
    current: SessionData,
    response: Response,
) -> Response {
    if current == decoded {
        return response;
    }

    if current.is_empty() {
        let mut removal = Cookie::from(SESSION_COOKIE);
        removal.set_path("/");
        return (jar.remove(removal), response).into_response();
    }

    match state.session_keys.encode(&current) {
        Ok(token) => {
            let cookie = Cookie::build((SESSION_COOKIE, token))
                .path("/")
                .http_only(true)
                .same_site(SameSite::Lax)
                .build();
            (jar.add(cookie), response).into_response()
        }
        Err(err) => {
            // Fail open: the request already succeeded, the client just
            // keeps its previous cookie.
            warn!("failed to persist session, leaving cookie unchanged: {err}");
            response
        }
    }
}
