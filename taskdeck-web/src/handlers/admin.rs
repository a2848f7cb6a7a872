//! Admin-only handlers
//!
//! All of these sit behind the [`AdminUser`] gate: unauthenticated
//! visitors are redirected to login, authenticated non-admins get a
//! terminal 403.

use crate::{
    auth::AdminUser,
    security::{self, ConfirmForm},
    session::Session,
    templates::{render, render_status, AdminUserRow, AdminUsersTemplate, ErrorTemplate},
    AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use std::collections::HashMap;
use taskdeck_core::Flash;
use tracing::{error, info};

/// GET /admin/users — every account joined with the presence snapshot.
pub async fn list_users(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    session: Session,
) -> Response {
    let users = match state.user_store.list_users().await {
        Ok(users) => users,
        Err(err) => {
            error!("unable to list users: {}", err);
            return render_status(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorTemplate::new(500, "Unable to load users".to_string()),
            );
        }
    };

    let details: HashMap<&str, (&str, taskdeck_core::Role)> = users
        .iter()
        .map(|user| (user.username.as_str(), (user.id.as_str(), user.role)))
        .collect();

    let rows = state
        .presence
        .snapshot(users.iter().map(|user| user.username.as_str()))
        .into_iter()
        .filter_map(|entry| {
            details.get(entry.username.as_str()).map(|(id, role)| AdminUserRow {
                id: (*id).to_string(),
                username: entry.username.clone(),
                role: *role,
                online: entry.online,
                last_seen: entry
                    .last_seen_at
                    .map(|at| at.format("%Y-%m-%d %H:%M:%S UTC").to_string()),
            })
        })
        .collect();

    let flash = session.take_flash();
    render(AdminUsersTemplate::new(
        admin.username,
        rows,
        flash,
        session.ensure_csrf(),
    ))
}

/// POST /admin/users/{id}/delete — remove an account and its presence
/// entry.
pub async fn delete_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    session: Session,
    Path(user_id): Path<String>,
    Form(form): Form<ConfirmForm>,
) -> Response {
    if !security::verify_csrf(&session, &form.csrf) {
        return security::csrf_rejection();
    }

    match state.user_store.find_by_id(&user_id).await {
        Ok(Some(target)) if target.username == admin.username => {
            session.set_flash(Flash::error("You cannot delete your own account"));
        }
        Ok(Some(target)) => match state.user_store.delete_user(&user_id).await {
            Ok(_) => {
                state.presence.mark_offline(&target.username);
                info!("admin {} deleted user {}", admin.username, target.username);
                session.set_flash(Flash::success(format!("Deleted user {}", target.username)));
            }
            Err(err) => {
                error!("unable to delete user {}: {}", user_id, err);
                session.set_flash(Flash::error("Unable to delete user"));
            }
        },
        Ok(None) => session.set_flash(Flash::error("User not found")),
        Err(err) => {
            error!("unable to look up user {}: {}", user_id, err);
            session.set_flash(Flash::error("Unable to delete user"));
        }
    }

    Redirect::to("/admin/users").into_response()
}
