//! Account, session, and admin user-management endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::account::{
        Account, CreateAccount, CreateSession, SessionCreated, SetPassword, UpdateAccount,
        UpdatePassword,
    },
    AppState,
};

use super::{page_limit, CurrentSession, ListQuery};

/// Create an account (signup). Never grants the admin flag; admins are
/// created through the `/users` endpoint.
#[utoipa::path(
    post,
    path = "/account",
    tag = "account",
    request_body = CreateAccount,
    responses(
        (status = 200, description = "Account created", body = Account),
        (status = 400, description = "Invalid input or duplicate email")
    )
)]
pub async fn signup(
    State(state): State<AppState>,
    Json(mut payload): Json<CreateAccount>,
) -> AppResult<Json<Account>> {
    payload.validate().map_err(|e| AppError::validation(e.to_string()))?;
    payload.admin = false;
    let hash = state.auth.hash_password(&payload.password)?;
    let account = state.store.create_account(&payload, &hash).await?;
    Ok(Json(account))
}

/// Account info for the current session.
#[utoipa::path(
    get,
    path = "/account",
    tag = "account",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current account", body = Account),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn me(
    State(state): State<AppState>,
    current: CurrentSession,
) -> AppResult<Json<Account>> {
    let account = state.store.get_account(current.session.account.id).await?;
    Ok(Json(account))
}

/// Update the current account. The admin flag cannot be changed here.
#[utoipa::path(
    put,
    path = "/account",
    tag = "account",
    security(("bearer_auth" = [])),
    request_body = UpdateAccount,
    responses(
        (status = 200, description = "Account updated", body = Account),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn update_me(
    State(state): State<AppState>,
    current: CurrentSession,
    Json(mut payload): Json<UpdateAccount>,
) -> AppResult<Json<Account>> {
    payload.validate().map_err(|e| AppError::validation(e.to_string()))?;
    payload.admin = None;
    let account = state
        .store
        .update_account(current.session.account.id, &payload)
        .await?;
    Ok(Json(account))
}

/// Change the current account's password, verifying the old one first.
/// Every outstanding session for the account is revoked.
#[utoipa::path(
    put,
    path = "/account/password",
    tag = "account",
    security(("bearer_auth" = [])),
    request_body = UpdatePassword,
    responses(
        (status = 204, description = "Password changed, all sessions revoked"),
        (status = 400, description = "Old password does not match")
    )
)]
pub async fn change_password(
    State(state): State<AppState>,
    current: CurrentSession,
    Json(payload): Json<UpdatePassword>,
) -> AppResult<StatusCode> {
    payload.validate().map_err(|e| AppError::validation(e.to_string()))?;

    // verify against the stored row, not the session snapshot
    let account = state.store.get_account(current.session.account.id).await?;
    if !state
        .auth
        .verify_password(&account.password_hash, &payload.old_password)?
    {
        return Err(AppError::validation("invalid credentials"));
    }

    let hash = state.auth.hash_password(&payload.new_password)?;
    state.store.update_account_password(account.id, &hash).await?;
    state.auth.delete_sessions_for(account.id);
    Ok(StatusCode::NO_CONTENT)
}

/// Log in with email and password.
#[utoipa::path(
    post,
    path = "/account/sessions",
    tag = "account",
    request_body = CreateSession,
    responses(
        (status = 200, description = "Session created", body = SessionCreated),
        (status = 400, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<CreateSession>,
) -> AppResult<Json<SessionCreated>> {
    // an unknown email and a wrong password are indistinguishable to the
    // client
    let account = match state.store.get_account_by_email(&payload.email).await {
        Ok(account) => account,
        Err(AppError::NotFound { .. }) => return Err(AppError::validation("invalid credentials")),
        Err(e) => return Err(e),
    };

    if !state
        .auth
        .verify_password(&account.password_hash, &payload.password)?
    {
        return Err(AppError::validation("invalid credentials"));
    }

    let token = state.auth.create_session(account.clone());
    Ok(Json(SessionCreated { token, account }))
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct LogoutQuery {
    /// Revoke every session for the account, not just the current token.
    #[serde(default)]
    pub all: bool,
}

/// Log out the current session, or all of the account's sessions.
#[utoipa::path(
    delete,
    path = "/account/sessions",
    tag = "account",
    security(("bearer_auth" = [])),
    params(LogoutQuery),
    responses(
        (status = 204, description = "Session(s) deleted"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn logout(
    State(state): State<AppState>,
    current: CurrentSession,
    Query(query): Query<LogoutQuery>,
) -> AppResult<StatusCode> {
    if query.all {
        state.auth.delete_sessions_for(current.session.account.id);
    } else {
        state.auth.delete_session(&current.token);
    }
    Ok(StatusCode::NO_CONTENT)
}

// --- Admin user management ---

/// List accounts (admin).
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    security(("bearer_auth" = [])),
    params(ListQuery),
    responses(
        (status = 200, description = "List of accounts", body = [Account]),
        (status = 403, description = "Not an admin")
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Account>>> {
    let limit = page_limit(&state.config.pagination, query.limit)?;
    let accounts = state.store.list_accounts(limit, query.after).await?;
    Ok(Json(accounts))
}

/// Create an account (admin). The admin flag is honored here.
#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    security(("bearer_auth" = [])),
    request_body = CreateAccount,
    responses(
        (status = 200, description = "Account created", body = Account),
        (status = 400, description = "Invalid input or duplicate email")
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateAccount>,
) -> AppResult<Json<Account>> {
    payload.validate().map_err(|e| AppError::validation(e.to_string()))?;
    let hash = state.auth.hash_password(&payload.password)?;
    let account = state.store.create_account(&payload, &hash).await?;
    Ok(Json(account))
}

/// Get an account by id (admin).
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Account id")),
    responses(
        (status = 200, description = "Account", body = Account),
        (status = 404, description = "Account not found")
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Account>> {
    let account = state.store.get_account(id).await?;
    Ok(Json(account))
}

/// Update an account (admin). May change the admin flag; the target's
/// sessions are revoked so stale privileges cannot linger.
#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Account id")),
    request_body = UpdateAccount,
    responses(
        (status = 200, description = "Account updated", body = Account),
        (status = 404, description = "Account not found")
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateAccount>,
) -> AppResult<Json<Account>> {
    payload.validate().map_err(|e| AppError::validation(e.to_string()))?;
    let account = state.store.update_account(id, &payload).await?;
    state.auth.delete_sessions_for(id);
    Ok(Json(account))
}

/// Delete an account and revoke its sessions (admin).
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Account id")),
    responses(
        (status = 204, description = "Account deleted"),
        (status = 404, description = "Account not found")
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.store.delete_account(id).await?;
    state.auth.delete_sessions_for(id);
    Ok(StatusCode::NO_CONTENT)
}

/// Set an account's password without the old-password check (admin).
/// The target's sessions are revoked.
#[utoipa::path(
    post,
    path = "/users/{id}/password",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Account id")),
    request_body = SetPassword,
    responses(
        (status = 204, description = "Password set, sessions revoked"),
        (status = 404, description = "Account not found")
    )
)]
pub async fn set_user_password(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SetPassword>,
) -> AppResult<StatusCode> {
    payload.validate().map_err(|e| AppError::validation(e.to_string()))?;
    let hash = state.auth.hash_password(&payload.password)?;
    state.store.update_account_password(id, &hash).await?;
    state.auth.delete_sessions_for(id);
    Ok(StatusCode::NO_CONTENT)
}

/// Revoke every session of an account (admin).
#[utoipa::path(
    delete,
    path = "/users/{id}/sessions",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Account id")),
    responses(
        (status = 204, description = "Sessions revoked")
    )
)]
pub async fn delete_user_sessions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.auth.delete_sessions_for(id);
    Ok(StatusCode::NO_CONTENT)
}
