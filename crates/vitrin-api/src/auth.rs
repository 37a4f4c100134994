//! Credential handling and `/auth` endpoints.
//!
//! Passwords are hashed with argon2 (PHC strings). Logins are granted an
//! opaque bearer token: 32 random bytes, hex-encoded for the client; only
//! its SHA-256 hash is persisted, so a leaked session table cannot be
//! replayed.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use axum::{
  Json,
  extract::{FromRequestParts, State},
  http::{StatusCode, header, request::Parts},
  response::IntoResponse,
};
use chrono::{Duration, Utc};
use rand_core::{OsRng, RngCore as _};
use serde::Deserialize;
use serde_json::json;
use sha2::{Digest as _, Sha256};
use vitrin_core::{
  store::CatalogStore,
  user::{NewUser, User, UserUpdate},
};

use crate::{AppState, error::ApiError};

// ─── Credential helpers ───────────────────────────────────────────────────────

/// Hash a password into an argon2 PHC string.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|h| h.to_string())
    .map_err(|e| ApiError::BadRequest(format!("could not hash password: {e}")))
}

/// Verify a password against a stored PHC string.
pub fn verify_password(hash: &str, password: &str) -> bool {
  PasswordHash::new(hash)
    .map(|parsed| {
      Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
    })
    .unwrap_or(false)
}

/// Generate a fresh bearer token and the hash under which it is stored.
pub fn issue_token() -> (String, String) {
  let mut bytes = [0u8; 32];
  OsRng.fill_bytes(&mut bytes);
  let token = hex::encode(bytes);
  (token.clone(), token_hash(&token))
}

/// The persisted form of a bearer token.
pub fn token_hash(token: &str) -> String {
  hex::encode(Sha256::digest(token.as_bytes()))
}

// ─── Extractors ───────────────────────────────────────────────────────────────

/// The authenticated user behind a valid, unexpired bearer token.
pub struct CurrentUser(pub User);

/// Like [`CurrentUser`], but additionally requires the admin flag.
pub struct AdminUser(pub User);

async fn user_from_parts<S>(
  parts: &Parts,
  state: &AppState<S>,
) -> Result<User, ApiError>
where
  S: CatalogStore,
{
  let header_val = parts
    .headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or_else(|| ApiError::Unauthorized("missing bearer token".into()))?;

  let token = header_val
    .strip_prefix("Bearer ")
    .ok_or_else(|| ApiError::Unauthorized("missing bearer token".into()))?;

  let (user, expires_at) = state
    .store
    .find_session(&token_hash(token))
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::Unauthorized("invalid token".into()))?;

  if expires_at < Utc::now() {
    return Err(ApiError::Unauthorized("token expired".into()));
  }

  Ok(user)
}

impl<S> FromRequestParts<AppState<S>> for CurrentUser
where
  S: CatalogStore + Clone + Send + Sync + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    Ok(CurrentUser(user_from_parts(parts, state).await?))
  }
}

impl<S> FromRequestParts<AppState<S>> for AdminUser
where
  S: CatalogStore + Clone + Send + Sync + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let user = user_from_parts(parts, state).await?;
    if !user.is_admin {
      return Err(ApiError::Forbidden("admin access required".into()));
    }
    Ok(AdminUser(user))
  }
}

// ─── Handlers ────────────────────────────────────────────────────────────────

/// Issue a session for `user` and render the auth response body.
async fn session_body<S>(
  state: &AppState<S>,
  user: &User,
) -> Result<serde_json::Value, ApiError>
where
  S: CatalogStore,
{
  let (token, hash) = issue_token();
  let expires_at = Utc::now() + Duration::days(state.config.session_ttl_days);
  state
    .store
    .add_session(user.id, hash, expires_at)
    .await
    .map_err(ApiError::store)?;

  Ok(json!({
    "id": user.id,
    "name": user.name,
    "email": user.email,
    "isAdmin": user.is_admin,
    "token": token,
  }))
}

#[derive(Debug, Deserialize)]
pub struct RegisterBody {
  pub name:     String,
  pub email:    String,
  pub password: String,
}

/// `POST /auth/register` — body: `{"name", "email", "password"}`
pub async fn register<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<RegisterBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CatalogStore + Clone + Send + Sync + 'static,
{
  if body.name.trim().is_empty()
    || body.email.trim().is_empty()
    || body.password.is_empty()
  {
    return Err(ApiError::BadRequest(
      "name, email and password are required".into(),
    ));
  }

  if state
    .store
    .find_user_by_email(&body.email)
    .await
    .map_err(ApiError::store)?
    .is_some()
  {
    return Err(ApiError::BadRequest("email already registered".into()));
  }

  let user = state
    .store
    .add_user(NewUser {
      name:          body.name.trim().to_owned(),
      email:         body.email,
      password_hash: hash_password(&body.password)?,
      is_admin:      false,
    })
    .await
    .map_err(ApiError::store)?;

  let data = session_body(&state, &user).await?;
  Ok((
    StatusCode::CREATED,
    Json(json!({ "success": true, "data": data })),
  ))
}

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  pub email:    String,
  pub password: String,
}

/// `POST /auth/login`
pub async fn login<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<LoginBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CatalogStore + Clone + Send + Sync + 'static,
{
  let user = state
    .store
    .find_user_by_email(&body.email)
    .await
    .map_err(ApiError::store)?;

  // One rejection message for both unknown email and bad password.
  let user = user
    .filter(|u| verify_password(&u.password_hash, &body.password))
    .ok_or_else(|| ApiError::Unauthorized("invalid email or password".into()))?;

  let data = session_body(&state, &user).await?;
  Ok(Json(json!({ "success": true, "data": data })))
}

/// `GET /auth/me`
pub async fn profile<S>(
  CurrentUser(user): CurrentUser,
) -> Result<impl IntoResponse, ApiError>
where
  S: CatalogStore + Clone + Send + Sync + 'static,
{
  Ok(Json(json!({
    "success": true,
    "data": {
      "id": user.id,
      "name": user.name,
      "email": user.email,
      "isAdmin": user.is_admin,
    },
  })))
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileBody {
  pub name:     Option<String>,
  pub email:    Option<String>,
  pub password: Option<String>,
}

/// `PUT /auth/me`
pub async fn update_profile<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  Json(body): Json<UpdateProfileBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CatalogStore + Clone + Send + Sync + 'static,
{
  if let Some(email) = &body.email
    && email.trim().to_lowercase() != user.email
    && state
      .store
      .find_user_by_email(email)
      .await
      .map_err(ApiError::store)?
      .is_some()
  {
    return Err(ApiError::BadRequest("email already in use".into()));
  }

  let password_hash = body.password.as_deref().map(hash_password).transpose()?;
  let updated = state
    .store
    .update_user(user.id, UserUpdate {
      name: body.name,
      email: body.email,
      password_hash,
    })
    .await
    .map_err(ApiError::store)?;

  Ok(Json(json!({
    "success": true,
    "data": {
      "id": updated.id,
      "name": updated.name,
      "email": updated.email,
      "isAdmin": updated.is_admin,
    },
  })))
}
