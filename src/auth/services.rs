use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    auth::{
        dto::SignupRequest,
        password::{hash_password, verify_password},
        repo::UserStore,
        repo_types::{NewUser, User},
    },
    error::AppError,
};

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Checks credentials and returns the user id they belong to.
pub async fn signin(store: &dyn UserStore, email: &str, password: &str) -> Result<Uuid, AppError> {
    let email = normalize_email(email);

    let Some(user) = store.find_by_email(&email).await? else {
        warn!(email = %email, "login unknown email");
        return Err(AppError::InvalidSignInInformation);
    };

    if !verify_password(password, &user.password_hash)? {
        warn!(email = %email, user_id = %user.id, "login invalid password");
        return Err(AppError::InvalidSignInInformation);
    }

    info!(user_id = %user.id, "user signed in");
    Ok(user.id)
}

/// Registers a new user with a hashed password.
pub async fn signup(store: &dyn UserStore, req: SignupRequest) -> Result<User, AppError> {
    let email = normalize_email(&req.email);

    if store.find_by_email(&email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(AppError::AlreadyExistsEmail);
    }

    let password_hash = hash_password(&req.password)?;
    let new = NewUser {
        name: req.name.trim().to_string(),
        email,
        password_hash,
    };

    // The unique index still decides when two signups race past the lookup.
    let user = store
        .create(new)
        .await?
        .ok_or(AppError::AlreadyExistsEmail)?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(user)
}
