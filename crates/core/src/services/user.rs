//! User service: registration, login and the admin user listing.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use domus_common::{AppError, AppResult, IdGenerator};
use domus_db::{
    entities::{profile, user},
    repositories::{profile::ProfileChange, ProfileRepository, UserRepository},
};
use serde::Deserialize;
use validator::Validate;

use super::Caller;

/// User service for account lifecycle and authentication.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    profile_repo: ProfileRepository,
    id_gen: IdGenerator,
}

/// Input for registering a new user.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterInput {
    #[validate(length(min = 1, max = 64))]
    pub username: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

/// A user together with their profile, for the admin listing.
#[derive(Debug)]
pub struct UserWithProfile {
    pub user: user::Model,
    pub profile: Option<profile::Model>,
}

/// Input for updating one's own profile. Only the caller's own row is
/// ever touched through this path.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileInput {
    #[validate(length(max = 64))]
    pub first_name: Option<String>,

    #[validate(length(max = 64))]
    pub last_name: Option<String>,

    #[validate(email)]
    pub email: Option<String>,

    #[validate(length(max = 32))]
    pub phone_number: Option<String>,

    /// Attachment ID of a profile photo.
    pub photo_id: Option<String>,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(user_repo: UserRepository, profile_repo: ProfileRepository) -> Self {
        Self {
            user_repo,
            profile_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Register a new user. The profile row is created in the same step.
    pub async fn register(&self, input: RegisterInput) -> AppResult<user::Model> {
        input.validate()?;

        if self
            .user_repo
            .find_by_username(&input.username)
            .await?
            .is_some()
        {
            return Err(AppError::BadRequest("Username already taken".to_string()));
        }

        let password_hash = hash_password(&input.password)?;
        let user_id = self.id_gen.generate();

        self.user_repo
            .create(user_id, input.username, password_hash)
            .await
    }

    /// Authenticate by username and password, issuing a fresh session token.
    pub async fn login(&self, username: &str, password: &str) -> AppResult<(user::Model, String)> {
        let user = self
            .user_repo
            .find_by_username(username)
            .await?
            .ok_or(AppError::Unauthorized)?;

        let profile = self
            .profile_repo
            .find_by_user_id(&user.id)
            .await?
            .ok_or(AppError::Unauthorized)?;

        let password_hash = profile.password.ok_or(AppError::Unauthorized)?;
        if !verify_password(password, &password_hash)? {
            return Err(AppError::Unauthorized);
        }

        let token = self.id_gen.generate_token();
        let user = self
            .user_repo
            .set_token(&user.id, Some(token.clone()))
            .await?;

        Ok((user, token))
    }

    /// Invalidate the caller's session token.
    pub async fn logout(&self, caller: &Caller) -> AppResult<()> {
        self.user_repo.set_token(&caller.id, None).await?;
        Ok(())
    }

    /// Resolve a session token to a caller identity.
    pub async fn authenticate_by_token(&self, token: &str) -> AppResult<Caller> {
        let user = self
            .user_repo
            .find_by_token(token)
            .await?
            .ok_or(AppError::Unauthorized)?;

        let is_manager = self
            .profile_repo
            .find_by_user_id(&user.id)
            .await?
            .is_some_and(|p| p.is_manager);

        Ok(Caller {
            id: user.id,
            is_manager,
        })
    }

    /// Get a user by ID.
    pub async fn get(&self, id: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_id(id).await
    }

    /// List all users with profiles. Manager only.
    pub async fn list(&self, caller: &Caller) -> AppResult<Vec<UserWithProfile>> {
        if !caller.is_manager {
            return Err(AppError::Forbidden(
                "Only managers may list users".to_string(),
            ));
        }

        let rows = self.user_repo.find_all_with_profiles().await?;

        Ok(rows
            .into_iter()
            .map(|(user, profile)| UserWithProfile { user, profile })
            .collect())
    }

    /// Read the caller's own profile.
    pub async fn get_own_profile(&self, caller: &Caller) -> AppResult<profile::Model> {
        self.profile_repo.get_by_user_id(&caller.id).await
    }

    /// Update the caller's own profile fields.
    pub async fn update_own_profile(
        &self,
        caller: &Caller,
        input: UpdateProfileInput,
    ) -> AppResult<profile::Model> {
        input.validate()?;

        self.profile_repo
            .update(
                &caller.id,
                ProfileChange {
                    first_name: input.first_name.map(Some),
                    last_name: input.last_name.map(Some),
                    email: input.email.map(Some),
                    phone_number: input.phone_number.map(Some),
                    photo_id: input.photo_id.map(Some),
                    password: None,
                },
            )
            .await
    }

    /// Grant or revoke the manager role. Manager only.
    pub async fn set_manager(
        &self,
        caller: &Caller,
        target_id: &str,
        is_manager: bool,
    ) -> AppResult<profile::Model> {
        if !caller.is_manager {
            return Err(AppError::Forbidden(
                "Only managers may change roles".to_string(),
            ));
        }

        // Verify the target exists before touching the profile.
        self.user_repo.get_by_id(target_id).await?;

        self.profile_repo.set_manager(target_id, is_manager).await
    }
}

/// Hash a password using Argon2.
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
