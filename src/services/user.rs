//! User service implementation
//!
//! This service handles account sign-up, password login, bearer token
//! authentication, role preferences and the staff approval workflow.

use tracing::{info, warn, debug};
use crate::config::settings::Settings;
use crate::database::repositories::UserRepository;
use crate::models::registration::Role;
use crate::models::user::{
    CreateUserRequest, LogInRequest, SignUpRequest, UpdateProfileRequest, User, UserProfile, UserWithProfile,
};
use crate::services::auth::{AccessToken, AuthContext, AuthService};
use crate::utils::errors::{SwingRegistrationsError, Result};
use crate::utils::helpers::{is_valid_email, is_valid_username, Page, PageQuery};
use crate::utils::logging::log_staff_action;

pub const MIN_PASSWORD_LENGTH: usize = 8;

/// User service for managing user operations
#[derive(Clone)]
pub struct UserService {
    user_repository: UserRepository,
    auth_service: AuthService,
    settings: Settings,
}

impl UserService {
    /// Create a new UserService instance
    pub fn new(user_repository: UserRepository, auth_service: AuthService, settings: Settings) -> Self {
        Self {
            user_repository,
            auth_service,
            settings,
        }
    }

    /// Create an account; staff usernames are approved immediately
    pub async fn sign_up(&self, request: SignUpRequest) -> Result<(User, UserProfile)> {
        let username = request.username.trim().to_string();
        let email = request.email.trim().to_string();
        let role_preference = validate_sign_up(&username, &email, &request.password, request.role_preference.as_deref())?;

        debug!(username = %username, "Signing up new user");

        let is_staff = self.settings.is_staff_username(&username);
        let password_hash = self.auth_service.hash_password(&request.password)?;

        let (user, profile) = self
            .user_repository
            .create(CreateUserRequest {
                username,
                email,
                password_hash,
                is_staff,
                role_preference,
                approved: is_staff,
            })
            .await?;

        info!(user_id = user.id, is_staff = is_staff, approved = profile.approved, "New user signed up");
        Ok((user, profile))
    }

    /// Verify credentials and issue an access token
    pub async fn log_in(&self, request: LogInRequest) -> Result<AccessToken> {
        let invalid = || SwingRegistrationsError::Authentication("Invalid username or password".to_string());

        let Some(user) = self.user_repository.find_by_username(request.username.trim()).await? else {
            self.auth_service.log_auth_event(None, "log_in", false, Some("unknown username"));
            return Err(invalid());
        };

        if !self.auth_service.verify_password(&request.password, &user.password_hash)? {
            self.auth_service.log_auth_event(Some(user.id), "log_in", false, Some("wrong password"));
            return Err(invalid());
        }

        let token = self.auth_service.issue_token(user.id)?;
        self.auth_service.log_auth_event(Some(user.id), "log_in", true, None);
        Ok(token)
    }

    /// Resolve a bearer token into the caller's authentication context
    pub async fn authenticate(&self, token: &str) -> Result<AuthContext> {
        let claims = self.auth_service.decode_token(token)?;
        let user_id = claims.user_id()?;

        let user = self.user_repository.find_by_id(user_id).await?.ok_or_else(|| {
            warn!(user_id = user_id, "Token refers to a deleted user");
            SwingRegistrationsError::Authentication("Unknown user".to_string())
        })?;
        let profile = self.user_repository.find_profile(user_id).await?;

        Ok(AuthContext::new(&user, profile.as_ref()))
    }

    /// Get a user's profile
    pub async fn get_profile(&self, user_id: i64) -> Result<UserProfile> {
        self.user_repository
            .find_profile(user_id)
            .await?
            .ok_or(SwingRegistrationsError::UserNotFound { user_id })
    }

    /// Role stored on the profile, used when a registration omits the role
    pub async fn preferred_role(&self, user_id: i64) -> Result<Option<Role>> {
        let profile = self.user_repository.find_profile(user_id).await?;
        Ok(profile.and_then(|p| p.preferred_role()))
    }

    /// Update the caller's role preference
    pub async fn update_profile(&self, user_id: i64, request: UpdateProfileRequest) -> Result<UserProfile> {
        let role = parse_role_preference(request.role_preference.as_deref())?;

        let profile = self
            .user_repository
            .set_role_preference(user_id, role)
            .await?
            .ok_or(SwingRegistrationsError::UserNotFound { user_id })?;

        info!(user_id = user_id, role_preference = ?profile.role_preference, "Role preference updated");
        Ok(profile)
    }

    /// Accounts waiting for approval
    pub async fn list_unapproved(&self, page: PageQuery) -> Result<Page<UserWithProfile>> {
        let users = self.user_repository.list_unapproved(page.limit(), page.offset()).await?;
        let total = self.user_repository.count_unapproved().await?;
        Ok(Page::new(users, page, total))
    }

    /// Approve an account so it may register for instances
    pub async fn approve(&self, staff: &AuthContext, user_id: i64) -> Result<UserProfile> {
        let profile = self
            .user_repository
            .set_approved(user_id, true)
            .await?
            .ok_or(SwingRegistrationsError::UserNotFound { user_id })?;

        log_staff_action(staff.user_id, "approve_user", Some(&user_id.to_string()), None);
        Ok(profile)
    }

    /// Delete an account with its registrations and profile
    pub async fn delete_user(&self, staff: &AuthContext, user_id: i64) -> Result<()> {
        if !self.user_repository.delete(user_id).await? {
            return Err(SwingRegistrationsError::UserNotFound { user_id });
        }

        log_staff_action(staff.user_id, "delete_user", Some(&user_id.to_string()), None);
        Ok(())
    }
}

/// Parse an optional role preference; blank means none
pub fn parse_role_preference(value: Option<&str>) -> Result<Option<Role>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(code) => Role::parse(code)
            .map(Some)
            .ok_or_else(|| SwingRegistrationsError::InvalidInput(format!("Unknown role: {code}"))),
    }
}

/// Check sign-up fields, returning the parsed role preference
pub fn validate_sign_up(username: &str, email: &str, password: &str, role_preference: Option<&str>) -> Result<Option<Role>> {
    if !is_valid_username(username) {
        return Err(SwingRegistrationsError::InvalidInput(
            "Username must be 3-150 characters of letters, digits and @.+-_".to_string(),
        ));
    }

    if !is_valid_email(email) {
        return Err(SwingRegistrationsError::InvalidInput("Invalid email address".to_string()));
    }

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(SwingRegistrationsError::InvalidInput(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    parse_role_preference(role_preference)
}
