use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::{UserError, UserResult};

pub const USERNAME_MIN_LEN: u64 = 3;
pub const USERNAME_MAX_LEN: u64 = 20;

/// User entity - matches SQL schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct User {
    /// Unique identifier (UUIDv7, time-ordered)
    pub id: Uuid,
    pub username: String,
    pub email: String,
    /// Stored as supplied; never exposed in API responses
    #[serde(default, skip_serializing)]
    pub password: String,
    pub created_at: DateTime<Utc>,
    /// Refreshed on every successful update
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Validate `input` and build a new user with a fresh id.
    ///
    /// `created_at` and `updated_at` are equal and truncated to microseconds
    /// so the value round-trips through PostgreSQL unchanged.
    pub fn new(input: CreateUser) -> UserResult<Self> {
        input.validate().map_err(validation_error)?;

        let now = now_micros();
        Ok(Self {
            id: Uuid::now_v7(),
            username: input.username,
            email: input.email,
            password: input.password,
            created_at: now,
            updated_at: now,
        })
    }

    /// Overwrite the fields that carry a non-empty value and refresh
    /// `updated_at`.
    pub fn apply_update(&mut self, input: UpdateUser) {
        if !input.username.is_empty() {
            self.username = input.username;
        }
        if !input.email.is_empty() {
            self.email = input.email;
        }
        if !input.password.is_empty() {
            self.password = input.password;
        }
        self.touch();
    }

    /// Move `updated_at` strictly forward, even if the clock has not advanced.
    pub fn touch(&mut self) {
        let now = now_micros();
        self.updated_at = if now > self.updated_at {
            now
        } else {
            self.updated_at + Duration::microseconds(1)
        };
    }
}

/// Current time at PostgreSQL `TIMESTAMPTZ` precision
pub fn now_micros() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// User response DTO (without password)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// DTO for creating a new user.
///
/// A missing or `null` field reads as empty and fails validation.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    #[serde(default, deserialize_with = "null_as_empty")]
    #[validate(custom(function = "validate_username"))]
    #[schema(min_length = 3, max_length = 20, example = "alice")]
    pub username: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    #[validate(length(min = 1, message = "email must not be empty"))]
    #[schema(example = "alice@example.com")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    #[validate(length(min = 1, message = "password must not be empty"))]
    pub password: String,
}

/// DTO for updating an existing user.
///
/// An omitted, `null` or empty field leaves the stored value unchanged, so a
/// field cannot be cleared through an update.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateUser {
    #[serde(default, deserialize_with = "null_as_empty")]
    #[validate(custom(function = "validate_optional_username"))]
    pub username: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub password: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Length is counted in UTF-8 bytes.
fn validate_username(username: &str) -> Result<(), ValidationError> {
    let len = username.len() as u64;
    if (USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&len) {
        return Ok(());
    }

    let mut err = ValidationError::new("length");
    err.message = Some("username must be between 3 and 20 characters".into());
    err.add_param("min".into(), &USERNAME_MIN_LEN);
    err.add_param("max".into(), &USERNAME_MAX_LEN);
    Err(err)
}

fn validate_optional_username(username: &str) -> Result<(), ValidationError> {
    if username.is_empty() {
        return Ok(());
    }
    validate_username(username)
}

/// Join field messages into one client-facing message.
pub(crate) fn validation_error(errors: ValidationErrors) -> UserError {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(msg) => msg.to_string(),
                None => format!("{} is invalid", field),
            })
        })
        .collect();
    messages.sort();
    UserError::Validation(messages.join("; "))
}

/// Query parameters for listing users
#[derive(Debug, Clone, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct ListUsersQuery {
    /// 1-based page number
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

impl Default for ListUsersQuery {
    fn default() -> Self {
        Self {
            page: default_page(),
            page_size: default_page_size(),
        }
    }
}

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    10
}

/// One page of users
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ListUsersResponse {
    pub users: Vec<UserResponse>,
    pub page: i64,
    pub page_size: i64,
    /// Number of users on this page
    pub total: usize,
}
