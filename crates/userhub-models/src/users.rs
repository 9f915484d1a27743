//! User domain models and DTOs.
//!
//! - [`User`]: The entity handled by the business layer
//! - [`UserRow`]: The `users` table row, mapped with `sqlx::FromRow`
//! - [`UserView`]: The wire shape returned to clients (no password hash)
//! - [`NewUser`] / [`UpdateUser`]: Request payloads, validated with `validator`

use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use userhub_auth::roles;
use uuid::Uuid;
use validator::{Validate, ValidateEmail, ValidationError, ValidationErrors};

/// Roles a user may be granted.
pub const KNOWN_ROLES: [&str; 2] = [roles::ADMIN, roles::USER];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub roles: Vec<String>,
    pub password_hash: String,
    pub date_created: DateTime<Utc>,
    pub date_updated: DateTime<Utc>,
}

impl User {
    /// Builds a user from a validated payload and an already computed hash.
    pub fn create(new: NewUser, password_hash: String, id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: new.name,
            email: new.email,
            roles: new.roles,
            password_hash,
            date_created: now,
            date_updated: now,
        }
    }

    /// Applies the present fields of `update`. `password_hash` replaces the
    /// stored hash when the update carried a new password.
    pub fn apply(&mut self, update: UpdateUser, password_hash: Option<String>, now: DateTime<Utc>) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(email) = update.email {
            self.email = email;
        }
        if let Some(roles) = update.roles {
            self.roles = roles;
        }
        if let Some(hash) = password_hash {
            self.password_hash = hash;
        }
        self.date_updated = now;
    }
}

/// A row of the `users` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct UserRow {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub roles: Vec<String>,
    pub password_hash: String,
    pub date_created: DateTime<Utc>,
    pub date_updated: DateTime<Utc>,
}

impl From<User> for UserRow {
    fn from(user: User) -> Self {
        Self {
            user_id: user.id,
            name: user.name,
            email: user.email,
            roles: user.roles,
            password_hash: user.password_hash,
            date_created: user.date_created,
            date_updated: user.date_updated,
        }
    }
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.user_id,
            name: row.name,
            email: row.email,
            roles: row.roles,
            password_hash: row.password_hash,
            date_created: row.date_created,
            date_updated: row.date_updated,
        }
    }
}

/// User as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserView {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub roles: Vec<String>,
    pub date_created: DateTime<Utc>,
    pub date_updated: DateTime<Utc>,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            roles: user.roles.clone(),
            date_created: user.date_created,
            date_updated: user.date_updated,
        }
    }
}

/// Payload for creating a user.
///
/// Missing fields decode to empty values so validation can name every absent
/// field at once instead of failing on the first one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default, deny_unknown_fields)]
pub struct NewUser {
    #[validate(length(min = 1, message = "name is a required field"))]
    pub name: String,
    #[validate(
        length(min = 1, message = "email is a required field"),
        email(message = "email must be a valid email address")
    )]
    pub email: String,
    #[validate(
        length(min = 1, message = "roles is a required field"),
        custom(function = "validate_roles")
    )]
    pub roles: Vec<String>,
    #[validate(length(min = 1, message = "password is a required field"))]
    pub password: String,
    #[validate(must_match(other = "password", message = "password_confirm must be equal to password"))]
    pub password_confirm: String,
}

/// Payload for a partial update. `None` leaves the stored value untouched.
///
/// Only present fields are validated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_confirm: Option<String>,
}

impl Validate for UpdateUser {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.name.as_ref().is_some_and(|name| name.is_empty()) {
            errors.add("name", invalid("length", "name must not be empty"));
        }
        if self.email.as_ref().is_some_and(|email| !email.validate_email()) {
            errors.add("email", invalid("email", "email must be a valid email address"));
        }
        if let Some(roles) = &self.roles {
            if roles.is_empty() {
                errors.add("roles", invalid("length", "roles must not be empty"));
            } else if let Err(err) = validate_roles(roles) {
                errors.add("roles", err);
            }
        }
        if self.password.as_ref().is_some_and(|password| password.is_empty()) {
            errors.add("password", invalid("length", "password must not be empty"));
        }
        if self.password_confirm != self.password {
            errors.add(
                "password_confirm",
                invalid("must_match", "password_confirm must be equal to password"),
            );
        }

        if errors.errors().is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

#[allow(clippy::ptr_arg)]
fn validate_roles(roles: &Vec<String>) -> Result<(), ValidationError> {
    match roles.iter().find(|r| !KNOWN_ROLES.contains(&r.as_str())) {
        Some(unknown) => Err(ValidationError::new("role")
            .with_message(Cow::Owned(format!("roles contains unknown role {:?}", unknown)))),
        None => Ok(()),
    }
}
