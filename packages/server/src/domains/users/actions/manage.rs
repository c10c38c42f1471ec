//! Account administration for DSI and Admin.

use sqlx::PgPool;
use tracing::info;

use crate::common::auth::{Actor, Capability};
use crate::common::{DomainError, DomainResult, UserId};
use crate::domains::users::data::{CreateUserInput, UpdateUserInput};
use crate::domains::users::models::{NewUser, RoleRecord, User};

/// What `delete_user` ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserRemoval {
    Deleted,
    /// The user is referenced by tickets and was deactivated instead
    Deactivated,
}

pub async fn list_users(actor: &Actor, pool: &PgPool) -> DomainResult<Vec<User>> {
    actor.can(Capability::ManageUsers).check()?;
    Ok(User::find_all(pool).await?)
}

pub async fn list_roles(pool: &PgPool) -> DomainResult<Vec<RoleRecord>> {
    Ok(RoleRecord::find_all(pool).await?)
}

pub async fn get_user(id: UserId, actor: &Actor, pool: &PgPool) -> DomainResult<User> {
    actor.can(Capability::ManageUsers).check()?;
    User::find_by_id(id, pool)
        .await?
        .ok_or(DomainError::NotFound("User"))
}

pub async fn create_user(input: CreateUserInput, actor: &Actor, pool: &PgPool) -> DomainResult<User> {
    actor.can(Capability::ManageUsers).check()?;

    let full_name = required(&input.full_name, "Full name")?;
    let email = required(&input.email, "Email")?;
    let username = required(&input.username, "Username")?;
    validate_capacity(input.max_tickets_capacity)?;

    if User::email_taken(&email, None, pool).await? || User::username_taken(&username, pool).await? {
        return Err(DomainError::validation(
            "User with same email or username already exists",
        ));
    }
    let role = RoleRecord::find_by_id(input.role_id, pool)
        .await?
        .ok_or(DomainError::NotFound("Role"))?;

    let user = User::create(
        &NewUser::builder()
            .full_name(full_name)
            .email(email)
            .username(username)
            .role_id(role.id)
            .agency(input.agency)
            .phone(input.phone)
            .specialization(input.specialization)
            .max_tickets_capacity(input.max_tickets_capacity)
            .notes(input.notes)
            .build(),
        pool,
    )
    .await
    .map_err(|e| duplicate_as_validation(e, "User with same email or username already exists"))?;

    info!(user_id = %user.id, role = %user.role, created_by = %actor.id, "user created");
    Ok(user)
}

pub async fn update_user(
    id: UserId,
    input: UpdateUserInput,
    actor: &Actor,
    pool: &PgPool,
) -> DomainResult<User> {
    actor.can(Capability::ManageUsers).check()?;

    let mut user = User::find_by_id(id, pool)
        .await?
        .ok_or(DomainError::NotFound("User"))?;

    if let Some(email) = input.email {
        let email = required(&email, "Email")?;
        if !email.eq_ignore_ascii_case(&user.email) && User::email_taken(&email, Some(id), pool).await? {
            return Err(DomainError::validation("Email already in use"));
        }
        user.email = email;
    }
    if let Some(full_name) = input.full_name {
        user.full_name = required(&full_name, "Full name")?;
    }
    if let Some(role_id) = input.role_id {
        let role = RoleRecord::find_by_id(role_id, pool)
            .await?
            .ok_or(DomainError::NotFound("Role"))?;
        user.role_id = role.id;
    }
    if input.max_tickets_capacity.is_some() {
        validate_capacity(input.max_tickets_capacity)?;
        user.max_tickets_capacity = input.max_tickets_capacity;
    }
    if let Some(actif) = input.actif {
        if !actif && user.id == actor.id {
            return Err(DomainError::validation("You cannot deactivate your own account"));
        }
        user.actif = actif;
    }
    if input.agency.is_some() {
        user.agency = input.agency;
    }
    if input.phone.is_some() {
        user.phone = input.phone;
    }
    if input.specialization.is_some() {
        user.specialization = input.specialization;
    }
    if input.notes.is_some() {
        user.notes = input.notes;
    }

    user.save(pool)
        .await
        .map_err(|e| duplicate_as_validation(e, "Email already in use"))?;
    info!(user_id = %user.id, updated_by = %actor.id, "user updated");

    // Reload so the joined role name follows a role change.
    User::find_by_id(id, pool)
        .await?
        .ok_or(DomainError::NotFound("User"))
}

pub async fn delete_user(id: UserId, actor: &Actor, pool: &PgPool) -> DomainResult<UserRemoval> {
    actor.can(Capability::ManageUsers).check()?;

    if id == actor.id {
        return Err(DomainError::validation("You cannot delete your own account"));
    }
    let user = User::find_by_id(id, pool)
        .await?
        .ok_or(DomainError::NotFound("User"))?;

    if User::has_tickets(user.id, pool).await? {
        User::deactivate(user.id, pool).await?;
        info!(user_id = %user.id, deleted_by = %actor.id, "user has tickets, deactivated");
        return Ok(UserRemoval::Deactivated);
    }

    User::delete(user.id, pool).await?;
    info!(user_id = %user.id, deleted_by = %actor.id, "user deleted");
    Ok(UserRemoval::Deleted)
}

fn required(value: &str, field: &str) -> DomainResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

/// A unique-index hit from a concurrent writer becomes the same 400 as the pre-check.
fn duplicate_as_validation(err: anyhow::Error, message: &str) -> DomainError {
    match err.downcast_ref::<sqlx::Error>() {
        Some(sqlx::Error::Database(db)) if db.is_unique_violation() => DomainError::validation(message),
        _ => DomainError::Internal(err),
    }
}

fn validate_capacity(capacity: Option<i32>) -> DomainResult<()> {
    match capacity {
        Some(c) if c < 1 => Err(DomainError::validation(
            "Ticket capacity must be at least 1",
        )),
        _ => Ok(()),
    }
}
