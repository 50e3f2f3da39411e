use serde::Deserialize;
use uuid::Uuid;

use crate::auth;
use crate::database::manager::DatabaseManager;
use crate::database::models::{Group, User};
use crate::revalidate;
use crate::services::journal_service;

use super::{require_non_blank, ServiceError, ServiceResult};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUser {
    pub email: String,
    pub name: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    pub email: Option<String>,
    pub name: Option<String>,
    pub password: Option<String>,
    pub is_active: Option<bool>,
}

fn validate_email(email: &str) -> ServiceResult<()> {
    let email = email.trim();
    if !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
        return Err(ServiceError::Validation(
            "Adresse e-mail invalide".to_string(),
        ));
    }
    Ok(())
}

pub async fn list() -> ServiceResult<Vec<User>> {
    let pool = DatabaseManager::pool().await?;
    let rows = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY name ASC")
        .fetch_all(&pool)
        .await?;
    Ok(rows)
}

pub async fn get(id: Uuid) -> ServiceResult<User> {
    let pool = DatabaseManager::pool().await?;
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(&pool)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Utilisateur non trouvé".to_string()))
}

pub async fn find_by_email(email: &str) -> ServiceResult<Option<User>> {
    let pool = DatabaseManager::pool().await?;
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(email.trim())
        .fetch_optional(&pool)
        .await?;
    Ok(user)
}

pub async fn create(input: CreateUser) -> ServiceResult<User> {
    require_non_blank(&input.email, "e-mail")?;
    require_non_blank(&input.name, "nom")?;
    require_non_blank(&input.password, "mot de passe")?;
    validate_email(&input.email)?;

    let pool = DatabaseManager::pool().await?;
    let mut tx = pool.begin().await?;

    let email = input.email.trim().to_lowercase();
    let duplicate: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE email = $1")
        .bind(&email)
        .fetch_optional(&mut *tx)
        .await?;
    if duplicate.is_some() {
        return Err(ServiceError::Guard(format!(
            "Un utilisateur avec l'adresse {} existe déjà",
            email
        )));
    }

    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users (email, name, password_hash) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(&email)
    .bind(input.name.trim())
    .bind(auth::hash_password(&input.password))
    .fetch_one(&mut *tx)
    .await?;

    journal_service::record(
        &mut *tx,
        "creation",
        "utilisateur",
        Some(user.id),
        &format!("Utilisateur {} créé", user.email),
        None,
    )
    .await?;

    tx.commit().await?;
    revalidate::mark(&[revalidate::USERS]).await;
    Ok(user)
}

pub async fn update(id: Uuid, input: UpdateUser) -> ServiceResult<User> {
    let pool = DatabaseManager::pool().await?;
    let mut tx = pool.begin().await?;

    let current = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Utilisateur non trouvé".to_string()))?;

    let email = match input.email {
        Some(e) => {
            validate_email(&e)?;
            e.trim().to_lowercase()
        }
        None => current.email,
    };
    let name = input.name.unwrap_or(current.name);
    require_non_blank(&name, "nom")?;

    let password_hash = match input.password {
        Some(p) if !p.trim().is_empty() => auth::hash_password(&p),
        _ => current.password_hash,
    };

    let user = sqlx::query_as::<_, User>(
        "UPDATE users SET email = $1, name = $2, password_hash = $3, is_active = $4, \
         updated_at = NOW() WHERE id = $5 RETURNING *",
    )
    .bind(&email)
    .bind(name.trim())
    .bind(&password_hash)
    .bind(input.is_active.unwrap_or(current.is_active))
    .bind(id)
    .fetch_one(&mut *tx)
    .await?;

    journal_service::record(
        &mut *tx,
        "modification",
        "utilisateur",
        Some(id),
        &format!("Utilisateur {} mis à jour", user.email),
        None,
    )
    .await?;

    tx.commit().await?;
    revalidate::mark(&[revalidate::USERS]).await;
    Ok(user)
}

/// Flip `is_active`; applying it twice restores the initial state
pub async fn toggle_active(id: Uuid) -> ServiceResult<User> {
    let pool = DatabaseManager::pool().await?;
    let mut tx = pool.begin().await?;

    let user = sqlx::query_as::<_, User>(
        "UPDATE users SET is_active = NOT is_active, updated_at = NOW() \
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| ServiceError::NotFound("Utilisateur non trouvé".to_string()))?;

    journal_service::record(
        &mut *tx,
        if user.is_active { "activation" } else { "desactivation" },
        "utilisateur",
        Some(id),
        &format!("Utilisateur {} {}", user.email, if user.is_active { "activé" } else { "désactivé" }),
        None,
    )
    .await?;

    tx.commit().await?;
    revalidate::mark(&[revalidate::USERS]).await;
    Ok(user)
}

pub async fn delete(id: Uuid) -> ServiceResult<()> {
    let pool = DatabaseManager::pool().await?;
    let mut tx = pool.begin().await?;

    let existing = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Utilisateur non trouvé".to_string()))?;

    // Membership rows cascade with the user
    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    journal_service::record(
        &mut *tx,
        "suppression",
        "utilisateur",
        Some(id),
        &format!("Utilisateur {} supprimé", existing.email),
        None,
    )
    .await?;

    tx.commit().await?;
    revalidate::mark(&[revalidate::USERS]).await;
    Ok(())
}

/// Groups the user belongs to
pub async fn groups_of(id: Uuid) -> ServiceResult<Vec<Group>> {
    let pool = DatabaseManager::pool().await?;

    // 404 on unknown user rather than an empty list
    let user: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(&pool)
        .await?;
    if user.is_none() {
        return Err(ServiceError::NotFound("Utilisateur non trouvé".to_string()));
    }

    let groups = sqlx::query_as::<_, Group>(
        "SELECT g.* FROM groups g \
         JOIN user_groups ug ON ug.group_id = g.id \
         WHERE ug.user_id = $1 ORDER BY g.name ASC",
    )
    .bind(id)
    .fetch_all(&pool)
    .await?;
    Ok(groups)
}
