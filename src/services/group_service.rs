use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeSet;
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::models::{Group, User};
use crate::revalidate;
use crate::services::journal_service;

use super::{require_non_blank, ServiceError, ServiceResult};

/// Capability tokens a group may carry. Unknown tokens are rejected at the
/// edge instead of being stored as free-form strings.
pub const KNOWN_PERMISSIONS: &[&str] = &[
    "utilisateurs.gerer",
    "groupes.gerer",
    "series.gerer",
    "localisations.gerer",
    "liasses.gerer",
    "structures.gerer",
    "beneficiaires.gerer",
    "types-document.gerer",
    "documents.gerer",
    "dossiers.gerer",
    "parametres.gerer",
    "journal.consulter",
];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGroup {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default)]
    pub autorisations: Option<Value>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGroup {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetPermissions {
    pub permissions: Vec<String>,
    #[serde(default)]
    pub autorisations: Option<Value>,
}

/// Deduplicate and validate capability tokens
fn normalize_permissions(permissions: Vec<String>) -> ServiceResult<Vec<String>> {
    let mut seen = BTreeSet::new();
    for perm in &permissions {
        if !KNOWN_PERMISSIONS.contains(&perm.as_str()) {
            return Err(ServiceError::Validation(format!(
                "Permission inconnue : {}",
                perm
            )));
        }
        seen.insert(perm.clone());
    }
    Ok(seen.into_iter().collect())
}

/// The autorisations extension map must be an object whose values are
/// booleans or arrays of strings
fn validate_autorisations(value: &Value) -> ServiceResult<()> {
    let Value::Object(map) = value else {
        return Err(ServiceError::Validation(
            "Les autorisations doivent être un objet".to_string(),
        ));
    };
    for (key, entry) in map {
        let ok = match entry {
            Value::Bool(_) => true,
            Value::Array(items) => items.iter().all(|i| i.is_string()),
            _ => false,
        };
        if !ok {
            return Err(ServiceError::Validation(format!(
                "Autorisation invalide pour {} : booléen ou liste de chaînes attendu",
                key
            )));
        }
    }
    Ok(())
}

pub async fn list() -> ServiceResult<Vec<Group>> {
    let pool = DatabaseManager::pool().await?;
    let rows = sqlx::query_as::<_, Group>("SELECT * FROM groups ORDER BY name ASC")
        .fetch_all(&pool)
        .await?;
    Ok(rows)
}

pub async fn get(id: Uuid) -> ServiceResult<Group> {
    let pool = DatabaseManager::pool().await?;
    sqlx::query_as::<_, Group>("SELECT * FROM groups WHERE id = $1")
        .bind(id)
        .fetch_optional(&pool)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Groupe non trouvé".to_string()))
}

pub async fn create(input: CreateGroup) -> ServiceResult<Group> {
    require_non_blank(&input.name, "nom")?;
    let permissions = normalize_permissions(input.permissions)?;
    let autorisations = input.autorisations.unwrap_or_else(|| Value::Object(Default::default()));
    validate_autorisations(&autorisations)?;

    let pool = DatabaseManager::pool().await?;
    let mut tx = pool.begin().await?;

    let name = input.name.trim();
    let duplicate: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM groups WHERE name = $1")
        .bind(name)
        .fetch_optional(&mut *tx)
        .await?;
    if duplicate.is_some() {
        return Err(ServiceError::Guard(format!(
            "Un groupe nommé {} existe déjà",
            name
        )));
    }

    let group = sqlx::query_as::<_, Group>(
        "INSERT INTO groups (name, description, permissions, autorisations) \
         VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(name)
    .bind(&input.description)
    .bind(&permissions)
    .bind(&autorisations)
    .fetch_one(&mut *tx)
    .await?;

    journal_service::record(
        &mut *tx,
        "creation",
        "groupe",
        Some(group.id),
        &format!("Groupe {} créé", group.name),
        None,
    )
    .await?;

    tx.commit().await?;
    revalidate::mark(&[revalidate::GROUPS]).await;
    Ok(group)
}

pub async fn update(id: Uuid, input: UpdateGroup) -> ServiceResult<Group> {
    let pool = DatabaseManager::pool().await?;
    let mut tx = pool.begin().await?;

    let current = sqlx::query_as::<_, Group>("SELECT * FROM groups WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Groupe non trouvé".to_string()))?;

    let name = input.name.unwrap_or(current.name);
    require_non_blank(&name, "nom")?;

    let group = sqlx::query_as::<_, Group>(
        "UPDATE groups SET name = $1, description = $2, updated_at = NOW() \
         WHERE id = $3 RETURNING *",
    )
    .bind(name.trim())
    .bind(input.description.or(current.description))
    .bind(id)
    .fetch_one(&mut *tx)
    .await?;

    journal_service::record(
        &mut *tx,
        "modification",
        "groupe",
        Some(id),
        &format!("Groupe {} mis à jour", group.name),
        None,
    )
    .await?;

    tx.commit().await?;
    revalidate::mark(&[revalidate::GROUPS]).await;
    Ok(group)
}

/// Replace the group's capability tokens and extension map
pub async fn set_permissions(id: Uuid, input: SetPermissions) -> ServiceResult<Group> {
    let permissions = normalize_permissions(input.permissions)?;

    let pool = DatabaseManager::pool().await?;
    let mut tx = pool.begin().await?;

    let current = sqlx::query_as::<_, Group>("SELECT * FROM groups WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Groupe non trouvé".to_string()))?;

    let autorisations = input.autorisations.unwrap_or(current.autorisations);
    validate_autorisations(&autorisations)?;

    let group = sqlx::query_as::<_, Group>(
        "UPDATE groups SET permissions = $1, autorisations = $2, updated_at = NOW() \
         WHERE id = $3 RETURNING *",
    )
    .bind(&permissions)
    .bind(&autorisations)
    .bind(id)
    .fetch_one(&mut *tx)
    .await?;

    journal_service::record(
        &mut *tx,
        "modification",
        "groupe",
        Some(id),
        &format!("Permissions du groupe {} mises à jour", group.name),
        None,
    )
    .await?;

    tx.commit().await?;
    revalidate::mark(&[revalidate::GROUPS]).await;
    Ok(group)
}

pub async fn delete(id: Uuid) -> ServiceResult<()> {
    let pool = DatabaseManager::pool().await?;
    let mut tx = pool.begin().await?;

    let existing = sqlx::query_as::<_, Group>("SELECT * FROM groups WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Groupe non trouvé".to_string()))?;

    // Membership rows cascade with the group
    sqlx::query("DELETE FROM groups WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    journal_service::record(
        &mut *tx,
        "suppression",
        "groupe",
        Some(id),
        &format!("Groupe {} supprimé", existing.name),
        None,
    )
    .await?;

    tx.commit().await?;
    revalidate::mark(&[revalidate::GROUPS]).await;
    Ok(())
}

pub async fn members(id: Uuid) -> ServiceResult<Vec<User>> {
    let pool = DatabaseManager::pool().await?;

    let group: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM groups WHERE id = $1")
        .bind(id)
        .fetch_optional(&pool)
        .await?;
    if group.is_none() {
        return Err(ServiceError::NotFound("Groupe non trouvé".to_string()));
    }

    let users = sqlx::query_as::<_, User>(
        "SELECT u.* FROM users u \
         JOIN user_groups ug ON ug.user_id = u.id \
         WHERE ug.group_id = $1 ORDER BY u.name ASC",
    )
    .bind(id)
    .fetch_all(&pool)
    .await?;
    Ok(users)
}

pub async fn add_member(group_id: Uuid, user_id: Uuid) -> ServiceResult<()> {
    let pool = DatabaseManager::pool().await?;
    let mut tx = pool.begin().await?;

    let group: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM groups WHERE id = $1")
        .bind(group_id)
        .fetch_optional(&mut *tx)
        .await?;
    if group.is_none() {
        return Err(ServiceError::NotFound("Groupe non trouvé".to_string()));
    }
    let user: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;
    if user.is_none() {
        return Err(ServiceError::NotFound("Utilisateur non trouvé".to_string()));
    }

    // Idempotent: an existing membership is left untouched
    sqlx::query(
        "INSERT INTO user_groups (user_id, group_id) VALUES ($1, $2) \
         ON CONFLICT (user_id, group_id) DO NOTHING",
    )
    .bind(user_id)
    .bind(group_id)
    .execute(&mut *tx)
    .await?;

    journal_service::record(
        &mut *tx,
        "modification",
        "groupe",
        Some(group_id),
        "Membre ajouté au groupe",
        None,
    )
    .await?;

    tx.commit().await?;
    revalidate::mark(&[revalidate::GROUPS, revalidate::USERS]).await;
    Ok(())
}

pub async fn remove_member(group_id: Uuid, user_id: Uuid) -> ServiceResult<()> {
    let pool = DatabaseManager::pool().await?;
    let mut tx = pool.begin().await?;

    let deleted = sqlx::query("DELETE FROM user_groups WHERE user_id = $1 AND group_id = $2")
        .bind(user_id)
        .bind(group_id)
        .execute(&mut *tx)
        .await?;
    if deleted.rows_affected() == 0 {
        return Err(ServiceError::NotFound(
            "Adhésion non trouvée".to_string(),
        ));
    }

    journal_service::record(
        &mut *tx,
        "modification",
        "groupe",
        Some(group_id),
        "Membre retiré du groupe",
        None,
    )
    .await?;

    tx.commit().await?;
    revalidate::mark(&[revalidate::GROUPS, revalidate::USERS]).await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn permissions_are_deduplicated_and_validated() {
        let perms = normalize_permissions(vec![
            "series.gerer".to_string(),
            "series.gerer".to_string(),
            "journal.consulter".to_string(),
        ])
        .unwrap();
        assert_eq!(perms.len(), 2);

        let err = normalize_permissions(vec!["tout.faire".to_string()]).unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[test]
    fn autorisations_shape_is_enforced() {
        assert!(validate_autorisations(&json!({})).is_ok());
        assert!(validate_autorisations(&json!({"administration": true})).is_ok());
        assert!(validate_autorisations(&json!({"structures": ["DG", "DRH"]})).is_ok());
        assert!(validate_autorisations(&json!({"niveau": 3})).is_err());
        assert!(validate_autorisations(&json!({"structures": [1, 2]})).is_err());
        assert!(validate_autorisations(&json!("admin")).is_err());
    }
}
