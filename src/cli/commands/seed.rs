//! One-shot idempotent seeding of baseline groups, users, memberships and
//! settings. Every insert is preceded by a unique-key existence check, so
//! running the command twice leaves the database unchanged.

use anyhow::Context;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth;
use crate::database::manager::DatabaseManager;
use crate::services::journal_service;

/// (name, description, permissions)
const BASELINE_GROUPS: &[(&str, &str, &[&str])] = &[
    (
        "Administrateurs",
        "Administration complète de l'application",
        &[
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
        ],
    ),
    (
        "Archivistes",
        "Gestion du plan de classement et des fonds",
        &[
            "series.gerer",
            "localisations.gerer",
            "liasses.gerer",
            "types-document.gerer",
            "documents.gerer",
            "dossiers.gerer",
        ],
    ),
    (
        "Consultation",
        "Accès en lecture seule",
        &["journal.consulter"],
    ),
];

/// (email, name, initial password, group memberships)
const BASELINE_USERS: &[(&str, &str, &str, &[&str])] = &[
    (
        "admin@arkiv.local",
        "Administrateur",
        "admin",
        &["Administrateurs"],
    ),
    (
        "archiviste@arkiv.local",
        "Archiviste principal",
        "archiviste",
        &["Archivistes"],
    ),
    (
        "consultation@arkiv.local",
        "Compte consultation",
        "consultation",
        &["Consultation"],
    ),
];

/// (key, default value)
const BASELINE_OPTIONS: &[(&str, &str)] = &[
    ("etablissement.nom", "Service des archives"),
    ("liasse.reference.prefixe", "L-"),
    ("dossier.reference.prefixe", "D-"),
];

pub async fn handle(migrate_first: bool) -> anyhow::Result<()> {
    if migrate_first {
        DatabaseManager::migrate()
            .await
            .context("failed to apply migrations")?;
    }

    let pool = DatabaseManager::pool()
        .await
        .context("failed to open database pool")?;

    let groups = seed_groups(&pool).await?;
    let users = seed_users(&pool).await?;
    let memberships = seed_memberships(&pool).await?;
    let options = seed_options(&pool).await?;

    println!(
        "Seed terminé : {} groupe(s), {} utilisateur(s), {} adhésion(s), {} paramètre(s) créé(s)",
        groups, users, memberships, options
    );
    Ok(())
}

async fn seed_groups(pool: &PgPool) -> anyhow::Result<u32> {
    let mut created = 0;
    for &(name, description, permissions) in BASELINE_GROUPS {
        let existing: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM groups WHERE name = $1")
            .bind(name)
            .fetch_optional(pool)
            .await?;
        if existing.is_some() {
            continue;
        }

        let permissions: Vec<String> = permissions.iter().map(|p| p.to_string()).collect();
        let autorisations = if name == "Administrateurs" {
            json!({ "administration": true })
        } else {
            json!({})
        };

        let mut tx = pool.begin().await?;
        let (id,): (Uuid,) = sqlx::query_as(
            "INSERT INTO groups (name, description, permissions, autorisations) \
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(name)
        .bind(description)
        .bind(&permissions)
        .bind(&autorisations)
        .fetch_one(&mut *tx)
        .await?;
        journal_service::record(
            &mut *tx,
            "creation",
            "groupe",
            Some(id),
            &format!("Groupe {} créé par le seed", name),
            Some("arkivctl"),
        )
        .await?;
        tx.commit().await?;
        created += 1;
    }
    Ok(created)
}

async fn seed_users(pool: &PgPool) -> anyhow::Result<u32> {
    let mut created = 0;
    for &(email, name, password, _) in BASELINE_USERS {
        let existing: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(pool)
            .await?;
        if existing.is_some() {
            continue;
        }

        let mut tx = pool.begin().await?;
        let (id,): (Uuid,) = sqlx::query_as(
            "INSERT INTO users (email, name, password_hash) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(email)
        .bind(name)
        .bind(auth::hash_password(password))
        .fetch_one(&mut *tx)
        .await?;
        journal_service::record(
            &mut *tx,
            "creation",
            "utilisateur",
            Some(id),
            &format!("Utilisateur {} créé par le seed", email),
            Some("arkivctl"),
        )
        .await?;
        tx.commit().await?;
        created += 1;
    }
    Ok(created)
}

async fn seed_memberships(pool: &PgPool) -> anyhow::Result<u32> {
    let mut created = 0;
    for &(email, _, _, groups) in BASELINE_USERS {
        let user: (Uuid,) = sqlx::query_as("SELECT id FROM users WHERE email = $1")
            .bind(email)
            .fetch_one(pool)
            .await
            .with_context(|| format!("seeded user {} not found", email))?;

        for group_name in groups {
            let group: (Uuid,) = sqlx::query_as("SELECT id FROM groups WHERE name = $1")
                .bind(group_name)
                .fetch_one(pool)
                .await
                .with_context(|| format!("seeded group {} not found", group_name))?;

            let existing: Option<(Uuid,)> = sqlx::query_as(
                "SELECT id FROM user_groups WHERE user_id = $1 AND group_id = $2",
            )
            .bind(user.0)
            .bind(group.0)
            .fetch_optional(pool)
            .await?;
            if existing.is_some() {
                continue;
            }

            sqlx::query("INSERT INTO user_groups (user_id, group_id) VALUES ($1, $2)")
                .bind(user.0)
                .bind(group.0)
                .execute(pool)
                .await?;
            created += 1;
        }
    }
    Ok(created)
}

async fn seed_options(pool: &PgPool) -> anyhow::Result<u32> {
    let mut created = 0;
    for &(cle, valeur) in BASELINE_OPTIONS {
        let existing: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM options WHERE cle = $1")
            .bind(cle)
            .fetch_optional(pool)
            .await?;
        if existing.is_some() {
            continue;
        }

        sqlx::query("INSERT INTO options (cle, valeur) VALUES ($1, $2)")
            .bind(cle)
            .bind(valeur)
            .execute(pool)
            .await?;
        created += 1;
    }
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::group_service::KNOWN_PERMISSIONS;
    use std::collections::HashSet;

    #[test]
    fn baseline_emails_are_unique() {
        let mut seen = HashSet::new();
        for (email, _, _, _) in BASELINE_USERS {
            assert!(seen.insert(*email), "duplicate baseline email: {}", email);
        }
    }

    #[test]
    fn baseline_memberships_reference_defined_groups() {
        let group_names: HashSet<&str> = BASELINE_GROUPS.iter().map(|(n, _, _)| *n).collect();
        for &(email, _, _, groups) in BASELINE_USERS {
            for group in groups {
                assert!(
                    group_names.contains(group),
                    "{} references undefined group {}",
                    email,
                    group
                );
            }
        }
    }

    #[test]
    fn baseline_permissions_are_known_tokens() {
        for (name, _, permissions) in BASELINE_GROUPS {
            for perm in *permissions {
                assert!(
                    KNOWN_PERMISSIONS.contains(perm),
                    "group {} carries unknown permission {}",
                    name,
                    perm
                );
            }
        }
    }
}
