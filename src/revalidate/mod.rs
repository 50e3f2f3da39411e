//! Cooperative staleness signal: successful mutations bump a version per
//! view path; clients poll `/api/revalidation` and refetch when a version
//! they rendered against has moved. No push mechanism.

use std::collections::HashMap;
use std::sync::OnceLock;
use tokio::sync::RwLock;

// View paths, as rendered by the client application
pub const SERIES: &str = "/classification/series";
pub const LIASSES: &str = "/classification/liasses";
pub const LOCALISATIONS: &str = "/localisations";
pub const STRUCTURES: &str = "/structures";
pub const USERS: &str = "/administration/utilisateurs";
pub const GROUPS: &str = "/administration/groupes";
pub const BENEFICIAIRES: &str = "/beneficiaires";
pub const TYPES_DOCUMENT: &str = "/types-document";
pub const DOCUMENTS: &str = "/documents";
pub const DOSSIERS: &str = "/dossiers";
pub const OPTIONS: &str = "/parametres";
pub const JOURNAL: &str = "/journal";

fn registry() -> &'static RwLock<HashMap<String, u64>> {
    static REGISTRY: OnceLock<RwLock<HashMap<String, u64>>> = OnceLock::new();
    REGISTRY.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Mark the given view paths stale (bump their versions)
pub async fn mark(paths: &[&str]) {
    let mut versions = registry().write().await;
    for path in paths {
        let counter = versions.entry(path.to_string()).or_insert(0);
        *counter += 1;
        tracing::debug!(path = *path, version = *counter, "view marked stale");
    }
}

/// Snapshot of all path versions
pub async fn versions() -> HashMap<String, u64> {
    registry().read().await.clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn marking_bumps_versions_monotonically() {
        let before = versions().await.get(SERIES).copied().unwrap_or(0);
        mark(&[SERIES]).await;
        mark(&[SERIES, LIASSES]).await;
        let after = versions().await;
        assert_eq!(after.get(SERIES).copied().unwrap_or(0), before + 2);
        assert!(after.get(LIASSES).copied().unwrap_or(0) >= 1);
    }
}
