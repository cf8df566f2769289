//! Read-through cache for derived project configuration.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;

use super::ProjectConfigOptions;

/// Derived tsconfig options keyed by the resolved tsconfig.json path.
///
/// Cloning shares the underlying map, so one cache can serve every module of
/// a build (and several plugin instances if desired). Only successful reads
/// are stored; a tsconfig.json that failed to load is retried next time.
#[derive(Debug, Clone, Default)]
pub struct ProjectConfigCache {
    entries: Arc<DashMap<PathBuf, ProjectConfigOptions>>,
}

impl ProjectConfigCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &Path) -> Option<ProjectConfigOptions> {
        self.entries.get(path).map(|entry| entry.value().clone())
    }

    pub fn insert(&self, path: PathBuf, options: ProjectConfigOptions) {
        self.entries.insert(path, options);
    }

    /// Drop every entry, e.g. after tsconfig.json changed on disk.
    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_entries() {
        let cache = ProjectConfigCache::new();
        let shared = cache.clone();
        let options = ProjectConfigOptions {
            target: Some("es2020".to_string()),
            ..Default::default()
        };

        cache.insert(PathBuf::from("/app/tsconfig.json"), options.clone());
        assert_eq!(shared.get(Path::new("/app/tsconfig.json")), Some(options));
        assert_eq!(shared.len(), 1);

        shared.clear();
        assert!(cache.is_empty());
    }
}
