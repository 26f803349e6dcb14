//! Configured-model validation against the gateway catalog.
//!
//! Unknown ids are warnings, not failures — the gateway may know models
//! the cached catalog missed, and the user may be deliberately early.

use crate::ports::model_catalog::{CatalogError, ModelCatalog};
use council_domain::ModelId;
use futures::future::join_all;
use std::sync::Arc;
use tracing::warn;

/// Use case for validating configured model ids
pub struct ValidateModelsUseCase<K: ModelCatalog> {
    catalog: Arc<K>,
}

impl<K: ModelCatalog> ValidateModelsUseCase<K> {
    pub fn new(catalog: Arc<K>) -> Self {
        Self { catalog }
    }

    /// Return the subset of `models` the catalog does not recognize.
    ///
    /// The web-search suffix is stripped before lookup — the catalog
    /// lists base model ids.
    pub async fn execute(&self, models: &[ModelId]) -> Result<Vec<ModelId>, CatalogError> {
        let lookups = models.iter().map(|model| {
            let base = model.strip_web_search();
            async move { (model.clone(), self.catalog.lookup(&base).await) }
        });

        let mut unknown = Vec::new();
        for (model, found) in join_all(lookups).await {
            if !found? {
                warn!("Configured model not in catalog: {}", model);
                unknown.push(model);
            }
        }
        Ok(unknown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::BTreeSet;

    struct SetCatalog {
        known: BTreeSet<ModelId>,
    }

    #[async_trait]
    impl ModelCatalog for SetCatalog {
        async fn lookup(&self, model: &ModelId) -> Result<bool, CatalogError> {
            Ok(self.known.contains(model))
        }

        async fn models(&self) -> Result<Vec<crate::ports::model_catalog::ModelInfo>, CatalogError>
        {
            Ok(vec![])
        }
    }

    #[tokio::test]
    async fn test_flags_unknown_models_only() {
        let catalog = Arc::new(SetCatalog {
            known: [ModelId::new("a/known")].into_iter().collect(),
        });
        let use_case = ValidateModelsUseCase::new(catalog);

        let unknown = use_case
            .execute(&[ModelId::new("a/known"), ModelId::new("b/mystery")])
            .await
            .unwrap();

        assert_eq!(unknown, vec![ModelId::new("b/mystery")]);
    }

    #[tokio::test]
    async fn test_lookup_ignores_web_search_suffix() {
        let catalog = Arc::new(SetCatalog {
            known: [ModelId::new("a/known")].into_iter().collect(),
        });
        let use_case = ValidateModelsUseCase::new(catalog);

        let unknown = use_case
            .execute(&[ModelId::new("a/known:online")])
            .await
            .unwrap();

        assert!(unknown.is_empty());
    }
}
