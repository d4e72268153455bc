use std::sync::Arc;

use super::backend::CatalogBackend;
use super::consul::ConsulCatalog;
use super::error::CatalogError;
use super::memory::InMemoryCatalog;
use crate::config::{BackendKind, CatalogConfig};

/// 按配置创建目录后端
pub fn connect_backend(config: &CatalogConfig) -> Result<Arc<dyn CatalogBackend>, CatalogError> {
    match config.backend {
        BackendKind::Consul => {
            let catalog = ConsulCatalog::new(&config.address, config.token.clone())?;
            tracing::info!(address = %catalog.base_url(), "Using Consul catalog backend");
            Ok(Arc::new(catalog))
        }
        BackendKind::Memory => {
            tracing::info!("Using in-memory catalog backend");
            Ok(Arc::new(InMemoryCatalog::new()))
        }
    }
}
