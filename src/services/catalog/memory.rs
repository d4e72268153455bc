use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use super::backend::CatalogBackend;
use super::error::CatalogError;
use super::types::{HealthCheckSpec, HealthStatus, ServiceIdentity, ServiceInstance};

/// 进程内服务目录，实例 ID -> 实例
///
/// 没有健康轮询器：新注册的实例直接为 passing，状态通过 [`InMemoryCatalog::set_health`] 调整。
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    instances: Arc<DashMap<String, ServiceInstance>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    // 手动更新实例健康状态
    pub fn set_health(&self, service_id: &str, status: HealthStatus) -> bool {
        if let Some(mut entry) = self.instances.get_mut(service_id) {
            tracing::info!(
                service_id = %service_id,
                new_status = ?status,
                "Updated health status for instance"
            );
            entry.status = status;
            true
        } else {
            false
        }
    }

    /// 直接放入一个实例，不经过注册流程
    pub fn insert(&self, instance: ServiceInstance) {
        self.instances.insert(instance.id.clone(), instance);
    }

    /// 指定服务的全部实例，不论健康状态
    pub fn instances(&self, service_name: &str) -> Vec<ServiceInstance> {
        self.instances
            .iter()
            .filter(|entry| entry.value().service_name == service_name)
            .map(|entry| entry.value().clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

#[async_trait]
impl CatalogBackend for InMemoryCatalog {
    async fn register(
        &self,
        identity: &ServiceIdentity,
        _check: &HealthCheckSpec,
    ) -> Result<(), CatalogError> {
        let instance = ServiceInstance {
            id: identity.id.clone(),
            service_name: identity.service_name.clone(),
            address: identity.address.clone(),
            port: identity.port,
            status: HealthStatus::Passing,
            tags: identity.tags.clone(),
        };

        // 同一 ID 原子替换
        if self.instances.insert(identity.id.clone(), instance).is_some() {
            tracing::debug!(service_id = %identity.id, "Replaced existing instance");
        }
        Ok(())
    }

    async fn deregister(&self, service_id: &str) -> Result<(), CatalogError> {
        if self.instances.remove(service_id).is_some() {
            tracing::debug!(service_id = %service_id, "Removed instance");
        }
        Ok(())
    }

    async fn healthy_instances(
        &self,
        service_name: &str,
    ) -> Result<Vec<ServiceInstance>, CatalogError> {
        Ok(self
            .instances
            .iter()
            .filter(|entry| {
                let instance = entry.value();
                instance.service_name == service_name && instance.status.is_passing()
            })
            .map(|entry| entry.value().clone())
            .collect())
    }
}
