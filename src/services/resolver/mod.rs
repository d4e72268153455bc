pub mod error;

pub use error::ResolveError;

use std::sync::Arc;

use http::Uri;
use rand::Rng;

use crate::services::catalog::{CatalogBackend, ServiceInstance};

/// 服务名解析器
///
/// 每次调用都查询目录并在健康实例中均匀随机选一个。没有缓存，也没有轮询计数器，
/// 可以直接在多个任务间克隆共享。
#[derive(Clone)]
pub struct Resolver {
    backend: Arc<dyn CatalogBackend>,
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver").finish_non_exhaustive()
    }
}

impl Resolver {
    pub fn new(backend: Arc<dyn CatalogBackend>) -> Self {
        Self { backend }
    }

    /// 解析为 `http://{host}:{port}/`，不发起下游调用
    pub async fn resolve(&self, service_name: &str) -> Result<Uri, ResolveError> {
        let instances = self
            .backend
            .healthy_instances(service_name)
            .await
            .map_err(|e| {
                tracing::warn!(
                    service_name = %service_name,
                    error = %e,
                    "Catalog unavailable during resolution"
                );
                ResolveError::CatalogUnavailable {
                    service_name: service_name.to_string(),
                    source: e,
                }
            })?;

        // 后端可能返回非 passing 的实例，这里再过滤一次
        let passing: Vec<ServiceInstance> = instances
            .into_iter()
            .filter(|instance| instance.status.is_passing())
            .collect();

        let Some(selected) = select_instance(&passing) else {
            tracing::warn!(service_name = %service_name, "No healthy instances for service");
            return Err(ResolveError::NoHealthyInstances {
                service_name: service_name.to_string(),
            });
        };

        tracing::debug!(
            service_name = %service_name,
            instance_id = %selected.id,
            candidates = passing.len(),
            "Selected service instance"
        );

        instance_uri(selected)
    }
}

/// 均匀随机选择，每个实例概率 1/N。使用线程本地生成器，调用间不共享状态
pub fn select_instance(instances: &[ServiceInstance]) -> Option<&ServiceInstance> {
    if instances.is_empty() {
        return None;
    }
    let idx = rand::rng().random_range(0..instances.len());
    instances.get(idx)
}

// IPv6 地址需要加方括号
fn instance_uri(instance: &ServiceInstance) -> Result<Uri, ResolveError> {
    let host = instance.address.trim();
    if host.is_empty() {
        return Err(ResolveError::InvalidAddress {
            address: format!(":{}", instance.port),
            reason: "empty host".to_string(),
        });
    }

    let authority = if host.contains(':') && !host.starts_with('[') {
        format!("[{host}]:{}", instance.port)
    } else {
        format!("{host}:{}", instance.port)
    };

    Uri::builder()
        .scheme("http")
        .authority(authority.as_str())
        .path_and_query("/")
        .build()
        .map_err(|e| ResolveError::InvalidAddress {
            address: authority,
            reason: e.to_string(),
        })
}
