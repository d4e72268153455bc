use std::future::Future;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::error::CatalogError;
use super::types::{HealthCheckSpec, ServiceIdentity, ServiceInstance};

/// 服务目录后端
#[async_trait]
pub trait CatalogBackend: Send + Sync {
    /// 注册实例，同一 ID 覆盖旧条目
    async fn register(
        &self,
        identity: &ServiceIdentity,
        check: &HealthCheckSpec,
    ) -> Result<(), CatalogError>;

    /// 注销实例，实例不存在时视为成功
    async fn deregister(&self, service_id: &str) -> Result<(), CatalogError>;

    /// 查询指定服务当前健康的实例，顺序无意义
    async fn healthy_instances(
        &self,
        service_name: &str,
    ) -> Result<Vec<ServiceInstance>, CatalogError>;
}

// 让后端调用与取消信号赛跑，取消优先
pub(crate) async fn with_cancel<T, F>(
    cancel: &CancellationToken,
    call: F,
) -> Result<T, CatalogError>
where
    F: Future<Output = Result<T, CatalogError>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(CatalogError::Cancelled),
        result = call => result,
    }
}
