use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::types::{RegistrationError, RegistrationOutcome};
use crate::services::catalog::backend::with_cancel;
use crate::services::catalog::{CatalogBackend, HealthCheckSpec, ServiceIdentity};

// 负责本进程服务身份的注册与注销，调用之间无状态
#[derive(Clone)]
pub struct Registrar {
    backend: Arc<dyn CatalogBackend>,
}

impl std::fmt::Debug for Registrar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registrar").finish_non_exhaustive()
    }
}

impl Registrar {
    pub fn new(backend: Arc<dyn CatalogBackend>) -> Self {
        Self { backend }
    }

    /// 先注销再注册，同一 ID 的陈旧条目会被清掉。失败只记录日志
    pub async fn register(
        &self,
        identity: &ServiceIdentity,
        check: &HealthCheckSpec,
        cancel: &CancellationToken,
    ) -> RegistrationOutcome {
        if let Err(reason) = identity.validate() {
            tracing::error!(
                service_id = %identity.id,
                service_name = %identity.service_name,
                reason = %reason,
                "Refusing to register invalid service identity"
            );
            return RegistrationOutcome::Failed(RegistrationError::InvalidIdentity(reason));
        }

        // 清理旧条目失败不影响后续注册
        if let Err(e) = with_cancel(cancel, self.backend.deregister(&identity.id)).await {
            tracing::warn!(
                service_id = %identity.id,
                error = %e,
                "Failed to clear previous registration, registering anyway"
            );
        }

        match with_cancel(cancel, self.backend.register(identity, check)).await {
            Ok(()) => {
                tracing::info!(
                    service_id = %identity.id,
                    service_name = %identity.service_name,
                    address = %identity.address,
                    port = identity.port,
                    "Service registered with catalog"
                );
                RegistrationOutcome::Completed
            }
            Err(e) => {
                tracing::error!(
                    service_id = %identity.id,
                    service_name = %identity.service_name,
                    check_interval_secs = check.interval.as_secs(),
                    error = %e,
                    "Failed to register service with catalog"
                );
                RegistrationOutcome::Failed(RegistrationError::Catalog {
                    service_id: identity.id.clone(),
                    source: e,
                })
            }
        }
    }

    /// 从目录中移除实例。失败只记录日志
    pub async fn deregister(
        &self,
        service_id: &str,
        cancel: &CancellationToken,
    ) -> RegistrationOutcome {
        if service_id.trim().is_empty() {
            tracing::error!("Refusing to deregister empty service id");
            return RegistrationOutcome::Failed(RegistrationError::InvalidIdentity(
                "service id must not be empty".to_string(),
            ));
        }

        match with_cancel(cancel, self.backend.deregister(service_id)).await {
            Ok(()) => {
                tracing::info!(service_id = %service_id, "Service deregistered from catalog");
                RegistrationOutcome::Completed
            }
            Err(e) => {
                tracing::error!(
                    service_id = %service_id,
                    error = %e,
                    "Failed to deregister service from catalog"
                );
                RegistrationOutcome::Failed(RegistrationError::Catalog {
                    service_id: service_id.to_string(),
                    source: e,
                })
            }
        }
    }
}
