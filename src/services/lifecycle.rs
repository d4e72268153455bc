use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::services::catalog::{HealthCheckSpec, ServiceIdentity};
use crate::services::registry::{RegistrationOutcome, Registrar};

/// 宿主在启动和停止时调用的钩子
///
/// 两个钩子都会执行完才返回，但失败不会中止启动/停止。截止时间由调用方通过 `cancel` 提供。
#[async_trait]
pub trait LifecycleHook: Send + Sync {
    async fn on_start(&self, cancel: &CancellationToken) -> RegistrationOutcome;
    async fn on_stop(&self, cancel: &CancellationToken) -> RegistrationOutcome;
}

// 启动时注册、停止时注销本实例
#[derive(Debug, Clone)]
pub struct RegistrationLifecycle {
    registrar: Registrar,
    identity: ServiceIdentity,
    check: HealthCheckSpec,
}

impl RegistrationLifecycle {
    pub fn new(registrar: Registrar, identity: ServiceIdentity, check: HealthCheckSpec) -> Self {
        Self {
            registrar,
            identity,
            check,
        }
    }

    pub fn from_config(config: &Config, registrar: Registrar) -> Self {
        Self::new(registrar, config.service_identity(), config.health_check())
    }

    pub fn identity(&self) -> &ServiceIdentity {
        &self.identity
    }
}

#[async_trait]
impl LifecycleHook for RegistrationLifecycle {
    // Registrar::register 先注销同 ID 的旧条目（崩溃重启后残留），再注册
    async fn on_start(&self, cancel: &CancellationToken) -> RegistrationOutcome {
        tracing::info!(
            service_id = %self.identity.id,
            service_name = %self.identity.service_name,
            "Registering instance on start"
        );
        self.registrar.register(&self.identity, &self.check, cancel).await
    }

    async fn on_stop(&self, cancel: &CancellationToken) -> RegistrationOutcome {
        tracing::info!(service_id = %self.identity.id, "Deregistering instance on stop");
        self.registrar.deregister(&self.identity.id, cancel).await
    }
}
