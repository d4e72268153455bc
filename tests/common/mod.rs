#![allow(dead_code)]

use std::sync::Mutex;

use async_trait::async_trait;

use service_catalog::services::catalog::{
    CatalogBackend, CatalogError, HealthCheckSpec, HealthStatus, ServiceIdentity, ServiceInstance,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Register(String),
    Deregister(String),
    Query(String),
}

/// 记录所有调用的假目录，可配置为全部失败或永不返回
#[derive(Debug, Default)]
pub struct RecordingCatalog {
    calls: Mutex<Vec<Call>>,
    instances: Vec<ServiceInstance>,
    fail: bool,
    hang: bool,
}

impl RecordingCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn hanging() -> Self {
        Self {
            hang: true,
            ..Self::default()
        }
    }

    pub fn with_instances(instances: Vec<ServiceInstance>) -> Self {
        Self {
            instances,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    async fn record(&self, call: Call) -> Result<(), CatalogError> {
        self.calls.lock().unwrap().push(call);
        if self.hang {
            std::future::pending::<()>().await;
        }
        if self.fail {
            return Err(CatalogError::Rejected {
                status: 500,
                message: "catalog down".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogBackend for RecordingCatalog {
    async fn register(
        &self,
        identity: &ServiceIdentity,
        _check: &HealthCheckSpec,
    ) -> Result<(), CatalogError> {
        self.record(Call::Register(identity.id.clone())).await
    }

    async fn deregister(&self, service_id: &str) -> Result<(), CatalogError> {
        self.record(Call::Deregister(service_id.to_string())).await
    }

    async fn healthy_instances(
        &self,
        service_name: &str,
    ) -> Result<Vec<ServiceInstance>, CatalogError> {
        self.record(Call::Query(service_name.to_string())).await?;
        Ok(self
            .instances
            .iter()
            .filter(|instance| instance.service_name == service_name)
            .cloned()
            .collect())
    }
}

pub fn identity(id: &str, service_name: &str, address: &str, port: u16) -> ServiceIdentity {
    ServiceIdentity {
        id: id.to_string(),
        service_name: service_name.to_string(),
        address: address.to_string(),
        port,
        tags: vec!["api".to_string()],
    }
}

pub fn instance(
    id: &str,
    service_name: &str,
    address: &str,
    port: u16,
    status: HealthStatus,
) -> ServiceInstance {
    ServiceInstance {
        id: id.to_string(),
        service_name: service_name.to_string(),
        address: address.to_string(),
        port,
        status,
        tags: Vec::new(),
    }
}

pub fn check() -> HealthCheckSpec {
    HealthCheckSpec::http(
        std::time::Duration::from_secs(10),
        std::time::Duration::from_secs(5),
        std::time::Duration::from_secs(60),
    )
}
