//! Consul agent HTTP API backend

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client as HttpClient, Method, RequestBuilder, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::backend::CatalogBackend;
use super::error::CatalogError;
use super::types::{HealthCheckSpec, HealthStatus, ServiceIdentity, ServiceInstance};

const TOKEN_HEADER: &str = "X-Consul-Token";

// Consul 注册请求体
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct AgentServiceRegistration<'a> {
    #[serde(rename = "ID")]
    id: &'a str,
    name: &'a str,
    address: &'a str,
    port: u16,
    tags: &'a [String],
    check: AgentServiceCheck,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct AgentServiceCheck {
    #[serde(rename = "HTTP")]
    http: String,
    interval: String,
    timeout: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    deregister_critical_service_after: Option<String>,
}

// /v1/health/service 响应条目
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct HealthServiceEntry {
    #[serde(default)]
    node: Option<HealthNode>,
    service: HealthService,
    #[serde(default)]
    checks: Vec<HealthCheckEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct HealthNode {
    #[serde(default)]
    address: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct HealthService {
    #[serde(rename = "ID")]
    id: String,
    service: String,
    #[serde(default)]
    address: String,
    port: u16,
    #[serde(default)]
    tags: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct HealthCheckEntry {
    status: String,
}

impl From<HealthServiceEntry> for ServiceInstance {
    fn from(entry: HealthServiceEntry) -> Self {
        // 取所有检查中最差的状态，没有检查视为 passing
        let status = entry
            .checks
            .iter()
            .map(|check| HealthStatus::from_check_status(&check.status))
            .max()
            .unwrap_or(HealthStatus::Passing);

        // 服务地址为空时 Consul 约定使用节点地址
        let address = if entry.service.address.is_empty() {
            entry.node.map(|node| node.address).unwrap_or_default()
        } else {
            entry.service.address
        };

        ServiceInstance {
            id: entry.service.id,
            service_name: entry.service.service,
            address,
            port: entry.service.port,
            status,
            tags: entry.service.tags.unwrap_or_default(),
        }
    }
}

/// 格式化为 Go duration 字符串，例如 "10s"、"500ms"
fn go_duration(duration: Duration) -> String {
    if duration.subsec_nanos() == 0 {
        format!("{}s", duration.as_secs())
    } else {
        format!("{}ms", duration.as_millis())
    }
}

/// Consul 目录后端
#[derive(Debug, Clone)]
pub struct ConsulCatalog {
    http_client: HttpClient,
    base_url: Url,
    token: Option<String>,
}

impl ConsulCatalog {
    /// 创建新的 Consul 后端，地址缺少 scheme 时补全为 http
    pub fn new(address: &str, token: Option<String>) -> Result<Self, CatalogError> {
        let address = address.trim();
        if address.is_empty() {
            return Err(CatalogError::InvalidAddress(
                "catalog address must not be empty".to_string(),
            ));
        }

        let address = if address.starts_with("http://") || address.starts_with("https://") {
            address.to_string()
        } else {
            format!("http://{address}")
        };

        let base_url = Url::parse(&address)
            .map_err(|e| CatalogError::InvalidAddress(format!("{address}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(CatalogError::InvalidAddress(address));
        }

        Ok(Self {
            http_client: HttpClient::new(),
            base_url,
            token: token.filter(|t| !t.is_empty()),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // 拼接 /v1/... 路径，每段单独编码
    fn endpoint(&self, segments: &[&str]) -> Result<Url, CatalogError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| CatalogError::InvalidAddress(self.base_url.to_string()))?
            .pop_if_empty()
            .push("v1")
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let request = self.http_client.request(method, url);
        match self.token {
            Some(ref token) => request.header(TOKEN_HEADER, token),
            None => request,
        }
    }

    // 非 2xx 响应转换为 Rejected
    async fn rejection(response: Response) -> CatalogError {
        let status = response.status().as_u16();
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        CatalogError::Rejected { status, message }
    }
}

#[async_trait]
impl CatalogBackend for ConsulCatalog {
    async fn register(
        &self,
        identity: &ServiceIdentity,
        check: &HealthCheckSpec,
    ) -> Result<(), CatalogError> {
        let registration = AgentServiceRegistration {
            id: &identity.id,
            name: &identity.service_name,
            address: &identity.address,
            port: identity.port,
            tags: &identity.tags,
            check: AgentServiceCheck {
                http: identity.health_check_url(),
                interval: go_duration(check.interval),
                timeout: go_duration(check.timeout),
                deregister_critical_service_after: check.deregister_critical_after.map(go_duration),
            },
        };

        let url = self.endpoint(&["agent", "service", "register"])?;
        debug!(service_id = %identity.id, url = %url, "Sending Consul service registration");

        let response = self.request(Method::PUT, url).json(&registration).send().await?;
        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }
        Ok(())
    }

    async fn deregister(&self, service_id: &str) -> Result<(), CatalogError> {
        let url = self.endpoint(&["agent", "service", "deregister", service_id])?;
        debug!(service_id = %service_id, url = %url, "Sending Consul service deregistration");

        let response = self.request(Method::PUT, url).send().await?;
        // 新版 Consul 对未知 ID 返回 404，目标状态已满足
        if response.status() == StatusCode::NOT_FOUND {
            debug!(service_id = %service_id, "Service already absent from Consul");
            return Ok(());
        }
        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }
        Ok(())
    }

    async fn healthy_instances(
        &self,
        service_name: &str,
    ) -> Result<Vec<ServiceInstance>, CatalogError> {
        let mut url = self.endpoint(&["health", "service", service_name])?;
        url.query_pairs_mut().append_pair("passing", "true");

        let response = self.request(Method::GET, url).send().await?;
        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        let body = response.bytes().await?;
        let entries: Vec<HealthServiceEntry> = serde_json::from_slice(&body)
            .map_err(|e| CatalogError::Decode(e.to_string()))?;

        debug!(
            service_name = %service_name,
            instance_count = entries.len(),
            "Fetched healthy instances from Consul"
        );

        Ok(entries.into_iter().map(ServiceInstance::from).collect())
    }
}
