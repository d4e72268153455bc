use std::time::Duration;

/// 服务目录自动清理的最小阈值
pub const MIN_DEREGISTER_CRITICAL_AFTER: Duration = Duration::from_secs(60);

/// 默认健康检查超时
pub const DEFAULT_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

// 本进程的服务身份
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceIdentity {
    /// 实例 ID，同一 ID 重复注册会覆盖旧条目
    pub id: String,
    /// 逻辑服务名
    pub service_name: String,
    /// 对外通告的地址
    pub address: String,
    /// 对外通告的端口
    pub port: u16,
    /// 自由标签
    pub tags: Vec<String>,
}

impl ServiceIdentity {
    /// 由地址和端口推导出的健康检查 URL
    pub fn health_check_url(&self) -> String {
        format!("http://{}:{}/health", self.address, self.port)
    }

    /// 检查注册前置条件，返回第一个不满足的字段
    pub fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("service id must not be empty".to_string());
        }
        if self.service_name.trim().is_empty() {
            return Err("service name must not be empty".to_string());
        }
        if self.address.trim().is_empty() {
            return Err("service address must not be empty".to_string());
        }
        if self.port == 0 {
            return Err("service port must be greater than zero".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckKind {
    /// 目录端按间隔轮询 HTTP 健康检查地址
    Http,
}

// 健康检查配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthCheckSpec {
    pub kind: CheckKind,
    pub interval: Duration,
    pub timeout: Duration,
    /// 检查持续 critical 多久后由目录自动注销，None 表示不自动清理
    pub deregister_critical_after: Option<Duration>,
}

impl HealthCheckSpec {
    /// 零值关闭自动清理，非零值不低于 [`MIN_DEREGISTER_CRITICAL_AFTER`]
    pub fn http(
        interval: Duration,
        timeout: Duration,
        deregister_critical_after: Duration,
    ) -> Self {
        let deregister_critical_after = if deregister_critical_after.is_zero() {
            None
        } else if deregister_critical_after < MIN_DEREGISTER_CRITICAL_AFTER {
            tracing::debug!(
                requested_secs = deregister_critical_after.as_secs(),
                floor_secs = MIN_DEREGISTER_CRITICAL_AFTER.as_secs(),
                "Raising critical deregister threshold to catalog floor"
            );
            Some(MIN_DEREGISTER_CRITICAL_AFTER)
        } else {
            Some(deregister_critical_after)
        };

        Self {
            kind: CheckKind::Http,
            interval,
            timeout,
            deregister_critical_after,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HealthStatus {
    Passing,
    Warning,
    Critical,
}

impl HealthStatus {
    /// 解析目录返回的检查状态，未知状态按 critical 处理
    pub fn from_check_status(status: &str) -> Self {
        match status {
            "passing" => HealthStatus::Passing,
            "warning" => HealthStatus::Warning,
            _ => HealthStatus::Critical,
        }
    }

    pub fn is_passing(&self) -> bool {
        *self == HealthStatus::Passing
    }
}

// 目录返回的服务实例（只读）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceInstance {
    pub id: String,
    pub service_name: String,
    pub address: String,
    pub port: u16,
    pub status: HealthStatus,
    pub tags: Vec<String>,
}
