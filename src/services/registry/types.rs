use crate::services::catalog::CatalogError;

/// 注册/注销失败，对进程而言不是致命错误
#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    #[error("Invalid service identity: {0}")]
    InvalidIdentity(String),
    #[error("Catalog call failed for {service_id}: {source}")]
    Catalog {
        service_id: String,
        #[source]
        source: CatalogError,
    },
}

/// 注册/注销的结果
///
/// 不是 `Result`，无法用 `?` 传播；失败在返回前已记录日志。
#[must_use]
#[derive(Debug)]
pub enum RegistrationOutcome {
    Completed,
    Failed(RegistrationError),
}

impl RegistrationOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, RegistrationOutcome::Completed)
    }

    pub fn error(&self) -> Option<&RegistrationError> {
        match self {
            RegistrationOutcome::Completed => None,
            RegistrationOutcome::Failed(err) => Some(err),
        }
    }
}
