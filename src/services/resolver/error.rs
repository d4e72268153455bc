use crate::services::catalog::CatalogError;

// 解析错误类型，均需调用方处理
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("No healthy instances available for service: {service_name}")]
    NoHealthyInstances { service_name: String },
    #[error("Catalog unavailable while resolving {service_name}: {source}")]
    CatalogUnavailable {
        service_name: String,
        #[source]
        source: CatalogError,
    },
    #[error("Invalid instance address {address}: {reason}")]
    InvalidAddress { address: String, reason: String },
}
