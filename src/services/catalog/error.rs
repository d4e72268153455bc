/// 目录后端错误类型
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Invalid catalog address: {0}")]
    InvalidAddress(String),
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Catalog rejected request: HTTP {status} - {message}")]
    Rejected { status: u16, message: String },
    #[error("Failed to decode catalog response: {0}")]
    Decode(String),
    #[error("Catalog call cancelled")]
    Cancelled,
}
