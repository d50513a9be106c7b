/// 请求失败的统一错误
///
/// 调用方只关心 Display 文本；变体用于日志和测试区分。
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    #[error("Request timed out after {0} ms")]
    Timeout(u64),
    #[error("Unable to reach API: {0}")]
    Transport(String),
    #[error("{message}")]
    Status { status: u16, message: String },
    #[error("Invalid response from API: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, ApiError::Timeout(_))
    }
}
