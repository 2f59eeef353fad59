use serde::{Deserialize, Serialize};

/// 网关自身生成的响应体；上游响应原样透传，不经过这里
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResult<T: Serialize> {
    pub code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<T>,
    /// 被准入控制拒绝时，可以重试的 Unix 时间戳
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_at: Option<i64>,
}

impl<T: Serialize> ApiResult<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: 0,
            error_message: None,
            content: Some(data),
            retry_at: None,
        }
    }

    pub fn error(code: i32, message: &str) -> Self {
        Self {
            code,
            error_message: Some(message.to_string()),
            content: None,
            retry_at: None,
        }
    }

    pub fn retry_at(mut self, timestamp: i64) -> Self {
        self.retry_at = Some(timestamp);
        self
    }
}
