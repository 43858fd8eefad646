use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 通知图标路径
pub const NOTIFICATION_ICON: &str = "/icons/Icon-192.png";

/// 推送服务配置束
///
/// 初始化时提供一次, 进程生命周期内不可变
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub api_key: String,
    pub auth_domain: String,
    pub project_id: String,
    pub storage_bucket: String,
    pub messaging_sender_id: String,
    pub app_id: String,
}

impl ProviderConfig {
    /// 校验配置束, 任何字段为空即为致命错误
    pub fn validate(&self) -> RelayResult<()> {
        let fields = [
            ("api_key", &self.api_key),
            ("auth_domain", &self.auth_domain),
            ("project_id", &self.project_id),
            ("storage_bucket", &self.storage_bucket),
            ("messaging_sender_id", &self.messaging_sender_id),
            ("app_id", &self.app_id),
        ];

        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(RelayError::Config {
                    message: format!("{name} must not be empty"),
                });
            }
        }

        Ok(())
    }
}

/// 后台消息负载
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification: Option<NotificationContent>,
    /// 服务端自定义键值, 原样透传
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

/// 通知内容
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationContent {
    pub title: String,
    pub body: String,
}

/// 系统通知显示请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayRequest {
    pub title: String,
    pub body: String,
    pub icon: String,
}

impl DisplayRequest {
    pub fn from_content(content: &NotificationContent) -> Self {
        Self {
            title: content.title.clone(),
            body: content.body.clone(),
            icon: NOTIFICATION_ICON.to_string(),
        }
    }
}

/// 注册结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registration {
    pub registration_token: String,
    pub issued_at: DateTime<Utc>,
}

/// API 响应结构
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: String,
    pub data: T,
}

/// 订阅通道消息类型
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum StreamMessage {
    /// 后台消息
    Message(MessagePayload),
    /// 纯文本消息
    Text(String),
    /// 关闭连接
    Close,
    /// 错误消息
    Error { message: String },
    /// 心跳包
    Ping,
    /// 心跳响应
    Pong,
}

/// 错误类型定义
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RelayError {
    /// 配置错误
    Config { message: String },
    /// 负载错误
    Payload { message: String },
    /// 显示错误
    Display { message: String },
    /// 未知错误
    Unknown { message: String },
}

impl std::fmt::Display for RelayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RelayError::Config { message } => write!(f, "Config error: {}", message),
            RelayError::Payload { message } => write!(f, "Payload error: {}", message),
            RelayError::Display { message } => write!(f, "Display error: {}", message),
            RelayError::Unknown { message } => write!(f, "Unknown error: {}", message),
        }
    }
}

impl std::error::Error for RelayError {}

/// 结果类型
pub type RelayResult<T> = Result<T, RelayError>;
