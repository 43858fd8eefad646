use crate::error::*;
use crate::SdkResult;
use futures_util::{SinkExt, StreamExt};
use pushrelay_core::*;
use reqwest::Client;
use std::time::Duration;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use url::Url;

#[derive(Clone)]
pub struct ProviderClient {
    client: Client,
    pub base_url: String,
    pub timeout: Duration,
    pub config: ProviderConfig,
}

impl ProviderClient {
    /// 建立与推送服务的连接上下文, 配置非法时直接失败
    pub fn initialize(base_url: &str, config: ProviderConfig) -> SdkResult<Self> {
        config
            .validate()
            .map_err(|e| SdkError::InvalidConfig(e.to_string()))?;

        let parsed = Url::parse(base_url)?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(SdkError::InvalidConfig(format!(
                "unsupported endpoint scheme: {}",
                parsed.scheme()
            )));
        }

        Ok(Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(30),
            config,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// 向推送服务注册本客户端, 返回订阅凭证
    pub async fn register(&self) -> SdkResult<Registration> {
        let url = format!("{}/register", self.base_url);
        let request_body = serde_json::json!({
            "api_key": self.config.api_key,
            "project_id": self.config.project_id,
            "messaging_sender_id": self.config.messaging_sender_id,
            "app_id": self.config.app_id,
        });

        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .json(&request_body)
            .send()
            .await?;

        let response = response.error_for_status()?;
        let api_response: ApiResponse<Registration> = response.json().await?;

        if api_response.status != "ok" {
            return Err(SdkError::ApiError {
                status: api_response.status,
            });
        }

        Ok(api_response.data)
    }

    /// 订阅后台消息推送, 返回消息接收器
    pub async fn subscribe(
        &self,
        registration: &Registration,
    ) -> SdkResult<tokio::sync::mpsc::UnboundedReceiver<StreamMessage>> {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let ws_url = format!(
            "{}/push?token={}&project={}",
            self.base_url.replace("http", "ws"),
            registration.registration_token,
            self.config.project_id,
        );

        match connect_async(&ws_url).await {
            Ok((ws_stream, _)) => {
                let (mut write, mut read) = ws_stream.split();

                // Handle incoming messages
                tokio::spawn(async move {
                    while let Some(msg) = read.next().await {
                        match msg {
                            Ok(Message::Text(text)) => {
                                if let Ok(payload) =
                                    serde_json::from_str::<MessagePayload>(&text)
                                {
                                    let _ = tx.send(StreamMessage::Message(payload));
                                } else {
                                    let _ = tx.send(StreamMessage::Text(text.to_string()));
                                }
                            }
                            Ok(Message::Binary(data)) => {
                                if let Ok(text) = String::from_utf8(data.to_vec()) {
                                    if let Ok(payload) =
                                        serde_json::from_str::<MessagePayload>(&text)
                                    {
                                        let _ = tx.send(StreamMessage::Message(payload));
                                    } else {
                                        let _ = tx.send(StreamMessage::Text(text));
                                    }
                                }
                            }
                            Ok(Message::Close(_)) => {
                                let _ = tx.send(StreamMessage::Close);
                                break;
                            }
                            Ok(Message::Ping(_)) => {
                                // Respond to ping with pong
                                if let Err(e) = write.send(Message::Pong(vec![].into())).await {
                                    let _ = tx.send(StreamMessage::Error {
                                        message: format!("failed to send pong: {e}"),
                                    });
                                    break;
                                }
                            }
                            Err(e) => {
                                let _ = tx.send(StreamMessage::Error {
                                    message: e.to_string(),
                                });
                                break;
                            }
                            _ => {}
                        }
                    }
                });

                Ok(rx)
            }
            Err(e) => Err(SdkError::NetworkError(e.to_string())),
        }
    }
}
