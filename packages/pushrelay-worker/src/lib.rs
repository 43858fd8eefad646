use pushrelay_core::{DisplayRequest, MessagePayload, StreamMessage};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("payload carries no notification field")]
    MissingNotification,

    #[error("notification display failed: {0}")]
    Sink(String),
}

pub type WorkerResult<T> = Result<T, WorkerError>;

/// 通知显示出口
pub trait NotificationSink {
    fn display(&self, request: &DisplayRequest) -> WorkerResult<()>;
}

/// 系统通知栏出口
pub struct SystemSink;

impl NotificationSink for SystemSink {
    fn display(&self, request: &DisplayRequest) -> WorkerResult<()> {
        notify_rust::Notification::new()
            .summary(&request.title)
            .body(&request.body)
            .icon(&request.icon)
            .show()
            .map_err(|e| WorkerError::Sink(e.to_string()))?;
        Ok(())
    }
}

/// 处理一条后台消息: 提取标题与正文, 发出一次显示请求
///
/// 无通知字段的负载只使本次调用失败, 不影响后续调用
pub fn on_background_message(
    payload: &MessagePayload,
    sink: &dyn NotificationSink,
) -> WorkerResult<()> {
    let content = payload
        .notification
        .as_ref()
        .ok_or(WorkerError::MissingNotification)?;

    let request = DisplayRequest::from_content(content);
    sink.display(&request)
}

/// 消费订阅通道直到连接关闭
pub async fn run_relay(mut rx: mpsc::UnboundedReceiver<StreamMessage>, sink: &dyn NotificationSink) {
    while let Some(msg) = rx.recv().await {
        match msg {
            StreamMessage::Message(payload) => {
                if let Err(err) = on_background_message(&payload, sink) {
                    warn!("background message dropped: {err}");
                }
            }
            StreamMessage::Text(text) => {
                debug!("ignoring non-payload frame: {text}");
            }
            StreamMessage::Error { message } => {
                warn!("stream error: {message}");
            }
            StreamMessage::Close => {
                info!("stream closed by provider");
                break;
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pushrelay_core::{NotificationContent, NOTIFICATION_ICON};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSink {
        requests: Mutex<Vec<DisplayRequest>>,
    }

    impl RecordingSink {
        fn requests(&self) -> Vec<DisplayRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl NotificationSink for RecordingSink {
        fn display(&self, request: &DisplayRequest) -> WorkerResult<()> {
            self.requests.lock().unwrap().push(request.clone());
            Ok(())
        }
    }

    struct FailingSink;

    impl NotificationSink for FailingSink {
        fn display(&self, _request: &DisplayRequest) -> WorkerResult<()> {
            Err(WorkerError::Sink("tray unavailable".to_string()))
        }
    }

    fn payload(title: &str, body: &str) -> MessagePayload {
        MessagePayload {
            notification: Some(NotificationContent {
                title: title.to_string(),
                body: body.to_string(),
            }),
            data: None,
        }
    }

    #[test]
    fn test_displays_title_body_and_fixed_icon() {
        let sink = RecordingSink::default();

        on_background_message(&payload("New message", "Hello"), &sink).unwrap();

        let requests = sink.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].title, "New message");
        assert_eq!(requests[0].body, "Hello");
        assert_eq!(requests[0].icon, "/icons/Icon-192.png");
    }

    #[test]
    fn test_repeated_payload_displays_twice() {
        let sink = RecordingSink::default();
        let payload = payload("New message", "Hello");

        on_background_message(&payload, &sink).unwrap();
        on_background_message(&payload, &sink).unwrap();

        assert_eq!(sink.requests().len(), 2);
    }

    #[test]
    fn test_empty_title_and_body_are_displayed() {
        let sink = RecordingSink::default();

        on_background_message(&payload("", ""), &sink).unwrap();

        let requests = sink.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].title, "");
        assert_eq!(requests[0].body, "");
        assert_eq!(requests[0].icon, NOTIFICATION_ICON);
    }

    #[test]
    fn test_missing_notification_is_an_error() {
        let sink = RecordingSink::default();
        let bare = MessagePayload {
            notification: None,
            data: None,
        };

        let err = on_background_message(&bare, &sink).unwrap_err();
        assert!(matches!(err, WorkerError::MissingNotification));
        assert!(sink.requests().is_empty());
    }

    #[test]
    fn test_error_does_not_poison_later_invocations() {
        let sink = RecordingSink::default();
        let bare = MessagePayload {
            notification: None,
            data: None,
        };

        assert!(on_background_message(&bare, &sink).is_err());
        assert!(on_background_message(&payload("New message", "Hello"), &sink).is_ok());
        assert_eq!(sink.requests().len(), 1);
    }

    #[test]
    fn test_sink_failure_surfaces_as_error() {
        let err = on_background_message(&payload("t", "b"), &FailingSink).unwrap_err();
        assert_eq!(
            err.to_string(),
            "notification display failed: tray unavailable"
        );
    }

    #[tokio::test]
    async fn test_run_relay_drains_until_close() {
        let sink = RecordingSink::default();
        let (tx, rx) = mpsc::unbounded_channel();

        tx.send(StreamMessage::Message(payload("first", "one")))
            .unwrap();
        tx.send(StreamMessage::Text("hello".to_string())).unwrap();
        tx.send(StreamMessage::Message(MessagePayload {
            notification: None,
            data: None,
        }))
        .unwrap();
        tx.send(StreamMessage::Message(payload("second", "two")))
            .unwrap();
        tx.send(StreamMessage::Close).unwrap();
        tx.send(StreamMessage::Message(payload("after close", "never")))
            .unwrap();

        run_relay(rx, &sink).await;

        let requests = sink.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].title, "first");
        assert_eq!(requests[1].title, "second");
    }

    #[tokio::test]
    async fn test_run_relay_ends_when_sender_dropped() {
        let sink = RecordingSink::default();
        let (tx, rx) = mpsc::unbounded_channel();

        tx.send(StreamMessage::Message(payload("only", "one")))
            .unwrap();
        drop(tx);

        run_relay(rx, &sink).await;

        assert_eq!(sink.requests().len(), 1);
    }
}
