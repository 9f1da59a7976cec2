//! Push notifications to the persona's owner.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tokio::time::timeout;

/// The Pushover message endpoint.
pub const PUSHOVER_URL: &str = "https://api.pushover.net/1/messages.json";

/// Error delivering a notification.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The request failed or the server rejected it.
    #[error("notification request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The notification wasn't delivered in time.
    #[error("notification timed out after {0:?}")]
    Timeout(Duration),
}

/// Something that delivers short text messages to a human.
#[async_trait]
pub trait Notifier: Send + Sync + 'static {
    /// Delivers `message`.
    async fn notify(&self, message: &str) -> Result<(), NotifyError>;
}

#[async_trait]
impl<N: Notifier + ?Sized> Notifier for Arc<N> {
    async fn notify(&self, message: &str) -> Result<(), NotifyError> {
        (**self).notify(message).await
    }
}

/// Sends notifications through the Pushover API.
#[derive(Clone)]
pub struct PushoverNotifier {
    client: Client,
    url: String,
    token: String,
    user: String,
    timeout: Duration,
}

impl PushoverNotifier {
    /// Creates a notifier with the application token and user key.
    pub fn new(token: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: PUSHOVER_URL.to_owned(),
            token: token.into(),
            user: user.into(),
            timeout: Duration::from_secs(10),
        }
    }

    /// Posts to another endpoint.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl std::fmt::Debug for PushoverNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PushoverNotifier")
            .field("url", &self.url)
            .field("token", &"<redacted>")
            .field("user", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[async_trait]
impl Notifier for PushoverNotifier {
    async fn notify(&self, message: &str) -> Result<(), NotifyError> {
        debug!("push: {message}");
        self.client
            .post(&self.url)
            .timeout(self.timeout)
            .form(&[
                ("token", self.token.as_str()),
                ("user", self.user.as_str()),
                ("message", message),
            ])
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

/// Writes notifications to the log. Used when no push credentials are
/// configured.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, message: &str) -> Result<(), NotifyError> {
        info!("notification: {message}");
        Ok(())
    }
}

/// Delivers `message`, giving up after `limit`. Failures are logged and
/// swallowed: the conversation must not depend on them.
pub(crate) async fn deliver(
    notifier: &dyn Notifier,
    message: &str,
    limit: Duration,
) {
    let result = match timeout(limit, notifier.notify(message)).await {
        Ok(result) => result,
        Err(_) => Err(NotifyError::Timeout(limit)),
    };
    if let Err(err) = result {
        warn!("failed to deliver notification: {err}");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::time::sleep;

    use super::*;

    struct Stalled;

    #[async_trait]
    impl Notifier for Stalled {
        async fn notify(&self, _message: &str) -> Result<(), NotifyError> {
            sleep(Duration::from_secs(3600)).await;
            Ok(())
        }
    }

    #[derive(Default)]
    struct Recording(Mutex<Vec<String>>);

    #[async_trait]
    impl Notifier for Recording {
        async fn notify(&self, message: &str) -> Result<(), NotifyError> {
            self.0.lock().unwrap().push(message.to_owned());
            Ok(())
        }
    }

    /// Accepts one connection, answers it with `status` and returns the raw
    /// request.
    async fn serve_once(listener: TcpListener, status: &str) -> String {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = stream.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
            let text = String::from_utf8_lossy(&request);
            if let Some(head_end) = text.find("\r\n\r\n") {
                let length = text[..head_end]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())?
                    })
                    .unwrap_or(0);
                if request.len() >= head_end + 4 + length {
                    break;
                }
            }
        }
        let response = format!(
            "HTTP/1.1 {status}\r\n\
             content-type: application/json\r\n\
             content-length: 2\r\n\
             connection: close\r\n\r\n{{}}"
        );
        stream.write_all(response.as_bytes()).await.unwrap();
        String::from_utf8(request).unwrap()
    }

    #[tokio::test]
    async fn test_pushover_form() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let url = format!("http://{addr}/1/messages.json");
        let server = tokio::spawn(serve_once(listener, "200 OK"));

        PushoverNotifier::new("tok", "usr")
            .with_url(url)
            .notify("Recording Ada with email a@b.com")
            .await
            .unwrap();

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /1/messages.json"));
        assert!(request.contains("token=tok"));
        assert!(request.contains("user=usr"));
        assert!(request.contains("a%40b.com"));
    }

    #[tokio::test]
    async fn test_pushover_rejected() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/", listener.local_addr().unwrap());
        let server = tokio::spawn(serve_once(listener, "400 Bad Request"));

        let err = PushoverNotifier::new("tok", "usr")
            .with_url(url)
            .notify("Recording Ada")
            .await
            .unwrap_err();
        server.await.unwrap();
        assert!(matches!(err, NotifyError::Http(_)));
    }

    #[tokio::test]
    async fn test_deliver_times_out() {
        deliver(&Stalled, "hello", Duration::from_millis(20)).await;
    }

    #[tokio::test]
    async fn test_deliver_through_arc() {
        let recording = Arc::new(Recording::default());
        deliver(&recording.clone(), "hello", Duration::from_secs(1)).await;
        assert_eq!(*recording.0.lock().unwrap(), ["hello"]);
        LogNotifier.notify("hi").await.unwrap();
    }
}
