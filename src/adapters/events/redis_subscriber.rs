//! Redis pub/sub subscriber feeding lifecycle events to handlers.
//!
//! Each [`EventStream`] maps to one Redis channel. Messages are decoded as
//! [`RawMetricEvent`] JSON and dispatched to the handlers registered for the
//! stream. Delivery is at-most-once: malformed messages and handler failures
//! are logged and the loop moves on.
//!
//! ## Graceful Shutdown
//!
//! `run` stops when the watch channel flips to `true`.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use futures::StreamExt;
use tokio::sync::watch;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::domain::metrics::{EventStream, MetricsError, RawMetricEvent};
use crate::ports::{EventHandler, EventSubscriber};

/// Default deadline for connecting and for each channel subscription.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

pub struct RedisEventSubscriber {
    client: redis::Client,
    connect_timeout: Duration,
    handlers: RwLock<HashMap<EventStream, Vec<Arc<dyn EventHandler>>>>,
}

impl RedisEventSubscriber {
    pub fn new(client: redis::Client) -> Self {
        Self {
            client,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            handlers: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    /// Opens a client for `url`. No connection is made until `run`.
    pub fn from_url(url: &str) -> Result<Self, MetricsError> {
        let client = redis::Client::open(url).map_err(|e| MetricsError::store(format!("invalid redis url: {}", e)))?;
        Ok(Self::new(client))
    }

    /// Streams with at least one handler.
    pub fn subscribed_streams(&self) -> Vec<EventStream> {
        let handlers = self.handlers.read().unwrap_or_else(PoisonError::into_inner);
        EventStream::ALL
            .into_iter()
            .filter(|s| handlers.get(s).is_some_and(|h| !h.is_empty()))
            .collect()
    }

    /// Subscribes to every stream with a handler and dispatches messages
    /// until shutdown is signalled or the connection drops.
    ///
    /// Connecting and each subscription are bounded by the connect timeout.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<(), MetricsError> {
        let connection = timeout(self.connect_timeout, self.client.get_async_connection())
            .await
            .map_err(|_| MetricsError::store("redis connection timed out"))?
            .map_err(|e| MetricsError::store(format!("redis connection failed: {}", e)))?;
        let mut pubsub = connection.into_pubsub();

        let streams = self.subscribed_streams();
        for stream in &streams {
            timeout(self.connect_timeout, pubsub.subscribe(stream.channel()))
                .await
                .map_err(|_| MetricsError::store(format!("subscribe to {} timed out", stream)))?
                .map_err(|e| MetricsError::store(format!("subscribe to {} failed: {}", stream, e)))?;
        }
        info!(channels = ?streams.iter().map(|s| s.channel()).collect::<Vec<_>>(), "Subscribed to event channels");

        let mut messages = pubsub.on_message();
        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("Event subscriber shutting down");
                        return Ok(());
                    }
                }

                message = messages.next() => {
                    let Some(message) = message else {
                        warn!("Redis subscription stream closed");
                        return Err(MetricsError::store("redis subscription closed"));
                    };

                    let Some(stream) = EventStream::from_channel(message.get_channel_name()) else {
                        warn!(channel = message.get_channel_name(), "Message on unknown channel");
                        continue;
                    };

                    match message.get_payload::<String>() {
                        Ok(payload) => {
                            self.dispatch(stream, &payload).await;
                        }
                        Err(e) => warn!(stream = %stream, error = %e, "Unreadable message payload"),
                    }
                }
            }
        }
    }

    /// Decodes one JSON message and hands it to the stream's handlers.
    ///
    /// Returns the number of handlers that completed successfully.
    pub async fn dispatch(&self, stream: EventStream, payload: &str) -> usize {
        let event: RawMetricEvent = match serde_json::from_str(payload) {
            Ok(event) => event,
            Err(e) => {
                warn!(stream = %stream, error = %e, "Skipping malformed event");
                return 0;
            }
        };

        let stream_handlers: Vec<Arc<dyn EventHandler>> = {
            let handlers = self.handlers.read().unwrap_or_else(PoisonError::into_inner);
            handlers.get(&stream).cloned().unwrap_or_default()
        };

        let mut handled = 0;
        for handler in stream_handlers {
            match handler.handle(event.clone()).await {
                Ok(()) => handled += 1,
                Err(e) => warn!(
                    handler = handler.name(),
                    stream = %stream,
                    event_type = %event.event_type,
                    error = %e,
                    "Event handler failed"
                ),
            }
        }
        debug!(stream = %stream, handled, "Dispatched event");
        handled
    }
}

impl EventSubscriber for RedisEventSubscriber {
    fn subscribe(&self, stream: EventStream, handler: Arc<dyn EventHandler>) {
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(stream)
            .or_default()
            .push(handler);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct RecordingHandler {
        seen: Mutex<Vec<RawMetricEvent>>,
        fail: bool,
    }

    impl RecordingHandler {
        fn new(fail: bool) -> Self {
            Self {
                seen: Mutex::new(Vec::new()),
                fail,
            }
        }
    }

    #[async_trait]
    impl EventHandler for RecordingHandler {
        async fn handle(&self, event: RawMetricEvent) -> Result<(), MetricsError> {
            self.seen.lock().unwrap().push(event);
            if self.fail {
                return Err(MetricsError::store("down"));
            }
            Ok(())
        }

        fn name(&self) -> &'static str {
            "RecordingHandler"
        }
    }

    fn subscriber() -> RedisEventSubscriber {
        RedisEventSubscriber::from_url("redis://127.0.0.1:6379").unwrap()
    }

    #[test]
    fn rejects_invalid_url() {
        assert!(RedisEventSubscriber::from_url("not a url").is_err());
    }

    #[test]
    fn tracks_subscribed_streams() {
        let subscriber = subscriber();
        subscriber.subscribe(EventStream::Tasks, Arc::new(RecordingHandler::new(false)));
        assert_eq!(subscriber.subscribed_streams(), vec![EventStream::Tasks]);
    }

    #[tokio::test]
    async fn run_fails_when_redis_is_unreachable() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let subscriber = RedisEventSubscriber::from_url(&format!("redis://{}", addr))
            .unwrap()
            .with_connect_timeout(Duration::from_secs(2));
        subscriber.subscribe(EventStream::Goals, Arc::new(RecordingHandler::new(false)));
        let (_tx, rx) = watch::channel(false);

        let result = tokio::time::timeout(Duration::from_secs(10), subscriber.run(rx))
            .await
            .expect("run should fail instead of hanging");

        assert!(matches!(result, Err(MetricsError::Store(_))));
    }

    #[tokio::test]
    async fn run_times_out_against_silent_server() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // Accept connections and never answer.
        let server = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let subscriber = RedisEventSubscriber::from_url(&format!("redis://{}", addr))
            .unwrap()
            .with_connect_timeout(Duration::from_millis(200));
        subscriber.subscribe(EventStream::Users, Arc::new(RecordingHandler::new(false)));
        let (_tx, rx) = watch::channel(false);

        let result = tokio::time::timeout(Duration::from_secs(10), subscriber.run(rx))
            .await
            .expect("run should time out instead of hanging");

        match result {
            Err(MetricsError::Store(msg)) => assert!(msg.contains("timed out"), "unexpected error: {}", msg),
            other => panic!("expected store timeout, got {:?}", other),
        }
        server.abort();
    }

    #[tokio::test]
    async fn dispatches_decoded_event() {
        let subscriber = subscriber();
        let handler = Arc::new(RecordingHandler::new(false));
        subscriber.subscribe(EventStream::Users, handler.clone());

        let handled = subscriber
            .dispatch(EventStream::Users, r#"{"type":"USER_ADDED","key":"alice","data":null}"#)
            .await;

        assert_eq!(handled, 1);
        assert_eq!(handler.seen.lock().unwrap()[0].key, "alice");
    }

    #[tokio::test]
    async fn skips_malformed_json() {
        let subscriber = subscriber();
        let handler = Arc::new(RecordingHandler::new(false));
        subscriber.subscribe(EventStream::Goals, handler.clone());

        let handled = subscriber.dispatch(EventStream::Goals, "{not json").await;

        assert_eq!(handled, 0);
        assert!(handler.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn handler_failure_does_not_stop_other_handlers() {
        let subscriber = subscriber();
        let failing = Arc::new(RecordingHandler::new(true));
        let healthy = Arc::new(RecordingHandler::new(false));
        subscriber.subscribe(EventStream::Tasks, failing.clone());
        subscriber.subscribe(EventStream::Tasks, healthy.clone());

        let handled = subscriber
            .dispatch(EventStream::Tasks, r#"{"type":"TASK_ADDED","key":"t-1"}"#)
            .await;

        assert_eq!(handled, 1);
        assert_eq!(failing.seen.lock().unwrap().len(), 1);
        assert_eq!(healthy.seen.lock().unwrap().len(), 1);
    }
}
