use anyhow::Result;
use async_trait::async_trait;
use jollof_types::{RoomKey, ServerEvent};
use serde::{Deserialize, Serialize};

/// Pub/sub channel shared by every node
pub const ROOMS_CHANNEL: &str = "jollof:rooms";

/// A room event as it travels between nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub origin: String,
    pub room: RoomKey,
    pub event: ServerEvent,
}

impl Envelope {
    pub fn new(origin: impl Into<String>, room: RoomKey, event: ServerEvent) -> Self {
        Self {
            origin: origin.into(),
            room,
            event,
        }
    }
}

/// Cross-node fan-out for room events
#[async_trait]
pub trait Backplane: Send + Sync {
    fn node_id(&self) -> &str;

    async fn publish(&self, envelope: &Envelope) -> Result<()>;
}

/// Single-node deployments
pub struct NoopBackplane;

#[async_trait]
impl Backplane for NoopBackplane {
    fn node_id(&self) -> &str {
        "local"
    }

    async fn publish(&self, _envelope: &Envelope) -> Result<()> {
        Ok(())
    }
}

#[cfg(feature = "redis")]
pub use self::redis_backplane::RedisBackplane;

#[cfg(feature = "redis")]
mod redis_backplane {
    use super::*;
    use crate::broadcaster::Broadcaster;
    use anyhow::Context;
    use futures::StreamExt;
    use redis::aio::ConnectionManager;
    use redis::{AsyncCommands, Client};
    use std::sync::Arc;

    /// Redis pub/sub backplane; each node ignores envelopes it published itself
    pub struct RedisBackplane {
        node_id: String,
        client: Client,
        conn: ConnectionManager,
    }

    impl RedisBackplane {
        pub async fn connect(redis_url: &str) -> Result<Self> {
            let client = Client::open(redis_url).context("invalid Redis URL")?;
            let conn = client
                .get_connection_manager()
                .await
                .context("failed to connect Redis backplane")?;
            Ok(Self {
                node_id: uuid::Uuid::new_v4().to_string(),
                client,
                conn,
            })
        }

        /// Relay envelopes from other nodes into the local broadcaster until the
        /// subscription ends
        pub async fn listen(&self, broadcaster: Arc<Broadcaster>) -> Result<()> {
            let mut pubsub = self.client.get_async_pubsub().await?;
            pubsub.subscribe(ROOMS_CHANNEL).await?;
            tracing::info!(node_id = %self.node_id, channel = ROOMS_CHANNEL, "backplane listening");

            let mut messages = pubsub.on_message();
            while let Some(msg) = messages.next().await {
                let payload: String = match msg.get_payload() {
                    Ok(payload) => payload,
                    Err(e) => {
                        tracing::warn!(error = %e, "unreadable backplane message");
                        continue;
                    }
                };
                match serde_json::from_str::<Envelope>(&payload) {
                    Ok(envelope) if envelope.origin == self.node_id => {}
                    Ok(envelope) => {
                        broadcaster.deliver_local(&envelope.room, &envelope.event).await;
                    }
                    Err(e) => tracing::warn!(error = %e, "malformed backplane envelope"),
                }
            }

            tracing::warn!("backplane subscription closed");
            Ok(())
        }
    }

    #[async_trait]
    impl Backplane for RedisBackplane {
        fn node_id(&self) -> &str {
            &self.node_id
        }

        async fn publish(&self, envelope: &Envelope) -> Result<()> {
            let payload = serde_json::to_string(envelope)?;
            let mut conn = self.conn.clone();
            conn.publish::<_, _, ()>(ROOMS_CHANNEL, payload).await?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_wire_shape() {
        let envelope = Envelope::new(
            "node-a",
            RoomKey::cook_along("jollof"),
            ServerEvent::TimerComplete {
                step: "Simmer".to_string(),
            },
        );
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["room"], "cookalong:jollof");
        assert_eq!(json["event"]["event"], "timerComplete");

        let back: Envelope = serde_json::from_value(json).unwrap();
        assert_eq!(back, envelope);
    }
}
