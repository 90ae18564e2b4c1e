use jollof_types::{RoomKey, ServerEvent};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;

use crate::backplane::{Backplane, Envelope, NoopBackplane};
use crate::error::{Result, SessionError};

pub type EventSender = mpsc::UnboundedSender<ServerEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<ServerEvent>;

/// Process-local handle for one live socket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

struct Member {
    sender: EventSender,
    label: String,
    rooms: HashSet<RoomKey>,
}

#[derive(Default)]
struct RoomTable {
    connections: HashMap<ConnectionId, Member>,
    rooms: HashMap<RoomKey, HashSet<ConnectionId>>,
}

impl RoomTable {
    /// Returns whether the connection was newly added
    fn join(&mut self, id: ConnectionId, room: &RoomKey) -> bool {
        let Some(member) = self.connections.get_mut(&id) else {
            return false;
        };
        member.rooms.insert(room.clone());
        self.rooms.entry(room.clone()).or_default().insert(id)
    }

    fn leave(&mut self, id: ConnectionId, room: &RoomKey) -> bool {
        if let Some(member) = self.connections.get_mut(&id) {
            member.rooms.remove(room);
        }
        let Some(members) = self.rooms.get_mut(room) else {
            return false;
        };
        let removed = members.remove(&id);
        if members.is_empty() {
            self.rooms.remove(room);
        }
        removed
    }

    fn deliver(&self, room: &RoomKey, event: &ServerEvent, except: Option<ConnectionId>) -> usize {
        let Some(members) = self.rooms.get(room) else {
            return 0;
        };
        members
            .iter()
            .filter(|id| Some(**id) != except)
            .filter_map(|id| self.connections.get(id))
            .filter(|member| member.sender.send(event.clone()).is_ok())
            .count()
    }
}

/// Room membership and fan-out of server events
///
/// Delivery is best-effort and at-most-once. With a backplane configured,
/// room events are also published so other nodes can deliver them to their
/// own members.
pub struct Broadcaster {
    table: RwLock<RoomTable>,
    next_id: AtomicU64,
    backplane: Arc<dyn Backplane>,
    max_timer: Duration,
}

impl Broadcaster {
    pub fn new(max_timer: Duration) -> Self {
        Self::with_backplane(max_timer, Arc::new(NoopBackplane))
    }

    pub fn with_backplane(max_timer: Duration, backplane: Arc<dyn Backplane>) -> Self {
        Self {
            table: RwLock::new(RoomTable::default()),
            next_id: AtomicU64::new(1),
            backplane,
            max_timer,
        }
    }

    /// Add a connection; `label` names it in join/leave notices
    pub async fn register(&self, label: impl Into<String>) -> (ConnectionId, EventReceiver) {
        let id = ConnectionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (sender, receiver) = mpsc::unbounded_channel();
        let member = Member {
            sender,
            label: label.into(),
            rooms: HashSet::new(),
        };
        self.table.write().await.connections.insert(id, member);
        tracing::debug!(%id, "registered connection");
        (id, receiver)
    }

    /// Remove a connection from every room it joined
    pub async fn disconnect(&self, id: ConnectionId) {
        let (label, rooms) = {
            let mut table = self.table.write().await;
            let Some(member) = table.connections.remove(&id) else {
                return;
            };
            for room in &member.rooms {
                table.leave(id, room);
            }
            (member.label, member.rooms)
        };

        for room in rooms {
            self.emit_to_room(&room, presence_notice(&room, &label, "left")).await;
        }
        tracing::debug!(%id, "connection closed");
    }

    /// Join a room; the join is announced to the other members
    pub async fn join(&self, id: ConnectionId, room: &RoomKey) {
        let joined = {
            let mut table = self.table.write().await;
            table
                .join(id, room)
                .then(|| table.connections.get(&id).map(|m| m.label.clone()))
                .flatten()
        };

        if let Some(label) = joined {
            tracing::debug!(%id, %room, "joined room");
            self.publish(room, presence_notice(room, &label, "joined"), Some(id))
                .await;
        }
    }

    pub async fn leave(&self, id: ConnectionId, room: &RoomKey) {
        let left = {
            let mut table = self.table.write().await;
            let label = table.connections.get(&id).map(|m| m.label.clone());
            table.leave(id, room).then_some(label).flatten()
        };

        if let Some(label) = left {
            tracing::debug!(%id, %room, "left room");
            self.emit_to_room(room, presence_notice(room, &label, "left"))
                .await;
        }
    }

    pub async fn is_member(&self, id: ConnectionId, room: &RoomKey) -> bool {
        self.table
            .read()
            .await
            .rooms
            .get(room)
            .is_some_and(|members| members.contains(&id))
    }

    pub async fn room_size(&self, room: &RoomKey) -> usize {
        self.table.read().await.rooms.get(room).map_or(0, HashSet::len)
    }

    /// Send to every current member of the room
    pub async fn emit_to_room(&self, room: &RoomKey, event: ServerEvent) {
        self.publish(room, event, None).await;
    }

    /// Send to one connection only
    pub async fn emit_to(&self, id: ConnectionId, event: ServerEvent) {
        let table = self.table.read().await;
        match table.connections.get(&id) {
            Some(member) => {
                if member.sender.send(event).is_err() {
                    tracing::debug!(%id, "dropping event for closed connection");
                }
            }
            None => tracing::debug!(%id, "dropping event for unknown connection"),
        }
    }

    /// Deliver an event received from another node
    pub async fn deliver_local(&self, room: &RoomKey, event: &ServerEvent) -> usize {
        self.table.read().await.deliver(room, event, None)
    }

    async fn publish(&self, room: &RoomKey, event: ServerEvent, except: Option<ConnectionId>) {
        let delivered = self.table.read().await.deliver(room, &event, except);
        tracing::trace!(%room, delivered, "emitted room event");

        let envelope = Envelope::new(self.backplane.node_id(), room.clone(), event);
        if let Err(e) = self.backplane.publish(&envelope).await {
            tracing::warn!(%room, error = %e, "backplane publish failed");
        }
    }

    /// Announce a countdown now and its completion after `seconds`
    ///
    /// Not cancellable. Completion into an empty room is a no-op.
    pub async fn start_timer(
        self: &Arc<Self>,
        room: RoomKey,
        seconds: u64,
        step: String,
    ) -> Result<JoinHandle<()>> {
        let max = self.max_timer.as_secs();
        if seconds == 0 || seconds > max {
            return Err(SessionError::Invalid(format!(
                "seconds must be between 1 and {}",
                max
            )));
        }

        self.emit_to_room(
            &room,
            ServerEvent::TimerStart {
                seconds,
                step: step.clone(),
            },
        )
        .await;

        let broadcaster = Arc::clone(self);
        Ok(tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(seconds)).await;
            broadcaster
                .emit_to_room(&room, ServerEvent::TimerComplete { step })
                .await;
        }))
    }
}

fn presence_notice(room: &RoomKey, label: &str, verb: &str) -> ServerEvent {
    let place = if room.is_cook_along() {
        "the cook-along"
    } else {
        "the session"
    };
    ServerEvent::system(format!("{} {} {}", label, verb, place))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn broadcaster() -> Arc<Broadcaster> {
        Arc::new(Broadcaster::new(Duration::from_secs(60)))
    }

    #[tokio::test]
    async fn test_room_isolation() {
        let b = broadcaster();
        let (a, mut rx_a) = b.register("Ada").await;
        let (c, mut rx_c) = b.register("Chidi").await;
        b.join(a, &RoomKey::cook_along("jollof")).await;
        b.join(c, &RoomKey::cook_along("egusi")).await;

        b.emit_to_room(&RoomKey::cook_along("jollof"), ServerEvent::system("hello"))
            .await;

        assert_eq!(rx_a.try_recv().ok(), Some(ServerEvent::system("hello")));
        assert!(rx_c.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_join_notice_goes_to_others() {
        let b = broadcaster();
        let room = RoomKey::cook_along("jollof");
        let (a, mut rx_a) = b.register("Ada").await;
        let (c, mut rx_c) = b.register("Chidi").await;

        b.join(a, &room).await;
        b.join(c, &room).await;

        assert_eq!(
            rx_a.try_recv().ok(),
            Some(ServerEvent::system("Chidi joined the cook-along"))
        );
        assert!(rx_c.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_personal_room_announces_devices() {
        let b = broadcaster();
        let (a, mut rx_a) = b.register("Ada").await;
        let (c, mut rx_c) = b.register("Ada on phone").await;
        let room = RoomKey::personal("u1", "r1");

        b.join(a, &room).await;
        b.join(c, &room).await;
        assert_eq!(b.room_size(&room).await, 2);
        assert_eq!(
            rx_a.try_recv().ok(),
            Some(ServerEvent::system("Ada on phone joined the session"))
        );
        assert!(rx_c.try_recv().is_err());

        b.leave(c, &room).await;
        assert_eq!(
            rx_a.try_recv().ok(),
            Some(ServerEvent::system("Ada on phone left the session"))
        );

        // rejoining an occupied seat is not a second join
        b.join(a, &room).await;
        assert!(rx_a.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_disconnect_leaves_all_rooms() {
        let b = broadcaster();
        let room = RoomKey::cook_along("jollof");
        let (a, mut rx_a) = b.register("Ada").await;
        let (c, _rx_c) = b.register("Chidi").await;
        b.join(a, &room).await;
        b.join(c, &room).await;
        b.join(c, &RoomKey::personal("u2", "jollof")).await;
        let _ = rx_a.try_recv();

        b.disconnect(c).await;

        assert_eq!(b.room_size(&room).await, 1);
        assert_eq!(b.room_size(&RoomKey::personal("u2", "jollof")).await, 0);
        assert_eq!(
            rx_a.try_recv().ok(),
            Some(ServerEvent::system("Chidi left the cook-along"))
        );
    }

    #[tokio::test]
    async fn test_emit_to_targets_one_connection() {
        let b = broadcaster();
        let room = RoomKey::personal("u1", "r1");
        let (a, mut rx_a) = b.register("Ada").await;
        let (c, mut rx_c) = b.register("Ada").await;
        b.join(a, &room).await;
        b.join(c, &room).await;
        let _ = rx_a.try_recv();

        b.emit_to(a, ServerEvent::error("nope")).await;

        assert_eq!(rx_a.try_recv().ok(), Some(ServerEvent::error("nope")));
        assert!(rx_c.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_timer_bounds() {
        let b = broadcaster();
        let room = RoomKey::cook_along("jollof");
        assert!(b.start_timer(room.clone(), 0, "Boil".into()).await.is_err());
        assert!(b.start_timer(room, 61, "Boil".into()).await.is_err());
    }

    #[tokio::test]
    async fn test_timer_start_and_complete() {
        let b = broadcaster();
        let room = RoomKey::cook_along("jollof");
        let (a, mut rx_a) = b.register("Ada").await;
        b.join(a, &room).await;

        let handle = b.start_timer(room, 1, "Simmer".into()).await.unwrap();
        assert_eq!(
            rx_a.recv().await,
            Some(ServerEvent::TimerStart {
                seconds: 1,
                step: "Simmer".into()
            })
        );

        handle.await.unwrap();
        assert_eq!(
            rx_a.recv().await,
            Some(ServerEvent::TimerComplete {
                step: "Simmer".into()
            })
        );
    }

    #[tokio::test]
    async fn test_timer_into_empty_room_is_noop() {
        let b = broadcaster();
        let handle = b
            .start_timer(RoomKey::cook_along("nobody"), 1, "Rest".into())
            .await
            .unwrap();
        handle.await.unwrap();
    }
}
