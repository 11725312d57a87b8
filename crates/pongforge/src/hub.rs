//! Hub actor: the one task that owns the [`SessionCoordinator`].
//!
//! Connection handlers never touch game state. They send [`HubCommand`]s
//! through a bounded channel and the hub applies them one at a time,
//! interleaved with ticks from the [`TickScheduler`]. A tick always runs to
//! completion (physics, then snapshots, then the lobby summary) before the
//! next command is looked at.

use pongforge_lobby::{OutboundSender, SessionCoordinator};
use pongforge_protocol::ClientMessage;
use pongforge_tick::{TickConfig, TickScheduler};
use pongforge_transport::ConnectionId;
use tokio::sync::mpsc;

use crate::PongforgeError;

/// Commands sent to the hub actor.
#[derive(Debug)]
pub(crate) enum HubCommand {
    /// A new connection with the sending half of its outbound channel.
    Connect {
        conn: ConnectionId,
        outbound: OutboundSender,
    },

    /// A decoded frame from a connection.
    Inbound {
        conn: ConnectionId,
        msg: ClientMessage,
    },

    /// The connection's socket has closed.
    Disconnect { conn: ConnectionId },
}

/// Handle to the running hub. Cheap to clone: one per connection task.
#[derive(Clone)]
pub(crate) struct HubHandle {
    sender: mpsc::Sender<HubCommand>,
}

impl HubHandle {
    pub(crate) async fn connect(
        &self,
        conn: ConnectionId,
        outbound: OutboundSender,
    ) -> Result<(), PongforgeError> {
        self.send(HubCommand::Connect { conn, outbound }).await
    }

    pub(crate) async fn inbound(
        &self,
        conn: ConnectionId,
        msg: ClientMessage,
    ) -> Result<(), PongforgeError> {
        self.send(HubCommand::Inbound { conn, msg }).await
    }

    pub(crate) async fn disconnect(&self, conn: ConnectionId) -> Result<(), PongforgeError> {
        self.send(HubCommand::Disconnect { conn }).await
    }

    async fn send(&self, cmd: HubCommand) -> Result<(), PongforgeError> {
        self.sender
            .send(cmd)
            .await
            .map_err(|_| PongforgeError::HubClosed)
    }
}

struct Hub {
    coordinator: SessionCoordinator,
    scheduler: TickScheduler,
    receiver: mpsc::Receiver<HubCommand>,
}

impl Hub {
    /// Runs until every [`HubHandle`] is dropped.
    async fn run(mut self) {
        tracing::info!(
            period_ms = self.scheduler.period().as_millis() as u64,
            "hub started"
        );

        loop {
            tokio::select! {
                cmd = self.receiver.recv() => match cmd {
                    Some(cmd) => self.apply(cmd),
                    None => break,
                },
                info = self.scheduler.wait_for_tick() => {
                    let report = self.coordinator.tick();
                    self.scheduler.record_tick_end();
                    tracing::trace!(tick = info.tick, ?report, "tick done");
                }
            }
        }

        let metrics = self.scheduler.metrics();
        tracing::info!(
            ticks = metrics.total_ticks,
            overruns = metrics.total_overruns,
            "hub stopped"
        );
    }

    fn apply(&mut self, cmd: HubCommand) {
        let (conn, result) = match cmd {
            HubCommand::Connect { conn, outbound } => {
                (conn, self.coordinator.connect(conn, outbound))
            }
            HubCommand::Inbound { conn, msg } => (conn, self.coordinator.handle(conn, msg)),
            HubCommand::Disconnect { conn } => (conn, self.coordinator.disconnect(conn)),
        };
        if let Err(e) = result {
            tracing::debug!(%conn, error = %e, "request ignored");
        }
    }
}

/// Spawns the hub actor task and returns a handle to it.
///
/// `channel_size` controls backpressure: when the channel is full,
/// connection handlers wait.
pub(crate) fn spawn_hub(
    coordinator: SessionCoordinator,
    tick: TickConfig,
    channel_size: usize,
) -> HubHandle {
    let (tx, rx) = mpsc::channel(channel_size.max(1));
    let hub = Hub {
        coordinator,
        scheduler: TickScheduler::new(tick),
        receiver: rx,
    };
    tokio::spawn(hub.run());
    HubHandle { sender: tx }
}
