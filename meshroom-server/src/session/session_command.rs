use meshroom_core::{ClientSignal, ConnectionId};

/// Inputs of a session actor, produced by the transport.
#[derive(Debug)]
pub enum SessionCommand {
    /// A socket was accepted and routed to this session.
    Connect { conn: ConnectionId },

    /// A decoded message from a connection.
    Signal {
        conn: ConnectionId,
        signal: ClientSignal,
    },

    /// The socket closed or errored.
    Disconnect { conn: ConnectionId },
}
