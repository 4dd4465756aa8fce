//! Grid snapshot fan-out.
//!
//! Every broadcast carries the full grid, so one message is enough for a
//! client that joined late to reconstruct the whole board. The grid is
//! serialized once and the resulting frame is shared by every session.

use std::sync::Arc;

use lifegrid_core::Grid;
use lifegrid_core::protocol::encode_grid;

use crate::error::ServerError;
use crate::session::{Frame, SessionId, SessionRegistry};

/// Serializes grid snapshots and queues them on registered sessions.
#[derive(Debug, Clone)]
pub struct Broadcaster {
    sessions: Arc<SessionRegistry>,
}

impl Broadcaster {
    /// Create a broadcaster over the given registry.
    pub const fn new(sessions: Arc<SessionRegistry>) -> Self {
        Self { sessions }
    }

    /// Queue a `grid` snapshot on every session.
    ///
    /// Sessions whose delivery fails are removed. Returns the number of
    /// sessions the snapshot was queued for.
    pub fn broadcast(&self, grid: &Grid) -> Result<usize, ServerError> {
        let frame = encode(grid)?;
        Ok(self.sessions.deliver_all(&frame))
    }

    /// Queue a `grid` snapshot on one session.
    pub fn send_to(&self, session: SessionId, grid: &Grid) -> Result<bool, ServerError> {
        let frame = encode(grid)?;
        Ok(self.sessions.deliver_to(session, frame))
    }
}

fn encode(grid: &Grid) -> Result<Frame, ServerError> {
    Ok(Frame::from(encode_grid(grid)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broadcast_sends_full_grid_envelope() {
        let registry = Arc::new(SessionRegistry::new(4));
        let broadcaster = Broadcaster::new(Arc::clone(&registry));
        let (_id, mut rx) = registry.register();

        let mut grid = Grid::new(2, 2);
        grid.set(1, 0, true);
        assert_eq!(broadcaster.broadcast(&grid).ok(), Some(1));

        let frame = rx.try_recv().ok();
        assert_eq!(
            frame.as_ref().map(Frame::as_str),
            Some(r#"{"type":"grid","data":[[0,1],[0,0]]}"#)
        );
    }

    #[test]
    fn send_to_reaches_only_the_target() {
        let registry = Arc::new(SessionRegistry::new(4));
        let broadcaster = Broadcaster::new(Arc::clone(&registry));
        let (target, mut rx_target) = registry.register();
        let (_other, mut rx_other) = registry.register();

        let grid = Grid::new(1, 1);
        assert_eq!(broadcaster.send_to(target, &grid).ok(), Some(true));
        assert!(rx_target.try_recv().is_ok());
        assert!(rx_other.try_recv().is_err());
    }

    #[test]
    fn broadcast_with_no_sessions_is_not_an_error() {
        let broadcaster = Broadcaster::new(Arc::new(SessionRegistry::new(4)));
        assert_eq!(broadcaster.broadcast(&Grid::new(3, 3)).ok(), Some(0));
    }
}
