//! Connection pool contract.

use std::collections::VecDeque;
use std::future::Future;
use std::io;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::debug;

use super::Connection;
use crate::Result;

/// Source of authenticated connections shared by folder sessions.
///
/// Each session holds at most one connection at a time. A connection that
/// failed with an I/O error is closed by the session and never released.
pub trait ConnectionPool: Send + Sync {
    /// Underlying byte stream.
    type Stream: AsyncRead + AsyncWrite + Unpin + Send;

    /// Hands out a connection, establishing one if needed.
    fn acquire(&self) -> impl Future<Output = Result<Connection<Self::Stream>>> + Send;

    /// Returns a healthy connection for reuse.
    fn release(&self, conn: Connection<Self::Stream>);
}

/// Pool over a fixed queue of pre-established connections.
#[derive(Debug)]
pub struct QueuePool<S> {
    idle: Mutex<VecDeque<Connection<S>>>,
}

impl<S> QueuePool<S> {
    /// Creates a pool from ready connections, handed out in order.
    pub fn new(connections: impl IntoIterator<Item = Connection<S>>) -> Self {
        Self {
            idle: Mutex::new(connections.into_iter().collect()),
        }
    }

    /// Number of idle connections.
    pub fn idle_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Connection<S>>> {
        self.idle.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<S> ConnectionPool for QueuePool<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    type Stream = S;

    async fn acquire(&self) -> Result<Connection<S>> {
        let conn = self.lock().pop_front();
        conn.ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "no idle connection").into())
    }

    fn release(&self, conn: Connection<S>) {
        let mut idle = self.lock();
        idle.push_back(conn);
        debug!(idle = idle.len(), "Connection released");
    }
}
