//! The connection bound to a folder session.

use crate::connection::Connection;
use crate::{Error, Result};

/// Either no connection or exactly one bound connection.
///
/// Transitions move the connection out with `mem::replace`, so a swap can
/// never observe a half-bound slot.
#[derive(Debug)]
pub enum ConnectionSlot<S> {
    /// No connection held.
    Unbound,
    /// Connection held by the session.
    Bound(Connection<S>),
}

impl<S> Default for ConnectionSlot<S> {
    fn default() -> Self {
        Self::Unbound
    }
}

impl<S> ConnectionSlot<S> {
    /// True when a connection is bound.
    #[must_use]
    pub const fn is_bound(&self) -> bool {
        matches!(self, Self::Bound(_))
    }

    /// Binds `conn`, returning whatever was bound before.
    pub fn bind(&mut self, conn: Connection<S>) -> Option<Connection<S>> {
        std::mem::replace(self, Self::Bound(conn)).into_connection()
    }

    /// Unbinds and returns the connection, if any.
    pub fn take(&mut self) -> Option<Connection<S>> {
        std::mem::take(self).into_connection()
    }

    /// The bound connection.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidState`] when unbound.
    pub fn get_mut(&mut self) -> Result<&mut Connection<S>> {
        match self {
            Self::Bound(conn) => Ok(conn),
            Self::Unbound => Err(Error::InvalidState("folder is not open".into())),
        }
    }

    fn into_connection(self) -> Option<Connection<S>> {
        match self {
            Self::Bound(conn) => Some(conn),
            Self::Unbound => None,
        }
    }
}
