//! Deferred navigation commands.
//!
//! Code that cannot borrow the browser (mount hooks, deferred tasks) holds
//! a [`Navigator`] and enqueues [`Command`]s. The owner of the browser
//! drains the matching [`Commands`] queue and applies each command in the
//! order it was sent.
//!
//! A navigator handed to a mount hook is tied to that mount. Commands it
//! sent are discarded on dequeue once the route has left the active chain.

use crate::error::RouterError;
use crate::route::RouteId;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, trace};
use waypoint_location::QueryParams;

/// Options for a navigation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavigateOptions {
    /// Replace the current history entry instead of pushing a new one.
    pub replace: bool,
}

impl NavigateOptions {
    /// Options for a replacing navigation.
    #[must_use]
    pub fn replace() -> Self {
        Self { replace: true }
    }
}

/// A queued navigation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Navigate to an href, relative to the current location.
    Navigate {
        /// Target href.
        to: String,
        /// Navigation options.
        options: NavigateOptions,
    },
    /// Replace the current query parameters.
    SetSearchParams(QueryParams),
    /// Move through history.
    Go(isize),
}

/// The mount a command came from.
#[derive(Debug, Clone)]
struct Issuer {
    route_id: RouteId,
    mounted: Arc<AtomicBool>,
}

#[derive(Debug)]
struct Queued {
    command: Command,
    issuer: Option<Issuer>,
}

impl Queued {
    fn into_live(self) -> Option<Command> {
        match &self.issuer {
            Some(issuer) if !issuer.mounted.load(Ordering::Acquire) => {
                debug!(
                    route = %issuer.route_id,
                    command = ?self.command,
                    "Dropping command from unmounted route"
                );
                None
            }
            _ => Some(self.command),
        }
    }
}

/// Cloneable handle for enqueueing navigation commands.
#[derive(Debug, Clone)]
pub struct Navigator {
    sender: mpsc::UnboundedSender<Queued>,
    issuer: Option<Issuer>,
}

/// Receiving end of a navigator's commands.
#[derive(Debug)]
pub struct Commands {
    receiver: mpsc::UnboundedReceiver<Queued>,
}

impl Navigator {
    /// Create a navigator and its command queue.
    #[must_use]
    pub fn channel() -> (Navigator, Commands) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (
            Navigator {
                sender,
                issuer: None,
            },
            Commands { receiver },
        )
    }

    /// A navigator whose commands only apply while `mounted` is set.
    pub(crate) fn issued_by(&self, route_id: RouteId, mounted: Arc<AtomicBool>) -> Navigator {
        Navigator {
            sender: self.sender.clone(),
            issuer: Some(Issuer { route_id, mounted }),
        }
    }

    /// Enqueue a command.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::NavigatorClosed`] if the queue is gone.
    pub fn send(&self, command: Command) -> Result<(), RouterError> {
        trace!(?command, "Navigator command queued");
        self.sender
            .send(Queued {
                command,
                issuer: self.issuer.clone(),
            })
            .map_err(|_| RouterError::NavigatorClosed)
    }

    /// Enqueue a navigation.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::NavigatorClosed`] if the queue is gone.
    pub fn navigate(&self, to: impl Into<String>, options: NavigateOptions) -> Result<(), RouterError> {
        self.send(Command::Navigate {
            to: to.into(),
            options,
        })
    }

    /// Enqueue a query-parameter update.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::NavigatorClosed`] if the queue is gone.
    pub fn set_search_params(&self, params: QueryParams) -> Result<(), RouterError> {
        self.send(Command::SetSearchParams(params))
    }

    /// Enqueue a step back.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::NavigatorClosed`] if the queue is gone.
    pub fn back(&self) -> Result<(), RouterError> {
        self.send(Command::Go(-1))
    }

    /// Enqueue a step forward.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::NavigatorClosed`] if the queue is gone.
    pub fn forward(&self) -> Result<(), RouterError> {
        self.send(Command::Go(1))
    }
}

impl Commands {
    /// Wait for the next command, skipping those of unmounted routes.
    ///
    /// Returns `None` once every navigator is dropped.
    pub async fn next(&mut self) -> Option<Command> {
        loop {
            if let Some(command) = self.receiver.recv().await?.into_live() {
                return Some(command);
            }
        }
    }

    /// Take the next command if one is queued, skipping those of unmounted
    /// routes.
    pub fn try_next(&mut self) -> Option<Command> {
        loop {
            if let Some(command) = self.receiver.try_recv().ok()?.into_live() {
                return Some(command);
            }
        }
    }
}
