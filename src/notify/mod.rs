//! # Change Notification
//!
//! Every observable mutation of a datacube node publishes a [`CubeEvent`]
//! to the node's [`NotificationBus`].
//!
//! ## Delivery
//!
//! - Synchronous: delivery completes before the mutating call returns
//! - Ordered: observers run in subscription order
//! - Fail-fast: the first failing observer stops delivery and its error
//!   reaches the caller; the mutation itself is not rolled back

mod bus;
mod event;

pub use bus::{
    CubeObserver, EventRecorder, NotificationBus, ObserverError, SharedObserver, SubscriptionId,
};
pub use event::{ChildRef, CubeEvent, EventKind, MetaSnapshot};
