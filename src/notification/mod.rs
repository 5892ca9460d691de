/*!
 * Style change notifications.
 */

pub mod hub;

pub use hub::{NotificationHub, ObserverId, StyleObserver};
