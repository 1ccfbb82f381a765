//! UI description primitives: node trees, signals and notifications.

pub mod node;
pub mod notification;
pub mod signal;

pub use node::{
    Anchor, Axes, Colour, FlowDirection, Icon, MarginPadding, Node, NodeKind, TextSpan, UiAction,
    Vec2, colours,
};
pub use notification::{Notification, NotificationActivation, NotificationQueue};
pub use signal::Signal;
