pub mod actor;
pub mod notification;

pub use actor::Actor;
pub use notification::{
    AggregationContext, Delivery, Notification, NotificationEvent, NotificationPayload,
    NotificationType, RenderedNotification,
};
