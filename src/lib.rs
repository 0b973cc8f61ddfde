//! 连载小说平台的通知核心：事件聚合判断、聚合键推导、发起人名称格式化，
//! 以及按通知类型生成标题、正文和链接。
//!
//! 聚合与渲染函数都是纯函数，不做 I/O。计数状态由宿主管道持有，
//! [`services::AggregationCounter`] 提供了一个内存实现。

pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

pub use config::Config;
pub use error::{AppError, Result};
pub use models::{
    Actor, AggregationContext, Delivery, Notification, NotificationEvent, NotificationPayload,
    NotificationType, RenderedNotification,
};
pub use services::{
    aggregation_key, create_content, create_link, create_title, should_aggregate, AggregationKey,
    AggregationPolicy, NotificationService,
};
pub use utils::format_actor_names;
