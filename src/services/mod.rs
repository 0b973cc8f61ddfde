pub mod aggregation;
pub mod content;
pub mod counter;
pub mod notification;

// 重新导出常用类型
pub use aggregation::{aggregation_key, should_aggregate, AggregationKey, AggregationPolicy};
pub use content::{create_content, create_link, create_title};
pub use counter::{AggregationCounter, BucketSnapshot};
pub use notification::NotificationService;
