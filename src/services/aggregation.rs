use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::debug;
use urlencoding::encode;

use crate::{
    error::{AppError, Result},
    models::{AggregationContext, NotificationType},
};

/// 聚合阈值表，同时决定哪些类型可以聚合（不在表中即不可聚合）
static DEFAULT_THRESHOLDS: Lazy<HashMap<NotificationType, u64>> = Lazy::new(|| {
    HashMap::from([
        (NotificationType::RatingLike, 5),
        (NotificationType::CommentLike, 5),
        (NotificationType::RatingReply, 3),
        (NotificationType::CommentReply, 3),
        (NotificationType::NewFollower, 5),
    ])
});

static DEFAULT_POLICY: Lazy<AggregationPolicy> = Lazy::new(AggregationPolicy::default);

/// 聚合键：同一接收者、同一目标实体、同一类型的事件共享一个键
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AggregationKey(String);

impl AggregationKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for AggregationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 聚合目标实体
enum AggregationTarget {
    Rating,
    Comment,
    Recipient,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregationPolicy {
    thresholds: HashMap<NotificationType, u64>,
}

impl Default for AggregationPolicy {
    fn default() -> Self {
        Self {
            thresholds: DEFAULT_THRESHOLDS.clone(),
        }
    }
}

impl AggregationPolicy {
    /// 覆盖默认阈值；只能修改已在表中的类型，且阈值必须大于 0
    pub fn with_overrides(overrides: &HashMap<NotificationType, u64>) -> Result<Self> {
        let mut policy = Self::default();

        for (&variant, &threshold) in overrides {
            if !policy.thresholds.contains_key(&variant) {
                return Err(AppError::Config(format!(
                    "{} is not an aggregatable notification type",
                    variant
                )));
            }
            if threshold == 0 {
                return Err(AppError::Config(format!(
                    "aggregation threshold for {} must be greater than 0",
                    variant
                )));
            }
            policy.thresholds.insert(variant, threshold);
        }

        Ok(policy)
    }

    pub fn threshold(&self, variant: NotificationType) -> Option<u64> {
        self.thresholds.get(&variant).copied()
    }

    pub fn is_aggregatable(&self, variant: NotificationType) -> bool {
        self.thresholds.contains_key(&variant)
    }

    /// 事件数严格大于阈值时才聚合
    pub fn should_aggregate(&self, variant: NotificationType, event_count: u64) -> bool {
        match self.threshold(variant) {
            Some(threshold) => event_count > threshold,
            None => false,
        }
    }

    /// 推导聚合键，格式为 `{TYPE}:{recipient}` 或 `{TYPE}:{recipient}:{target}`
    ///
    /// ID 经过百分号编码，含 `:` 的 ID 不会与其他组合冲突。
    ///
    /// 不可聚合的类型、或上下文缺少目标 ID 时返回 `None`，调用方应回退为单条通知。
    pub fn aggregation_key(
        &self,
        variant: NotificationType,
        recipient_user_id: &str,
        context: &AggregationContext,
    ) -> Option<AggregationKey> {
        if !self.is_aggregatable(variant) {
            return None;
        }

        let target = match aggregation_target(variant)? {
            AggregationTarget::Rating => Some(context.rating()),
            AggregationTarget::Comment => Some(context.comment()),
            AggregationTarget::Recipient => None,
        };

        let key = match target {
            None => format!("{}:{}", variant, encode(recipient_user_id)),
            Some(Some(target_id)) => format!(
                "{}:{}:{}",
                variant,
                encode(recipient_user_id),
                encode(target_id)
            ),
            Some(None) => {
                debug!(
                    "Context for {} to {} lacks a target id, not aggregating",
                    variant, recipient_user_id
                );
                return None;
            }
        };

        Some(AggregationKey(key))
    }
}

fn aggregation_target(variant: NotificationType) -> Option<AggregationTarget> {
    match variant {
        NotificationType::RatingLike | NotificationType::RatingReply => {
            Some(AggregationTarget::Rating)
        }
        NotificationType::CommentLike | NotificationType::CommentReply => {
            Some(AggregationTarget::Comment)
        }
        NotificationType::NewFollower => Some(AggregationTarget::Recipient),
        NotificationType::AuthorNewNovel
        | NotificationType::AuthorNewChapter
        | NotificationType::NovelUpdate
        | NotificationType::NovelRating
        | NotificationType::NovelComment
        | NotificationType::LevelUp
        | NotificationType::SystemAnnouncement => None,
    }
}

/// 使用默认阈值表判断是否聚合
pub fn should_aggregate(variant: NotificationType, event_count: u64) -> bool {
    DEFAULT_POLICY.should_aggregate(variant, event_count)
}

/// 使用默认阈值表推导聚合键
pub fn aggregation_key(
    variant: NotificationType,
    recipient_user_id: &str,
    context: &AggregationContext,
) -> Option<AggregationKey> {
    DEFAULT_POLICY.aggregation_key(variant, recipient_user_id, context)
}
