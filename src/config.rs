use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;

use crate::{
    error::Result,
    models::NotificationType,
    services::aggregation::AggregationPolicy,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub environment: String,
    pub log_level: String,
    pub log_format: String,

    // 聚合通知中列出的发起人数量
    pub actor_preview_limit: usize,

    // 阈值覆盖，只对可聚合类型生效
    pub threshold_overrides: HashMap<NotificationType, u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            log_level: "novel_notify=debug".to_string(),
            log_format: "pretty".to_string(),
            actor_preview_limit: 3,
            threshold_overrides: HashMap::new(),
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();
        let base_policy = AggregationPolicy::default();

        let mut threshold_overrides = HashMap::new();
        for variant in NotificationType::ALL {
            if !base_policy.is_aggregatable(variant) {
                continue;
            }
            if let Ok(value) = env::var(threshold_var(variant)) {
                threshold_overrides.insert(variant, value.parse()?);
            }
        }

        Ok(Config {
            environment: env::var("ENVIRONMENT").unwrap_or(defaults.environment),
            log_level: env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
            log_format: env::var("LOG_FORMAT").unwrap_or(defaults.log_format),
            actor_preview_limit: env::var("ACTOR_PREVIEW_LIMIT")
                .unwrap_or_else(|_| "3".to_string())
                .parse()?,
            threshold_overrides,
        })
    }

    pub fn aggregation_policy(&self) -> Result<AggregationPolicy> {
        AggregationPolicy::with_overrides(&self.threshold_overrides)
    }

    pub fn json_logs(&self) -> bool {
        self.log_format == "json"
    }
}

/// `AGGREGATION_THRESHOLD_RATING_LIKE` 等
pub fn threshold_var(variant: NotificationType) -> String {
    format!("AGGREGATION_THRESHOLD_{}", variant.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[test]
    fn test_default_policy_matches_table() {
        let policy = Config::default().aggregation_policy().unwrap();
        assert_eq!(policy, AggregationPolicy::default());
    }

    #[test]
    fn test_overrides_feed_policy() {
        let mut config = Config::default();
        config
            .threshold_overrides
            .insert(NotificationType::CommentReply, 1);

        let policy = config.aggregation_policy().unwrap();
        assert!(policy.should_aggregate(NotificationType::CommentReply, 2));

        config.threshold_overrides.insert(NotificationType::NewFollower, 0);
        assert!(matches!(
            config.aggregation_policy(),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn test_threshold_var() {
        assert_eq!(
            threshold_var(NotificationType::NewFollower),
            "AGGREGATION_THRESHOLD_NEW_FOLLOWER"
        );
    }
}
