use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;

use crate::{models::Actor, services::aggregation::AggregationKey};

/// 聚合桶快照
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketSnapshot {
    pub count: u64,
    /// 最近的发起人，最新的在前
    pub actors: Vec<Actor>,
}

#[derive(Debug, Default)]
struct Bucket {
    count: u64,
    recent_actors: Vec<Actor>,
}

/// 内存中的聚合计数器
///
/// 计数和快照在同一个分片锁内完成，所以每次越过阈值只会被一个调用方观察到。
///
/// 桶在越过阈值后不会自动清空：之后的事件继续累加，管道据此返回
/// `Delivery::Merged`。桶一直保留到宿主调用 [`AggregationCounter::reset`]
/// （通常在聚合通知被阅读或归档之后），因此长期运行的宿主负责定期清理。
#[derive(Debug, Clone)]
pub struct AggregationCounter {
    buckets: Arc<DashMap<AggregationKey, Bucket>>,
    preview_limit: usize,
}

impl AggregationCounter {
    pub fn new(preview_limit: usize) -> Self {
        Self {
            buckets: Arc::new(DashMap::new()),
            preview_limit: preview_limit.max(1),
        }
    }

    /// 记录一次事件，返回记录后的快照
    pub fn record(&self, key: &AggregationKey, actor: Option<&Actor>) -> BucketSnapshot {
        let mut bucket = self.buckets.entry(key.clone()).or_default();
        bucket.count += 1;

        if let Some(actor) = actor {
            bucket.recent_actors.retain(|existing| existing.id != actor.id);
            bucket.recent_actors.insert(0, actor.clone());
            bucket.recent_actors.truncate(self.preview_limit);
        }

        BucketSnapshot {
            count: bucket.count,
            actors: bucket.recent_actors.clone(),
        }
    }

    pub fn get(&self, key: &AggregationKey) -> Option<BucketSnapshot> {
        self.buckets.get(key).map(|bucket| BucketSnapshot {
            count: bucket.count,
            actors: bucket.recent_actors.clone(),
        })
    }

    /// 聚合通知落库后清空计数
    pub fn reset(&self, key: &AggregationKey) -> bool {
        let removed = self.buckets.remove(key).is_some();
        if removed {
            debug!("Reset aggregation bucket {}", key);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}
