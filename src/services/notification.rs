use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    config::Config,
    error::{AppError, Result},
    models::{Delivery, Notification, NotificationEvent, NotificationPayload},
    services::{
        aggregation::{AggregationKey, AggregationPolicy},
        content,
        counter::{AggregationCounter, BucketSnapshot},
    },
    utils::format_actor_names,
};

/// 通知管道：推导聚合键、计数、判断是否聚合，然后渲染通知
#[derive(Debug, Clone)]
pub struct NotificationService {
    policy: AggregationPolicy,
    counter: AggregationCounter,
}

impl NotificationService {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            policy: config.aggregation_policy()?,
            counter: AggregationCounter::new(config.actor_preview_limit),
        })
    }

    pub fn counter(&self) -> &AggregationCounter {
        &self.counter
    }

    pub fn ingest(&self, event: NotificationEvent) -> Result<Delivery> {
        let variant = event.payload.notification_type();
        debug!(
            "Ingesting {} notification for {}",
            variant, event.recipient_user_id
        );

        let key = match self
            .policy
            .aggregation_key(variant, &event.recipient_user_id, &event.context)
        {
            Some(key) => key,
            None => {
                let notification = self.render_individual(event, None)?;
                return Ok(Delivery::Individual { notification });
            }
        };

        let snapshot = self.counter.record(&key, event.actor.as_ref());
        // 没有任何发起人时无法列出名称，按单条通知处理
        if snapshot.actors.is_empty() || !self.policy.should_aggregate(variant, snapshot.count) {
            let notification = self.render_individual(event, Some(key))?;
            return Ok(Delivery::Individual { notification });
        }

        let count = snapshot.count;
        let crossed = self
            .policy
            .threshold(variant)
            .map_or(false, |threshold| count == threshold + 1);
        let notification = self.render_aggregated(event, key, snapshot)?;

        if crossed {
            info!(
                "Aggregating {} notifications under {}",
                count,
                notification.aggregation_key.as_deref().unwrap_or_default()
            );
            Ok(Delivery::Aggregated {
                notification,
                count,
            })
        } else {
            Ok(Delivery::Merged {
                notification,
                count,
            })
        }
    }

    fn render_individual(
        &self,
        event: NotificationEvent,
        key: Option<AggregationKey>,
    ) -> Result<Notification> {
        let payload = match &event.actor {
            Some(actor) => {
                let name = format_actor_names(std::slice::from_ref(actor), 1)?;
                event
                    .payload
                    .with_actor_name(name)
                    .with_default_actor_id(&actor.id)
            }
            None => event.payload,
        };

        Ok(build_notification(event.recipient_user_id, &payload, key, 1))
    }

    fn render_aggregated(
        &self,
        event: NotificationEvent,
        key: AggregationKey,
        snapshot: BucketSnapshot,
    ) -> Result<Notification> {
        let latest = snapshot
            .actors
            .first()
            .ok_or_else(|| AppError::internal("aggregation bucket has no actors"))?;
        let name = format_actor_names(&snapshot.actors, snapshot.count)?;
        let payload = event
            .payload
            .with_actor_name(name)
            .with_default_actor_id(&latest.id);

        Ok(build_notification(
            event.recipient_user_id,
            &payload,
            Some(key),
            snapshot.count,
        ))
    }
}

fn build_notification(
    recipient_id: String,
    payload: &NotificationPayload,
    key: Option<AggregationKey>,
    actor_count: u64,
) -> Notification {
    let rendered = content::render(payload);

    Notification {
        id: Uuid::new_v4().to_string(),
        recipient_id,
        notification_type: payload.notification_type(),
        title: rendered.title,
        content: rendered.content,
        link: rendered.link,
        aggregation_key: key.map(AggregationKey::into_string),
        actor_count,
        created_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Actor, AggregationContext, NotificationType};

    fn service() -> NotificationService {
        NotificationService::new(&Config::default()).unwrap()
    }

    fn like_event(liker: &str) -> NotificationEvent {
        NotificationEvent {
            recipient_user_id: "author1".to_string(),
            actor: Some(Actor::new(liker, format!("{}@example.com", liker)).with_display_name(liker)),
            context: AggregationContext::default().with_rating_id("r1"),
            payload: NotificationPayload::RatingLike {
                actor_name: String::new(),
            },
        }
    }

    #[test]
    fn test_likes_aggregate_after_threshold() {
        let service = service();

        for liker in ["A", "B", "C", "D", "E"] {
            let delivery = service.ingest(like_event(liker)).unwrap();
            assert!(!delivery.is_aggregated());
            assert_eq!(delivery.notification().title, format!("{} 赞了你的评分", liker));
        }

        let delivery = service.ingest(like_event("F")).unwrap();
        match &delivery {
            Delivery::Aggregated { notification, count } => {
                assert_eq!(*count, 6);
                assert_eq!(notification.title, "F、E、D 等6人 赞了你的评分");
                assert_eq!(
                    notification.aggregation_key.as_deref(),
                    Some("RATING_LIKE:author1:r1")
                );
            }
            other => panic!("expected aggregated delivery, got {:?}", other),
        }

        let delivery = service.ingest(like_event("G")).unwrap();
        assert!(matches!(delivery, Delivery::Merged { count: 7, .. }));
    }

    #[test]
    fn test_non_aggregatable_always_individual() {
        let service = service();

        for _ in 0..20 {
            let event = NotificationEvent {
                recipient_user_id: "reader1".to_string(),
                actor: None,
                context: AggregationContext::default(),
                payload: NotificationPayload::NovelUpdate {
                    novel_title: "Moonfall".to_string(),
                },
            };
            let delivery = service.ingest(event).unwrap();
            assert!(!delivery.is_aggregated());
            assert_eq!(delivery.notification().title, "《Moonfall》更新了");
            assert_eq!(delivery.notification().aggregation_key, None);
        }
        assert!(service.counter().is_empty());
    }

    #[test]
    fn test_actorless_events_stay_individual() {
        let service = service();

        for _ in 0..8 {
            let event = NotificationEvent {
                recipient_user_id: "author1".to_string(),
                actor: None,
                context: AggregationContext::default().with_rating_id("r"),
                payload: NotificationPayload::RatingLike {
                    actor_name: "某位读者".to_string(),
                },
            };
            let delivery = service.ingest(event).unwrap();
            assert!(!delivery.is_aggregated());
            assert_eq!(delivery.notification().title, "某位读者 赞了你的评分");
            assert_eq!(delivery.notification().actor_count, 1);
        }
    }

    #[test]
    fn test_follower_link_filled_from_actor() {
        let service = service();
        let event = NotificationEvent {
            recipient_user_id: "author1".to_string(),
            actor: Some(Actor::new("u77", "reader@example.com")),
            context: AggregationContext::default(),
            payload: NotificationPayload::NewFollower {
                actor_name: String::new(),
                actor_id: None,
            },
        };

        let delivery = service.ingest(event).unwrap();
        let notification = delivery.notification();
        assert_eq!(notification.notification_type, NotificationType::NewFollower);
        assert_eq!(notification.title, "reader@example.com 关注了你");
        assert_eq!(notification.link.as_deref(), Some("/profile/u77"));
    }
}
