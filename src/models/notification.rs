use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AppError;
use crate::models::Actor;

/// 通知类型（封闭集合）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    RatingLike,
    CommentLike,
    RatingReply,
    CommentReply,
    NewFollower,
    AuthorNewNovel,
    AuthorNewChapter,
    NovelUpdate,
    NovelRating,
    NovelComment,
    LevelUp,
    SystemAnnouncement,
}

impl NotificationType {
    pub const ALL: [NotificationType; 12] = [
        NotificationType::RatingLike,
        NotificationType::CommentLike,
        NotificationType::RatingReply,
        NotificationType::CommentReply,
        NotificationType::NewFollower,
        NotificationType::AuthorNewNovel,
        NotificationType::AuthorNewChapter,
        NotificationType::NovelUpdate,
        NotificationType::NovelRating,
        NotificationType::NovelComment,
        NotificationType::LevelUp,
        NotificationType::SystemAnnouncement,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::RatingLike => "RATING_LIKE",
            NotificationType::CommentLike => "COMMENT_LIKE",
            NotificationType::RatingReply => "RATING_REPLY",
            NotificationType::CommentReply => "COMMENT_REPLY",
            NotificationType::NewFollower => "NEW_FOLLOWER",
            NotificationType::AuthorNewNovel => "AUTHOR_NEW_NOVEL",
            NotificationType::AuthorNewChapter => "AUTHOR_NEW_CHAPTER",
            NotificationType::NovelUpdate => "NOVEL_UPDATE",
            NotificationType::NovelRating => "NOVEL_RATING",
            NotificationType::NovelComment => "NOVEL_COMMENT",
            NotificationType::LevelUp => "LEVEL_UP",
            NotificationType::SystemAnnouncement => "SYSTEM_ANNOUNCEMENT",
        }
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NotificationType::ALL
            .into_iter()
            .find(|variant| variant.as_str() == s)
            .ok_or_else(|| AppError::Parse(format!("Unknown notification type: {}", s)))
    }
}

/// 各通知类型模板所需的数据
///
/// 与当前类型无关的字段在反序列化时被忽略。缺失的可选字段会让对应的
/// 输出片段为空，而不是报错。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum NotificationPayload {
    RatingLike {
        #[serde(default)]
        actor_name: String,
    },
    CommentLike {
        #[serde(default)]
        actor_name: String,
    },
    RatingReply {
        #[serde(default)]
        actor_name: String,
        novel_id: Option<String>,
        novel_slug: Option<String>,
        rating_id: Option<String>,
        reply_content: Option<String>,
    },
    CommentReply {
        #[serde(default)]
        actor_name: String,
        novel_id: Option<String>,
        novel_slug: Option<String>,
        chapter_number: Option<u32>,
        comment_id: Option<String>,
    },
    NewFollower {
        #[serde(default)]
        actor_name: String,
        actor_id: Option<String>,
    },
    AuthorNewNovel {
        #[serde(default)]
        actor_name: String,
        #[serde(default)]
        novel_title: String,
        novel_id: Option<String>,
        novel_slug: Option<String>,
    },
    AuthorNewChapter {
        #[serde(default)]
        actor_name: String,
        #[serde(default)]
        novel_title: String,
        novel_id: Option<String>,
        novel_slug: Option<String>,
        chapter_number: Option<u32>,
        chapter_title: Option<String>,
    },
    NovelUpdate {
        #[serde(default)]
        novel_title: String,
    },
    NovelRating {
        #[serde(default)]
        actor_name: String,
        #[serde(default)]
        novel_title: String,
        score: Option<f64>,
    },
    NovelComment {
        #[serde(default)]
        actor_name: String,
        #[serde(default)]
        novel_title: String,
    },
    LevelUp {
        level: Option<u32>,
    },
    SystemAnnouncement {
        custom_title: Option<String>,
        custom_link: Option<String>,
    },
}

impl NotificationPayload {
    pub fn notification_type(&self) -> NotificationType {
        match self {
            NotificationPayload::RatingLike { .. } => NotificationType::RatingLike,
            NotificationPayload::CommentLike { .. } => NotificationType::CommentLike,
            NotificationPayload::RatingReply { .. } => NotificationType::RatingReply,
            NotificationPayload::CommentReply { .. } => NotificationType::CommentReply,
            NotificationPayload::NewFollower { .. } => NotificationType::NewFollower,
            NotificationPayload::AuthorNewNovel { .. } => NotificationType::AuthorNewNovel,
            NotificationPayload::AuthorNewChapter { .. } => NotificationType::AuthorNewChapter,
            NotificationPayload::NovelUpdate { .. } => NotificationType::NovelUpdate,
            NotificationPayload::NovelRating { .. } => NotificationType::NovelRating,
            NotificationPayload::NovelComment { .. } => NotificationType::NovelComment,
            NotificationPayload::LevelUp { .. } => NotificationType::LevelUp,
            NotificationPayload::SystemAnnouncement { .. } => {
                NotificationType::SystemAnnouncement
            }
        }
    }

    /// 替换发起人名称片段；没有发起人子句的类型原样返回
    pub fn with_actor_name(mut self, name: impl Into<String>) -> Self {
        match &mut self {
            NotificationPayload::RatingLike { actor_name }
            | NotificationPayload::CommentLike { actor_name }
            | NotificationPayload::RatingReply { actor_name, .. }
            | NotificationPayload::CommentReply { actor_name, .. }
            | NotificationPayload::NewFollower { actor_name, .. }
            | NotificationPayload::AuthorNewNovel { actor_name, .. }
            | NotificationPayload::AuthorNewChapter { actor_name, .. }
            | NotificationPayload::NovelRating { actor_name, .. }
            | NotificationPayload::NovelComment { actor_name, .. } => {
                *actor_name = name.into();
            }
            NotificationPayload::NovelUpdate { .. }
            | NotificationPayload::LevelUp { .. }
            | NotificationPayload::SystemAnnouncement { .. } => {}
        }
        self
    }

    /// 关注通知缺少关注者 ID 时补上，用于生成个人主页链接
    pub fn with_default_actor_id(mut self, id: &str) -> Self {
        if let NotificationPayload::NewFollower { actor_id, .. } = &mut self {
            if actor_id.as_deref().map_or(true, str::is_empty) {
                *actor_id = Some(id.to_string());
            }
        }
        self
    }
}

/// 聚合键推导所需的实体 ID，由上游内容服务解析
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationContext {
    pub rating_id: Option<String>,
    pub comment_id: Option<String>,
    pub novel_id: Option<String>,
    pub novel_slug: Option<String>,
    pub chapter_id: Option<String>,
    pub chapter_number: Option<u32>,
    pub actor_id: Option<String>,
}

impl AggregationContext {
    pub fn with_rating_id(mut self, rating_id: impl Into<String>) -> Self {
        self.rating_id = Some(rating_id.into());
        self
    }

    pub fn with_comment_id(mut self, comment_id: impl Into<String>) -> Self {
        self.comment_id = Some(comment_id.into());
        self
    }

    pub fn with_actor_id(mut self, actor_id: impl Into<String>) -> Self {
        self.actor_id = Some(actor_id.into());
        self
    }

    /// 非空的评分 ID
    pub fn rating(&self) -> Option<&str> {
        non_empty(&self.rating_id)
    }

    /// 非空的评论 ID
    pub fn comment(&self) -> Option<&str> {
        non_empty(&self.comment_id)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// 渲染结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedNotification {
    pub title: String,
    pub content: Option<String>,
    pub link: Option<String>,
}

/// 交给持久化层保存的通知记录
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub recipient_id: String,
    pub notification_type: NotificationType,
    pub title: String,
    pub content: Option<String>,
    pub link: Option<String>,
    pub aggregation_key: Option<String>,
    pub actor_count: u64,
    pub created_at: DateTime<Utc>,
}

/// 事件管道的输入
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationEvent {
    pub recipient_user_id: String,
    pub actor: Option<Actor>,
    #[serde(default)]
    pub context: AggregationContext,
    pub payload: NotificationPayload,
}

/// 事件处理结果
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "delivery", rename_all = "snake_case")]
pub enum Delivery {
    /// 单条通知，直接新建
    Individual { notification: Notification },
    /// 刚越过阈值，新建一条聚合通知
    Aggregated { notification: Notification, count: u64 },
    /// 已经聚合过，更新现有聚合通知
    Merged { notification: Notification, count: u64 },
}

impl Delivery {
    pub fn notification(&self) -> &Notification {
        match self {
            Delivery::Individual { notification }
            | Delivery::Aggregated { notification, .. }
            | Delivery::Merged { notification, .. } => notification,
        }
    }

    pub fn is_aggregated(&self) -> bool {
        !matches!(self, Delivery::Individual { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_type_tag_round_trip() {
        for variant in NotificationType::ALL {
            assert_eq!(variant.as_str().parse::<NotificationType>().unwrap(), variant);
            assert_eq!(
                serde_json::to_value(variant).unwrap(),
                json!(variant.as_str())
            );
        }
        assert!("FRIEND_REQUEST".parse::<NotificationType>().is_err());
    }

    #[test]
    fn test_payload_ignores_irrelevant_fields() {
        let payload: NotificationPayload = serde_json::from_value(json!({
            "type": "NOVEL_UPDATE",
            "novelTitle": "Moonfall",
            "actorName": "ignored",
            "score": 9
        }))
        .unwrap();

        assert_eq!(
            payload,
            NotificationPayload::NovelUpdate {
                novel_title: "Moonfall".to_string()
            }
        );
    }

    #[test]
    fn test_payload_missing_fields_default() {
        let payload: NotificationPayload =
            serde_json::from_value(json!({ "type": "SYSTEM_ANNOUNCEMENT" })).unwrap();

        assert_eq!(
            payload,
            NotificationPayload::SystemAnnouncement {
                custom_title: None,
                custom_link: None
            }
        );
        assert_eq!(payload.notification_type(), NotificationType::SystemAnnouncement);
    }

    #[test]
    fn test_with_actor_name() {
        let payload = NotificationPayload::RatingLike {
            actor_name: String::new(),
        }
        .with_actor_name("Alice、Bob");
        assert_eq!(
            payload,
            NotificationPayload::RatingLike {
                actor_name: "Alice、Bob".to_string()
            }
        );

        let level = NotificationPayload::LevelUp { level: Some(4) };
        assert_eq!(level.clone().with_actor_name("Alice"), level);
    }

    #[test]
    fn test_context_treats_empty_ids_as_missing() {
        let context: AggregationContext =
            serde_json::from_value(json!({ "ratingId": "", "commentId": "c1" })).unwrap();
        assert_eq!(context.rating(), None);
        assert_eq!(context.comment(), Some("c1"));
    }
}
