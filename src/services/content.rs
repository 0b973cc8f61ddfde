//! 通知内容生成：根据通知类型和数据渲染标题、正文和链接
//!
//! 模板固定为中文。发起人名称片段由调用方预先格式化（见
//! [`crate::utils::format_actor_names`]），这里只做插值。

use crate::{
    models::{NotificationPayload, RenderedNotification},
    utils::links,
};

const STAR: &str = "⭐";
const MAX_STARS: u32 = 5;

pub fn create_title(payload: &NotificationPayload) -> String {
    match payload {
        NotificationPayload::RatingLike { actor_name } => format!("{} 赞了你的评分", actor_name),
        NotificationPayload::CommentLike { actor_name } => format!("{} 赞了你的评论", actor_name),
        NotificationPayload::RatingReply { actor_name, .. } => {
            format!("{} 回复了你的评分", actor_name)
        }
        NotificationPayload::CommentReply { actor_name, .. } => {
            format!("{} 回复了你的评论", actor_name)
        }
        NotificationPayload::NewFollower { actor_name, .. } => format!("{} 关注了你", actor_name),
        NotificationPayload::AuthorNewNovel {
            actor_name,
            novel_title,
            ..
        } => format!("{} 发布了新作品《{}》", actor_name, novel_title),
        NotificationPayload::AuthorNewChapter {
            actor_name,
            novel_title,
            ..
        } => format!("{} 更新了《{}》", actor_name, novel_title),
        NotificationPayload::NovelUpdate { novel_title } => format!("《{}》更新了", novel_title),
        NotificationPayload::NovelRating {
            actor_name,
            novel_title,
            ..
        } => format!("{} 评价了《{}》", actor_name, novel_title),
        NotificationPayload::NovelComment {
            actor_name,
            novel_title,
        } => format!("{} 评论了《{}》", actor_name, novel_title),
        NotificationPayload::LevelUp { level } => match level {
            Some(level) => format!("恭喜你升级到 Lv.{}", level),
            None => "恭喜你升级了".to_string(),
        },
        NotificationPayload::SystemAnnouncement { custom_title, .. } => {
            custom_title.clone().unwrap_or_default()
        }
    }
}

pub fn create_content(payload: &NotificationPayload) -> Option<String> {
    match payload {
        NotificationPayload::RatingReply { reply_content, .. } => non_empty(reply_content),
        NotificationPayload::AuthorNewChapter { chapter_title, .. } => non_empty(chapter_title),
        NotificationPayload::NovelRating { score, .. } => score.map(star_rating),
        NotificationPayload::RatingLike { .. }
        | NotificationPayload::CommentLike { .. }
        | NotificationPayload::CommentReply { .. }
        | NotificationPayload::NewFollower { .. }
        | NotificationPayload::AuthorNewNovel { .. }
        | NotificationPayload::NovelUpdate { .. }
        | NotificationPayload::NovelComment { .. }
        | NotificationPayload::LevelUp { .. }
        | NotificationPayload::SystemAnnouncement { .. } => None,
    }
}

pub fn create_link(payload: &NotificationPayload) -> Option<String> {
    match payload {
        NotificationPayload::RatingReply {
            novel_id,
            novel_slug,
            rating_id,
            ..
        } => {
            let novel = links::novel_path(segment(novel_id)?, segment(novel_slug)?);
            Some(format!("{}{}", novel, links::rating_anchor(segment(rating_id)?)))
        }
        NotificationPayload::CommentReply {
            novel_id,
            novel_slug,
            chapter_number,
            comment_id,
            ..
        } => {
            let chapter =
                links::chapter_path(segment(novel_id)?, segment(novel_slug)?, (*chapter_number)?);
            Some(format!("{}{}", chapter, links::comment_anchor(segment(comment_id)?)))
        }
        NotificationPayload::NewFollower { actor_id, .. } => {
            segment(actor_id).map(links::profile_path)
        }
        NotificationPayload::AuthorNewNovel {
            novel_id,
            novel_slug,
            ..
        } => Some(links::novel_path(segment(novel_id)?, segment(novel_slug)?)),
        NotificationPayload::AuthorNewChapter {
            novel_id,
            novel_slug,
            chapter_number,
            ..
        } => Some(links::chapter_path(
            segment(novel_id)?,
            segment(novel_slug)?,
            (*chapter_number)?,
        )),
        NotificationPayload::SystemAnnouncement { custom_link, .. } => non_empty(custom_link),
        NotificationPayload::RatingLike { .. }
        | NotificationPayload::CommentLike { .. }
        | NotificationPayload::NovelUpdate { .. }
        | NotificationPayload::NovelRating { .. }
        | NotificationPayload::NovelComment { .. }
        | NotificationPayload::LevelUp { .. } => None,
    }
}

/// 一次性渲染标题、正文和链接
pub fn render(payload: &NotificationPayload) -> RenderedNotification {
    RenderedNotification {
        title: create_title(payload),
        content: create_content(payload),
        link: create_link(payload),
    }
}

/// 10 分制评分转换为 0-5 颗星
pub fn star_rating(score: f64) -> String {
    let stars = (score / 2.0).round();
    let count = if stars.is_nan() || stars <= 0.0 {
        0
    } else {
        (stars as u32).min(MAX_STARS)
    };
    STAR.repeat(count as usize)
}

fn non_empty(value: &Option<String>) -> Option<String> {
    segment(value).map(str::to_string)
}

/// 路径片段，空字符串视为缺失
fn segment(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
