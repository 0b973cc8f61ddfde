//! 站内链接路径
//!
//! 前端路由依赖这些路径格式，修改即为破坏性变更。

use urlencoding::encode;

/// `/novel/{id}/{slug}`
pub fn novel_path(novel_id: &str, novel_slug: &str) -> String {
    format!("/novel/{}/{}", encode(novel_id), encode(novel_slug))
}

/// `/novel/{id}/{slug}/chapter/{n}`
pub fn chapter_path(novel_id: &str, novel_slug: &str, chapter_number: u32) -> String {
    format!("{}/chapter/{}", novel_path(novel_id, novel_slug), chapter_number)
}

/// `/profile/{id}`
pub fn profile_path(user_id: &str) -> String {
    format!("/profile/{}", encode(user_id))
}

pub fn rating_anchor(rating_id: &str) -> String {
    format!("#rating-{}", encode(rating_id))
}

pub fn comment_anchor(comment_id: &str) -> String {
    format!("#comment-{}", encode(comment_id))
}
