use crate::error::{AppError, Result};
use crate::models::Actor;

/// 名称分隔符（全角顿号）
pub const NAME_SEPARATOR: &str = "、";

/// 将发起人列表格式化为名称片段
///
/// `actors` 可以只是完整发起人集合的前几个，`total_count` 是真实总数。
/// 总数不超过 2 时直接列出名称，否则追加 ` 等{total_count}人`。
pub fn format_actor_names(actors: &[Actor], total_count: u64) -> Result<String> {
    if actors.is_empty() {
        return Err(AppError::validation("actor list must not be empty"));
    }

    if total_count < actors.len() as u64 {
        return Err(AppError::Validation(format!(
            "total count {} is smaller than the {} actors supplied",
            total_count,
            actors.len()
        )));
    }

    let joined = actors
        .iter()
        .map(Actor::display_label)
        .collect::<Vec<_>>()
        .join(NAME_SEPARATOR);

    if total_count <= 2 {
        Ok(joined)
    } else {
        Ok(format!("{} 等{}人", joined, total_count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn named(name: &str) -> Actor {
        Actor::new(name.to_lowercase(), format!("{}@example.com", name.to_lowercase()))
            .with_display_name(name)
    }

    #[test]
    fn test_single_actor() {
        assert_eq!(format_actor_names(&[named("Alice")], 1).unwrap(), "Alice");
    }

    #[test]
    fn test_two_actors() {
        let actors = [named("Alice"), named("Bob")];
        assert_eq!(format_actor_names(&actors, 2).unwrap(), "Alice、Bob");
    }

    #[test]
    fn test_truncated_list_uses_total_count() {
        let actors = [named("Alice"), named("Bob"), named("Charlie")];
        assert_eq!(
            format_actor_names(&actors, 150).unwrap(),
            "Alice、Bob、Charlie 等150人"
        );
        assert_eq!(
            format_actor_names(&actors, 3).unwrap(),
            "Alice、Bob、Charlie 等3人"
        );
        assert_eq!(
            format_actor_names(&actors[..1], 3).unwrap(),
            "Alice 等3人"
        );
    }

    #[test]
    fn test_falls_back_to_email() {
        let actors = [named("Alice"), Actor::new("u2", "bob@example.com")];
        assert_eq!(
            format_actor_names(&actors, 2).unwrap(),
            "Alice、bob@example.com"
        );
    }

    #[test]
    fn test_rejects_broken_preconditions() {
        assert!(matches!(
            format_actor_names(&[], 4),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            format_actor_names(&[named("Alice"), named("Bob")], 1),
            Err(AppError::Validation(_))
        ));
    }

    proptest! {
        #[test]
        fn prop_suffix_always_reports_total(total in 3u64..100_000) {
            let actors = [named("Alice"), named("Bob"), named("Charlie")];
            let formatted = format_actor_names(&actors, total).unwrap();
            prop_assert_eq!(formatted, format!("Alice、Bob、Charlie 等{}人", total));
        }
    }
}
