pub mod actor_names;
pub mod links;

pub use actor_names::format_actor_names;
