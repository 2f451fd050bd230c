pub mod ids;
pub mod time;

pub use ids::{validate_identifier_value, BuildId, ProjectId};
pub use time::now_secs;
