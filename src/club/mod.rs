pub mod dates;
pub mod goals;
pub mod stats;
pub mod validate;

pub use goals::milestone_progress;
pub use stats::member_ranks;
pub use validate::ValidationError;
