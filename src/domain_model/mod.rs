mod calendar;
mod day;
mod day_index;
mod group;
mod invite;
mod task;
mod task_cache;
mod user;
mod validation;

pub use calendar::*;
pub use day::*;
pub use day_index::*;
pub use group::*;
pub use invite::*;
pub use task::*;
pub use task_cache::*;
pub use user::*;
pub use validation::*;
