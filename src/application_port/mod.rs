mod group_calendar_service;
mod group_service;
mod invite_service;
mod session;
mod task_service;

pub use group_calendar_service::*;
pub use group_service::*;
pub use invite_service::*;
pub use session::*;
pub use task_service::*;
