mod group_calendar_service_impl;
mod group_service_impl;
mod invite_service_impl;
mod session_manager;
mod task_service_impl;

pub use group_calendar_service_impl::*;
pub use group_service_impl::*;
pub use invite_service_impl::*;
pub use session_manager::*;
pub use task_service_impl::*;
