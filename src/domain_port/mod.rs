mod backend_api;
mod identity_provider;

pub use backend_api::*;
pub use identity_provider::*;
