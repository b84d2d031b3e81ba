mod backend_api_fake;
mod identity_provider_fake;

pub use backend_api_fake::*;
pub use identity_provider_fake::*;
