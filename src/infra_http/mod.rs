mod backend_api_http;
mod identity_provider_firebase;

pub use backend_api_http::*;
pub use identity_provider_firebase::*;
