pub mod builder;
pub mod handler;

pub use builder::{BoundServer, ServerBuilder};
pub use handler::{respond, RequestHandler, HEALTHZ_IETF_PATH, HEALTHZ_PATH};
