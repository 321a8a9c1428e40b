pub mod handlers;
pub mod server;
pub mod signature;

pub use server::{build_router, start, AppState, ServerConfig, ServerHandle};
pub use signature::{sign, verify_signature, SIGNATURE_HEADER};
