//! Remote controller ingress over TCP

pub mod handler;
pub mod protocol;
pub mod server;

pub use server::CommandChannel;
