//! Tool server - JSON-RPC protocol, tool catalogue and transports

pub mod handlers;
pub mod http;
pub mod protocol;
#[allow(clippy::module_inception)]
pub mod server;
pub mod tools;

pub use http::{bind_http, run_http};
pub use server::{bind_socket, run_socket, run_stdio, serve};
