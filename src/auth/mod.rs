pub mod identity;
pub mod middleware;
pub mod session;
pub mod webhook;
