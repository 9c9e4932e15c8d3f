pub mod auth;
pub mod hello;
pub mod helpers;
pub mod middleware;
pub mod system;
