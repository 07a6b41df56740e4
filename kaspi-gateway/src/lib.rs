//! HTTP and gRPC gateway in front of the Kaspi Pay merchant API.

pub mod config;
pub mod dtos;
pub mod grpc;
pub mod handlers;
pub mod operations;
pub mod services;
pub mod startup;

pub use startup::{build_router, AppState, Application};
