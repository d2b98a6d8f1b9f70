pub mod api_utils;
pub mod config;
pub mod crud;
pub mod error;
pub mod http;
pub mod persist;
