pub mod api;
pub mod context;
pub mod events;
pub mod local_storage;
pub mod storage;
