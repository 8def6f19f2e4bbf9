// Adapters layer: concrete implementations for external systems (analytics API, storage).

pub mod http;
pub mod storage;
