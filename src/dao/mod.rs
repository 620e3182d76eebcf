/// Key-value persistence backends.
pub mod kv;
/// Persisted record definitions.
pub mod models;
/// Storage abstraction layer shared by every backend.
pub mod storage;
