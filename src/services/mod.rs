// History viewer services
// Remote data access (HTTP and in-memory) and settings persistence.

pub mod http_data_service;
pub mod memory_data_service;
pub mod remote_data_service;
pub mod settings_engine;
