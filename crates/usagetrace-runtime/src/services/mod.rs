pub mod file_state;
pub mod import;
pub mod summary;
