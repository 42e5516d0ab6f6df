pub mod import;
pub mod sources;
pub mod state;
