pub mod archive;
pub mod cli;
pub mod config;
pub mod confirm;
pub mod enroll;
pub mod errors;
pub mod output;
pub mod present;
pub mod request;
pub mod store;
