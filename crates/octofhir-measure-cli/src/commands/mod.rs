pub mod measure;
pub mod server;
