pub mod add;
pub mod common;
pub mod completions;
pub mod config;
pub mod delete;
pub mod edit;
pub mod export;
pub mod image_url;
pub mod images;
pub mod import;
pub mod list;
pub mod publish;
pub mod push;
pub mod token;
