pub mod annotation;
pub mod annotator;
pub mod completer;
pub mod config;
pub mod consts;
pub mod error;
pub mod pipeline;
pub mod prompts;
pub mod source;
pub mod spinner;
