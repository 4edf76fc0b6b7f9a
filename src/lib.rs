pub mod cmd;
pub mod domain;
pub mod export;
pub mod format;
pub mod source;
