pub mod init;
pub mod questions;
pub mod run;
pub mod validate;
