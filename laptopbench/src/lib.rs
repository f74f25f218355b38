pub mod common;
pub mod modules;
pub mod schemas;
