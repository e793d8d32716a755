pub mod allocator;
pub mod config;
pub mod run;
