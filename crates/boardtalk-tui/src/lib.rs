pub mod app;
pub mod components;
pub mod discussion;
pub mod input;
pub mod mention;
pub mod sync;
