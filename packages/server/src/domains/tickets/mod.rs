pub mod actions;
pub mod data;
pub mod effects;
pub mod emails;
pub mod machines;
pub mod models;
