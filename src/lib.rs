pub mod ai;
pub mod app;
pub mod config;
pub mod conversation;
pub mod input;
pub mod markdown;
pub mod pipeline;
pub mod types;

#[cfg(feature = "dioxus")]
pub mod ui;
#[cfg(feature = "dioxus")]
pub mod views;
