pub mod app;
pub mod drag;
pub mod keybindings;
pub mod logging;
pub mod projection;
pub mod realm;
pub mod settings;
pub mod storage;
pub mod store;
pub mod theme;
pub mod types;
pub mod ui;
