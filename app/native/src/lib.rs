//! Paneltone - pick a legible panel style for any wallpaper.
//!
//! The [`analysis`] module is the core: it samples the strip of a wallpaper
//! that sits behind a panel and classifies it as `dark`, `light`,
//! `translucent-dark` or `translucent-light`. The [`session`] module wraps it
//! in a small state machine that reacts to wallpaper, settings and window
//! changes and hands the resulting style to a [`session::PanelHost`].
//!
//! ```no_run
//! let result = paneltone_lib::analysis::analyze("/usr/share/backgrounds/default.png", 0.575, 32);
//! println!("{}", result.style);
//! ```

pub mod analysis;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod platform;
pub mod schema;
pub mod session;
