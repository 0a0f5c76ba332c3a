//! Region screenshots with rectangle and arrow markups.
//!
//! The pointer drags out a selection over a frozen capture of the screen.
//! Releasing the secondary button saves straight away; releasing the primary
//! button freezes the box so markups can be drawn, and Enter saves. The
//! crop goes to a timestamped PNG and to the clipboard.

pub mod app;
pub mod capture;
pub mod clipboard;
pub mod config;
pub mod error;
pub mod export;
pub mod geometry;
pub mod input;
pub mod interaction;
pub mod markup;
pub mod render;
