//! Before/after post composer.
//!
//! [`ops::compose::Renderer`] lays out and draws the composite; the other
//! modules feed it (`session`, `io`, `profile`, `improve`) or drive it (`cli`).

pub mod logger;

pub mod cli;
pub mod improve;
pub mod io;
pub mod ops;
pub mod profile;
pub mod session;

pub use ops::compose::{ContactEntry, ImageSlot, RenderError, RenderInput, Renderer};
pub use ops::layout::{CompositeLayout, RenderStyle};
pub use ops::text::{FixedAdvanceFace, GlyphFace, TextStyle, Typeface, Weight};
pub use session::Session;
