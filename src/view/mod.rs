//! Per-component state objects for the browsing surface.
//!
//! The interactive pieces of the portal (quick-search dropdown, image
//! lightbox, document viewer) hold small amounts of mutable state with
//! clamping rules worth pinning down in one place. Nothing here touches the
//! network or the database; the HTTP layer ships the data, these types model
//! the interaction.

pub mod lightbox;
pub mod search;
pub mod viewer;
