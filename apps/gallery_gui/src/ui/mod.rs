//! UI layer for the gallery: app shell, picker widget and texture cache.

pub mod app;
pub mod picker_view;
pub mod textures;

pub use app::{GalleryApp, PersistedPrefs, PREFS_STORAGE_KEY};
