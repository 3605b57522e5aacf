//! Controller layer: UI events, reducer-like state transitions, and command orchestration.

pub mod carousel;
pub mod events;
pub mod orchestration;
pub mod picker;
pub mod reducer;
