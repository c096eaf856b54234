// Audio playback module
// Uses Symphonia for decoding and cpal for output

pub mod controller;
pub mod convert;
pub mod decoder;
pub mod engine;
pub mod native;
pub mod output;

pub use controller::{AudioController, AudioView};
pub use native::SymphoniaFactory;
