//! Setlist fitting and the state around it

pub mod fitter;
pub mod session;
pub mod source;
pub mod track;

pub use fitter::Setlist;
pub use session::Session;
pub use source::{FileTrackSource, TrackSource};
pub use track::{TargetDuration, Track};
