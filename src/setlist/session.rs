//! Working state for one generate/reshuffle cycle
//!
//! Holds the fetched tracks so a setlist can be reshuffled without going
//! back to the source.

use rand::Rng;
use tracing::debug;

use super::fitter::{self, Setlist};
use super::track::{TargetDuration, Track};
use crate::error::{Result, SetlistError};

pub struct Session {
    tracks: Vec<Track>,
    target: TargetDuration,
    current: Setlist,
}

impl Session {
    /// Start a session from fetched tracks
    ///
    /// An empty collection is reported as [`SetlistError::EmptyPlaylist`] so
    /// callers can tell it apart from a fetch failure.
    pub fn new(tracks: Vec<Track>, target: TargetDuration) -> Result<Self> {
        if tracks.is_empty() {
            return Err(SetlistError::EmptyPlaylist);
        }
        debug!("Session started with {} tracks, target {}", tracks.len(), target);
        Ok(Self {
            tracks,
            target,
            current: Setlist::default(),
        })
    }

    /// Fit a new setlist, replacing the current one
    pub fn generate<R: Rng + ?Sized>(&mut self, rng: &mut R) -> &Setlist {
        self.current = fitter::fit(&mut self.tracks, self.target, rng);
        &self.current
    }

    /// Shuffle the working tracks again and refit
    pub fn reshuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) -> &Setlist {
        fitter::shuffle(&mut self.tracks, rng);
        self.generate(rng)
    }

    /// Change the target used by later fits
    pub fn set_target(&mut self, target: TargetDuration) {
        self.target = target;
    }

    pub fn target(&self) -> TargetDuration {
        self.target
    }

    pub fn setlist(&self) -> &Setlist {
        &self.current
    }

    /// Working tracks in their current shuffled order
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }
}
