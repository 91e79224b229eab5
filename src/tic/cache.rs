//! # Last Value Cache
//!
//! Meters repeat every dataset in every frame, roughly once per second. Most
//! consumers only care when a value moves, so this cache remembers the last
//! value forwarded per tag and filters out repeats.

use crate::tic::dataset::Dataset;
use std::collections::HashMap;

/// Last forwarded value per tag.
#[derive(Debug, Clone, Default)]
pub struct LastValueCache {
    values: HashMap<String, String>,
}

impl LastValueCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if the tag is unseen or its value differs from the recorded one.
    pub fn has_changed(&self, dataset: &Dataset) -> bool {
        self.values
            .get(dataset.tag())
            .map_or(true, |last| last != dataset.data())
    }

    /// Records `dataset` as forwarded. Returns true if it was a change.
    pub fn record(&mut self, dataset: &Dataset) -> bool {
        if !self.has_changed(dataset) {
            return false;
        }
        self.values
            .insert(dataset.tag().to_owned(), dataset.data().to_owned());
        true
    }

    /// Calls `send` for changed datasets and records the value only once
    /// `send` succeeds, so a failed delivery is retried on the next frame.
    ///
    /// Returns `Ok(false)` when the dataset was a repeat and nothing was sent.
    pub fn forward_if_changed<E, F>(&mut self, dataset: &Dataset, send: F) -> Result<bool, E>
    where
        F: FnOnce(&Dataset) -> Result<(), E>,
    {
        if !self.has_changed(dataset) {
            return Ok(false);
        }
        send(dataset)?;
        self.record(dataset);
        Ok(true)
    }

    pub fn get(&self, tag: &str) -> Option<&str> {
        self.values.get(tag).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}
