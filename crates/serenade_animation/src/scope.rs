//! Animation scopes
//!
//! An [`AnimationScope`] owns every timeline a section creates and records
//! the original value of every property it writes. Reverting the scope puts
//! each touched property back (or clears it when it was never set) and drops
//! the timelines, so an unmounted section leaves no trace on the page.

use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};

use serenade_core::{ElementId, Property, StyleSink, Value};

use crate::timeline::{Sample, Timeline};

new_key_type! {
    /// Handle to a timeline owned by a scope
    pub struct TimelineId;
}

/// Owner of a section's timelines and the style snapshot to restore on revert
#[derive(Debug)]
pub struct AnimationScope {
    name: String,
    timelines: SlotMap<TimelineId, Timeline>,
    /// Insertion order; later timelines win on shared properties
    order: Vec<TimelineId>,
    /// Value each touched property had before the scope first wrote it
    snapshot: FxHashMap<(ElementId, Property), Option<Value>>,
    /// Last value written, to skip redundant writes
    written: FxHashMap<(ElementId, Property), Value>,
    reverted: bool,
}

impl AnimationScope {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            timelines: SlotMap::with_key(),
            order: Vec::new(),
            snapshot: FxHashMap::default(),
            written: FxHashMap::default(),
            reverted: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Take ownership of a timeline
    pub fn add(&mut self, timeline: Timeline) -> TimelineId {
        if self.reverted {
            tracing::debug!(scope = %self.name, "timeline added to a reverted scope is inert");
        }
        let id = self.timelines.insert(timeline);
        self.order.push(id);
        id
    }

    pub fn get(&self, id: TimelineId) -> Option<&Timeline> {
        self.timelines.get(id)
    }

    pub fn get_mut(&mut self, id: TimelineId) -> Option<&mut Timeline> {
        self.timelines.get_mut(id)
    }

    /// Number of timelines owned by this scope
    pub fn len(&self) -> usize {
        self.timelines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timelines.is_empty()
    }

    /// Number of distinct (element, property) pairs written so far
    pub fn touched_count(&self) -> usize {
        self.snapshot.len()
    }

    pub fn is_reverted(&self) -> bool {
        self.reverted
    }

    /// Start an autonomous timeline
    pub fn play(&mut self, id: TimelineId) {
        if self.reverted {
            return;
        }
        if let Some(timeline) = self.timelines.get_mut(id) {
            timeline.play();
        }
    }

    /// Position a scrubbed timeline and write the resulting values
    pub fn set_progress<S>(&mut self, id: TimelineId, progress: f32, sink: &mut S)
    where
        S: StyleSink + ?Sized,
    {
        if self.reverted {
            return;
        }
        let samples = match self.timelines.get_mut(id) {
            Some(timeline) => {
                timeline.set_progress(progress);
                timeline.sample()
            }
            None => return,
        };
        self.write_samples(&samples, sink);
    }

    /// Write the current values of one timeline without moving it
    pub fn apply<S>(&mut self, id: TimelineId, sink: &mut S)
    where
        S: StyleSink + ?Sized,
    {
        if self.reverted {
            return;
        }
        if let Some(samples) = self.timelines.get(id).map(Timeline::sample) {
            self.write_samples(&samples, sink);
        }
    }

    /// Advance every playing timeline by `delta_ms` and write its values
    ///
    /// Returns true while any timeline still needs ticks.
    pub fn tick<S>(&mut self, delta_ms: f32, sink: &mut S) -> bool
    where
        S: StyleSink + ?Sized,
    {
        if self.reverted {
            return false;
        }

        let mut active = false;
        for index in 0..self.order.len() {
            let id = self.order[index];
            let Some(timeline) = self.timelines.get_mut(id) else {
                continue;
            };
            if !timeline.is_playing() {
                continue;
            }
            active |= timeline.tick(delta_ms);
            let samples = timeline.sample();
            self.write_samples(&samples, sink);
        }
        active
    }

    /// Write a single property value directly
    pub fn set<S>(&mut self, target: ElementId, property: Property, value: Value, sink: &mut S)
    where
        S: StyleSink + ?Sized,
    {
        if self.reverted {
            return;
        }
        self.write(target, property, value, sink);
    }

    fn write_samples<S>(&mut self, samples: &[Sample], sink: &mut S)
    where
        S: StyleSink + ?Sized,
    {
        for sample in samples {
            self.write(sample.target, sample.property, sample.value, sink);
        }
    }

    fn write<S>(&mut self, target: ElementId, property: Property, value: Value, sink: &mut S)
    where
        S: StyleSink + ?Sized,
    {
        let key = (target, property);
        self.snapshot
            .entry(key)
            .or_insert_with(|| sink.read(target, property));

        if self.written.get(&key) == Some(&value) {
            return;
        }
        self.written.insert(key, value);
        sink.write(target, property, value);
    }

    /// Restore every touched property and drop all timelines
    ///
    /// Returns false if the scope was already reverted; a second call has no
    /// effect.
    pub fn revert<S>(&mut self, sink: &mut S) -> bool
    where
        S: StyleSink + ?Sized,
    {
        if self.reverted {
            return false;
        }
        self.reverted = true;

        let restored = self.snapshot.len();
        for ((target, property), original) in self.snapshot.drain() {
            match original {
                Some(value) => sink.write(target, property, value),
                None => sink.clear(target, property),
            }
        }
        self.written.clear();
        self.timelines.clear();
        self.order.clear();

        tracing::debug!(scope = %self.name, restored, "animation scope reverted");
        true
    }
}
