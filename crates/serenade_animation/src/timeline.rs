//! Timeline engine
//!
//! A timeline is an explicit, ordered list of [`Segment`]s. Each segment
//! animates one target from one property set to another over a [`Span`], and
//! carries a [`Position`] tag saying where it starts relative to the segment
//! before it. Placement is resolved once, when the segment is appended, so a
//! built timeline holds no implicit builder state.
//!
//! Timelines run in one of two modes:
//!
//! - **Autonomous**: an internal clock advanced by [`Timeline::tick`], with
//!   optional delay, repeat and yoyo.
//! - **Scrubbed**: no clock. [`Timeline::set_progress`] maps `p ∈ [0, 1]` onto
//!   the combined span; sampling is a pure function of `p`.
//!
//! # Example
//!
//! ```ignore
//! let mut tl = Timeline::scrubbed();
//! tl.to(content, from_left, rest, Span::new(1.0))?
//!   .to(media, from_right, rest, Span::new(1.0).at(Position::WithPrevious))?;
//! tl.set_progress(0.5);
//! for sample in tl.sample() { /* write sample.value */ }
//! ```

use std::str::FromStr;

use serenade_core::{ElementId, Property, Result, SerenadeError, Value};

use crate::easing::Easing;
use crate::values::{Interpolate, PropertySet};

/// Where a segment starts, relative to the previously appended segment
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Position {
    /// Right after the previous segment ends
    #[default]
    Sequential,
    /// Together with the previous segment (`"<"`)
    WithPrevious,
    /// Offset from the previous segment's end in seconds (`"+=0.5"`, `"-=1.5"`)
    Offset(f32),
    /// At an absolute time in seconds
    Absolute(f32),
}

impl FromStr for Position {
    type Err = SerenadeError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let parse = |n: &str| {
            n.trim()
                .parse::<f32>()
                .map_err(|_| SerenadeError::InvalidTimeline(format!("bad position `{s}`")))
        };

        if s.is_empty() {
            Ok(Position::Sequential)
        } else if s == "<" {
            Ok(Position::WithPrevious)
        } else if let Some(rest) = s.strip_prefix("+=") {
            Ok(Position::Offset(parse(rest)?))
        } else if let Some(rest) = s.strip_prefix("-=") {
            Ok(Position::Offset(-parse(rest)?))
        } else {
            Ok(Position::Absolute(parse(s)?))
        }
    }
}

/// Duration, easing and placement of a segment
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Span {
    /// Duration in seconds
    pub duration: f32,
    pub easing: Easing,
    /// Extra delay in seconds added to the resolved start
    pub delay: f32,
    pub position: Position,
}

impl Span {
    pub fn new(duration: f32) -> Self {
        Self {
            duration,
            easing: Easing::Linear,
            delay: 0.0,
            position: Position::Sequential,
        }
    }

    pub fn ease(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn delay(mut self, delay: f32) -> Self {
        self.delay = delay;
        self
    }

    pub fn at(mut self, position: Position) -> Self {
        self.position = position;
        self
    }
}

/// One property interpolation over a span
#[derive(Clone, Debug, PartialEq)]
pub struct Segment {
    pub target: ElementId,
    pub from: PropertySet,
    pub to: PropertySet,
    pub span: Span,
}

impl Segment {
    pub fn new(target: ElementId, from: PropertySet, to: PropertySet, span: Span) -> Self {
        Self {
            target,
            from,
            to,
            span,
        }
    }
}

/// How many times an autonomous timeline plays
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Repeat {
    /// Extra plays after the first (`Count(0)` plays once)
    Count(u32),
    Infinite,
}

/// Playback settings of an autonomous timeline
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Playback {
    pub repeat: Repeat,
    /// Alternate direction on every repeat
    pub yoyo: bool,
    /// Seconds before the first cycle starts
    pub delay: f32,
}

impl Playback {
    pub fn once() -> Self {
        Self {
            repeat: Repeat::Count(0),
            yoyo: false,
            delay: 0.0,
        }
    }

    /// Loop forever, reversing direction every cycle
    pub fn yoyo_forever() -> Self {
        Self {
            repeat: Repeat::Infinite,
            yoyo: true,
            delay: 0.0,
        }
    }

    pub fn with_delay(mut self, delay: f32) -> Self {
        self.delay = delay;
        self
    }
}

impl Default for Playback {
    fn default() -> Self {
        Self::once()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TimelineMode {
    Autonomous(Playback),
    Scrubbed,
}

/// A computed property value for one target
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample {
    pub target: ElementId,
    pub property: Property,
    pub value: Value,
}

#[derive(Clone, Debug)]
struct Placed {
    segment: Segment,
    start: f32,
}

impl Placed {
    fn end(&self) -> f32 {
        self.start + self.segment.span.duration
    }
}

/// All segments touching one (target, property) pair, sorted by start
#[derive(Clone, Debug)]
struct Track {
    target: ElementId,
    property: Property,
    segments: Vec<usize>,
}

/// A sequenced set of property interpolations
#[derive(Clone, Debug)]
pub struct Timeline {
    mode: TimelineMode,
    segments: Vec<Placed>,
    tracks: Vec<Track>,
    duration: f32,
    /// Current position inside one cycle, in seconds
    time: f32,
    /// Seconds of clock time consumed (autonomous only, includes delay)
    elapsed: f32,
    playing: bool,
    complete: bool,
}

impl Timeline {
    pub fn new(mode: TimelineMode) -> Self {
        Self {
            mode,
            segments: Vec::new(),
            tracks: Vec::new(),
            duration: 0.0,
            time: 0.0,
            elapsed: 0.0,
            playing: false,
            complete: false,
        }
    }

    pub fn autonomous(playback: Playback) -> Self {
        Self::new(TimelineMode::Autonomous(playback))
    }

    pub fn scrubbed() -> Self {
        Self::new(TimelineMode::Scrubbed)
    }

    /// Build a timeline from an explicit segment list
    pub fn from_segments(mode: TimelineMode, segments: Vec<Segment>) -> Result<Self> {
        let mut timeline = Self::new(mode);
        for segment in segments {
            timeline.push(segment)?;
        }
        Ok(timeline)
    }

    /// Append a segment animating `target` from `from` to `to`
    pub fn to(
        &mut self,
        target: ElementId,
        from: PropertySet,
        to: PropertySet,
        span: Span,
    ) -> Result<&mut Self> {
        self.push(Segment::new(target, from, to, span))?;
        Ok(self)
    }

    /// Append a segment, resolving its start from the previous one
    pub fn push(&mut self, segment: Segment) -> Result<()> {
        let span = segment.span;
        if !span.duration.is_finite() || span.duration < 0.0 {
            return Err(SerenadeError::InvalidTimeline(format!(
                "segment duration must be finite and non-negative, got {}",
                span.duration
            )));
        }
        if !span.delay.is_finite() {
            return Err(SerenadeError::InvalidTimeline("segment delay is not finite".into()));
        }
        if segment.to.is_empty() {
            return Err(SerenadeError::InvalidTimeline("segment animates no properties".into()));
        }

        let (prev_start, prev_end) = self
            .segments
            .last()
            .map_or((0.0, 0.0), |prev| (prev.start, prev.end()));
        let base = match span.position {
            Position::Sequential => prev_end,
            Position::WithPrevious => prev_start,
            Position::Offset(offset) => prev_end + offset,
            Position::Absolute(at) => at,
        };
        let start = (base + span.delay).max(0.0);

        let index = self.segments.len();
        for property in segment.to.properties() {
            match self
                .tracks
                .iter_mut()
                .find(|t| t.target == segment.target && t.property == property)
            {
                Some(track) => {
                    track.segments.push(index);
                }
                None => self.tracks.push(Track {
                    target: segment.target,
                    property,
                    segments: vec![index],
                }),
            }
        }

        self.segments.push(Placed { segment, start });
        self.duration = self.duration.max(self.segments[index].end());

        // Keep every track ordered by start so sampling can scan backwards
        let segments = &self.segments;
        for track in &mut self.tracks {
            track
                .segments
                .sort_by(|a, b| segments[*a].start.total_cmp(&segments[*b].start));
        }
        Ok(())
    }

    pub fn mode(&self) -> TimelineMode {
        self.mode
    }

    pub fn is_scrubbed(&self) -> bool {
        matches!(self.mode, TimelineMode::Scrubbed)
    }

    /// Combined span of all segments in seconds
    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Resolved start time of the segment at `index`
    pub fn segment_start(&self, index: usize) -> Option<f32> {
        self.segments.get(index).map(|placed| placed.start)
    }

    /// Current time inside the cycle, in seconds
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Current position as a fraction of the combined span
    pub fn progress(&self) -> f32 {
        if self.duration > 0.0 {
            self.time / self.duration
        } else if self.complete {
            1.0
        } else {
            0.0
        }
    }

    /// Position a scrubbed timeline at `progress`
    ///
    /// Clamped to `[0, 1]`; NaN is ignored. Calling this twice with the same
    /// value leaves the timeline in the same state.
    pub fn set_progress(&mut self, progress: f32) {
        if progress.is_nan() {
            return;
        }
        let progress = progress.clamp(0.0, 1.0);
        self.time = progress * self.duration;
        self.complete = progress >= 1.0;
    }

    /// Start (or resume) the internal clock
    pub fn play(&mut self) {
        if matches!(self.mode, TimelineMode::Autonomous(_)) && !self.complete {
            self.playing = true;
        }
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    /// Rewind to the beginning and play
    pub fn restart(&mut self) {
        self.elapsed = 0.0;
        self.time = 0.0;
        self.complete = false;
        self.play();
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Advance the internal clock
    ///
    /// Returns true while the timeline still needs ticks.
    pub fn tick(&mut self, delta_ms: f32) -> bool {
        let TimelineMode::Autonomous(playback) = self.mode else {
            return false;
        };
        if !self.playing {
            return false;
        }

        self.elapsed += delta_ms.max(0.0) / 1000.0;
        let active = self.elapsed - playback.delay;
        if active < 0.0 {
            self.time = 0.0;
            return true;
        }

        let cycle = self.duration;
        if cycle <= 0.0 {
            self.time = 0.0;
            self.finish();
            return false;
        }

        let iteration = (active / cycle).floor();
        if let Repeat::Count(extra) = playback.repeat {
            let total = extra as f32 + 1.0;
            if iteration >= total {
                let last_reversed = playback.yoyo && extra % 2 == 1;
                self.time = if last_reversed { 0.0 } else { cycle };
                self.finish();
                return false;
            }
        }

        let local = active - iteration * cycle;
        let reversed = playback.yoyo && (iteration as u64) % 2 == 1;
        self.time = if reversed { cycle - local } else { local };
        true
    }

    fn finish(&mut self) {
        self.playing = false;
        self.complete = true;
    }

    /// Property values at the current time
    pub fn sample(&self) -> Vec<Sample> {
        self.sample_at(self.time)
    }

    /// Property values at `time` seconds
    ///
    /// For each (target, property) the value comes from the latest segment
    /// that has started by `time`; before any has started, the earliest
    /// segment's starting value applies.
    pub fn sample_at(&self, time: f32) -> Vec<Sample> {
        let mut out = Vec::with_capacity(self.tracks.len());
        for track in &self.tracks {
            let active = track
                .segments
                .iter()
                .rev()
                .copied()
                .find(|&i| self.segments[i].start <= time);

            let value = match active {
                Some(index) => {
                    let placed = &self.segments[index];
                    let duration = placed.segment.span.duration;
                    let local = if duration > 0.0 {
                        ((time - placed.start) / duration).clamp(0.0, 1.0)
                    } else {
                        1.0
                    };
                    let eased = placed.segment.span.easing.apply(local);
                    let from = self.from_value(track, index);
                    let to = self.to_value(track, index);
                    from.lerp(&to, eased)
                }
                None => self.from_value(track, track.segments[0]),
            };

            out.push(Sample {
                target: track.target,
                property: track.property,
                value,
            });
        }
        out
    }

    fn to_value(&self, track: &Track, index: usize) -> Value {
        self.segments[index]
            .segment
            .to
            .get(track.property)
            .unwrap_or_else(|| track.property.initial())
    }

    /// Starting value of a segment on a track
    ///
    /// Without an explicit `from`, a segment continues from where the
    /// previous segment on the same track ended, or from the property's
    /// initial value.
    fn from_value(&self, track: &Track, index: usize) -> Value {
        if let Some(value) = self.segments[index].segment.from.get(track.property) {
            return value;
        }
        let position = track.segments.iter().position(|&i| i == index);
        match position {
            Some(pos) if pos > 0 => self.to_value(track, track.segments[pos - 1]),
            _ => track.property.initial(),
        }
    }
}
