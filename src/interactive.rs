//! On-demand re-rendering of raw symbol streams under a chosen mapping.
//!
//! Unlike the batch pipeline this path starts from symbols, so decimation
//! happens inside the walk engine through its stride. Work is cooperative:
//! [`RerenderJob::step`] handles a bounded number of items and hands control
//! back to the host, which calls it again to resume.

use crate::config::RerenderConfig;
use crate::downsample::stride_for_target;
use crate::mapping::Mapping;
use crate::render::Renderer;
use crate::walk::walk_points;
use glam::Vec3;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

/// Separator between source and walk name in a symbol key.
pub const KEY_SEPARATOR: &str = "::";

/// A `"<source>::<walk name>"` key, split at the first separator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SymbolKey<'a> {
    pub source: &'a str,
    pub walk: &'a str,
}

impl<'a> SymbolKey<'a> {
    /// Keys without a separator have an empty source.
    pub fn parse(key: &'a str) -> Self {
        match key.split_once(KEY_SEPARATOR) {
            Some((source, walk)) => Self { source, walk },
            None => Self {
                source: "",
                walk: key,
            },
        }
    }
}

/// Result for one symbol stream.
#[derive(Clone, Debug)]
pub struct RerenderedWalk {
    pub key: String,
    pub points: Vec<Vec3>,
    /// PNG bytes, or `None` when the walk could not be drawn.
    pub image: Option<Vec<u8>>,
}

impl RerenderedWalk {
    /// Splits the stream key into its dataset and walk parts.
    pub fn symbol_key(&self) -> SymbolKey<'_> {
        SymbolKey::parse(&self.key)
    }
}

/// What a call to [`RerenderJob::step`] left behind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JobStatus {
    /// More items remain; call `step` again.
    Yielded { done: usize, total: usize },
    Finished,
}

/// A resumable re-render over many symbol streams sharing one mapping.
pub struct RerenderJob {
    streams: Vec<(String, Vec<u8>)>,
    point_counts: HashMap<String, usize>,
    mapping: Mapping,
    config: RerenderConfig,
    cursor: usize,
    results: Vec<RerenderedWalk>,
}

impl RerenderJob {
    /// Streams are processed in key order.
    pub fn new(
        streams: BTreeMap<String, Vec<u8>>,
        mapping: Mapping,
        config: RerenderConfig,
    ) -> Self {
        Self {
            streams: streams.into_iter().collect(),
            point_counts: HashMap::new(),
            mapping,
            config,
            cursor: 0,
            results: Vec::new(),
        }
    }

    /// Original point counts per key, used only to pick each walk's stride.
    pub fn with_point_counts(mut self, counts: HashMap<String, usize>) -> Self {
        self.point_counts = counts;
        self
    }

    pub fn total(&self) -> usize {
        self.streams.len()
    }

    pub fn done(&self) -> usize {
        self.cursor
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.streams.len()
    }

    /// Stride used for `key`, derived from its original point count when
    /// known and from its symbol count otherwise.
    pub fn stride_for(&self, key: &str, symbol_count: usize) -> usize {
        let count = self.point_counts.get(key).copied().unwrap_or(symbol_count);
        stride_for_target(count, self.config.target_points)
    }

    /// Processes up to `items_per_yield` streams.
    pub fn step(&mut self, renderer: &mut Renderer) -> JobStatus {
        let batch = self.config.items_per_yield.max(1);
        let end = (self.cursor + batch).min(self.streams.len());

        while self.cursor < end {
            let (key, symbols) = &self.streams[self.cursor];
            let stride = self.stride_for(key, symbols.len());
            let points = walk_points(symbols, &self.mapping, stride);
            let image = match renderer.render_png(&points, self.cursor) {
                Ok(image) => image,
                Err(err) => {
                    warn!(key = %key, %err, "re-render failed");
                    None
                }
            };
            self.results.push(RerenderedWalk {
                key: key.clone(),
                points,
                image,
            });
            self.cursor += 1;
        }

        if self.is_finished() {
            JobStatus::Finished
        } else {
            debug!(done = self.cursor, total = self.total(), "yielding");
            JobStatus::Yielded {
                done: self.cursor,
                total: self.total(),
            }
        }
    }

    /// Drives the job to completion, calling `on_yield` at every yield point.
    pub fn run(
        mut self,
        renderer: &mut Renderer,
        mut on_yield: impl FnMut(usize, usize),
    ) -> Vec<RerenderedWalk> {
        while let JobStatus::Yielded { done, total } = self.step(renderer) {
            on_yield(done, total);
        }
        self.results
    }

    pub fn results(&self) -> &[RerenderedWalk] {
        &self.results
    }

    pub fn into_results(self) -> Vec<RerenderedWalk> {
        self.results
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_symbol_keys() {
        assert_eq!(
            SymbolKey::parse("whales::Blue::Song"),
            SymbolKey {
                source: "whales",
                walk: "Blue::Song"
            }
        );
        assert_eq!(SymbolKey::parse("lonely").source, "");
    }

    #[test]
    fn stride_prefers_original_point_count() {
        let streams = BTreeMap::from([("a::x".to_string(), vec![0u8; 100])]);
        let config = RerenderConfig {
            target_points: 11,
            items_per_yield: 10,
        };
        let job = RerenderJob::new(streams, Mapping::IDENTITY, config)
            .with_point_counts(HashMap::from([("a::x".to_string(), 50)]));
        assert_eq!(job.stride_for("a::x", 100), 5);
        assert_eq!(job.stride_for("other", 100), 10);
    }
}
