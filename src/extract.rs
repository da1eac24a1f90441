//! Pulls named point sequences out of heterogeneous dataset documents.
//!
//! Each labeled node is classified once into a [`WalkNode`]. Nested `walks`
//! containers are followed a single level deep; anything nested further is
//! not discovered.

use crate::point::is_coordinate_like;
use serde_json::{Map, Value};

/// Key of a container whose children are walks.
pub const WALKS_KEY: &str = "walks";

/// A named walk as found in a document, before coordinate normalization.
#[derive(Clone, Debug, PartialEq)]
pub struct ExtractedWalk {
    pub name: String,
    pub points: Vec<Value>,
}

/// The shapes a data-bearing node can take.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WalkNode<'a> {
    /// `{ "points": [...] }`
    PointsField(&'a [Value]),
    /// `{ "path": [...] }`
    PathField(&'a [Value]),
    /// `[[x, y, z], ...]` or `[{x, y, z}, ...]`
    RawArray(&'a [Value]),
    /// A container of further walks, either `{ "walks": {...} }` or the
    /// `walks` object itself.
    NestedWalks(&'a Map<String, Value>),
}

/// Classifies one labeled node. A node may carry both a `points` and a `path`
/// field; each is reported.
pub fn classify<'a>(key: &str, value: &'a Value) -> Vec<WalkNode<'a>> {
    match value {
        Value::Array(items) if items.len() > 1 && is_coordinate_like(&items[0]) => {
            vec![WalkNode::RawArray(items)]
        }
        Value::Object(obj) if key == WALKS_KEY => vec![WalkNode::NestedWalks(obj)],
        Value::Object(obj) => {
            let mut nodes = Vec::new();
            if let Some(Value::Array(points)) = obj.get("points") {
                nodes.push(WalkNode::PointsField(points));
            }
            if let Some(Value::Array(path)) = obj.get("path") {
                nodes.push(WalkNode::PathField(path));
            }
            if nodes.is_empty()
                && let Some(Value::Object(walks)) = obj.get(WALKS_KEY)
            {
                nodes.push(WalkNode::NestedWalks(walks));
            }
            nodes
        }
        _ => Vec::new(),
    }
}

/// Extracts every renderable walk from a labeled document.
///
/// Candidates with fewer than two points are dropped. Names of walks found
/// under a nested container are prefixed as `"<outer> - <inner>"`; the bare
/// `walks` key adds no prefix of its own.
pub fn extract_walks(document: &Map<String, Value>) -> Vec<ExtractedWalk> {
    let mut walks = Vec::new();
    collect(document, "", true, &mut walks);
    walks
}

fn collect(obj: &Map<String, Value>, prefix: &str, top: bool, out: &mut Vec<ExtractedWalk>) {
    for (key, value) in obj {
        for node in classify(key, value) {
            let points = match node {
                WalkNode::PointsField(p) | WalkNode::PathField(p) | WalkNode::RawArray(p) => p,
                WalkNode::NestedWalks(inner) => {
                    if top {
                        let inner_prefix = if key == WALKS_KEY { prefix } else { key.as_str() };
                        collect(inner, inner_prefix, false, out);
                    }
                    continue;
                }
            };
            if points.len() > 1 {
                out.push(ExtractedWalk {
                    name: walk_name(prefix, key),
                    points: points.to_vec(),
                });
            }
        }
    }
}

fn walk_name(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix} - {key}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn names(doc: Value) -> Vec<String> {
        let Value::Object(obj) = doc else {
            panic!("test document must be an object")
        };
        extract_walks(&obj).into_iter().map(|w| w.name).collect()
    }

    #[test]
    fn classifies_raw_arrays() {
        let v = json!([[0, 0, 0], [1, 0, 0]]);
        assert!(matches!(classify("a", &v).as_slice(), [WalkNode::RawArray(_)]));

        let scalars = json!([1, 2, 3]);
        assert!(classify("a", &scalars).is_empty());
    }

    #[test]
    fn points_and_path_are_both_emitted() {
        let doc = json!({
            "Both": {
                "points": [[0, 0, 0], [1, 1, 1]],
                "path": [[0, 0, 0], [2, 2, 2]]
            }
        });
        assert_eq!(names(doc), vec!["Both", "Both"]);
    }

    #[test]
    fn short_candidates_are_dropped() {
        let doc = json!({
            "One": {"points": [[0, 0, 0]]},
            "Empty": {"path": []},
            "Two": [{"x": 0}, {"x": 1}]
        });
        assert_eq!(names(doc), vec!["Two"]);
    }

    #[test]
    fn recursion_stops_after_one_level() {
        let doc = json!({
            "Outer": {
                "walks": {
                    "Inner": {"walks": {"Deep": {"path": [[0, 0, 0], [1, 0, 0]]}}},
                    "Shallow": {"path": [[0, 0, 0], [1, 0, 0]]}
                }
            }
        });
        assert_eq!(names(doc), vec!["Outer - Shallow"]);
    }

    #[test]
    fn ignores_metadata_fields() {
        let doc = json!({
            "title": "Whales",
            "count": 3,
            "Blue": {"points": [[0, 0, 0], [0, 1, 0]], "color": "#00f"}
        });
        assert_eq!(names(doc), vec!["Blue"]);
    }
}
