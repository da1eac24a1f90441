//! Batch thumbnail pipeline: extract, decimate, render, record.
//!
//! Datasets and walks are processed strictly one after another through a
//! single [`Renderer`]. Bad datasets and failed renders are logged and
//! skipped; only setting up the surface, the output directory, or writing the
//! manifest can abort a run.

use crate::config::{BatchConfig, RenderConfig};
use crate::dataset::Dataset;
use crate::downsample::downsample;
use crate::error::{BatchError, WalkSkip};
use crate::extract::{ExtractedWalk, extract_walks};
use crate::manifest::{Manifest, ManifestEntry, output_file_name};
use crate::point::normalize_points;
use crate::render::Renderer;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info, warn};

/// Outcome of a batch run.
#[derive(Clone, Debug, Default)]
pub struct BatchReport {
    /// The manifest as written to disk.
    pub manifest: Manifest,
    /// Identifiers of datasets selected by the filter, in processing order.
    pub processed: Vec<String>,
    pub rendered: usize,
    pub skipped_walks: usize,
    pub skipped_datasets: usize,
}

/// Renders every selected dataset and writes the manifest.
pub fn run_batch(
    datasets: &[Dataset],
    config: &BatchConfig,
    render_config: RenderConfig,
) -> Result<BatchReport, BatchError> {
    std::fs::create_dir_all(&config.output_dir).map_err(|source| BatchError::OutputDir {
        path: config.output_dir.clone(),
        source,
    })?;
    let mut renderer = Renderer::new(render_config)?;

    let manifest_path = config.manifest_path();
    let prior = if config.merge {
        Some(Manifest::load_or_default(&manifest_path))
    } else {
        None
    };

    let mut report = BatchReport::default();
    let mut fresh = Manifest::new();
    // Files of prior entries that survive the merge are taken.
    let selected: HashSet<&str> = datasets
        .iter()
        .map(|d| d.id.as_str())
        .filter(|id| config.selects(id))
        .collect();
    let mut used_files: HashSet<String> = prior
        .iter()
        .flat_map(|m| &m.entries)
        .filter(|e| !selected.contains(e.source.as_str()))
        .map(|e| e.file.clone())
        .collect();

    for dataset in datasets {
        if !config.selects(&dataset.id) {
            continue;
        }
        report.processed.push(dataset.id.clone());

        let document = match dataset.document() {
            Ok(doc) => doc,
            Err(err) => {
                warn!(dataset = %dataset.id, %err, "skipping malformed dataset");
                report.skipped_datasets += 1;
                continue;
            }
        };

        let walks = extract_walks(&document);
        if walks.is_empty() {
            info!(dataset = %dataset.id, "no renderable walks");
            continue;
        }
        info!(dataset = %dataset.id, walks = walks.len(), "rendering dataset");

        for (index, walk) in walks.iter().enumerate() {
            let file = unique_file_name(
                &mut used_files,
                output_file_name(&dataset.id, &walk.name, config.max_name_len),
            );
            match render_walk(&mut renderer, walk, index, config, &config.output_dir.join(&file)) {
                Ok(()) => {
                    report.rendered += 1;
                    fresh.push(ManifestEntry {
                        source: dataset.id.clone(),
                        walk: walk.name.clone(),
                        file,
                    });
                }
                Err(reason) => {
                    warn!(dataset = %dataset.id, walk = %walk.name, %reason, "skipping walk");
                    report.skipped_walks += 1;
                }
            }
        }
    }

    let manifest = match prior {
        Some(prior) => Manifest::merge(prior, report.processed.iter().map(String::as_str), fresh),
        None => fresh,
    };
    manifest
        .write_atomic(&manifest_path)
        .map_err(|source| BatchError::ManifestWrite {
            path: manifest_path.clone(),
            source,
        })?;

    info!(
        rendered = report.rendered,
        skipped_walks = report.skipped_walks,
        skipped_datasets = report.skipped_datasets,
        entries = manifest.len(),
        manifest = %manifest_path.display(),
        "batch complete"
    );
    report.manifest = manifest;
    Ok(report)
}

fn render_walk(
    renderer: &mut Renderer,
    walk: &ExtractedWalk,
    color_index: usize,
    config: &BatchConfig,
    out_path: &Path,
) -> Result<(), WalkSkip> {
    let mut points = normalize_points(&walk.points);
    if points.len() > config.max_points {
        debug!(walk = %walk.name, from = points.len(), to = config.max_points, "downsampling");
        points = downsample(&points, config.max_points);
    }

    let png = renderer
        .render_png(&points, color_index)?
        .ok_or(WalkSkip::NothingToDraw {
            points: points.len(),
        })?;

    std::fs::write(out_path, png).map_err(|source| WalkSkip::Write {
        path: out_path.to_path_buf(),
        source,
    })?;
    debug!(path = %out_path.display(), "saved image");
    Ok(())
}

/// Suffixes `_2`, `_3`, ... when two walks sanitize to the same file name.
fn unique_file_name(used: &mut HashSet<String>, file: String) -> String {
    if used.insert(file.clone()) {
        return file;
    }
    let stem = file.trim_end_matches(".png");
    let mut n = 2;
    loop {
        let candidate = format!("{stem}_{n}.png");
        if used.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collisions_get_numbered() {
        let mut used = HashSet::new();
        assert_eq!(unique_file_name(&mut used, "a.png".into()), "a.png");
        assert_eq!(unique_file_name(&mut used, "a.png".into()), "a_2.png");
        assert_eq!(unique_file_name(&mut used, "a.png".into()), "a_3.png");
    }
}
