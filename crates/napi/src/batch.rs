//! Batch processing types and utilities for transforming many documents in
//! parallel.
//!
//! Note numbering is scoped to one document, so transforming documents in
//! parallel never reorders identifiers; within each document the walk stays
//! strictly sequential.

use crate::build_options;
use crate::types::TransformConfig;
use napi_derive::napi;
use sidenote_core::transform_json;

/// Input for batch processing - one serialized document to transform.
#[napi(object)]
#[derive(Debug, Clone)]
pub struct BatchInput {
    /// Document identifier (typically the file path).
    pub id: String,
    /// Serialized Pandoc JSON document.
    pub source: String,
}

/// Result for a single document in a batch.
#[napi(object)]
#[derive(Debug, Clone)]
pub struct BatchResult {
    /// Document identifier matching the input.
    pub id: String,
    /// Transformed document (present on success).
    pub result: Option<String>,
    /// Error message (present on failure).
    pub error: Option<String>,
}

/// Statistics for batch processing.
#[napi(object)]
#[derive(Debug, Clone)]
pub struct BatchStats {
    /// Total number of documents processed.
    pub total: u32,
    /// Number of successfully transformed documents.
    pub succeeded: u32,
    /// Number of failed transformations.
    pub failed: u32,
    /// Total processing time in milliseconds.
    pub processing_time_ms: f64,
}

/// Options for batch processing.
#[napi(object)]
#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    /// Maximum number of threads to use. Defaults to number of CPU cores.
    pub max_threads: Option<u32>,
    /// Whether to keep processing after a failed document. Defaults to true.
    pub continue_on_error: Option<bool>,
    /// Transform configuration applied to every document.
    pub config: Option<TransformConfig>,
}

/// Result of batch processing containing all results and statistics.
#[napi(object)]
#[derive(Debug, Clone)]
pub struct BatchProcessingResult {
    /// Individual results for each input document.
    pub results: Vec<BatchResult>,
    /// Processing statistics.
    pub stats: BatchStats,
}

/// Transforms a batch of serialized documents, in parallel when possible.
#[napi]
pub fn transform_batch(
    inputs: Vec<BatchInput>,
    options: Option<BatchOptions>,
) -> napi::Result<BatchProcessingResult> {
    use rayon::prelude::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Instant;

    let start = Instant::now();
    let opts = options.unwrap_or_default();
    let continue_on_error = opts.continue_on_error.unwrap_or(true);
    let transform_options = build_options(opts.config.as_ref());

    // Configure thread pool if max_threads is specified
    let pool = if let Some(max_threads) = opts.max_threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(max_threads as usize)
            .build()
            .ok()
    } else {
        None
    };

    let total = inputs.len() as u32;
    let succeeded = AtomicU32::new(0);
    let failed = AtomicU32::new(0);

    let process_input = |input: BatchInput| -> BatchResult {
        match transform_json(&input.source, &transform_options) {
            Ok(result) => {
                succeeded.fetch_add(1, Ordering::Relaxed);
                BatchResult {
                    id: input.id,
                    result: Some(result),
                    error: None,
                }
            }
            Err(e) => {
                failed.fetch_add(1, Ordering::Relaxed);
                BatchResult {
                    id: input.id,
                    result: None,
                    error: Some(e.to_string()),
                }
            }
        }
    };

    let results: Vec<BatchResult> = if continue_on_error {
        if let Some(pool) = pool {
            pool.install(|| inputs.into_par_iter().map(process_input).collect())
        } else {
            inputs.into_par_iter().map(process_input).collect()
        }
    } else {
        // Stop on first error; order stays deterministic, so run sequentially.
        let mut results = Vec::with_capacity(inputs.len());
        for input in inputs {
            let result = process_input(input);
            let had_error = result.error.is_some();
            results.push(result);
            if had_error {
                break;
            }
        }
        results
    };

    Ok(BatchProcessingResult {
        results,
        stats: BatchStats {
            total,
            succeeded: succeeded.load(Ordering::Relaxed),
            failed: failed.load(Ordering::Relaxed),
            processing_time_ms: start.elapsed().as_secs_f64() * 1000.0,
        },
    })
}
