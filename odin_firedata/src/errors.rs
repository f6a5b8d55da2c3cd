/*
 * Copyright © 2025, United States Government, as represented by the Administrator of 
 * the National Aeronautics and Space Administration. All rights reserved.
 *
 * The “ODIN” software is licensed under the Apache License, Version 2.0 (the "License"); 
 * you may not use this file except in compliance with the License. You may obtain a copy 
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */

use thiserror::Error;
use odin_tfrecord::OdinTfRecordError;

pub type Result<T> = std::result::Result<T, OdinFireDataError>;

#[derive(Error,Debug)]
pub enum OdinFireDataError {
    #[error("IO error {0}")]
    IOError( #[from] std::io::Error),

    #[error("config error {0}")]
    ConfigError( #[from] ron::error::SpannedError),

    #[error("record error {0}")]
    TfRecordError( #[from] OdinTfRecordError),

    #[error("GDAL error {0}")]
    GdalError( #[from] gdal::errors::GdalError),

    #[error("file pattern error {0}")]
    PatternError( #[from] glob::PatternError),

    #[error("file glob error {0}")]
    GlobError( #[from] glob::GlobError),

    #[error("regex error {0}")]
    RegexError( #[from] regex::Error),

    /// no raster available for the requested date/window/region - recoverable per date
    #[error("source {source_id} unavailable for {query}")]
    SourceUnavailable { source_id: String, query: String },

    /// rasters that should be co-registered are not
    #[error("grid mismatch: {0}")]
    GridMismatch(String),

    #[error("missing band {band} in {source_id}")]
    MissingBand { source_id: String, band: String },

    /// export backend rejected the request
    #[error("export submission failed: {0}")]
    SubmissionFailed(String),

    /// a generic error
    #[error("operation failed {0}")]
    OpFailed(String)
}

pub fn op_failed (msg: impl ToString)->OdinFireDataError {
    OdinFireDataError::OpFailed(msg.to_string())
}

pub fn source_unavailable (source_id: impl ToString, query: impl ToString)->OdinFireDataError {
    OdinFireDataError::SourceUnavailable { source_id: source_id.to_string(), query: query.to_string() }
}

pub fn grid_mismatch (msg: impl ToString)->OdinFireDataError {
    OdinFireDataError::GridMismatch(msg.to_string())
}

pub fn missing_band (source_id: impl ToString, band: impl ToString)->OdinFireDataError {
    OdinFireDataError::MissingBand { source_id: source_id.to_string(), band: band.to_string() }
}

pub fn submission_failed (msg: impl ToString)->OdinFireDataError {
    OdinFireDataError::SubmissionFailed(msg.to_string())
}

/// render an error with its complete `source()` chain, one cause per line
pub fn error_chain (e: &dyn std::error::Error)->String {
    let mut s = e.to_string();
    let mut cause = e.source();
    while let Some(c) = cause {
        s.push_str("\n  caused by: ");
        s.push_str( &c.to_string());
        cause = c.source();
    }
    s
}
