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

//! reduction of an exported patch corpus to the records that show active fire

use std::path::{Path,PathBuf};
use serde::{Deserialize,Serialize};
use tracing::{debug,info};
use odin_tfrecord::{RecordChain, RecordFileSink, TfRecordWriter};

use crate::{bands::{fire_schema, FireBand, PATCH_SIZE}, errors::*, fire_mask::is_active_fire};

#[derive(Debug,Clone,Serialize,Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub input_dir: PathBuf,
    /// glob pattern for record files within `input_dir`
    pub file_pattern: String,
    /// relative paths are resolved against `input_dir`
    pub output_file: PathBuf,
    pub compressed: bool,
    pub verify_crc: bool,
    pub patch_size: usize,
}

impl Default for FilterConfig {
    fn default ()->Self {
        FilterConfig {
            input_dir: PathBuf::from("."),
            file_pattern: "FireData_*.tfrecord.gz".to_string(),
            output_file: PathBuf::from("FireEyeData.tfrecord.gz"),
            compressed: true,
            verify_crc: true,
            patch_size: PATCH_SIZE,
        }
    }
}

impl FilterConfig {
    pub fn output_path (&self)->PathBuf {
        if self.output_file.is_absolute() { self.output_file.clone() } else { self.input_dir.join( &self.output_file) }
    }
}

#[derive(Debug,Clone,Copy,Default,PartialEq,Eq)]
pub struct FilterStats {
    pub files: usize,
    pub records_read: usize,
    pub records_kept: usize,
}

/// all files in `dir` matching `pattern`, sorted by path
pub fn find_record_files (dir: &Path, pattern: &str)->Result<Vec<PathBuf>> {
    let full_pattern = dir.join( pattern);
    let mut files = Vec::new();
    for entry in glob::glob( &full_pattern.to_string_lossy())? {
        let path = entry?;
        if path.is_file() { files.push(path) }
    }
    files.sort();
    Ok(files)
}

/// maximum of `values`, `NaN` if any value is `NaN` or `values` is empty
pub fn max_value (values: &[f32])->f32 {
    let mut max = f32::NAN;
    for (i,v) in values.iter().enumerate() {
        if v.is_nan() { return f32::NAN }
        if i == 0 || *v > max { max = *v }
    }
    max
}

/// stream all matching records of `config.input_dir` into a single output file, keeping those with
/// active fire in their `fire_mask` band. The output file is only created if the whole corpus was
/// processed successfully
pub fn filter_corpus (config: &FilterConfig)->Result<FilterStats> {
    let output_path = config.output_path();
    let files: Vec<PathBuf> = find_record_files( &config.input_dir, &config.file_pattern)?
        .into_iter()
        .filter( |p| *p != output_path)
        .collect();
    info!("filtering {} record files from {:?}", files.len(), config.input_dir);

    let schema = fire_schema( config.patch_size);
    let fire_idx = FireBand::FireMask.index();
    let mut stats = FilterStats { files: files.len(), ..Default::default() };

    let out_dir = match output_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from(".")
    };
    std::fs::create_dir_all( &out_dir)?;
    let mut tmp = tempfile::Builder::new().prefix(".filter-").suffix(".tmp").tempfile_in( &out_dir)?;

    {
        let mut writer = TfRecordWriter::new( RecordFileSink::new( tmp.as_file_mut(), config.compressed));

        for rec in RecordChain::new( files).with_crc_check( config.verify_crc) {
            let bands = schema.decode_record( &rec?)?;
            stats.records_read += 1;

            if is_active_fire( max_value( &bands[fire_idx])) {
                let example = schema.encode( &bands)?;
                writer.write_record( &example.encode())?;
                stats.records_kept += 1;
            }
        }
        writer.finish()?;
    }

    tmp.as_file().sync_all()?;
    tmp.persist( &output_path).map_err( |e| OdinFireDataError::IOError(e.error))?;
    debug!("{stats:?}");
    info!("kept {} of {} records in {:?}", stats.records_kept, stats.records_read, output_path);

    Ok(stats)
}
