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

use std::path::{Path,PathBuf};
use serde::{Deserialize,Serialize};
use serde::de::DeserializeOwned;

use crate::{catalog::SourcesConfig, compositor::CompositorConfig, errors::*, sweep::DateSweep};

fn default_export_dir ()->PathBuf { PathBuf::from("export") }
fn default_error_log ()->PathBuf { PathBuf::from("error_log.log") }
fn default_queue_len ()->usize { 4 }

/// configuration of the `export_fire_data` sweep
#[derive(Debug,Clone,Serialize,Deserialize)]
pub struct FireDataConfig {
    pub compositor: CompositorConfig,
    pub sources: SourcesConfig,
    pub sweep: DateSweep,

    /// root directory of export folders
    #[serde(default="default_export_dir")]
    pub export_dir: PathBuf,

    /// value for pixels of edge patches that lie outside the grid
    #[serde(default)]
    pub fill_value: f32,

    /// max number of composites waiting to be written
    #[serde(default="default_queue_len")]
    pub queue_len: usize,

    /// append-only log of per-date failures
    #[serde(default="default_error_log")]
    pub error_log: PathBuf,
}

/// deserialize a RON config file
pub fn load_config<C: DeserializeOwned> (path: impl AsRef<Path>)->Result<C> {
    let path = path.as_ref();
    let input = std::fs::read_to_string( path)
        .map_err( |e| op_failed( format!("cannot read config {path:?}: {e}")))?;
    Ok( ron::from_str( &input)? )
}
