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

//! export of composites as patch records. Submission and completion are decoupled - an [`ExportSink`]
//! accepts a task and returns a handle, the actual writing happens out of band

use std::{path::{Path,PathBuf}, sync::{Arc, atomic::{AtomicU64,Ordering}}};
use async_trait::async_trait;
use chrono::NaiveDate;
use geo_types::Polygon;
use serde::{Deserialize,Serialize};
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug,error,info};
use odin_tfrecord::{RecordFileSink, TfRecordWriter};

use crate::{bands::{fire_schema, CompositeExample, PATCH_SIZE}, errors::*};

#[derive(Debug,Clone,Serialize,Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// file name prefix, the date is appended as `_yyyyMMdd`
    pub prefix: String,
    pub folder: String,
    pub description: String,
    pub patch_size: usize,
    pub compressed: bool,
}

impl Default for ExportConfig {
    fn default ()->Self {
        ExportConfig {
            prefix: "FireData".to_string(),
            folder: "FireEyeExportActual".to_string(),
            description: "PatchesExport".to_string(),
            patch_size: PATCH_SIZE,
            compressed: true,
        }
    }
}

impl ExportConfig {
    pub fn file_name (&self, date: NaiveDate)->String {
        format!("{}_{}", self.prefix, date.format("%Y%m%d"))
    }
}

/// everything the export backend needs to produce the patch records of one composite
#[derive(Debug,Clone)]
pub struct ExportTask {
    pub description: String,
    pub file_name: String,
    pub folder: String,
    /// region of interest in `crs` units
    pub region: Polygon<f64>,
    pub crs: String,
    pub scale: f64,
    pub patch_size: usize,
    pub compressed: bool,
    pub image: CompositeExample,
}

impl ExportTask {
    pub fn file_ext (&self)->&'static str {
        if self.compressed { "tfrecord.gz" } else { "tfrecord" }
    }

    /// `<root>/<folder>/<file_name>.<ext>`
    pub fn output_path (&self, root_dir: &Path)->PathBuf {
        root_dir.join( &self.folder).join( format!("{}.{}", self.file_name, self.file_ext()))
    }
}

#[derive(Debug,Clone,PartialEq,Eq)]
pub struct SubmissionHandle {
    pub id: u64,
    pub description: String,
    pub file_name: String,
}

/// the submission side of an export backend. Returning `Ok` only means the task was accepted
#[async_trait]
pub trait ExportSink: Send + Sync {
    async fn submit (&self, task: ExportTask)->Result<SubmissionHandle>;
}

/* #region tiling ***************************************************************************************/

/// one square tile of a composite, bands are flattened row-major in `FireBand` order
#[derive(Debug,Clone)]
pub struct Patch {
    pub row: usize,
    pub col: usize,
    pub bands: Vec<Vec<f32>>,
}

/// split a composite into `patch_size` tiles, row-major over the image. Edge tiles that extend past
/// the image are padded with `fill`
pub fn patches (example: &CompositeExample, patch_size: usize, fill: f32)->Vec<Patch> {
    let (h,w) = example.grid.shape();
    if patch_size == 0 { return Vec::new() }
    let n_rows = h.div_ceil( patch_size);
    let n_cols = w.div_ceil( patch_size);

    let mut list = Vec::with_capacity( n_rows * n_cols);
    for pr in 0..n_rows {
        for pc in 0..n_cols {
            let (r0,c0) = (pr * patch_size, pc * patch_size);
            let bands = example.bands.iter().map( |data| {
                let mut values = Vec::with_capacity( patch_size * patch_size);
                for r in r0..r0+patch_size {
                    for c in c0..c0+patch_size {
                        values.push( if r < h && c < w { data[[r,c]] } else { fill });
                    }
                }
                values
            }).collect();
            list.push( Patch { row: r0, col: c0, bands });
        }
    }
    list
}

/* #endregion tiling */

/// write all patches of `task` as `tf.Example` records. The output file only appears once it is complete
pub fn write_export (task: &ExportTask, root_dir: &Path, fill: f32)->Result<PathBuf> {
    let path = task.output_path( root_dir);
    let dir = root_dir.join( &task.folder);
    std::fs::create_dir_all( &dir)?;

    let schema = fire_schema( task.patch_size);
    let mut tmp = tempfile::Builder::new().prefix(".export-").suffix(".tmp").tempfile_in( &dir)?;
    {
        let mut writer = TfRecordWriter::new( RecordFileSink::new( tmp.as_file_mut(), task.compressed));
        for patch in patches( &task.image, task.patch_size, fill) {
            let example = schema.encode( &patch.bands)?;
            writer.write_record( &example.encode())?;
        }
        debug!("{} records for {}", writer.n_records(), task.file_name);
        writer.finish()?;
    }
    tmp.as_file().sync_all()?;
    tmp.persist( &path).map_err( |e| OdinFireDataError::IOError(e.error))?;

    Ok(path)
}

/* #region background export task ***********************************************************************/

#[derive(Debug)]
pub enum ExportCmd {
    Write { id: u64, task: ExportTask },
    Terminate,
}

#[derive(Debug,Clone,Copy,Default,PartialEq,Eq)]
pub struct ExportStats {
    pub written: usize,
    pub failed: usize,
}

/// [`ExportSink`] that queues tasks for a background writer task
#[derive(Clone)]
pub struct TaskExportSink {
    tx: mpsc::Sender<ExportCmd>,
    next_id: Arc<AtomicU64>,
}

impl TaskExportSink {
    /// ask the writer task to finish all queued exports and then stop
    pub async fn terminate (&self)->Result<()> {
        self.tx.send( ExportCmd::Terminate).await.map_err( |_| submission_failed("export task already terminated"))
    }
}

#[async_trait]
impl ExportSink for TaskExportSink {
    async fn submit (&self, task: ExportTask)->Result<SubmissionHandle> {
        let id = self.next_id.fetch_add( 1, Ordering::Relaxed);
        let handle = SubmissionHandle { id, description: task.description.clone(), file_name: task.file_name.clone() };

        self.tx.send( ExportCmd::Write{ id, task }).await
            .map_err( |_| submission_failed( format!("export queue closed, cannot submit {}", handle.file_name)))?;
        Ok(handle)
    }
}

/// spawn the tokio task that writes submitted exports one at a time below `root_dir`
pub fn spawn_export_task (root_dir: PathBuf, fill: f32, queue_len: usize)->(JoinHandle<ExportStats>, TaskExportSink) {
    let (tx, mut rx) = mpsc::channel::<ExportCmd>( queue_len.max(1));
    let sink = TaskExportSink { tx, next_id: Arc::new( AtomicU64::new(1)) };

    let jh = tokio::spawn( async move {
        let mut stats = ExportStats::default();

        while let Some(cmd) = rx.recv().await {
            match cmd {
                ExportCmd::Write{id, task} => {
                    let root = root_dir.clone();
                    let file_name = task.file_name.clone();
                    let res = tokio::task::spawn_blocking( move || write_export( &task, &root, fill)).await;

                    match res {
                        Ok(Ok(path)) => {
                            info!("export {id} completed: {:?}", path);
                            stats.written += 1;
                        }
                        Ok(Err(e)) => {
                            error!("export {id} ({file_name}) failed: {}", error_chain(&e));
                            stats.failed += 1;
                        }
                        Err(e) => {
                            error!("export {id} ({file_name}) aborted: {e}");
                            stats.failed += 1;
                        }
                    }
                }
                ExportCmd::Terminate => break
            }
        }
        stats
    });

    (jh, sink)
}

/* #endregion background export task */
