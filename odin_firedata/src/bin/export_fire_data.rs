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

use std::{fs::OpenOptions, path::{Path,PathBuf}, sync::{Arc,Mutex}};
use anyhow::Result;
use chrono::NaiveDate;
use clap::Parser;
use tracing_subscriber::{filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use odin_firedata::{
    catalog::FireDataSources, compositor::FireDataCompositor, export::spawn_export_task, load_config,
    sweep::run_sweep, FireDataConfig
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = "composite and export daily fire data patches for a range of dates")]
pub struct Args {
    /// RON config file
    #[arg(short,long, default_value = "odin_firedata/configs/fire_data.ron")]
    pub config: PathBuf,

    /// first date to export (overrides config)
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// last date to export (overrides config)
    #[arg(long)]
    pub end: Option<NaiveDate>,

    /// root directory for export folders (overrides config)
    #[arg(long)]
    pub export_dir: Option<PathBuf>,

    /// file to append per-date errors to (overrides config)
    #[arg(long)]
    pub error_log: Option<PathBuf>,
}

/// per-date errors go to the append-only error log, everything else is controlled by RUST_LOG
fn init_logging (error_log: &Path)->Result<()> {
    let file = OpenOptions::new().create(true).append(true).open( error_log)?;

    tracing_subscriber::registry()
        .with( fmt::layer().with_ansi(false).with_writer( Mutex::new(file)).with_filter( LevelFilter::ERROR))
        .with( fmt::layer().with_filter( EnvFilter::from_default_env()))
        .try_init()?;
    Ok(())
}

#[tokio::main]
async fn main()->Result<()> {
    let args = Args::parse();

    let mut config: FireDataConfig = load_config( &args.config)?;
    if let Some(start) = args.start { config.sweep.start = start }
    if let Some(end) = args.end { config.sweep.end = end }
    if let Some(dir) = args.export_dir { config.export_dir = dir }
    if let Some(path) = args.error_log { config.error_log = path }

    init_logging( &config.error_log)?;

    let sources = FireDataSources::from_config( &config.sources)?;
    let (jh, sink) = spawn_export_task( config.export_dir.clone(), config.fill_value, config.queue_len);
    let compositor = FireDataCompositor::new( config.compositor.clone(), sources, Arc::new( sink.clone()))?;

    let report = run_sweep( &compositor, &config.sweep).await;

    sink.terminate().await?;
    let stats = jh.await?;

    println!("{} dates submitted, {} failed (see {:?})", report.succeeded().count(), report.failed().count(), config.error_log);
    println!("{} exports written to {:?}, {} failed", stats.written, config.export_dir, stats.failed);
    Ok(())
}
