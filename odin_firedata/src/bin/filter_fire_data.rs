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

use std::path::PathBuf;
use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use odin_firedata::{filter::{filter_corpus, FilterConfig}, load_config};

#[derive(Parser, Debug)]
#[command(version, about, long_about = "reduce exported fire data records to those with active fire")]
pub struct Args {
    /// optional RON filter config, command line options take precedence
    #[arg(short,long)]
    pub config: Option<PathBuf>,

    /// directory with exported record files
    #[arg(short,long)]
    pub input_dir: Option<PathBuf>,

    /// glob pattern for record files within input dir
    #[arg(short,long)]
    pub pattern: Option<String>,

    /// output file (relative to input dir unless absolute)
    #[arg(short,long)]
    pub output: Option<PathBuf>,

    /// do not verify record checksums
    #[arg(long)]
    pub no_crc: bool,
}

fn main()->Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter( EnvFilter::from_default_env())  // use RUST_LOG to set max level
        .init();

    let args = Args::parse();

    let mut config: FilterConfig = match &args.config {
        Some(path) => load_config( path)?,
        None => FilterConfig::default()
    };
    if let Some(dir) = args.input_dir { config.input_dir = dir }
    if let Some(pattern) = args.pattern { config.file_pattern = pattern }
    if let Some(output) = args.output { config.output_file = output }
    if args.no_crc { config.verify_crc = false }

    let stats = filter_corpus( &config)?;
    println!("{} files, {} records read, {} records with active fire written to {:?}",
             stats.files, stats.records_read, stats.records_kept, config.output_path());
    Ok(())
}
