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

use odin_tfrecord::{Example, Feature, RecordChain};
use odin_firedata::{bands::FireBand, filter::max_value, fire_mask::is_active_fire};

#[derive(Parser, Debug)]
#[command(version, about, long_about = "list the features of tf.Example records in (gzipped) TFRecord files")]
pub struct Args {
    /// max number of records to show
    #[arg(short,long, default_value_t = 10)]
    pub n_records: usize,

    /// record files
    #[arg(num_args=1..)]
    pub files: Vec<PathBuf>,
}

fn value_range (values: &[f32])->(f32,f32) {
    values.iter().fold( (f32::INFINITY, f32::NEG_INFINITY), |(lo,hi),v| (lo.min(*v), hi.max(*v)))
}

fn main()->Result<()> {
    let args = Args::parse();

    for (i,rec) in RecordChain::new( args.files).take( args.n_records).enumerate() {
        let example = Example::decode( &rec?)?;
        println!("------- record {i}: {} features", example.len());

        for (name,feature) in &example.features {
            match feature {
                Feature::FloatList(values) => {
                    let (lo,hi) = value_range( values);
                    println!("  {name:28} float[{}] {lo} .. {hi}", values.len());
                }
                other => println!("  {name:28} {}", other.kind_name())
            }
        }

        if let Some(values) = example.get( FireBand::FireMask.name()).and_then( |f| f.as_float_list()) {
            println!("  active fire: {}", is_active_fire( max_value( values)));
        }
    }
    Ok(())
}
