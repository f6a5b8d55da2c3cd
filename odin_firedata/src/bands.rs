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

use chrono::NaiveDate;
use ndarray::Array2;
use strum::{EnumCount, EnumIter, EnumString, IntoStaticStr, IntoEnumIterator};
use odin_tfrecord::FloatSchema;

use crate::{errors::*, grid::GridSpec};

/// side length of exported square patches (pixels)
pub const PATCH_SIZE: usize = 64;

/// the bands of a fire data example, in storage order. The string values are the feature names used
/// in exported records
#[derive(Debug,Clone,Copy,PartialEq,Eq,Hash,EnumIter,EnumCount,EnumString,IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum FireBand {
    FireMask,
    FireMaskNextDay,
    Elevation,
    WindDirection,
    WindSpeed,
    EnergyReleaseComponent,
    BurnIndex,
    Precipitation,
    // wire names as found in existing corpora
    #[strum(serialize = "tempature_min")]
    TemperatureMin,
    #[strum(serialize = "tempature_max")]
    TemperatureMax,
    DroughtIndex,
    Vegetation,
    PopulationDensity,
}

impl FireBand {
    pub fn name (self)->&'static str { self.into() }

    /// position of this band within an example
    pub fn index (self)->usize { self as usize }

    pub fn names ()->Vec<&'static str> {
        FireBand::iter().map( |b| b.name()).collect()
    }
}

/// the (not self-describing) record schema shared by exporter and corpus filter
pub fn fire_schema (patch_size: usize)->FloatSchema {
    FloatSchema::new( FireBand::names().as_slice(), [patch_size, patch_size])
}

/// the co-registered band stack for one date. Band `i` corresponds to the i-th `FireBand`
#[derive(Debug,Clone)]
pub struct CompositeExample {
    pub date: NaiveDate,
    pub grid: GridSpec,
    pub bands: Vec<Array2<f32>>,
}

impl CompositeExample {
    pub fn new (date: NaiveDate, grid: GridSpec, bands: Vec<Array2<f32>>)->Result<Self> {
        if bands.len() != FireBand::COUNT {
            return Err( grid_mismatch( format!("composite needs {} bands, got {}", FireBand::COUNT, bands.len())))
        }
        let shape = grid.shape();
        for (band,data) in FireBand::iter().zip( bands.iter()) {
            if data.dim() != shape {
                return Err( grid_mismatch( format!("band {} has shape {:?}, grid is {:?}", band.name(), data.dim(), shape)))
            }
        }
        Ok( CompositeExample { date, grid, bands } )
    }

    pub fn band (&self, band: FireBand)->&Array2<f32> {
        &self.bands[band.index()]
    }
}
