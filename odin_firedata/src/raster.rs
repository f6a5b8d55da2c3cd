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

//! immutable raster layers and the resampling that puts them onto a common grid.
//! No-data pixels are represented as `NaN`

use std::sync::Arc;
use chrono::{DateTime,Utc};
use ndarray::Array2;
use serde::{Deserialize,Serialize};

use crate::{errors::*, grid::GridSpec, warp::warp_bands};

/// GDAL resampling algorithms used to put sources on the target grid
#[derive(Debug,Clone,Copy,PartialEq,Eq,Serialize,Deserialize)]
pub enum Resampling {
    Nearest,
    Bilinear,
    Bicubic,
}

#[derive(Debug,Clone)]
pub struct RasterBand {
    pub name: String,
    pub data: Array2<f64>,
}

impl RasterBand {
    pub fn new (name: impl ToString, data: Array2<f64>)->Self {
        RasterBand { name: name.to_string(), data }
    }
}

/// a set of bands on one grid, retrieved from a single source. Transformations return new layers
#[derive(Debug,Clone)]
pub struct RasterLayer {
    pub source: Arc<String>,
    pub time_start: DateTime<Utc>,
    pub time_end: Option<DateTime<Utc>>,
    pub grid: GridSpec,
    pub bands: Vec<RasterBand>,
}

impl RasterLayer {
    pub fn new (source: Arc<String>, time_start: DateTime<Utc>, grid: GridSpec, bands: Vec<RasterBand>)->Result<Self> {
        let shape = grid.shape();
        if let Some(b) = bands.iter().find( |b| b.data.dim() != shape) {
            return Err( grid_mismatch( format!("band {} of {} has shape {:?}, grid is {:?}", b.name, source, b.data.dim(), shape)))
        }
        Ok( RasterLayer { source, time_start, time_end: None, grid, bands } )
    }

    pub fn with_time_end (mut self, time_end: DateTime<Utc>)->Self {
        self.time_end = Some(time_end);
        self
    }

    pub fn band (&self, name: &str)->Option<&RasterBand> {
        self.bands.iter().find( |b| b.name == name)
    }

    pub fn band_names (&self)->Vec<&str> {
        self.bands.iter().map( |b| b.name.as_str()).collect()
    }

    fn derive (&self, grid: GridSpec, bands: Vec<RasterBand>)->RasterLayer {
        RasterLayer { source: self.source.clone(), time_start: self.time_start, time_end: self.time_end, grid, bands }
    }

    /// new layer with the given bands (in given order)
    pub fn select<S: AsRef<str>> (&self, names: &[S])->Result<RasterLayer> {
        let mut bands = Vec::with_capacity( names.len());
        for name in names {
            let name = name.as_ref();
            let band = self.band(name).ok_or_else( || missing_band( self.source.as_str(), name))?;
            bands.push( band.clone());
        }
        Ok( self.derive( self.grid.clone(), bands) )
    }

    /// new layer with bands renamed positionally
    pub fn rename<S: AsRef<str>> (&self, names: &[S])->Result<RasterLayer> {
        if names.len() != self.bands.len() {
            return Err( op_failed( format!("cannot rename {} bands of {} with {} names", self.bands.len(), self.source, names.len())))
        }
        let bands = self.bands.iter().zip( names.iter())
            .map( |(b,n)| RasterBand::new( n.as_ref(), b.data.clone()))
            .collect();
        Ok( self.derive( self.grid.clone(), bands) )
    }

    /// new layer with `f` applied to every pixel of every band
    pub fn map_values<F> (&self, f: F)->RasterLayer where F: Fn(f64)->f64 {
        let bands = self.bands.iter().map( |b| RasterBand::new( &b.name, b.data.mapv(&f))).collect();
        self.derive( self.grid.clone(), bands)
    }

    /// new layer on `target` grid, reprojected if the grids use different CRSs. Pixels that are not
    /// covered by the source become NaN
    pub fn resample (&self, target: &GridSpec, method: Resampling)->Result<RasterLayer> {
        if self.grid.is_aligned_with(target) {
            return Ok( self.derive( target.clone(), self.bands.clone()) )
        }

        let src: Vec<&Array2<f64>> = self.bands.iter().map( |b| &b.data).collect();
        let warped = warp_bands( &self.grid, &src, target, method)?;
        let bands = self.bands.iter().zip( warped)
            .map( |(b,data)| RasterBand::new( &b.name, data))
            .collect();
        Ok( self.derive( target.clone(), bands) )
    }
}
