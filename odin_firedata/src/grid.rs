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

use std::fmt;
use serde::{Deserialize,Serialize};
use gdal::GeoTransform;
use geo_types::{coord, Rect};

use crate::errors::*;

const REL_EPS: f64 = 1e-9;

/// a north-up raster grid in a given CRS. `(x_min,y_max)` is the outer corner of the upper left pixel,
/// `scale` the pixel size in CRS units (pixels are square)
#[derive(Debug,Clone,PartialEq,Serialize,Deserialize)]
pub struct GridSpec {
    pub crs: String,
    pub x_min: f64,
    pub y_max: f64,
    pub scale: f64,
    pub width: usize,
    pub height: usize,
}

impl GridSpec {
    pub fn new (crs: impl ToString, x_min: f64, y_max: f64, scale: f64, width: usize, height: usize)->Self {
        GridSpec { crs: crs.to_string(), x_min, y_max, scale, width, height }
    }

    /// the smallest grid with given scale that covers `bounds`, anchored at the upper left corner of `bounds`
    pub fn from_bounds (crs: impl ToString, bounds: &Rect<f64>, scale: f64)->Result<Self> {
        if !(scale > 0.0) {
            return Err( grid_mismatch( format!("invalid pixel scale {scale}")))
        }
        let width = (bounds.width() / scale).ceil() as usize;
        let height = (bounds.height() / scale).ceil() as usize;
        if width == 0 || height == 0 {
            return Err( grid_mismatch( format!("empty grid for bounds {bounds:?}")))
        }
        Ok( GridSpec::new( crs, bounds.min().x, bounds.max().y, scale, width, height) )
    }

    /// grid of a north-up GDAL geotransform with square pixels
    pub fn from_geo_transform (crs: impl ToString, gt: &GeoTransform, width: usize, height: usize)->Result<Self> {
        let scale = gt[1];
        if gt[2] != 0.0 || gt[4] != 0.0 {
            return Err( grid_mismatch( format!("rotated geotransform {gt:?}")))
        }
        if !(scale > 0.0) || !approx_eq( scale, -gt[5], scale) {
            return Err( grid_mismatch( format!("not a north-up grid with square pixels: {} x {}", gt[1], gt[5])))
        }
        Ok( GridSpec::new( crs, gt[0], gt[3], scale, width, height) )
    }

    /// the GDAL geotransform of this grid
    pub fn geo_transform (&self)->GeoTransform {
        [self.x_min, self.scale, 0.0, self.y_max, 0.0, -self.scale]
    }

    pub fn shape (&self)->(usize,usize) { (self.height, self.width) }

    pub fn x_max (&self)->f64 { self.x_min + self.width as f64 * self.scale }

    pub fn y_min (&self)->f64 { self.y_max - self.height as f64 * self.scale }

    pub fn bounds (&self)->Rect<f64> {
        Rect::new( coord!{ x: self.x_min, y: self.y_min() }, coord!{ x: self.x_max(), y: self.y_max })
    }

    /// CRS coordinates of the center of pixel (col,row)
    pub fn pixel_center (&self, col: usize, row: usize)->(f64,f64) {
        ( self.x_min + (col as f64 + 0.5) * self.scale, self.y_max - (row as f64 + 0.5) * self.scale )
    }

    /// fractional (col,row) pixel coordinates of a CRS position, pixel centers are at `n + 0.5`
    pub fn to_pixel (&self, x: f64, y: f64)->(f64,f64) {
        ( (x - self.x_min) / self.scale, (self.y_max - y) / self.scale )
    }

    pub fn is_same_crs (&self, other: &GridSpec)->bool {
        self.crs.eq_ignore_ascii_case( &other.crs)
    }

    /// same CRS, scale, origin and dimensions
    pub fn is_aligned_with (&self, other: &GridSpec)->bool {
        self.is_same_crs(other)
            && self.width == other.width && self.height == other.height
            && approx_eq( self.scale, other.scale, self.scale)
            && approx_eq( self.x_min, other.x_min, self.scale)
            && approx_eq( self.y_max, other.y_max, self.scale)
    }
}

impl fmt::Display for GridSpec {
    fn fmt (&self, f: &mut fmt::Formatter<'_>)->fmt::Result {
        write!( f, "{} {}x{} @{} [{},{}]", self.crs, self.width, self.height, self.scale, self.x_min, self.y_max)
    }
}

fn approx_eq (a: f64, b: f64, magnitude: f64)->bool {
    (a - b).abs() <= REL_EPS * magnitude.abs().max(1.0)
}
