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

//! GDAL based CRS transformations and warping of band data between grids.
//! CRS values are anything `SpatialRef::from_definition` accepts (e.g. "EPSG:26913").
//! Geographic CRSs are taken in authority axis order (lat,lon for EPSG:4326), all public functions
//! here use (x,y) = (lon,lat) order

use std::{ffi::CStr, ptr::{null, null_mut}};
use gdal::{Dataset, DriverManager, raster::Buffer, spatial_ref::{CoordTransform, CoordTransformOptions, SpatialRef}};
use gdal_sys::{CPLErr, GDALResampleAlg};
use geo_types::{coord, Rect};
use ndarray::Array2;

use crate::{errors::*, grid::GridSpec, raster::Resampling};

/// default recommended by the OCTTransformBounds docs
const DENSIFY_PTS: i32 = 21;

pub fn spatial_ref (crs: &str)->Result<SpatialRef> {
    Ok( SpatialRef::from_definition( crs)? )
}

/// `AUTHORITY:CODE` of `srs` if it has one, its WKT otherwise
pub fn crs_name (srs: &SpatialRef)->Result<String> {
    match srs.authority().into_iter().next() {
        Some(name) => Ok(name),
        None => Ok( srs.to_wkt()? )
    }
}

pub fn is_same_crs (a: &str, b: &str)->bool {
    a.eq_ignore_ascii_case(b)
}

fn coord_transform (s_srs: &SpatialRef, t_srs: &SpatialRef)->Result<CoordTransform> {
    let mut ct_options = CoordTransformOptions::new()?;
    ct_options.desired_accuracy( 0.0);
    ct_options.set_ballpark_allowed(false);
    Ok( CoordTransform::new_with_options( s_srs, t_srs, &ct_options)? )
}

/// the bounding rectangle of `bounds` (given in `s_crs`) in `t_crs`. Edges are densified so that
/// curved images of straight edges are covered
pub fn transform_rect (bounds: &Rect<f64>, s_crs: &str, t_crs: &str)->Result<Rect<f64>> {
    if is_same_crs( s_crs, t_crs) { return Ok(*bounds) }

    let s_srs = spatial_ref( s_crs)?;
    let t_srs = spatial_ref( t_crs)?;
    let (min,max) = (bounds.min(), bounds.max());

    let b = if s_srs.is_geographic() { [min.y, min.x, max.y, max.x] } else { [min.x, min.y, max.x, max.y] };
    let a = coord_transform( &s_srs, &t_srs)?.transform_bounds( &b, DENSIFY_PTS)?;
    let (x0,y0,x1,y1) = if t_srs.is_geographic() { (a[1], a[0], a[3], a[2]) } else { (a[0], a[1], a[2], a[3]) };

    Ok( Rect::new( coord!{ x: x0, y: y0 }, coord!{ x: x1, y: y1 }) )
}

/// transform individual (x,y) positions from `s_crs` into `t_crs`
pub fn transform_points (points: &[[f64;2]], s_crs: &str, t_crs: &str)->Result<Vec<[f64;2]>> {
    if is_same_crs( s_crs, t_crs) { return Ok( points.to_vec()) }

    let s_srs = spatial_ref( s_crs)?;
    let t_srs = spatial_ref( t_crs)?;
    let s_swap = s_srs.is_geographic();
    let t_swap = t_srs.is_geographic();

    let mut xs: Vec<f64> = points.iter().map( |[x,y]| if s_swap { *y } else { *x }).collect();
    let mut ys: Vec<f64> = points.iter().map( |[x,y]| if s_swap { *x } else { *y }).collect();
    let mut zs: [f64;0] = [];
    coord_transform( &s_srs, &t_srs)?.transform_coords( &mut xs, &mut ys, &mut zs)?;

    Ok( xs.into_iter().zip( ys).map( |(x,y)| if t_swap { [y,x] } else { [x,y] }).collect() )
}

/* #region warping **************************************************************************************/

fn resample_alg (method: Resampling)->GDALResampleAlg::Type {
    match method {
        Resampling::Nearest => GDALResampleAlg::GRA_NearestNeighbour,
        Resampling::Bilinear => GDALResampleAlg::GRA_Bilinear,
        Resampling::Bicubic => GDALResampleAlg::GRA_Cubic,
    }
}

/// in-memory Float64 dataset for `grid` with NaN as no-data value
pub fn mem_dataset (grid: &GridSpec, n_bands: usize)->Result<Dataset> {
    let driver = DriverManager::get_driver_by_name("MEM")?;
    let mut ds = driver.create_with_band_type::<f64,_>( "", grid.width, grid.height, n_bands)?;
    ds.set_geo_transform( &grid.geo_transform())?;
    ds.set_spatial_ref( &spatial_ref( &grid.crs)?)?;

    for i in 1..=n_bands {
        let mut band = ds.rasterband(i)?;
        band.set_no_data_value( Some(f64::NAN))?;
    }
    Ok(ds)
}

pub fn write_band (ds: &Dataset, index: usize, data: &Array2<f64>)->Result<()> {
    let (h,w) = data.dim();
    let mut band = ds.rasterband(index)?;
    let mut buf = Buffer::new( (w,h), data.iter().copied().collect::<Vec<f64>>());
    band.write( (0,0), (w,h), &mut buf)?;
    Ok(())
}

/// the raw values of band `index` as a (rows,cols) array
pub fn read_band (ds: &Dataset, index: usize)->Result<Array2<f64>> {
    let band = ds.rasterband(index)?;
    let (w,h) = band.size();
    let buf: Buffer<f64> = band.read_as( (0,0), (w,h), (w,h), None)?;
    Array2::from_shape_vec( (h,w), buf.data().to_vec())
        .map_err( |e| op_failed( format!("band {index} does not fit {w}x{h}: {e}")))
}

fn last_gdal_error_msg ()->String {
    unsafe {
        let msg = gdal_sys::CPLGetLastErrorMsg();
        if msg.is_null() { String::new() } else { CStr::from_ptr(msg).to_string_lossy().into_owned() }
    }
}

/// reproject and resample `bands` from `src_grid` onto `tgt_grid`. Target pixels that are not covered
/// by valid source pixels are NaN
pub fn warp_bands (src_grid: &GridSpec, bands: &[&Array2<f64>], tgt_grid: &GridSpec, method: Resampling)->Result<Vec<Array2<f64>>> {
    if bands.is_empty() { return Ok( Vec::new()) }

    let src_ds = mem_dataset( src_grid, bands.len())?;
    for (i,data) in bands.iter().enumerate() {
        write_band( &src_ds, i+1, data)?;
    }

    let tgt_ds = mem_dataset( tgt_grid, bands.len())?;
    let empty = Array2::from_elem( tgt_grid.shape(), f64::NAN);
    for i in 1..=bands.len() {
        write_band( &tgt_ds, i, &empty)?;
    }

    // source and target WKT are taken from the datasets
    let res = unsafe {
        gdal_sys::GDALReprojectImage( src_ds.c_dataset(), null(), tgt_ds.c_dataset(), null(),
                                      resample_alg(method), 0.0, 0.0, None, null_mut(), null_mut())
    };
    if res != CPLErr::CE_None {
        return Err( grid_mismatch( format!("cannot warp {src_grid} to {tgt_grid}: {}", last_gdal_error_msg())))
    }

    (1..=bands.len()).map( |i| read_band( &tgt_ds, i)).collect()
}

/* #endregion warping */
