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

use std::sync::Arc;
use chrono::{TimeZone, Utc};
use geo_types::{coord, Rect};
use ndarray::{array, Array2};
use odin_firedata::{grid::GridSpec, raster::*, OdinFireDataError};

const CRS: &str = "EPSG:26913";

fn layer (grid: GridSpec, bands: Vec<(&str,Array2<f64>)>)->RasterLayer {
    let bands = bands.into_iter().map( |(n,d)| RasterBand::new(n,d)).collect();
    let t = Utc.with_ymd_and_hms( 2020, 4, 15, 0, 0, 0).unwrap();
    RasterLayer::new( Arc::new("test".to_string()), t, grid, bands).unwrap()
}

#[test]
fn test_grid_from_bounds() {
    let bounds = Rect::new( coord!{x: 1000.0, y: 2000.0}, coord!{x: 5500.0, y: 4000.0});
    let grid = GridSpec::from_bounds( CRS, &bounds, 1000.0).unwrap();
    println!("{grid}");

    assert_eq!( grid.shape(), (2,5)); // width is rounded up
    assert_eq!( grid.x_min, 1000.0);
    assert_eq!( grid.y_max, 4000.0);
    assert_eq!( grid.pixel_center(0,0), (1500.0, 3500.0));
    assert_eq!( grid.to_pixel(1500.0, 3500.0), (0.5, 0.5));
    assert_eq!( grid.y_min(), 2000.0);

    assert!( GridSpec::from_bounds( CRS, &bounds, 0.0).is_err());
}

#[test]
fn test_grid_alignment() {
    let a = GridSpec::new( CRS, 0.0, 3000.0, 1000.0, 4, 3);
    let b = GridSpec::new( "epsg:26913", 0.0, 3000.0 + 1e-7, 1000.0, 4, 3);
    assert!( a.is_aligned_with(&b));

    assert!( !a.is_aligned_with( &GridSpec::new( CRS, 500.0, 3000.0, 1000.0, 4, 3)));
    assert!( !a.is_aligned_with( &GridSpec::new( CRS, 0.0, 3000.0, 500.0, 4, 3)));
    assert!( !a.is_aligned_with( &GridSpec::new( CRS, 0.0, 3000.0, 1000.0, 3, 3)));
    assert!( !a.is_aligned_with( &GridSpec::new( "EPSG:4326", 0.0, 3000.0, 1000.0, 4, 3)));
}

#[test]
fn test_layer_transforms() {
    let grid = GridSpec::new( CRS, 0.0, 2000.0, 1000.0, 2, 2);
    let l = layer( grid, vec![ ("a", array![[1.0, 2.0],[3.0, 4.0]]), ("b", array![[5.0, 6.0],[7.0, 8.0]]) ]);

    let s = l.select( &["b"]).unwrap();
    assert_eq!( s.band_names(), vec!["b"]);
    assert_eq!( l.band_names(), vec!["a", "b"]); // original unchanged

    let r = l.rename( &["x", "y"]).unwrap();
    assert_eq!( r.band("y").unwrap().data, array![[5.0, 6.0],[7.0, 8.0]]);
    assert!( l.rename( &["x"]).is_err());

    let m = l.map_values( |v| v * 10.0);
    assert_eq!( m.band("a").unwrap().data, array![[10.0, 20.0],[30.0, 40.0]]);

    match l.select( &["c"]) {
        Err(OdinFireDataError::MissingBand{band,..}) => assert_eq!( band, "c"),
        other => panic!("expected missing band, got {other:?}")
    }
}

#[test]
fn test_layer_shape_check() {
    let grid = GridSpec::new( CRS, 0.0, 2000.0, 1000.0, 2, 2);
    let t = Utc.with_ymd_and_hms( 2020, 4, 15, 0, 0, 0).unwrap();
    let res = RasterLayer::new( Arc::new("test".to_string()), t, grid, vec![ RasterBand::new( "a", Array2::zeros((3,2)))]);
    assert!( matches!( res, Err(OdinFireDataError::GridMismatch(_))));
}

#[test]
fn test_resample_nearest() {
    // 2x2 source at 1000m, 4x4 target at 500m covering the same area
    let src = GridSpec::new( CRS, 0.0, 2000.0, 1000.0, 2, 2);
    let tgt = GridSpec::new( CRS, 0.0, 2000.0, 500.0, 4, 4);
    let l = layer( src, vec![ ("a", array![[1.0, 2.0],[3.0, 4.0]]) ]);

    let r = l.resample( &tgt, Resampling::Nearest).unwrap();
    let expected = array![
        [1.0, 1.0, 2.0, 2.0],
        [1.0, 1.0, 2.0, 2.0],
        [3.0, 3.0, 4.0, 4.0],
        [3.0, 3.0, 4.0, 4.0],
    ];
    assert_eq!( r.band("a").unwrap().data, expected);
    assert_eq!( r.grid, tgt);
}

#[test]
fn test_resample_outside_is_nan() {
    let src = GridSpec::new( CRS, 0.0, 2000.0, 1000.0, 2, 2);
    let tgt = GridSpec::new( CRS, 1000.0, 2000.0, 1000.0, 2, 2); // right column outside source
    let l = layer( src, vec![ ("a", array![[1.0, 2.0],[3.0, 4.0]]) ]);

    let data = l.resample( &tgt, Resampling::Nearest).unwrap().bands[0].data.clone();
    assert_eq!( data[[0,0]], 2.0);
    assert_eq!( data[[1,0]], 4.0);
    assert!( data[[0,1]].is_nan());
    assert!( data[[1,1]].is_nan());
}

#[test]
fn test_resample_interpolating() {
    // linear ramp in x: value = column index
    let src = GridSpec::new( CRS, 0.0, 8000.0, 1000.0, 8, 8);
    let ramp = Array2::from_shape_fn( (8,8), |(_,c)| c as f64);
    let l = layer( src, vec![ ("a", ramp) ]);

    // target pixel centers fall halfway between source pixel centers
    let tgt = GridSpec::new( CRS, 3500.0, 5000.0, 1000.0, 2, 2);

    let bl = l.resample( &tgt, Resampling::Bilinear).unwrap();
    println!("bilinear: {:?}", bl.bands[0].data);
    assert!( (bl.bands[0].data[[0,0]] - 3.5).abs() < 1e-6);
    assert!( (bl.bands[0].data[[1,1]] - 4.5).abs() < 1e-6);

    // cubic convolution reproduces linear functions
    let bc = l.resample( &tgt, Resampling::Bicubic).unwrap();
    println!("bicubic: {:?}", bc.bands[0].data);
    assert!( (bc.bands[0].data[[0,0]] - 3.5).abs() < 1e-6);
    assert!( (bc.bands[0].data[[0,1]] - 4.5).abs() < 1e-6);
}

#[test]
fn test_resample_aligned_is_identity() {
    let src = GridSpec::new( CRS, 0.0, 2000.0, 1000.0, 2, 2);
    let l = layer( src.clone(), vec![ ("a", array![[1.0, f64::NAN],[3.0, 4.0]]) ]);

    let r = l.resample( &GridSpec { crs: "epsg:26913".to_string(), ..src }, Resampling::Bicubic).unwrap();
    assert_eq!( r.bands[0].data[[0,0]], 1.0);
    assert!( r.bands[0].data[[0,1]].is_nan());
    assert_eq!( r.bands[0].data[[1,1]], 4.0);
}

/// a GRIDMET like layer at 0.01 degrees over (-106,39)..(-105,40)
fn lon_lat_layer ()->RasterLayer {
    let src = GridSpec::new( "EPSG:4326", -106.0, 40.0, 0.01, 100, 100);
    let constant = Array2::from_elem( (100,100), 5.0);
    let lon = Array2::from_shape_fn( (100,100), |(_,c)| -106.0 + (c as f64 + 0.5) * 0.01);
    layer( src, vec![ ("constant", constant), ("lon", lon) ])
}

#[test]
fn test_reproject_lon_lat_to_utm() {
    // 10x10 km in UTM 13N, around (-105.5,39.5)
    let tgt = GridSpec::new( CRS, 450000.0, 4380000.0, 1000.0, 10, 10);
    let l = lon_lat_layer();

    for method in [Resampling::Nearest, Resampling::Bilinear, Resampling::Bicubic] {
        let r = l.resample( &tgt, method).unwrap();
        assert_eq!( r.grid, tgt);
        assert_eq!( r.band_names(), vec!["constant", "lon"]);

        let constant = &r.band("constant").unwrap().data;
        assert!( constant.iter().all( |v| (v - 5.0).abs() < 1e-6), "{method:?}: {constant:?}");

        // longitude grows with easting and stays within the source
        let lon = &r.band("lon").unwrap().data;
        for row in lon.rows() {
            let row = row.to_vec();
            assert!( row.iter().all( |v| *v > -105.7 && *v < -105.3), "{method:?}: {row:?}");
            assert!( row.windows(2).all( |w| w[1] > w[0]), "{method:?}: {row:?}");
        }
    }
}

#[test]
fn test_reproject_outside_source_is_nan() {
    // right half of the target lies east of -105.0
    let tgt = GridSpec::new( CRS, 490000.0, 4380000.0, 1000.0, 20, 4);
    let r = lon_lat_layer().resample( &tgt, Resampling::Nearest).unwrap();
    let data = &r.band("constant").unwrap().data;

    assert_eq!( data[[0,0]], 5.0);
    assert!( data[[0,19]].is_nan());
}

#[test]
fn test_geo_transform() {
    let grid = GridSpec::new( CRS, 1000.0, 4000.0, 500.0, 4, 2);
    let gt = grid.geo_transform();
    assert_eq!( gt, [1000.0, 500.0, 0.0, 4000.0, 0.0, -500.0]);
    assert_eq!( GridSpec::from_geo_transform( CRS, &gt, 4, 2).unwrap(), grid);

    assert!( GridSpec::from_geo_transform( CRS, &[0.0, 500.0, 0.0, 0.0, 0.0, -250.0], 4, 2).is_err());
    assert!( GridSpec::from_geo_transform( CRS, &[0.0, 500.0, 1.0, 0.0, 0.0, -500.0], 4, 2).is_err());
}

#[test]
fn test_transform_region() {
    use odin_firedata::warp::{transform_points, transform_rect};

    let colorado = Rect::new( coord!{x: -109.04785486659851, y: 36.993281070894604}, coord!{x: -102.04212011725402, y: 41.00143097730514});
    let utm = transform_rect( &colorado, "EPSG:4326", CRS).unwrap();
    println!("Colorado in UTM 13N: {utm:?}");
    assert!( utm.min().x > 120000.0 && utm.min().x < 160000.0);
    assert!( utm.max().x > 740000.0 && utm.max().x < 790000.0);
    assert!( utm.min().y > 4080000.0 && utm.min().y < 4110000.0);
    assert!( utm.max().y > 4530000.0 && utm.max().y < 4560000.0);

    // the central meridian of zone 13 maps to easting 500km
    let pts = transform_points( &[[-105.0, 39.0]], "EPSG:4326", CRS).unwrap();
    assert!( (pts[0][0] - 500000.0).abs() < 1e-3);
    assert!( (pts[0][1] - 4317000.0).abs() < 5000.0);

    let back = transform_points( &pts, CRS, "EPSG:4326").unwrap();
    assert!( (back[0][0] + 105.0).abs() < 1e-6 && (back[0][1] - 39.0).abs() < 1e-6);

    assert_eq!( transform_rect( &colorado, "EPSG:4326", "epsg:4326").unwrap(), colorado);
}
