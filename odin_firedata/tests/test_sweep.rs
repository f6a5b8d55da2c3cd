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

use std::collections::BTreeSet;
use chrono::{Datelike, NaiveDate};
use odin_firedata::{load_config, sweep::DateSweep, FireDataConfig};

fn date (y: i32, m: u32, d: u32)->NaiveDate { NaiveDate::from_ymd_opt(y,m,d).unwrap() }

#[test]
fn test_fire_season_dates() {
    let sweep = DateSweep::new( date(2020,1,1), date(2024,6,1), vec![10,11,12,1,2,3]);
    let dates: Vec<NaiveDate> = sweep.dates().collect();

    let months: BTreeSet<u32> = dates.iter().map( |d| d.month()).collect();
    assert_eq!( months, BTreeSet::from([4,5,6,7,8,9]));

    assert_eq!( dates.first(), Some(&date(2020,4,1)));
    assert_eq!( dates.last(), Some(&date(2024,6,1)));
    assert_eq!( dates.len(), 4 * 183 + 30 + 31 + 1);

    // strictly ascending without duplicates
    assert!( dates.windows(2).all( |w| w[0] < w[1]));
    assert!( dates.iter().all( |d| sweep.includes(*d)));
}

#[test]
fn test_empty_and_single_day() {
    assert_eq!( DateSweep::new( date(2020,5,2), date(2020,5,1), vec![]).dates().count(), 0);
    assert_eq!( DateSweep::new( date(2020,5,1), date(2020,5,1), vec![]).dates().count(), 1);
    assert_eq!( DateSweep::new( date(2020,5,1), date(2020,5,31), vec![5]).dates().count(), 0);
}

#[test]
fn test_sample_config() {
    let path = concat!( env!("CARGO_MANIFEST_DIR"), "/configs/fire_data.ron");
    let config: FireDataConfig = load_config( path).unwrap();
    println!("{config:#?}");

    assert_eq!( config.sweep.skip_months, vec![10,11,12,1,2,3]);
    assert_eq!( config.compositor.lookback_days, 30);
    assert_eq!( config.compositor.export.file_name( date(2020,4,15)), "FireData_20200415");
    assert_eq!( config.sources.weather.bands.len(), 16);
    assert!( config.sources.elevation.file_pattern.is_none());
    assert_eq!( config.sources.fire.source, "MODIS/061/MOD14A1");
    assert_eq!( config.sources.elevation.source, "CGIAR/SRTM90_V4");

    // the lon/lat box of Colorado is about 600km x 450km, in 1km pixels
    let grid = config.compositor.target_grid().unwrap();
    println!("{grid}");
    assert_eq!( grid.crs, "EPSG:2232");
    let (h,w) = grid.shape();
    assert!( (590..680).contains(&w), "width {w}");
    assert!( (440..480).contains(&h), "height {h}");
}
