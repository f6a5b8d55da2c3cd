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

//! raster source catalogs. A catalog answers a time/space query with a single [`RasterLayer`] in the
//! native CRS of the image, or with a `SourceUnavailable` error if it does not have a matching image.
//! Query bounds are transformed into the CRS of each candidate image before they are intersected

use std::{fmt, path::{Path,PathBuf}, sync::Arc};
use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, Utc};
use gdal::Dataset;
use geo::Intersects;
use geo_types::Rect;
use regex::Regex;
use serde::{Deserialize,Serialize};
use tracing::{debug,warn};

use crate::{errors::*, grid::GridSpec, raster::{RasterBand,RasterLayer}, warp::{crs_name, read_band, transform_rect}};

/// the temporal part of a catalog query
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum TimeFilter {
    /// first image that starts within `[date, date+1)`
    Day(NaiveDate),
    /// most recent image that starts within `[end - days, end)`
    Lookback { end: NaiveDate, days: u32 },
    /// most recent image regardless of date
    Latest,
    /// the (single) time invariant image
    Static,
}

impl fmt::Display for TimeFilter {
    fn fmt (&self, f: &mut fmt::Formatter<'_>)->fmt::Result {
        match self {
            TimeFilter::Day(d) => write!( f, "day {d}"),
            TimeFilter::Lookback{end,days} => write!( f, "{days} days before {end}"),
            TimeFilter::Latest => write!( f, "latest"),
            TimeFilter::Static => write!( f, "static"),
        }
    }
}

pub fn start_of_day (date: NaiveDate)->DateTime<Utc> {
    date.and_time( NaiveTime::MIN).and_utc()
}

#[derive(Debug,Clone,PartialEq)]
pub struct CatalogQuery {
    pub time: TimeFilter,
    /// region of interest in `crs` units
    pub bounds: Rect<f64>,
    /// CRS of `bounds`. If not set the bounds are taken to be in the CRS of the catalog images
    pub crs: Option<String>,
}

impl CatalogQuery {
    pub fn new (time: TimeFilter, bounds: Rect<f64>)->Self {
        CatalogQuery { time, bounds, crs: None }
    }

    pub fn with_crs (mut self, crs: impl ToString)->Self {
        self.crs = Some(crs.to_string());
        self
    }

    /// the query bounds in `crs`
    pub fn bounds_in (&self, crs: &str)->Result<Rect<f64>> {
        match &self.crs {
            Some(query_crs) => transform_rect( &self.bounds, query_crs, crs),
            None => Ok(self.bounds)
        }
    }
}

impl fmt::Display for CatalogQuery {
    fn fmt (&self, f: &mut fmt::Formatter<'_>)->fmt::Result {
        let (min,max) = (self.bounds.min(), self.bounds.max());
        write!( f, "{} in [{},{} .. {},{}]", self.time, min.x, min.y, max.x, max.y)
    }
}

/// the interface to the (external) provider of source rasters
pub trait RasterCatalog: Send + Sync {
    fn source_id (&self)->&str;

    /// the matching layer in its native grid, or `SourceUnavailable`
    fn query (&self, query: &CatalogQuery)->Result<RasterLayer>;
}

/// what a catalog needs to know about an image to select it. Static images have no time
#[derive(Debug,Clone)]
pub struct CatalogEntry<T> {
    pub time: Option<DateTime<Utc>>,
    /// image bounds in `crs` units
    pub footprint: Rect<f64>,
    pub crs: String,
    pub item: T,
}

/// apply the time/space selection rules of `query` to a set of catalog entries
pub fn select_entry<'a,T> (entries: &'a [CatalogEntry<T>], query: &CatalogQuery)->Option<&'a CatalogEntry<T>> {
    // query bounds per image CRS, None if they could not be transformed
    let mut projected: Vec<(&str, Option<Rect<f64>>)> = Vec::new();
    let mut in_region: Vec<&'a CatalogEntry<T>> = Vec::new();

    for e in entries {
        let cached = projected.iter().find( |(crs,_)| *crs == e.crs.as_str()).map( |(_,b)| *b);
        let bounds = match cached {
            Some(bounds) => bounds,
            None => {
                let bounds = query.bounds_in( &e.crs)
                    .inspect_err( |err| warn!("cannot transform query bounds into {}: {err}", e.crs))
                    .ok();
                projected.push( (e.crs.as_str(), bounds));
                bounds
            }
        };
        if bounds.is_some_and( |b| e.footprint.intersects( &b)) {
            in_region.push(e);
        }
    }
    let mut candidates = in_region.into_iter();

    match query.time {
        TimeFilter::Day(date) => {
            let (t0,t1) = (start_of_day(date), start_of_day(date) + TimeDelta::days(1));
            candidates
                .filter_map( |e| e.time.filter( |t| *t >= t0 && *t < t1).map( |t| (t,e)))
                .min_by_key( |(t,_)| *t)
                .map( |(_,e)| e)
        }
        TimeFilter::Lookback{end,days} => {
            let t1 = start_of_day(end);
            let t0 = t1 - TimeDelta::days( days as i64);
            candidates
                .filter_map( |e| e.time.filter( |t| *t >= t0 && *t < t1).map( |t| (t,e)))
                .max_by_key( |(t,_)| *t)
                .map( |(_,e)| e)
        }
        TimeFilter::Latest => {
            // static images only count if there is no dated one
            let (dated, fixed): (Vec<_>,Vec<_>) = candidates.partition( |e| e.time.is_some());
            dated.into_iter()
                .filter_map( |e| e.time.map( |t| (t,e)))
                .max_by_key( |(t,_)| *t)
                .map( |(_,e)| e)
                .or_else( || fixed.into_iter().next())
        }
        TimeFilter::Static => {
            candidates.find( |e| e.time.is_none())
        }
    }
}

/* #region in-memory catalog ****************************************************************************/

/// a catalog over pre-loaded layers
pub struct MemoryCatalog {
    source_id: String,
    entries: Vec<CatalogEntry<RasterLayer>>,
}

impl MemoryCatalog {
    pub fn new (source_id: impl ToString)->Self {
        MemoryCatalog { source_id: source_id.to_string(), entries: Vec::new() }
    }

    /// add a layer that is stamped with its `time_start`
    pub fn with_layer (mut self, layer: RasterLayer)->Self {
        self.entries.push( CatalogEntry{ time: Some(layer.time_start), footprint: layer.grid.bounds(), crs: layer.grid.crs.clone(), item: layer });
        self
    }

    pub fn with_static_layer (mut self, layer: RasterLayer)->Self {
        self.entries.push( CatalogEntry{ time: None, footprint: layer.grid.bounds(), crs: layer.grid.crs.clone(), item: layer });
        self
    }

    pub fn len (&self)->usize { self.entries.len() }
}

impl RasterCatalog for MemoryCatalog {
    fn source_id (&self)->&str { &self.source_id }

    fn query (&self, query: &CatalogQuery)->Result<RasterLayer> {
        select_entry( &self.entries, query)
            .map( |e| e.item.clone())
            .ok_or_else( || source_unavailable( &self.source_id, query))
    }
}

/* #endregion in-memory catalog */

/* #region raster file catalog **************************************************************************/

#[derive(Debug,Clone,Serialize,Deserialize)]
pub struct FileCatalogConfig {
    pub source: String,
    pub dir: PathBuf,

    /// regex for file names with one capture group for the `yyyyMMdd` date of the image. Files of
    /// sources without pattern are static
    #[serde(default)]
    pub file_pattern: Option<String>,

    /// CRS of images that do not carry a spatial reference
    #[serde(default)]
    pub crs: Option<String>,

    /// band names for the raster bands of the images, in band order
    pub bands: Vec<String>,

    /// overrides the no-data value of the image bands
    #[serde(default)]
    pub no_data: Option<f64>,
}

/// a directory of north-up raster files in any format and CRS GDAL can read. The directory is re-scanned
/// for each query
pub struct FileCatalog {
    config: FileCatalogConfig,
    pattern: Option<Regex>,
}

impl FileCatalog {
    pub fn new (config: FileCatalogConfig)->Result<Self> {
        let pattern = match &config.file_pattern {
            Some(p) => Some( Regex::new(p)?),
            None => None
        };
        Ok( FileCatalog { config, pattern } )
    }

    pub fn config (&self)->&FileCatalogConfig { &self.config }

    fn file_time (&self, path: &Path)->Option<Option<DateTime<Utc>>> {
        let name = path.file_name()?.to_str()?;
        match &self.pattern {
            Some(re) => {
                let caps = re.captures(name)?;
                let date = NaiveDate::parse_from_str( caps.get(1)?.as_str(), "%Y%m%d").ok()?;
                Some( Some( start_of_day(date)))
            }
            None => {
                let lc = name.to_ascii_lowercase();
                if lc.ends_with(".tif") || lc.ends_with(".tiff") { Some(None) } else { None }
            }
        }
    }

    fn scan (&self)->Result<Vec<CatalogEntry<(PathBuf,GridSpec)>>> {
        let mut entries = Vec::new();
        for dir_entry in std::fs::read_dir( &self.config.dir)? {
            let path = dir_entry?.path();
            if !path.is_file() { continue }

            if let Some(time) = self.file_time( &path) {
                let grid = read_raster_grid( &path, self.config.crs.as_deref())?;
                entries.push( CatalogEntry { time, footprint: grid.bounds(), crs: grid.crs.clone(), item: (path, grid) });
            }
        }
        debug!("scanned {} images of {}", entries.len(), self.config.source);
        Ok(entries)
    }
}

impl RasterCatalog for FileCatalog {
    fn source_id (&self)->&str { &self.config.source }

    fn query (&self, query: &CatalogQuery)->Result<RasterLayer> {
        let entries = self.scan()?;
        let entry = select_entry( &entries, query).ok_or_else( || source_unavailable( &self.config.source, query))?;
        let (path,grid) = &entry.item;
        debug!("{} selected {:?} for {}", self.config.source, path, query);

        let bands = read_raster_bands( path, &self.config.bands, self.config.no_data)?;
        let time_start = entry.time.unwrap_or( DateTime::<Utc>::UNIX_EPOCH);
        RasterLayer::new( Arc::new( self.config.source.clone()), time_start, grid.clone(), bands)
    }
}

fn dataset_grid (ds: &Dataset, path: &Path, default_crs: Option<&str>)->Result<GridSpec> {
    let crs = match ds.spatial_ref() {
        Ok(srs) => crs_name( &srs)?,
        Err(_) => default_crs.map( |c| c.to_string())
            .ok_or_else( || grid_mismatch( format!("no spatial reference for {path:?}")))?
    };
    let (w,h) = ds.raster_size();
    GridSpec::from_geo_transform( crs, &ds.geo_transform()?, w, h)
}

/// the grid of a raster file (header only). `default_crs` is used if the file has no spatial reference
pub fn read_raster_grid (path: &Path, default_crs: Option<&str>)->Result<GridSpec> {
    let ds = Dataset::open( path)?;
    dataset_grid( &ds, path, default_crs)
}

/// read all bands of a raster file as named bands, with band scale and offset applied. No-data values
/// become `NaN`
pub fn read_raster_bands (path: &Path, names: &[String], no_data: Option<f64>)->Result<Vec<RasterBand>> {
    let ds = Dataset::open( path)?;
    let n_bands = ds.raster_count();
    if n_bands != names.len() {
        return Err( grid_mismatch( format!("{path:?} has {n_bands} bands, expected {}", names.len())))
    }

    let mut bands = Vec::with_capacity( n_bands);
    for (i,name) in names.iter().enumerate() {
        let band = ds.rasterband( i+1)?;
        let no_data = no_data.or( band.no_data_value());
        let scale = band.scale().unwrap_or(1.0);
        let offset = band.offset().unwrap_or(0.0);

        let data = read_band( &ds, i+1)?.mapv( |v| match no_data {
            Some(nd) if v == nd => f64::NAN,
            _ => v * scale + offset
        });
        bands.push( RasterBand::new( name, data));
    }

    Ok(bands)
}

/* #endregion raster file catalog */

/// file catalog configurations for all sources of a fire data example
#[derive(Debug,Clone,Serialize,Deserialize)]
pub struct SourcesConfig {
    pub fire: FileCatalogConfig,
    pub elevation: FileCatalogConfig,
    pub weather: FileCatalogConfig,
    pub drought: FileCatalogConfig,
    pub vegetation: FileCatalogConfig,
    pub population: FileCatalogConfig,
}

/// the injected catalogs the compositor draws from
#[derive(Clone)]
pub struct FireDataSources {
    pub fire: Arc<dyn RasterCatalog>,
    pub elevation: Arc<dyn RasterCatalog>,
    pub weather: Arc<dyn RasterCatalog>,
    pub drought: Arc<dyn RasterCatalog>,
    pub vegetation: Arc<dyn RasterCatalog>,
    pub population: Arc<dyn RasterCatalog>,
}

impl FireDataSources {
    pub fn from_config (config: &SourcesConfig)->Result<Self> {
        fn file_catalog (c: &FileCatalogConfig)->Result<Arc<dyn RasterCatalog>> {
            Ok( Arc::new( FileCatalog::new( c.clone())?) )
        }

        Ok( FireDataSources {
            fire: file_catalog( &config.fire)?,
            elevation: file_catalog( &config.elevation)?,
            weather: file_catalog( &config.weather)?,
            drought: file_catalog( &config.drought)?,
            vegetation: file_catalog( &config.vegetation)?,
            population: file_catalog( &config.population)?,
        })
    }
}
