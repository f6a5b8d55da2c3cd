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

//! assembly of the daily fire data composite from the source catalogs, and its submission for export

use std::sync::Arc;
use chrono::NaiveDate;
use geo::BoundingRect;
use geo_types::{Coord, LineString, Polygon};
use ndarray::Array2;
use serde::{Deserialize,Serialize};
use strum::IntoEnumIterator;
use tracing::{debug,info};

use crate::{
    bands::{CompositeExample, FireBand},
    catalog::{CatalogQuery, FireDataSources, RasterCatalog, TimeFilter},
    errors::*,
    export::{ExportConfig, ExportSink, ExportTask, SubmissionHandle},
    fire_mask::recode_value,
    grid::GridSpec,
    raster::{RasterBand, RasterLayer, Resampling},
    warp::{transform_points, transform_rect},
};

/// band name of the raw fire detection class in the fire source
pub const FIRE_SOURCE_BAND: &str = "FireMask";
pub const ELEVATION_SOURCE_BAND: &str = "elevation";
pub const DROUGHT_SOURCE_BAND: &str = "pdsi";
pub const VEGETATION_SOURCE_BAND: &str = "NDVI";
pub const POPULATION_SOURCE_BAND: &str = "population_density";

/// weather source bands and the example bands they become
pub const WEATHER_BANDS: [(&str, FireBand); 7] = [
    ("th", FireBand::WindDirection),
    ("vs", FireBand::WindSpeed),
    ("erc", FireBand::EnergyReleaseComponent),
    ("bi", FireBand::BurnIndex),
    ("pr", FireBand::Precipitation),
    ("tmmn", FireBand::TemperatureMin),
    ("tmmx", FireBand::TemperatureMax),
];

fn default_lookback_days ()->u32 { 30 }
fn default_region_crs ()->String { "EPSG:4326".to_string() }

#[derive(Debug,Clone,Serialize,Deserialize)]
pub struct CompositorConfig {
    /// vertices of the region of interest in `region_crs` units (lon,lat degrees by default)
    pub region: Vec<[f64;2]>,
    #[serde(default="default_region_crs")]
    pub region_crs: String,

    /// CRS of the target grid and the exported records
    pub crs: String,
    /// pixel size in `crs` units
    pub scale: f64,

    #[serde(default="default_lookback_days")]
    pub lookback_days: u32,

    #[serde(default)]
    pub export: ExportConfig,
}

impl CompositorConfig {
    /// the region as configured, in `region_crs`
    pub fn region_polygon (&self)->Polygon<f64> {
        polygon( &self.region)
    }

    /// the region with its vertices transformed into `crs`
    pub fn projected_region (&self)->Result<Polygon<f64>> {
        Ok( polygon( &transform_points( &self.region, &self.region_crs, &self.crs)?) )
    }

    /// the grid in `crs` that covers the bounding rectangle of the region
    pub fn target_grid (&self)->Result<GridSpec> {
        let bounds = self.region_polygon().bounding_rect()
            .ok_or_else( || grid_mismatch("empty region"))?;
        let bounds = transform_rect( &bounds, &self.region_crs, &self.crs)?;
        GridSpec::from_bounds( &self.crs, &bounds, self.scale)
    }
}

fn polygon (vertices: &[[f64;2]])->Polygon<f64> {
    let coords: Vec<Coord<f64>> = vertices.iter().map( |[x,y]| Coord { x: *x, y: *y }).collect();
    Polygon::new( LineString::new(coords), vec![])
}

pub struct FireDataCompositor {
    config: CompositorConfig,
    region: Polygon<f64>,
    grid: GridSpec,
    sources: FireDataSources,
    sink: Arc<dyn ExportSink>,
}

impl FireDataCompositor {
    pub fn new (config: CompositorConfig, sources: FireDataSources, sink: Arc<dyn ExportSink>)->Result<Self> {
        let region = config.projected_region()?;
        let grid = config.target_grid()?;
        info!("fire data grid: {grid}");
        Ok( FireDataCompositor { config, region, grid, sources, sink } )
    }

    pub fn grid (&self)->&GridSpec { &self.grid }

    pub fn config (&self)->&CompositorConfig { &self.config }

    /// query `catalog`, pick `bands` and warp them onto the target grid
    fn fetch (&self, catalog: &dyn RasterCatalog, time: TimeFilter, bands: &[&str], method: Resampling)->Result<RasterLayer> {
        let query = CatalogQuery::new( time, self.grid.bounds()).with_crs( &self.grid.crs);
        let layer = catalog.query( &query)?;
        debug!("{} -> {} {:?}", query, layer.source, layer.time_start);
        layer.select( bands)?.resample( &self.grid, method)
    }

    fn fire_mask (&self, date: NaiveDate, band: FireBand)->Result<RasterLayer> {
        let layer = self.fetch( self.sources.fire.as_ref(), TimeFilter::Day(date), &[FIRE_SOURCE_BAND], Resampling::Nearest)?;
        layer.map_values( recode_value).rename( &[band.name()])
    }

    /// the co-registered 13 band stack for `date`
    pub fn composite (&self, date: NaiveDate)->Result<CompositeExample> {
        let next_day = date.succ_opt().ok_or_else( || op_failed( format!("no day after {date}")))?;
        let lookback = TimeFilter::Lookback { end: date, days: self.config.lookback_days };

        let weather_src: Vec<&str> = WEATHER_BANDS.iter().map( |(src,_)| *src).collect();
        let weather_dst: Vec<&str> = WEATHER_BANDS.iter().map( |(_,b)| b.name()).collect();

        let layers = [
            self.fire_mask( date, FireBand::FireMask)?,
            self.fire_mask( next_day, FireBand::FireMaskNextDay)?,
            self.fetch( self.sources.elevation.as_ref(), TimeFilter::Static, &[ELEVATION_SOURCE_BAND], Resampling::Nearest)?
                .rename( &[FireBand::Elevation.name()])?,
            self.fetch( self.sources.weather.as_ref(), TimeFilter::Day(date), weather_src.as_slice(), Resampling::Bicubic)?
                .rename( weather_dst.as_slice())?,
            self.fetch( self.sources.drought.as_ref(), lookback, &[DROUGHT_SOURCE_BAND], Resampling::Bicubic)?
                .rename( &[FireBand::DroughtIndex.name()])?,
            self.fetch( self.sources.vegetation.as_ref(), lookback, &[VEGETATION_SOURCE_BAND], Resampling::Nearest)?
                .rename( &[FireBand::Vegetation.name()])?,
            self.fetch( self.sources.population.as_ref(), TimeFilter::Latest, &[POPULATION_SOURCE_BAND], Resampling::Nearest)?
                .rename( &[FireBand::PopulationDensity.name()])?,
        ];

        let bands: Vec<&RasterBand> = layers.iter().flat_map( |l| l.bands.iter()).collect();
        let mut stack: Vec<Array2<f32>> = Vec::with_capacity( bands.len());
        for fb in FireBand::iter() {
            let band = bands.iter().find( |b| b.name == fb.name())
                .ok_or_else( || missing_band( "composite", fb.name()))?;
            stack.push( band.data.mapv( |v| v as f32));
        }

        CompositeExample::new( date, self.grid.clone(), stack)
    }

    /// composite `date` and submit it for export. This does not wait for the export to complete
    pub async fn export_day (&self, date: NaiveDate)->Result<SubmissionHandle> {
        let image = self.composite( date)?;
        let export = &self.config.export;

        let task = ExportTask {
            description: export.description.clone(),
            file_name: export.file_name( date),
            folder: export.folder.clone(),
            region: self.region.clone(),
            crs: self.config.crs.clone(),
            scale: self.config.scale,
            patch_size: export.patch_size,
            compressed: export.compressed,
            image,
        };

        let handle = self.sink.submit( task).await?;
        info!("submitted export {} for {date} as {}", handle.id, handle.file_name);
        Ok(handle)
    }
}
