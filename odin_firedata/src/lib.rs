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

//! daily multi-source fire data composites, their export as 64x64 patch records and the reduction of
//! exported corpora to records with active fire

pub mod fire_mask;
pub mod grid;
pub mod raster;
pub mod warp;
pub mod bands;
pub mod catalog;
pub mod export;
pub mod compositor;
pub mod sweep;
pub mod filter;

mod config;
pub use config::*;

mod errors;
pub use errors::*;
