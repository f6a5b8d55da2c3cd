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

//! recoding of MODIS (MOD14A1) `FireMask` pixel classes into the two-flag fire mask that is stored in
//! exported records. The stored value packs a "fire" flag (value 2) and a "no usable observation" flag
//! (value 1):
//! ```text
//!   raw  0..2  not processed       -> 1 NoData
//!   raw  3     non-fire water      -> 0 NoFire
//!   raw  4     cloud               -> 1 NoData
//!   raw  5     non-fire land       -> 0 NoFire
//!   raw  6     unknown             -> 1 NoData
//!   raw  7..9  fire (low,nom,high) -> 2 Fire
//! ```
//! `3` (fire + no-data) is representable but cannot be produced from valid raw codes.
//! The corpus filter keys on the exact value `2`, so changes to this mapping have to go together with
//! [`is_active_fire`].

use serde::{Deserialize,Serialize};

/// lowest raw confidence class that counts as fire
pub const RAW_FIRE_THRESHOLD: u8 = 7;

#[derive(Debug,Clone,Copy,PartialEq,Eq,Hash,Serialize,Deserialize)]
#[repr(u8)]
pub enum FireMaskClass {
    NoFire = 0,
    NoData = 1,
    Fire = 2,
    FireNoData = 3,
}

impl FireMaskClass {
    pub fn value (self)->u8 { self as u8 }

    pub fn from_value (v: u8)->Option<Self> {
        match v {
            0 => Some(FireMaskClass::NoFire),
            1 => Some(FireMaskClass::NoData),
            2 => Some(FireMaskClass::Fire),
            3 => Some(FireMaskClass::FireNoData),
            _ => None
        }
    }

    pub fn is_fire (self)->bool { self.value() & 2 != 0 }
}

fn classify (c: f64)->FireMaskClass {
    let fire = if c >= RAW_FIRE_THRESHOLD as f64 { 2 } else { 0 };
    let no_data = if c <= 2.0 || c == 4.0 || c == 6.0 { 1 } else { 0 };
    // the combination is always a valid class
    FireMaskClass::from_value( fire | no_data).unwrap_or(FireMaskClass::NoData)
}

/// recode a raw fire detection class: `2*[c >= 7] | ([c <= 2] or [c == 4] or [c == 6])`.
/// A missing observation is reported as `NoData`
pub fn recode (raw: Option<u8>)->FireMaskClass {
    match raw {
        Some(c) => classify( c as f64),
        None => FireMaskClass::NoData
    }
}

/// raster version of [`recode`]. `NaN` is a missing observation. Other values are compared as they are,
/// so fractional codes between the listed classes (e.g. `4.5`) are `NoFire`
pub fn recode_value (raw: f64)->f64 {
    let class = if raw.is_nan() { FireMaskClass::NoData } else { classify(raw) };
    class.value() as f64
}

/// the retention predicate of the corpus filter, applied to the maximum of a record's fire mask
pub fn is_active_fire (mask_max: f32)->bool {
    mask_max == FireMaskClass::Fire.value() as f32
}
