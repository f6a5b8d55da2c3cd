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

use crate::{errors::*, example::{Example,Feature}};

/// a fixed, externally supplied feature schema: every named feature is a float list with
/// `shape[0] * shape[1]` elements (row major). Records are not self-describing, hence readers and
/// writers have to agree on this
#[derive(Debug,Clone,PartialEq)]
pub struct FloatSchema {
    pub names: Vec<String>,
    pub shape: [usize;2],
}

impl FloatSchema {
    pub fn new<S: ToString> (names: &[S], shape: [usize;2])->Self {
        FloatSchema { names: names.iter().map( |s| s.to_string()).collect(), shape }
    }

    pub fn n_elements (&self)->usize { self.shape[0] * self.shape[1] }

    pub fn index_of (&self, name: &str)->Option<usize> {
        self.names.iter().position( |n| n == name)
    }

    /// extract the schema features in schema order. Features that are not part of the schema are ignored
    pub fn decode (&self, example: &Example)->Result<Vec<Vec<f32>>> {
        let n = self.n_elements();
        let mut values = Vec::with_capacity( self.names.len());

        for name in &self.names {
            match example.get(name) {
                Some(Feature::FloatList(v)) => {
                    if v.len() != n {
                        return Err( schema_mismatch( format!("feature '{}' has {} values, expected {} ({}x{})",
                                                             name, v.len(), n, self.shape[0], self.shape[1])))
                    }
                    values.push( v.clone());
                }
                Some(other) => {
                    return Err( schema_mismatch( format!("feature '{}' is a {}, expected float_list", name, other.kind_name())))
                }
                None => return Err( schema_mismatch( format!("missing feature '{}'", name)))
            }
        }
        Ok(values)
    }

    /// parse a raw record payload and extract the schema features
    pub fn decode_record (&self, data: &[u8])->Result<Vec<Vec<f32>>> {
        let example = Example::decode(data)?;
        self.decode( &example)
    }

    /// build an example that contains all schema features (in schema order) as flat float lists
    pub fn encode (&self, values: &[Vec<f32>])->Result<Example> {
        if values.len() != self.names.len() {
            return Err( schema_mismatch( format!("got {} features, schema has {}", values.len(), self.names.len())))
        }

        let n = self.n_elements();
        let mut example = Example::with_capacity( self.names.len());
        for (name,v) in self.names.iter().zip( values.iter()) {
            if v.len() != n {
                return Err( schema_mismatch( format!("feature '{}' has {} values, expected {}", name, v.len(), n)))
            }
            example.insert( name.as_str(), Feature::FloatList( v.clone()));
        }
        Ok(example)
    }
}
