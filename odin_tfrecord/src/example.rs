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

//! protobuf wire codec for `tf.train.Example` records
//! ```text
//!   Example  { Features features = 1; }
//!   Features { map<string,Feature> feature = 1; }      // map entry: { key = 1; value = 2; }
//!   Feature  { oneof kind { BytesList bytes_list = 1; FloatList float_list = 2; Int64List int64_list = 3; } }
//!   XxxList  { repeated xxx value = 1; }                // float and int64 values are packed
//! ```

use crate::errors::*;

const WT_VARINT: u8 = 0;
const WT_FIXED64: u8 = 1;
const WT_LEN: u8 = 2;
const WT_FIXED32: u8 = 5;

#[derive(Debug,Clone,PartialEq)]
pub enum Feature {
    BytesList(Vec<Vec<u8>>),
    FloatList(Vec<f32>),
    Int64List(Vec<i64>),
    /// a feature without any `kind` set
    Unset,
}

impl Feature {
    pub fn as_float_list (&self)->Option<&[f32]> {
        if let Feature::FloatList(v) = self { Some(v.as_slice()) } else { None }
    }

    pub fn kind_name (&self)->&'static str {
        match self {
            Feature::BytesList(_) => "bytes_list",
            Feature::FloatList(_) => "float_list",
            Feature::Int64List(_) => "int64_list",
            Feature::Unset => "unset",
        }
    }
}

/// a tf.Example with its features in wire order
#[derive(Debug,Clone,PartialEq,Default)]
pub struct Example {
    pub features: Vec<(String,Feature)>,
}

impl Example {
    pub fn new ()->Self { Example { features: Vec::new() } }

    pub fn with_capacity (n: usize)->Self { Example { features: Vec::with_capacity(n) } }

    /// add or replace a feature
    pub fn insert (&mut self, name: impl Into<String>, feature: Feature) {
        let name = name.into();
        if let Some(e) = self.features.iter_mut().find( |(k,_)| *k == name) {
            e.1 = feature;
        } else {
            self.features.push( (name,feature));
        }
    }

    pub fn get (&self, name: &str)->Option<&Feature> {
        self.features.iter().find( |(k,_)| k == name).map( |(_,f)| f)
    }

    pub fn len (&self)->usize { self.features.len() }

    pub fn is_empty (&self)->bool { self.features.is_empty() }

    pub fn encode (&self)->Vec<u8> {
        let mut features = Vec::new();
        for (name,feature) in &self.features {
            let mut entry = Vec::new();
            write_len_field( &mut entry, 1, name.as_bytes());
            write_len_field( &mut entry, 2, &encode_feature(feature));
            write_len_field( &mut features, 1, &entry);
        }

        let mut buf = Vec::with_capacity( features.len() + 8);
        write_len_field( &mut buf, 1, &features);
        buf
    }

    pub fn decode (buf: &[u8])->Result<Example> {
        let mut example = Example::new();
        let mut r = ProtoReader::new(buf);

        while let Some((field,wt)) = r.read_tag()? {
            if field == 1 && wt == WT_LEN {
                decode_features( r.read_len_delimited()?, &mut example)?;
            } else {
                r.skip(wt)?;
            }
        }
        Ok(example)
    }
}

/* #region encoding ************************************************************************************/

fn write_varint (buf: &mut Vec<u8>, mut v: u64) {
    while v >= 0x80 {
        buf.push( (v as u8) | 0x80);
        v >>= 7;
    }
    buf.push( v as u8);
}

fn write_tag (buf: &mut Vec<u8>, field: u32, wt: u8) {
    write_varint( buf, ((field as u64) << 3) | wt as u64);
}

fn write_len_field (buf: &mut Vec<u8>, field: u32, data: &[u8]) {
    write_tag( buf, field, WT_LEN);
    write_varint( buf, data.len() as u64);
    buf.extend_from_slice( data);
}

fn encode_feature (feature: &Feature)->Vec<u8> {
    let mut buf = Vec::new();
    match feature {
        Feature::BytesList(values) => {
            let mut list = Vec::new();
            for v in values { write_len_field( &mut list, 1, v) }
            write_len_field( &mut buf, 1, &list);
        }
        Feature::FloatList(values) => {
            let mut list = Vec::new();
            if !values.is_empty() {
                let mut packed = Vec::with_capacity( values.len() * 4);
                for v in values { packed.extend_from_slice( &v.to_le_bytes()) }
                write_len_field( &mut list, 1, &packed);
            }
            write_len_field( &mut buf, 2, &list);
        }
        Feature::Int64List(values) => {
            let mut list = Vec::new();
            if !values.is_empty() {
                let mut packed = Vec::new();
                for v in values { write_varint( &mut packed, *v as u64) }
                write_len_field( &mut list, 1, &packed);
            }
            write_len_field( &mut buf, 3, &list);
        }
        Feature::Unset => {}
    }
    buf
}

/* #endregion encoding */

/* #region decoding ************************************************************************************/

struct ProtoReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ProtoReader<'a> {
    fn new (buf: &'a [u8])->Self { ProtoReader { buf, pos: 0 } }

    fn is_empty (&self)->bool { self.pos >= self.buf.len() }

    fn read_varint (&mut self)->Result<u64> {
        let mut v: u64 = 0;
        let mut shift = 0;
        loop {
            if shift >= 64 { return Err( proto_error("varint overflow")) }
            let b = *self.buf.get(self.pos).ok_or_else( || proto_error("truncated varint"))?;
            self.pos += 1;
            v |= ((b & 0x7f) as u64) << shift;
            if b & 0x80 == 0 { return Ok(v) }
            shift += 7;
        }
    }

    fn read_tag (&mut self)->Result<Option<(u32,u8)>> {
        if self.is_empty() { return Ok(None) }
        let key = self.read_varint()?;
        let field = (key >> 3) as u32;
        if field == 0 { return Err( proto_error("invalid field number 0")) }
        Ok( Some( (field, (key & 0x7) as u8)) )
    }

    fn read_bytes (&mut self, n: usize)->Result<&'a [u8]> {
        let end = self.pos.checked_add(n).filter( |end| *end <= self.buf.len())
            .ok_or_else( || proto_error( format!("field length {n} exceeds message")))?;
        let buf: &'a [u8] = self.buf;
        let data = &buf[self.pos..end];
        self.pos = end;
        Ok(data)
    }

    fn read_len_delimited (&mut self)->Result<&'a [u8]> {
        let n = self.read_varint()? as usize;
        self.read_bytes(n)
    }

    fn read_fixed32 (&mut self)->Result<[u8;4]> {
        let b = self.read_bytes(4)?;
        Ok( [b[0],b[1],b[2],b[3]] )
    }

    fn skip (&mut self, wt: u8)->Result<()> {
        match wt {
            WT_VARINT => { self.read_varint()?; }
            WT_FIXED64 => { self.read_bytes(8)?; }
            WT_LEN => { self.read_len_delimited()?; }
            WT_FIXED32 => { self.read_bytes(4)?; }
            _ => return Err( proto_error( format!("unsupported wire type {wt}")))
        }
        Ok(())
    }
}

fn decode_features (buf: &[u8], example: &mut Example)->Result<()> {
    let mut r = ProtoReader::new(buf);
    while let Some((field,wt)) = r.read_tag()? {
        if field == 1 && wt == WT_LEN {
            let (name,feature) = decode_map_entry( r.read_len_delimited()?)?;
            example.insert( name, feature); // last entry wins, as for any protobuf map
        } else {
            r.skip(wt)?;
        }
    }
    Ok(())
}

fn decode_map_entry (buf: &[u8])->Result<(String,Feature)> {
    let mut r = ProtoReader::new(buf);
    let mut name = String::new();
    let mut feature = Feature::Unset;

    while let Some((field,wt)) = r.read_tag()? {
        match (field,wt) {
            (1,WT_LEN) => {
                name = String::from_utf8( r.read_len_delimited()?.to_vec())
                    .map_err( |_| proto_error("feature name is not valid UTF-8"))?;
            }
            (2,WT_LEN) => feature = decode_feature( r.read_len_delimited()?)?,
            _ => r.skip(wt)?
        }
    }
    Ok( (name,feature) )
}

fn decode_feature (buf: &[u8])->Result<Feature> {
    let mut r = ProtoReader::new(buf);
    let mut feature = Feature::Unset;

    while let Some((field,wt)) = r.read_tag()? {
        match (field,wt) {
            (1,WT_LEN) => feature = Feature::BytesList( decode_bytes_list( r.read_len_delimited()?)?),
            (2,WT_LEN) => feature = Feature::FloatList( decode_float_list( r.read_len_delimited()?)?),
            (3,WT_LEN) => feature = Feature::Int64List( decode_int64_list( r.read_len_delimited()?)?),
            _ => r.skip(wt)?
        }
    }
    Ok(feature)
}

fn decode_bytes_list (buf: &[u8])->Result<Vec<Vec<u8>>> {
    let mut r = ProtoReader::new(buf);
    let mut values = Vec::new();
    while let Some((field,wt)) = r.read_tag()? {
        if field == 1 && wt == WT_LEN {
            values.push( r.read_len_delimited()?.to_vec());
        } else {
            r.skip(wt)?;
        }
    }
    Ok(values)
}

fn decode_float_list (buf: &[u8])->Result<Vec<f32>> {
    let mut r = ProtoReader::new(buf);
    let mut values = Vec::new();
    while let Some((field,wt)) = r.read_tag()? {
        match (field,wt) {
            (1,WT_LEN) => { // packed
                let packed = r.read_len_delimited()?;
                if packed.len() % 4 != 0 {
                    return Err( proto_error( format!("packed float list length {} not a multiple of 4", packed.len())))
                }
                values.reserve( packed.len() / 4);
                for c in packed.chunks_exact(4) {
                    values.push( f32::from_le_bytes( [c[0],c[1],c[2],c[3]]));
                }
            }
            (1,WT_FIXED32) => values.push( f32::from_le_bytes( r.read_fixed32()?)),
            _ => r.skip(wt)?
        }
    }
    Ok(values)
}

fn decode_int64_list (buf: &[u8])->Result<Vec<i64>> {
    let mut r = ProtoReader::new(buf);
    let mut values = Vec::new();
    while let Some((field,wt)) = r.read_tag()? {
        match (field,wt) {
            (1,WT_LEN) => {
                let mut pr = ProtoReader::new( r.read_len_delimited()?);
                while !pr.is_empty() {
                    values.push( pr.read_varint()? as i64);
                }
            }
            (1,WT_VARINT) => values.push( r.read_varint()? as i64),
            _ => r.skip(wt)?
        }
    }
    Ok(values)
}

/* #endregion decoding */
