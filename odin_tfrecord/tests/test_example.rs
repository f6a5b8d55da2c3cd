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
#![allow(unused)]

use odin_tfrecord::{Example, Feature, FloatSchema, OdinTfRecordError};

#[test]
fn test_wire_bytes() {
    // hand assembled: Example{ features{ feature{ key:"x" value{ float_list{ value:[1.0] }}}}}
    let expected: Vec<u8> = vec![
        0x0a, 0x0f,                   // Example.features (len 15)
          0x0a, 0x0d,                 // Features.feature map entry (len 13)
            0x0a, 0x01, b'x',         // key
            0x12, 0x08,               // value: Feature (len 8)
              0x12, 0x06,             // Feature.float_list (len 6)
                0x0a, 0x04,           // FloatList.value packed (len 4)
                  0x00, 0x00, 0x80, 0x3f
    ];

    let mut ex = Example::new();
    ex.insert( "x", Feature::FloatList( vec![1.0]));
    assert_eq!( ex.encode(), expected);
    assert_eq!( Example::decode( &expected).unwrap(), ex);
}

#[test]
fn test_unpacked_floats_and_unknown_fields() {
    let buf: Vec<u8> = vec![
        0x0a, 0x17,
          0x0a, 0x13,
            0x0a, 0x01, b'y',
            0x12, 0x0e,
              0x12, 0x0c,
                0x0d, 0x00, 0x00, 0x00, 0x40,   // unpacked value 2.0 (fixed32)
                0x0d, 0x00, 0x00, 0x40, 0x40,   // unpacked value 3.0
                0x18, 0x07,                     // unknown varint field 3
          0x10, 0x01                            // unknown varint field 2 in Features
    ];
    let ex = Example::decode( &buf).unwrap();
    assert_eq!( ex.get("y"), Some( &Feature::FloatList( vec![2.0, 3.0])));
}

#[test]
fn test_mixed_features() {
    let mut ex = Example::new();
    ex.insert( "f", Feature::FloatList( vec![0.5, -1.25, f32::MAX]));
    ex.insert( "i", Feature::Int64List( vec![0, 1, -1, i64::MAX, i64::MIN]));
    ex.insert( "b", Feature::BytesList( vec![ b"abc".to_vec(), Vec::new()]));
    ex.insert( "e", Feature::FloatList( Vec::new()));

    let decoded = Example::decode( &ex.encode()).unwrap();
    assert_eq!( decoded, ex);
}

#[test]
fn test_truncated_protobuf() {
    let mut ex = Example::new();
    ex.insert( "x", Feature::FloatList( vec![1.0, 2.0]));
    let buf = ex.encode();

    let res = Example::decode( &buf[..buf.len()-3]);
    assert!( matches!( res, Err(OdinTfRecordError::ProtoError(_))));
}

#[test]
fn test_schema() {
    let schema = FloatSchema::new( &["a", "b"], [2,2]);

    let mut ex = Example::new();
    ex.insert( "b", Feature::FloatList( vec![5.0, 6.0, 7.0, 8.0]));
    ex.insert( "extra", Feature::Int64List( vec![42]));
    ex.insert( "a", Feature::FloatList( vec![1.0, 2.0, 3.0, 4.0]));

    let values = schema.decode( &ex).unwrap();
    assert_eq!( values, vec![ vec![1.0, 2.0, 3.0, 4.0], vec![5.0, 6.0, 7.0, 8.0]]);

    let reencoded = schema.encode( &values).unwrap();
    assert_eq!( reencoded.features.iter().map( |(k,_)| k.as_str()).collect::<Vec<_>>(), vec!["a","b"]);
    assert_eq!( schema.decode_record( &reencoded.encode()).unwrap(), values);
}

#[test]
fn test_schema_mismatch() {
    let schema = FloatSchema::new( &["a", "b"], [2,2]);

    let mut missing = Example::new();
    missing.insert( "a", Feature::FloatList( vec![0.0; 4]));
    assert!( matches!( schema.decode(&missing), Err(OdinTfRecordError::SchemaMismatch(_))));

    let mut wrong_len = missing.clone();
    wrong_len.insert( "b", Feature::FloatList( vec![0.0; 5]));
    assert!( matches!( schema.decode(&wrong_len), Err(OdinTfRecordError::SchemaMismatch(_))));

    let mut wrong_kind = missing.clone();
    wrong_kind.insert( "b", Feature::Int64List( vec![0; 4]));
    assert!( matches!( schema.decode(&wrong_kind), Err(OdinTfRecordError::SchemaMismatch(_))));
}
