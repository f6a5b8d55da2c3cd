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

use odin_firedata::fire_mask::*;
use odin_firedata::filter::max_value;

#[test]
fn test_recode_table() {
    use FireMaskClass::*;
    let expected = [NoData, NoData, NoData, NoFire, NoData, NoFire, NoData, Fire, Fire, Fire];

    for (c, exp) in expected.iter().enumerate() {
        let class = recode( Some(c as u8));
        println!("{c} -> {class:?}");
        assert_eq!( class, *exp);
    }
    assert_eq!( recode(None), NoData);

    // codes above the documented range still count as fire
    assert_eq!( recode( Some(200)), Fire);
}

#[test]
fn test_recode_is_pure() {
    for c in 0..=255u8 {
        assert_eq!( recode(Some(c)), recode(Some(c)));
        assert_ne!( recode(Some(c)), FireMaskClass::FireNoData);
    }
}

#[test]
fn test_recode_values() {
    assert_eq!( recode_value(8.0), 2.0);
    assert_eq!( recode_value(7.9), 2.0);
    assert_eq!( recode_value(7.0), 2.0);
    assert_eq!( recode_value(6.9), 0.0);
    assert_eq!( recode_value(6.0), 1.0);
    assert_eq!( recode_value(4.5), 0.0);
    assert_eq!( recode_value(2.5), 0.0);
    assert_eq!( recode_value(2.0), 1.0);
    assert_eq!( recode_value(5.0), 0.0);
    assert_eq!( recode_value(3.0), 0.0);
    assert_eq!( recode_value(-4.0), 1.0);
    assert_eq!( recode_value(f64::NAN), 1.0);
}

#[test]
fn test_class_values() {
    for v in 0..4u8 {
        let class = FireMaskClass::from_value(v).unwrap();
        assert_eq!( class.value(), v);
        assert_eq!( class.is_fire(), v >= 2);
    }
    assert!( FireMaskClass::from_value(4).is_none());
}

#[test]
fn test_filter_predicate() {
    let cases: [(&[f32], bool); 8] = [
        (&[0.0, 0.0, 0.0], false),
        (&[0.0, 1.0, 1.0], false),
        (&[0.0, 1.0, 2.0], true),
        (&[2.0, 2.0, 2.0], true),
        (&[1.0, 2.0, 0.0], true),
        (&[0.0, 2.0, 3.0], false), // max is 3, not 2
        (&[3.0], false),
        (&[1.0, 2.0, f32::NAN], false),
    ];

    for (values, keep) in cases {
        let max = max_value(values);
        println!("{values:?} -> max {max} -> {}", is_active_fire(max));
        assert_eq!( is_active_fire(max), keep);
    }
}

#[test]
fn test_max_value() {
    assert_eq!( max_value( &[-3.0, -1.0, -2.0]), -1.0);
    assert!( max_value( &[]).is_nan());
    assert!( max_value( &[f32::NAN, 2.0]).is_nan());
}
