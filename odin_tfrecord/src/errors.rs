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

use thiserror::Error;

pub type Result<T> = std::result::Result<T, OdinTfRecordError>;

#[derive(Error,Debug)]
pub enum OdinTfRecordError {
    #[error("IO error {0}")]
    IOError( #[from] std::io::Error),

    /// framing or checksum violation in a record stream
    #[error("corrupt record: {0}")]
    CorruptRecord(String),

    /// payload is not a valid tf.Example protobuf
    #[error("protobuf decode error: {0}")]
    ProtoError(String),

    /// decoded example does not match the expected feature schema
    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),
}

pub fn corrupt_record (msg: impl ToString)->OdinTfRecordError {
    OdinTfRecordError::CorruptRecord(msg.to_string())
}

pub fn proto_error (msg: impl ToString)->OdinTfRecordError {
    OdinTfRecordError::ProtoError(msg.to_string())
}

pub fn schema_mismatch (msg: impl ToString)->OdinTfRecordError {
    OdinTfRecordError::SchemaMismatch(msg.to_string())
}
