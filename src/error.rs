/* Licensed to the Apache Software Foundation (ASF) under one
 * or more contributor license agreements.  See the NOTICE file
 * distributed with this work for additional information
 * regarding copyright ownership.  The ASF licenses this file
 * to you under the Apache License, Version 2.0 (the
 * "License"); you may not use this file except in compliance
 * with the License.  You may obtain a copy of the License at
 *
 *   http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing,
 * software distributed under the License is distributed on an
 * "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
 * KIND, either express or implied.  See the License for the
 * specific language governing permissions and limitations
 * under the License.
 */

use crate::record::{Offset, PartitionId};
use std::fmt::Display;
use strum::{EnumDiscriminants, FromRepr, IntoStaticStr};
use thiserror::Error;

/// The error type shared by the processor, decoders, event handlers and log
/// client implementations.
///
/// Decoders and handlers return `ViewError` to signal failure; transport
/// implementations pick the client-side variants. Each variant carries a
/// stable numeric code.
#[derive(Clone, Debug, Error, EnumDiscriminants, IntoStaticStr, FromRepr, Default)]
#[repr(u32)]
#[strum(serialize_all = "snake_case")]
#[strum_discriminants(
    vis(pub),
    derive(FromRepr, IntoStaticStr),
    strum(serialize_all = "snake_case")
)]
pub enum ViewError {
    #[default]
    #[error("Error")]
    Error = 1,
    #[error("Invalid format")]
    InvalidFormat = 2,
    #[error("Invalid UTF-8")]
    InvalidUtf8 = 3,
    #[error("Invalid number encoding")]
    InvalidNumberEncoding = 4,
    #[error("Key decoder is not registered")]
    MissingKeyDecoder = 10,
    #[error("Value decoder is not registered")]
    MissingValueDecoder = 11,
    #[error("Event handler error: {0}")]
    EventHandler(String) = 20,
    #[error("Disconnected")]
    Disconnected = 30,
    #[error("Client shutdown")]
    ClientShutdown = 31,
    #[error("Log client error: {0}")]
    Client(String) = 32,
}

impl ViewError {
    pub fn as_code(&self) -> u32 {
        // SAFETY: ViewError specifies #[repr(u32)] representation.
        // https://doc.rust-lang.org/reference/items/enumerations.html#pointer-casting
        unsafe { *(self as *const Self as *const u32) }
    }

    pub fn as_string(&self) -> &'static str {
        self.into()
    }

    pub fn from_code(code: u32) -> Self {
        ViewError::from_repr(code).unwrap_or(ViewError::Error)
    }

    pub fn from_code_as_string(code: u32) -> &'static str {
        ViewErrorDiscriminants::from_repr(code)
            .map(|discriminant| discriminant.into())
            .unwrap_or("unknown error code")
    }
}

impl PartialEq for ViewError {
    fn eq(&self, other: &Self) -> bool {
        self.as_code() == other.as_code()
    }
}

/// Which half of a record failed to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStage {
    Key,
    Value,
}

impl Display for DecodeStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeStage::Key => write!(f, "key"),
            DecodeStage::Value => write!(f, "value"),
        }
    }
}

/// A recoverable, per-record decode failure.
///
/// Carries the partition, offset and stage of the rejected record so the
/// caller can log the rejection and resume deterministically. The store is
/// never mutated and no change event is dispatched for a rejected record.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("Cannot decode record {stage} at partition: {partition}, offset: {offset}: {source}")]
pub struct DecodeError {
    /// The partition the rejected record was delivered on.
    pub partition: PartitionId,
    /// The offset of the rejected record within its partition.
    pub offset: Offset,
    /// Whether the key or the value failed to decode.
    pub stage: DecodeStage,
    /// The error returned by the decoder.
    #[source]
    pub source: Box<ViewError>,
}
