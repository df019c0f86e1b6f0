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

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_with::base64::Base64;
use serde_with::serde_as;

/// The identifier of a partition within the log.
pub type PartitionId = u32;

/// A monotonically increasing per-partition position identifier.
pub type Offset = u64;

/// A single raw record delivered by the log client.
///
/// Records on a compacted log carry a key and either a payload (an upsert of
/// that key) or no payload (a tombstone, deleting the key). Offsets increase
/// monotonically within a partition; there is no ordering across partitions.
///
/// # Examples
///
/// ```
/// use compacted_view::Record;
///
/// let upsert = Record::upsert(0, 10, "42", "hi there");
/// assert!(!upsert.is_tombstone());
///
/// let tombstone = Record::tombstone(0, 11, "42");
/// assert!(tombstone.is_tombstone());
/// ```
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// The partition the record was delivered on.
    pub partition: PartitionId,
    /// The offset of the record within its partition.
    pub offset: Offset,
    /// The raw key bytes.
    #[serde_as(as = "Base64")]
    pub key: Bytes,
    /// The raw payload bytes. Absent for tombstones.
    #[serde_as(as = "Option<Base64>")]
    pub payload: Option<Bytes>,
}

impl Record {
    /// Creates an upsert record for the given key and payload.
    pub fn upsert(
        partition: PartitionId,
        offset: Offset,
        key: impl Into<Bytes>,
        payload: impl Into<Bytes>,
    ) -> Self {
        Self {
            partition,
            offset,
            key: key.into(),
            payload: Some(payload.into()),
        }
    }

    /// Creates a tombstone record for the given key.
    pub fn tombstone(partition: PartitionId, offset: Offset, key: impl Into<Bytes>) -> Self {
        Self {
            partition,
            offset,
            key: key.into(),
            payload: None,
        }
    }

    /// Whether this record deletes its key.
    ///
    /// Brokers surface key-only messages either as a null payload or as a
    /// zero-length one depending on the transport, so both count.
    pub fn is_tombstone(&self) -> bool {
        self.payload.as_ref().map_or(true, |payload| payload.is_empty())
    }
}

impl std::fmt::Display for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let payload = match &self.payload {
            Some(payload) if !payload.is_empty() => match std::str::from_utf8(payload) {
                Ok(text) if text.len() > 50 => format!("'{}...' ({}B)", &text[..47], payload.len()),
                Ok(text) => format!("'{text}'"),
                Err(_) => format!("<binary {}B>", payload.len()),
            },
            _ => "<tombstone>".to_owned(),
        };
        write!(
            f,
            "[{partition}:{offset}] {payload}",
            partition = self.partition,
            offset = self.offset
        )
    }
}
