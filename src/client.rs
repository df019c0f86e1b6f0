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

use crate::error::ViewError;
use crate::record::{PartitionId, Record};
use std::time::Duration;

/// One classified unit of work pulled from the log.
///
/// Control conditions (end of partition, rebalance notifications) are
/// separate variants, never mixed into the data-record path.
#[derive(Debug, Clone, PartialEq)]
pub enum LogUnit {
    /// A data record carrying a key and an optional payload.
    Record(Record),
    /// The reader caught up with the current end of a partition.
    EndOfPartition { partition: PartitionId },
    /// Partitions were assigned to this reader.
    PartitionsAssigned(Vec<PartitionId>),
    /// Partitions were revoked from this reader.
    PartitionsRevoked(Vec<PartitionId>),
}

/// The log transport as seen by the processor.
///
/// Implementations wrap a concrete broker client. They own partition
/// assignment, replay start offsets, offset commits and reconnection; the
/// processor only pulls classified units and never reinterprets
/// transport-level error semantics.
///
/// # Example (in-memory implementation for testing)
///
/// ```
/// use std::collections::VecDeque;
/// use std::time::Duration;
///
/// use compacted_view::{LogClient, LogUnit, ViewError};
///
/// struct ScriptedClient {
///     units: VecDeque<LogUnit>,
/// }
///
/// impl LogClient for ScriptedClient {
///     fn poll(&mut self, _timeout: Duration) -> Result<Option<LogUnit>, ViewError> {
///         Ok(self.units.pop_front())
///     }
/// }
/// ```
pub trait LogClient {
    /// Pulls the next unit from the log, blocking up to `timeout`.
    ///
    /// Returns `Ok(None)` when nothing was ready within `timeout`. A zero
    /// timeout means "return immediately if nothing is ready". Errors are
    /// surfaced to the caller of `process_event` verbatim.
    fn poll(&mut self, timeout: Duration) -> Result<Option<LogUnit>, ViewError>;
}
