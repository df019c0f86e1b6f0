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

use crate::record::PartitionId;
use ahash::AHashSet;

/// The set of partitions currently assigned to this processor.
///
/// Driven by assignment and revocation notifications from the log client.
/// Independent from the key-indexed store: revoking a partition does not
/// purge keys whose last update came from it.
#[derive(Debug, Clone, Default)]
pub struct PartitionSet {
    partitions: AHashSet<PartitionId>,
}

impl PartitionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the given partitions to the set.
    pub fn assign(&mut self, partitions: &[PartitionId]) {
        self.partitions.extend(partitions.iter().copied());
    }

    /// Removes the given partitions from the set.
    pub fn revoke(&mut self, partitions: &[PartitionId]) {
        for partition in partitions {
            self.partitions.remove(partition);
        }
    }

    pub fn contains(&self, partition: PartitionId) -> bool {
        self.partitions.contains(&partition)
    }

    pub fn len(&self) -> usize {
        self.partitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = PartitionId> + '_ {
        self.partitions.iter().copied()
    }
}
