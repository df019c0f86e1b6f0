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
use crate::record::{Offset, PartitionId};
use serde::{Deserialize, Serialize};
use strum::{EnumDiscriminants, IntoStaticStr};

/// A single observed state transition of the materialized view.
///
/// One event is constructed per successfully decoded record, carrying the
/// provenance of the record that caused it. Events are immutable, never
/// merged or batched, and never constructed for control conditions.
/// Equality is value-based on all fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, EnumDiscriminants)]
#[serde(tag = "type", rename_all = "snake_case")]
#[strum_discriminants(
    name(ChangeEventKind),
    vis(pub),
    derive(IntoStaticStr),
    strum(serialize_all = "snake_case")
)]
pub enum ChangeEvent<K, V> {
    /// A key was set to a new value.
    SetElement {
        key: K,
        value: V,
        partition: PartitionId,
        offset: Offset,
    },
    /// A key was deleted by a tombstone.
    DeleteElement {
        key: K,
        partition: PartitionId,
        offset: Offset,
    },
}

impl<K, V> ChangeEvent<K, V> {
    /// The discriminant of this event.
    pub fn kind(&self) -> ChangeEventKind {
        self.into()
    }

    /// The key this event applies to.
    pub fn key(&self) -> &K {
        match self {
            ChangeEvent::SetElement { key, .. } => key,
            ChangeEvent::DeleteElement { key, .. } => key,
        }
    }

    /// The new value, for set events.
    pub fn value(&self) -> Option<&V> {
        match self {
            ChangeEvent::SetElement { value, .. } => Some(value),
            ChangeEvent::DeleteElement { .. } => None,
        }
    }

    /// The partition of the record that caused this event.
    pub fn partition(&self) -> PartitionId {
        match self {
            ChangeEvent::SetElement { partition, .. } => *partition,
            ChangeEvent::DeleteElement { partition, .. } => *partition,
        }
    }

    /// The offset of the record that caused this event.
    pub fn offset(&self) -> Offset {
        match self {
            ChangeEvent::SetElement { offset, .. } => *offset,
            ChangeEvent::DeleteElement { offset, .. } => *offset,
        }
    }
}

/// The callback invoked for every change event, exactly once per decoded
/// record, in delivery order.
///
/// Dispatch is synchronous: a slow handler slows the whole pipeline. A
/// returned error propagates out of `process_event`; the store mutation for
/// that record is already committed and is not rolled back.
pub type EventHandler<K, V> = Box<dyn FnMut(&ChangeEvent<K, V>) -> Result<(), ViewError>>;
