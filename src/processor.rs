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

use crate::client::{LogClient, LogUnit};
use crate::decoder::{KeyDecoder, ValueDecoder};
use crate::error::{DecodeError, DecodeStage, ViewError};
use crate::event::{ChangeEvent, ChangeEventKind, EventHandler};
use crate::partitions::PartitionSet;
use crate::processor_builder::CompactedStreamProcessorBuilder;
use crate::record::{Offset, PartitionId, Record};
use crate::store::MaterializedStore;
use bytes::Bytes;
use std::hash::Hash;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// What a single `process_event` call did.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessOutcome {
    /// A data record was decoded, applied to the view and dispatched.
    Applied {
        partition: PartitionId,
        offset: Offset,
        kind: ChangeEventKind,
    },
    /// Key or value decoding failed; the record was skipped and the view is
    /// untouched.
    Rejected(DecodeError),
    /// The reader caught up with the current end of a partition.
    EndOfPartition { partition: PartitionId },
    /// Partitions were assigned to this processor.
    Assigned(Vec<PartitionId>),
    /// Partitions were revoked from this processor.
    Revoked(Vec<PartitionId>),
    /// No unit was available within the timeout.
    Idle,
}

/// Builds and maintains a materialized view from a compacted stream.
///
/// The processor pulls one classified unit per [`process_event`] call from
/// its [`LogClient`], decodes data records with the registered decoders,
/// applies them to the [`MaterializedStore`] and dispatches one
/// [`ChangeEvent`] per record to the registered handler.
///
/// Everything happens synchronously on the calling thread: there is no
/// internal locking and no background work. An application sharing the
/// processor across threads must serialize access itself.
///
/// Events for a given partition are dispatched in strictly increasing offset
/// order. No ordering is guaranteed across partitions; the store reflects
/// the most recently processed record for each key.
///
/// [`process_event`]: CompactedStreamProcessor::process_event
pub struct CompactedStreamProcessor<K, V, C> {
    client: C,
    store: MaterializedStore<K, V>,
    partitions: PartitionSet,
    key_decoder: Option<KeyDecoder<K>>,
    value_decoder: Option<ValueDecoder<K, V>>,
    event_handler: Option<EventHandler<K, V>>,
}

impl<K, V, C> CompactedStreamProcessor<K, V, C>
where
    K: Hash + Eq + Clone,
    V: Clone,
    C: LogClient,
{
    /// Creates a processor with no decoders and no event handler registered.
    ///
    /// Decoders are mandatory before processing starts; the event handler is
    /// optional. See [`CompactedStreamProcessor::builder`] for fluent
    /// construction.
    pub fn new(client: C) -> Self {
        Self {
            client,
            store: MaterializedStore::new(),
            partitions: PartitionSet::new(),
            key_decoder: None,
            value_decoder: None,
            event_handler: None,
        }
    }

    pub fn builder(client: C) -> CompactedStreamProcessorBuilder<K, V, C> {
        CompactedStreamProcessorBuilder::new(client)
    }

    /// Registers the key decoder, replacing any previous one.
    pub fn set_key_decoder(&mut self, decoder: impl Fn(&Bytes) -> Result<K, ViewError> + 'static) {
        self.key_decoder = Some(Box::new(decoder));
    }

    /// Registers the value decoder, replacing any previous one.
    pub fn set_value_decoder(
        &mut self,
        decoder: impl Fn(&K, &Bytes) -> Result<V, ViewError> + 'static,
    ) {
        self.value_decoder = Some(Box::new(decoder));
    }

    /// Registers the event handler, replacing any previous one.
    ///
    /// At most one handler is registered at a time. With no handler, decoded
    /// records still update the store and the events are dropped.
    pub fn set_event_handler(
        &mut self,
        handler: impl FnMut(&ChangeEvent<K, V>) -> Result<(), ViewError> + 'static,
    ) {
        self.event_handler = Some(Box::new(handler));
    }

    /// Unregisters the event handler.
    pub fn clear_event_handler(&mut self) {
        self.event_handler = None;
    }

    /// The current value for `key`.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.store.get(key)
    }

    /// The materialized view.
    pub fn store(&self) -> &MaterializedStore<K, V> {
        &self.store
    }

    /// The partitions currently assigned to this processor.
    pub fn partitions(&self) -> &PartitionSet {
        &self.partitions
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn client_mut(&mut self) -> &mut C {
        &mut self.client
    }

    /// Pulls and processes exactly one unit of work, blocking up to
    /// `timeout`.
    ///
    /// Fails fast with [`ViewError::MissingKeyDecoder`] or
    /// [`ViewError::MissingValueDecoder`] before touching the log client if
    /// a decoder is not registered. Log client errors and event handler
    /// errors are propagated verbatim; a handler error does not roll back
    /// the store mutation that preceded dispatch.
    ///
    /// Decode failures are not errors: they are reported as
    /// [`ProcessOutcome::Rejected`] and the caller is expected to keep
    /// pumping.
    pub fn process_event(&mut self, timeout: Duration) -> Result<ProcessOutcome, ViewError> {
        if self.key_decoder.is_none() {
            return Err(ViewError::MissingKeyDecoder);
        }
        if self.value_decoder.is_none() {
            return Err(ViewError::MissingValueDecoder);
        }

        let Some(unit) = self.client.poll(timeout)? else {
            trace!("no unit available within {timeout:?}");
            return Ok(ProcessOutcome::Idle);
        };

        match unit {
            LogUnit::Record(record) => self.apply(record),
            LogUnit::EndOfPartition { partition } => {
                trace!("reached end of partition {partition}");
                Ok(ProcessOutcome::EndOfPartition { partition })
            }
            LogUnit::PartitionsAssigned(partitions) => {
                debug!("partitions assigned: {partitions:?}");
                self.partitions.assign(&partitions);
                Ok(ProcessOutcome::Assigned(partitions))
            }
            LogUnit::PartitionsRevoked(partitions) => {
                debug!("partitions revoked: {partitions:?}");
                self.partitions.revoke(&partitions);
                Ok(ProcessOutcome::Revoked(partitions))
            }
        }
    }

    /// Pumps [`process_event`] until no unit is available, returning the
    /// number of applied records.
    ///
    /// `timeout` bounds each individual pull, not the whole drain. Rejected
    /// records and control units are pumped through without counting.
    ///
    /// [`process_event`]: CompactedStreamProcessor::process_event
    pub fn process_available(&mut self, timeout: Duration) -> Result<u32, ViewError> {
        let mut applied = 0;
        loop {
            match self.process_event(timeout)? {
                ProcessOutcome::Applied { .. } => applied += 1,
                ProcessOutcome::Idle => return Ok(applied),
                _ => {}
            }
        }
    }

    fn apply(&mut self, record: Record) -> Result<ProcessOutcome, ViewError> {
        let partition = record.partition;
        let offset = record.offset;

        let key = {
            let Some(decode_key) = self.key_decoder.as_ref() else {
                return Err(ViewError::MissingKeyDecoder);
            };
            match decode_key(&record.key) {
                Ok(key) => key,
                Err(source) => {
                    return Ok(self.reject(partition, offset, DecodeStage::Key, source));
                }
            }
        };

        let event = match record.payload.as_ref().filter(|payload| !payload.is_empty()) {
            Some(payload) => {
                let value = {
                    let Some(decode_value) = self.value_decoder.as_ref() else {
                        return Err(ViewError::MissingValueDecoder);
                    };
                    match decode_value(&key, payload) {
                        Ok(value) => value,
                        Err(source) => {
                            return Ok(self.reject(partition, offset, DecodeStage::Value, source));
                        }
                    }
                };
                trace!("set key at partition: {partition}, offset: {offset}");
                self.store.set(key.clone(), value.clone());
                ChangeEvent::SetElement {
                    key,
                    value,
                    partition,
                    offset,
                }
            }
            None => {
                trace!("delete key at partition: {partition}, offset: {offset}");
                self.store.remove(&key);
                ChangeEvent::DeleteElement {
                    key,
                    partition,
                    offset,
                }
            }
        };

        let kind = event.kind();
        self.dispatch(&event)?;
        Ok(ProcessOutcome::Applied {
            partition,
            offset,
            kind,
        })
    }

    fn dispatch(&mut self, event: &ChangeEvent<K, V>) -> Result<(), ViewError> {
        match self.event_handler.as_mut() {
            Some(handler) => handler(event),
            None => {
                trace!("no event handler registered, dropping event");
                Ok(())
            }
        }
    }

    fn reject(
        &self,
        partition: PartitionId,
        offset: Offset,
        stage: DecodeStage,
        source: ViewError,
    ) -> ProcessOutcome {
        warn!(
            "Failed to decode record {stage} at partition: {partition}, offset: {offset}: {source}, skipping record..."
        );
        ProcessOutcome::Rejected(DecodeError {
            partition,
            offset,
            stage,
            source: Box::new(source),
        })
    }

    pub(crate) fn with_parts(
        client: C,
        key_decoder: Option<KeyDecoder<K>>,
        value_decoder: Option<ValueDecoder<K, V>>,
        event_handler: Option<EventHandler<K, V>>,
    ) -> Self {
        Self {
            client,
            store: MaterializedStore::new(),
            partitions: PartitionSet::new(),
            key_decoder,
            value_decoder,
            event_handler,
        }
    }
}
