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

use crate::client::LogClient;
use crate::decoder::{KeyDecoder, ValueDecoder};
use crate::error::ViewError;
use crate::event::{ChangeEvent, EventHandler};
use crate::processor::CompactedStreamProcessor;
use bytes::Bytes;
use std::hash::Hash;

/// Fluent construction of a [`CompactedStreamProcessor`].
///
/// Decoders and the event handler can also be registered (and rebound) on
/// the built processor later; building without decoders is allowed, but
/// processing then fails fast with a configuration error.
pub struct CompactedStreamProcessorBuilder<K, V, C> {
    client: C,
    key_decoder: Option<KeyDecoder<K>>,
    value_decoder: Option<ValueDecoder<K, V>>,
    event_handler: Option<EventHandler<K, V>>,
}

impl<K, V, C> CompactedStreamProcessorBuilder<K, V, C>
where
    K: Hash + Eq + Clone,
    V: Clone,
    C: LogClient,
{
    pub(crate) fn new(client: C) -> Self {
        Self {
            client,
            key_decoder: None,
            value_decoder: None,
            event_handler: None,
        }
    }

    /// Sets the key decoder.
    pub fn key_decoder(self, decoder: impl Fn(&Bytes) -> Result<K, ViewError> + 'static) -> Self {
        Self {
            key_decoder: Some(Box::new(decoder)),
            ..self
        }
    }

    /// Sets the value decoder.
    pub fn value_decoder(
        self,
        decoder: impl Fn(&K, &Bytes) -> Result<V, ViewError> + 'static,
    ) -> Self {
        Self {
            value_decoder: Some(Box::new(decoder)),
            ..self
        }
    }

    /// Sets the event handler.
    pub fn event_handler(
        self,
        handler: impl FnMut(&ChangeEvent<K, V>) -> Result<(), ViewError> + 'static,
    ) -> Self {
        Self {
            event_handler: Some(Box::new(handler)),
            ..self
        }
    }

    /// Clears the event handler; the store is still maintained.
    pub fn without_event_handler(self) -> Self {
        Self {
            event_handler: None,
            ..self
        }
    }

    /// Builds the processor.
    pub fn build(self) -> CompactedStreamProcessor<K, V, C> {
        CompactedStreamProcessor::with_parts(
            self.client,
            self.key_decoder,
            self.value_decoder,
            self.event_handler,
        )
    }
}
