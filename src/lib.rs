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

mod client;
mod decoder;
mod error;
mod event;
mod partitions;
mod processor;
mod processor_builder;
mod record;
mod store;

// Errors
pub use error::{DecodeError, DecodeStage, ViewError, ViewErrorDiscriminants};
// Log client contract
pub use client::{LogClient, LogUnit};
// Records
pub use record::{Offset, PartitionId, Record};
// Decoders
pub use decoder::{KeyDecoder, ValueDecoder};
// Change events
pub use event::{ChangeEvent, ChangeEventKind, EventHandler};
// Materialized view
pub use store::{MaterializedStore, Snapshot};
// Partition lifecycle
pub use partitions::PartitionSet;
// Processing loop
pub use processor::{CompactedStreamProcessor, ProcessOutcome};
pub use processor_builder::CompactedStreamProcessorBuilder;
