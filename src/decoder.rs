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
use bytes::Bytes;

/// Decodes the raw key bytes of a record into a typed key.
///
/// Must be pure and side-effect-free from the processor's perspective. A
/// returned error marks the record as rejected: the store is left untouched
/// and processing continues with the next unit.
pub type KeyDecoder<K> = Box<dyn Fn(&Bytes) -> Result<K, ViewError>>;

/// Decodes the raw payload bytes of a record into a typed value.
///
/// Receives the already-decoded key, so implementations can pick a schema
/// per key. Same purity and failure contract as [`KeyDecoder`]. Never
/// invoked for tombstones.
pub type ValueDecoder<K, V> = Box<dyn Fn(&K, &Bytes) -> Result<V, ViewError>>;
