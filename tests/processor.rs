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

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use bytes::Bytes;
use compacted_view::{
    ChangeEvent, ChangeEventKind, CompactedStreamProcessor, DecodeStage, LogClient, LogUnit,
    ProcessOutcome, Record, ViewError,
};

const TIMEOUT: Duration = Duration::ZERO;

/// Replays a fixed script of poll results, then reports nothing available.
struct ScriptedLogClient {
    units: VecDeque<Result<Option<LogUnit>, ViewError>>,
    polls: u32,
}

impl ScriptedLogClient {
    fn new(units: impl IntoIterator<Item = LogUnit>) -> Self {
        Self {
            units: units.into_iter().map(|unit| Ok(Some(unit))).collect(),
            polls: 0,
        }
    }

    fn failing_with(error: ViewError) -> Self {
        Self {
            units: VecDeque::from([Err(error)]),
            polls: 0,
        }
    }
}

impl LogClient for ScriptedLogClient {
    fn poll(&mut self, _timeout: Duration) -> Result<Option<LogUnit>, ViewError> {
        self.polls += 1;
        self.units.pop_front().unwrap_or(Ok(None))
    }
}

fn decode_key(key: &Bytes) -> Result<i32, ViewError> {
    std::str::from_utf8(key.as_ref())
        .map_err(|_| ViewError::InvalidUtf8)?
        .parse()
        .map_err(|_| ViewError::InvalidNumberEncoding)
}

fn decode_value(_key: &i32, payload: &Bytes) -> Result<String, ViewError> {
    String::from_utf8(payload.to_vec()).map_err(|_| ViewError::InvalidUtf8)
}

type Events = Rc<RefCell<Vec<ChangeEvent<i32, String>>>>;

fn processor(
    units: impl IntoIterator<Item = LogUnit>,
) -> (
    CompactedStreamProcessor<i32, String, ScriptedLogClient>,
    Events,
) {
    let events: Events = Rc::new(RefCell::new(Vec::new()));
    let sink = events.clone();
    let processor = CompactedStreamProcessor::builder(ScriptedLogClient::new(units))
        .key_decoder(decode_key)
        .value_decoder(decode_value)
        .event_handler(move |event: &ChangeEvent<i32, String>| {
            sink.borrow_mut().push(event.clone());
            Ok(())
        })
        .build();
    (processor, events)
}

#[test]
fn should_materialize_reference_scenario() {
    let (mut processor, events) = processor([
        LogUnit::PartitionsAssigned(vec![0, 1]),
        LogUnit::Record(Record::upsert(0, 0, "42", "hi there")),
        LogUnit::Record(Record::upsert(1, 0, "1337", "heh")),
        LogUnit::Record(Record::tombstone(0, 1, "42")),
        LogUnit::EndOfPartition { partition: 0 },
        LogUnit::EndOfPartition { partition: 1 },
    ]);

    for _ in 0..10 {
        processor.process_event(TIMEOUT).unwrap();
    }

    assert_eq!(1, processor.store().len());
    assert_eq!(Some(&"heh".to_owned()), processor.get(&1337));
    assert_eq!(None, processor.get(&42));

    let events = events.borrow();
    let set_count = events
        .iter()
        .filter(|event| event.kind() == ChangeEventKind::SetElement)
        .count();
    let delete_count = events
        .iter()
        .filter(|event| event.kind() == ChangeEventKind::DeleteElement)
        .count();
    assert_eq!(2, set_count);
    assert_eq!(1, delete_count);
    assert_eq!(
        vec![
            ChangeEvent::SetElement {
                key: 42,
                value: "hi there".to_owned(),
                partition: 0,
                offset: 0,
            },
            ChangeEvent::SetElement {
                key: 1337,
                value: "heh".to_owned(),
                partition: 1,
                offset: 0,
            },
            ChangeEvent::DeleteElement {
                key: 42,
                partition: 0,
                offset: 1,
            },
        ],
        *events
    );
}

#[test]
fn should_keep_last_write_within_partition() {
    let (mut processor, _events) = processor([
        LogUnit::Record(Record::upsert(0, 0, "42", "first")),
        LogUnit::Record(Record::upsert(0, 1, "42", "second")),
        LogUnit::Record(Record::upsert(0, 2, "42", "third")),
    ]);

    processor.process_available(TIMEOUT).unwrap();

    assert_eq!(Some(&"third".to_owned()), processor.get(&42));
    assert_eq!(1, processor.store().len());
}

#[test]
fn should_delete_key_when_last_record_is_tombstone() {
    let (mut processor, _events) = processor([
        LogUnit::Record(Record::upsert(0, 0, "42", "first")),
        LogUnit::Record(Record::upsert(0, 1, "42", "second")),
        LogUnit::Record(Record::tombstone(0, 2, "42")),
    ]);

    processor.process_available(TIMEOUT).unwrap();

    assert_eq!(None, processor.get(&42));
    assert!(processor.store().is_empty());
}

#[test]
fn should_not_touch_other_keys() {
    let (mut processor, _events) = processor([
        LogUnit::Record(Record::upsert(0, 0, "1", "one")),
        LogUnit::Record(Record::upsert(0, 1, "2", "two")),
        LogUnit::Record(Record::tombstone(0, 2, "1")),
        LogUnit::Record(Record::upsert(0, 3, "1", "one again")),
    ]);

    processor.process_available(TIMEOUT).unwrap();

    assert_eq!(Some(&"two".to_owned()), processor.get(&2));
    assert_eq!(Some(&"one again".to_owned()), processor.get(&1));
}

#[test]
fn should_count_events_per_processed_record() {
    let (mut processor, events) = processor([
        LogUnit::Record(Record::upsert(0, 0, "1", "one")),
        LogUnit::Record(Record::upsert(0, 1, Bytes::from(vec![0xff]), "bad key")),
        LogUnit::Record(Record::upsert(0, 2, "2", Bytes::from(vec![0xff]))),
        LogUnit::Record(Record::tombstone(0, 3, "1")),
        LogUnit::Record(Record::upsert(0, 4, "3", "three")),
    ]);

    processor.process_available(TIMEOUT).unwrap();

    let events = events.borrow();
    let set_count = events
        .iter()
        .filter(|event| event.kind() == ChangeEventKind::SetElement)
        .count();
    let delete_count = events
        .iter()
        .filter(|event| event.kind() == ChangeEventKind::DeleteElement)
        .count();
    assert_eq!(2, set_count);
    assert_eq!(1, delete_count);
}

#[test]
fn should_apply_replayed_record_idempotently() {
    let record = Record::upsert(0, 5, "42", "hi there");
    let (mut processor, events) = processor([
        LogUnit::Record(record.clone()),
        LogUnit::Record(record.clone()),
    ]);

    processor.process_available(TIMEOUT).unwrap();

    assert_eq!(1, processor.store().len());
    assert_eq!(Some(&"hi there".to_owned()), processor.get(&42));
    assert_eq!(2, events.borrow().len());
}

#[test]
fn should_preserve_offset_order_per_partition() {
    let (mut processor, events) = processor([
        LogUnit::Record(Record::upsert(0, 0, "1", "a")),
        LogUnit::Record(Record::upsert(1, 0, "2", "b")),
        LogUnit::Record(Record::upsert(1, 1, "3", "c")),
        LogUnit::Record(Record::upsert(0, 1, "4", "d")),
        LogUnit::Record(Record::upsert(1, 2, "5", "e")),
        LogUnit::Record(Record::upsert(0, 2, "6", "f")),
    ]);

    processor.process_available(TIMEOUT).unwrap();

    let events = events.borrow();
    for partition in [0, 1] {
        let offsets: Vec<_> = events
            .iter()
            .filter(|event| event.partition() == partition)
            .map(|event| event.offset())
            .collect();
        assert!(
            offsets.windows(2).all(|pair| pair[0] < pair[1]),
            "offsets not strictly increasing on partition {partition}: {offsets:?}"
        );
    }
}

#[test]
fn should_fail_fast_without_key_decoder() {
    let mut processor: CompactedStreamProcessor<i32, String, _> =
        CompactedStreamProcessor::new(ScriptedLogClient::new([]));
    processor.set_value_decoder(decode_value);

    let result = processor.process_event(TIMEOUT);

    assert_eq!(Err(ViewError::MissingKeyDecoder), result);
    assert_eq!(0, processor.client().polls);
}

#[test]
fn should_fail_fast_without_value_decoder() {
    let mut processor: CompactedStreamProcessor<i32, String, _> =
        CompactedStreamProcessor::new(ScriptedLogClient::new([]));
    processor.set_key_decoder(decode_key);

    let result = processor.process_event(TIMEOUT);

    assert_eq!(Err(ViewError::MissingValueDecoder), result);
    assert_eq!(0, processor.client().polls);
}

#[test]
fn should_skip_record_on_key_decode_failure() {
    let (mut processor, events) = processor([
        LogUnit::Record(Record::upsert(0, 0, Bytes::from(vec![0xff]), "value")),
        LogUnit::Record(Record::upsert(0, 1, "42", "hi there")),
    ]);

    let outcome = processor.process_event(TIMEOUT).unwrap();
    let ProcessOutcome::Rejected(error) = outcome else {
        panic!("expected rejection, got {outcome:?}");
    };
    assert_eq!(0, error.partition);
    assert_eq!(0, error.offset);
    assert_eq!(DecodeStage::Key, error.stage);
    assert!(processor.store().is_empty());
    assert!(events.borrow().is_empty());

    processor.process_available(TIMEOUT).unwrap();
    assert_eq!(Some(&"hi there".to_owned()), processor.get(&42));
}

#[test]
fn should_skip_record_on_value_decode_failure() {
    let (mut processor, events) = processor([
        LogUnit::Record(Record::upsert(0, 0, "42", "hi there")),
        LogUnit::Record(Record::upsert(0, 1, "42", Bytes::from(vec![0xff]))),
    ]);

    processor.process_event(TIMEOUT).unwrap();
    let outcome = processor.process_event(TIMEOUT).unwrap();

    let ProcessOutcome::Rejected(error) = outcome else {
        panic!("expected rejection, got {outcome:?}");
    };
    assert_eq!(DecodeStage::Value, error.stage);
    assert_eq!(1, error.offset);
    assert_eq!(ViewError::InvalidUtf8, *error.source);
    // The previously materialized value survives the rejected overwrite.
    assert_eq!(Some(&"hi there".to_owned()), processor.get(&42));
    assert_eq!(1, events.borrow().len());
}

#[test]
fn should_propagate_handler_error_after_store_commit() {
    let mut processor = CompactedStreamProcessor::builder(ScriptedLogClient::new([
        LogUnit::Record(Record::upsert(0, 0, "42", "hi there")),
    ]))
    .key_decoder(decode_key)
    .value_decoder(decode_value)
    .event_handler(|_event: &ChangeEvent<i32, String>| {
        Err(ViewError::EventHandler("handler is broken".to_owned()))
    })
    .build();

    let result = processor.process_event(TIMEOUT);

    assert_eq!(
        Err(ViewError::EventHandler("handler is broken".to_owned())),
        result
    );
    assert_eq!(Some(&"hi there".to_owned()), processor.get(&42));
}

#[test]
fn should_track_partition_lifecycle() {
    let (mut processor, events) = processor([
        LogUnit::PartitionsAssigned(vec![0, 1, 2]),
        LogUnit::PartitionsRevoked(vec![0]),
    ]);

    let outcome = processor.process_event(TIMEOUT).unwrap();
    assert_eq!(ProcessOutcome::Assigned(vec![0, 1, 2]), outcome);
    assert_eq!(3, processor.partitions().len());

    let outcome = processor.process_event(TIMEOUT).unwrap();
    assert_eq!(ProcessOutcome::Revoked(vec![0]), outcome);
    assert!(!processor.partitions().contains(0));
    assert!(processor.partitions().contains(1));
    assert!(processor.partitions().contains(2));
    assert!(events.borrow().is_empty());
}

#[test]
fn should_retain_state_after_partition_revocation() {
    let (mut processor, _events) = processor([
        LogUnit::PartitionsAssigned(vec![0]),
        LogUnit::Record(Record::upsert(0, 0, "42", "hi there")),
        LogUnit::PartitionsRevoked(vec![0]),
    ]);

    processor.process_available(TIMEOUT).unwrap();

    assert!(processor.partitions().is_empty());
    assert_eq!(Some(&"hi there".to_owned()), processor.get(&42));
}

#[test]
fn should_update_store_without_event_handler() {
    let mut processor = CompactedStreamProcessor::builder(ScriptedLogClient::new([
        LogUnit::Record(Record::upsert(0, 0, "42", "hi there")),
    ]))
    .key_decoder(decode_key)
    .value_decoder(decode_value)
    .build();

    let outcome = processor.process_event(TIMEOUT).unwrap();

    assert_eq!(
        ProcessOutcome::Applied {
            partition: 0,
            offset: 0,
            kind: ChangeEventKind::SetElement,
        },
        outcome
    );
    assert_eq!(Some(&"hi there".to_owned()), processor.get(&42));
}

#[test]
fn should_treat_empty_payload_as_tombstone() {
    let (mut processor, events) = processor([
        LogUnit::Record(Record::upsert(0, 0, "42", "hi there")),
        LogUnit::Record(Record::upsert(0, 1, "42", Bytes::new())),
    ]);

    processor.process_available(TIMEOUT).unwrap();

    assert_eq!(None, processor.get(&42));
    assert_eq!(
        Some(&ChangeEvent::DeleteElement {
            key: 42,
            partition: 0,
            offset: 1,
        }),
        events.borrow().last()
    );
}

#[test]
fn should_surface_end_of_partition_without_side_effects() {
    let (mut processor, events) = processor([LogUnit::EndOfPartition { partition: 3 }]);

    let outcome = processor.process_event(TIMEOUT).unwrap();

    assert_eq!(ProcessOutcome::EndOfPartition { partition: 3 }, outcome);
    assert!(processor.store().is_empty());
    assert!(events.borrow().is_empty());
}

#[test]
fn should_return_idle_when_nothing_is_available() {
    let (mut processor, _events) = processor([]);

    let outcome = processor.process_event(TIMEOUT).unwrap();

    assert_eq!(ProcessOutcome::Idle, outcome);
}

#[test]
fn should_drain_available_units_and_count_applied_records() {
    let (mut processor, _events) = processor([
        LogUnit::PartitionsAssigned(vec![0]),
        LogUnit::Record(Record::upsert(0, 0, "1", "one")),
        LogUnit::Record(Record::upsert(0, 1, Bytes::from(vec![0xff]), "bad key")),
        LogUnit::Record(Record::tombstone(0, 2, "1")),
        LogUnit::EndOfPartition { partition: 0 },
    ]);

    let applied = processor.process_available(TIMEOUT).unwrap();

    assert_eq!(2, applied);
}

#[test]
fn should_propagate_client_error() {
    let mut processor = CompactedStreamProcessor::builder(ScriptedLogClient::failing_with(
        ViewError::Disconnected,
    ))
    .key_decoder(decode_key)
    .value_decoder(decode_value)
    .build();

    let result = processor.process_event(TIMEOUT);

    assert_eq!(Err(ViewError::Disconnected), result);
}

#[test]
fn should_replace_event_handler_on_rebind() {
    let (mut processor, first_events) = processor([
        LogUnit::Record(Record::upsert(0, 0, "1", "one")),
        LogUnit::Record(Record::upsert(0, 1, "2", "two")),
    ]);
    processor.process_event(TIMEOUT).unwrap();

    let second_events: Events = Rc::new(RefCell::new(Vec::new()));
    let sink = second_events.clone();
    processor.set_event_handler(move |event: &ChangeEvent<i32, String>| {
        sink.borrow_mut().push(event.clone());
        Ok(())
    });
    processor.process_event(TIMEOUT).unwrap();

    assert_eq!(1, first_events.borrow().len());
    assert_eq!(1, second_events.borrow().len());
    assert_eq!(&2, second_events.borrow()[0].key());
}
