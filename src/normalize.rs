//!
//! This module maps arbitrary backend payloads onto canonical records.
//!
//! The queue backend has shipped several envelope conventions and both snake_case and camelCase field names.
//! Every synonym listed here is part of the compatibility surface. Nothing in this module fails: malformed input
//! degrades to empty collections and defaulted fields.
//!
use serde_json::{Map, Value};

use crate::coerce;
use crate::model::{ConsumerGroup, Message, MessagePage, Queue, QueueCollection, Topic};

/// Envelope keys probed for every collection endpoint, in order.
pub const ENVELOPE_KEYS: [&str; 4] = ["items", "data", "records", "results"];

const QUEUE_NAME_KEYS: [&str; 4] = ["queue_name", "queueName", "name", "id"];
const QUEUE_ID_KEYS: [&str; 3] = ["id", "queue_id", "queueId"];
const MESSAGE_COUNT_KEYS: [&str; 2] = ["message_count", "messageCount"];
const AVAILABLE_KEYS: [&str; 2] = ["available_messages", "availableMessages"];
const IN_FLIGHT_KEYS: [&str; 2] = ["in_flight_messages", "inFlightMessages"];

/// A canonical record that can be built from one element of a collection payload.
pub trait Canonical: Sized {
    /// Endpoint specific envelope keys, probed after [`ENVELOPE_KEYS`].
    const COLLECTION_KEYS: &'static [&'static str];

    /// Map one raw element. `index` is the element's 0-based position and seeds synthesized identifiers.
    fn from_raw(raw: &Value, index: usize) -> Self;
}

/// Locate the list of records inside `payload`.
///
/// 1. A bare sequence is returned as-is.
/// 2. For an object, [`ENVELOPE_KEYS`] then `endpoint_keys` are probed and the first sequence wins.
/// 3. Otherwise the first sequence-valued property, in document order, is returned.
/// 4. Anything else yields an empty slice.
///
/// Only top-level properties are inspected.
pub fn extract_list<'a>(payload: &'a Value, endpoint_keys: &[&str]) -> &'a [Value] {
    match payload {
        Value::Array(items) => items,
        Value::Object(record) => ENVELOPE_KEYS
            .iter()
            .chain(endpoint_keys.iter())
            .filter_map(|key| record.get(*key))
            .chain(record.values())
            .find_map(|value| value.as_array())
            .map(Vec::as_slice)
            .unwrap_or(&[]),
        _ => &[],
    }
}

/// Extract and map every record of a collection payload.
pub fn normalize<T: Canonical>(payload: &Value) -> Vec<T> {
    extract_list(payload, T::COLLECTION_KEYS)
        .iter()
        .enumerate()
        .map(|(index, raw)| T::from_raw(raw, index))
        .collect()
}

fn empty() -> &'static Map<String, Value> {
    static EMPTY: std::sync::OnceLock<Map<String, Value>> = std::sync::OnceLock::new();
    EMPTY.get_or_init(Map::new)
}

fn as_record(raw: &Value) -> &Map<String, Value> {
    raw.as_object().unwrap_or_else(|| empty())
}

fn optional_u32(record: &Map<String, Value>, keys: &[&str]) -> Option<u32> {
    coerce::first_count(record, keys).and_then(|n| u32::try_from(n).ok())
}

/// Map a raw queue record. `index` is 0-based; the synthesized fallback name is `queue-{index + 1}`.
pub fn map_queue(raw: &Value, index: usize) -> Queue {
    // Some deployments list queues as bare names.
    if let Value::String(name) = raw {
        if !name.is_empty() {
            return Queue {
                id: name.clone(),
                queue_name: name.clone(),
                ..Default::default()
            };
        }
    }

    let record = as_record(raw);
    let queue_name = coerce::first_string(record, &QUEUE_NAME_KEYS)
        .unwrap_or_else(|| format!("queue-{}", index.saturating_add(1)));
    let id = coerce::first_text(record, &QUEUE_ID_KEYS).unwrap_or_else(|| queue_name.clone());

    let available_messages = coerce::first_count(record, &AVAILABLE_KEYS).unwrap_or(0);
    let in_flight_messages = coerce::first_count(record, &IN_FLIGHT_KEYS).unwrap_or(0);
    let message_count = coerce::first_count(record, &MESSAGE_COUNT_KEYS)
        .unwrap_or(available_messages.saturating_add(in_flight_messages));

    let permissions = record
        .get("permissions")
        .map(coerce::string_list)
        .unwrap_or_default();

    Queue {
        id,
        queue_name,
        message_count,
        available_messages,
        in_flight_messages,
        permissions,
        description: coerce::first_string(record, &["description"]),
        created_at: coerce::first_text(record, &["created_at", "createdAt"]),
        updated_at: coerce::first_text(record, &["updated_at", "updatedAt"]),
    }
}

impl Canonical for Queue {
    const COLLECTION_KEYS: &'static [&'static str] = &["queues", "Queues"];

    fn from_raw(raw: &Value, index: usize) -> Self {
        map_queue(raw, index)
    }
}

/// Normalize a `GET /queues` payload.
///
/// `count` falls back to the number of queues returned.
pub fn queue_collection(payload: &Value) -> QueueCollection {
    let queues: Vec<Queue> = normalize(payload);
    let (count, api_key_description) = match payload.as_object() {
        Some(record) => (
            coerce::first_count(record, &["count", "total", "totalCount"]),
            coerce::first_string(record, &["api_key_description", "apiKeyDescription"]),
        ),
        None => (None, None),
    };
    QueueCollection {
        count: count.unwrap_or(queues.len() as u64),
        queues,
        api_key_description,
    }
}

fn looks_like_queue(record: &Map<String, Value>) -> bool {
    ["queue_name", "queueName", "name"]
        .iter()
        .any(|key| record.get(*key).map_or(false, Value::is_string))
}

/// Normalize a payload that describes one queue: a bare record, a record under `queue`/`data`, or a collection.
///
/// From a collection the record matching `queue_id` by name or id is chosen, falling back to the first one.
pub fn queue_record(payload: &Value, queue_id: &str) -> Option<Queue> {
    let record = payload.as_object()?;
    if looks_like_queue(record) {
        return Some(map_queue(payload, 0));
    }
    for key in ["queue", "data"] {
        if let Some(inner) = record.get(key) {
            if inner.as_object().map_or(false, looks_like_queue) {
                return Some(map_queue(inner, 0));
            }
        }
    }

    let mut queues: Vec<Queue> = normalize(payload);
    let matched = queues
        .iter()
        .position(|queue| queue.queue_name == queue_id || queue.id == queue_id);
    match matched {
        Some(position) => Some(queues.swap_remove(position)),
        None if !queues.is_empty() => Some(queues.swap_remove(0)),
        None => None,
    }
}

/// Map a raw message record. The synthesized fallback id is `message-{index + 1}`.
pub fn map_message(raw: &Value, index: usize) -> Message {
    let record = as_record(raw);
    Message {
        id: coerce::first_text(record, &["id", "message_id", "messageId", "MessageId"])
            .unwrap_or_else(|| format!("message-{}", index.saturating_add(1))),
        timestamp: coerce::first_text(
            record,
            &["timestamp", "sent_timestamp", "sentTimestamp", "created_at", "createdAt"],
        )
        .unwrap_or_default(),
        status: coerce::first_text(record, &["status", "state"]),
        visibility_timeout: coerce::first_text(record, &["visibility_timeout", "visibilityTimeout"]),
        receipt_handle: coerce::first_text(record, &["receipt_handle", "receiptHandle"]),
        receive_count: coerce::first_count(record, &["receive_count", "receiveCount"]).unwrap_or(0),
        message_body: coerce::first_value(
            record,
            &["message_body", "messageBody", "body", "content", "payload"],
        )
        .cloned()
        .unwrap_or(Value::Null),
        queue_id: coerce::first_text(record, &["queue_id", "queueId"]),
    }
}

impl Canonical for Message {
    const COLLECTION_KEYS: &'static [&'static str] = &["messages", "Messages"];

    fn from_raw(raw: &Value, index: usize) -> Self {
        map_message(raw, index)
    }
}

/// Normalize a `GET /queues/{id}/messages` payload requested with `offset` and `limit`.
///
/// Values echoed by the backend take precedence over the requested ones. When `hasMore` is absent it is derived
/// from `offset + count < total`.
pub fn message_page(payload: &Value, offset: u64, limit: u64) -> MessagePage {
    let record = payload.as_object().unwrap_or_else(|| empty());
    let offset = coerce::first_count(record, &["offset"]).unwrap_or(offset);
    let limit = coerce::first_count(record, &["limit"]).unwrap_or(limit);

    let first_index = usize::try_from(offset).unwrap_or(usize::MAX);
    let messages: Vec<Message> = extract_list(payload, Message::COLLECTION_KEYS)
        .iter()
        .enumerate()
        .map(|(index, raw)| map_message(raw, first_index.saturating_add(index)))
        .collect();

    let count = coerce::first_count(record, &["count"]).unwrap_or(messages.len() as u64);
    let total = coerce::first_count(record, &["total", "total_count", "totalCount"])
        .unwrap_or(offset.saturating_add(count));
    let has_more = coerce::first_bool(record, &["hasMore", "has_more"])
        .unwrap_or(offset.saturating_add(count) < total);

    MessagePage {
        messages,
        count,
        total,
        offset,
        limit,
        has_more,
    }
}

/// Map a raw topic record. The synthesized fallback id is `topic-{index + 1}`.
pub fn map_topic(raw: &Value, index: usize) -> Topic {
    let record = as_record(raw);
    let name = coerce::first_string(record, &["name", "topic_name", "topicName"]);
    let id = coerce::first_text(record, &["id", "topic_id", "topicId"])
        .or_else(|| name.clone())
        .unwrap_or_else(|| format!("topic-{}", index.saturating_add(1)));
    Topic {
        name: name.unwrap_or_else(|| id.clone()),
        id,
        partitions: optional_u32(record, &["partitions", "partition_count", "partitionCount"]),
        replication_factor: optional_u32(record, &["replication_factor", "replicationFactor"]),
    }
}

impl Canonical for Topic {
    const COLLECTION_KEYS: &'static [&'static str] = &["topics", "Topics"];

    fn from_raw(raw: &Value, index: usize) -> Self {
        map_topic(raw, index)
    }
}

/// Normalize a payload that describes one topic, either bare or under `topic`/`data`.
pub fn topic_record(payload: &Value) -> Option<Topic> {
    let record = payload.as_object()?;
    if let Some(inner) = ["topic", "data"]
        .iter()
        .filter_map(|key| record.get(*key))
        .find(|value| value.is_object())
    {
        return Some(map_topic(inner, 0));
    }
    Some(map_topic(payload, 0))
}

fn member_id(member: &Value) -> Option<String> {
    match member {
        Value::Object(record) => {
            coerce::first_text(record, &["id", "member_id", "memberId", "client_id", "clientId", "name"])
        }
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Map a raw consumer group record. The synthesized fallback id is `group-{index + 1}`.
pub fn map_consumer_group(raw: &Value, index: usize) -> ConsumerGroup {
    let record = as_record(raw);
    let name = coerce::first_string(record, &["name", "group_name", "groupName"]);
    let id = coerce::first_text(record, &["id", "group_id", "groupId"])
        .or_else(|| name.clone())
        .unwrap_or_else(|| format!("group-{}", index.saturating_add(1)));
    let members = record
        .get("members")
        .and_then(Value::as_array)
        .map(|members| members.iter().filter_map(member_id).collect())
        .unwrap_or_default();
    ConsumerGroup {
        name: name.unwrap_or_else(|| id.clone()),
        id,
        members,
        queue_id: coerce::first_text(record, &["queue_id", "queueId", "queue"]),
    }
}

impl Canonical for ConsumerGroup {
    const COLLECTION_KEYS: &'static [&'static str] =
        &["consumerGroups", "consumer_groups", "groups"];

    fn from_raw(raw: &Value, index: usize) -> Self {
        map_consumer_group(raw, index)
    }
}
