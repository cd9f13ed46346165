//!
//! Canonical records handed to presentation code.
//!
//! Records are immutable snapshots of backend state: they are rebuilt on every fetch and never patched in place.
//!
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::format;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Queue {
    /// Backend identifier. Equal to `queue_name` when the backend reports none.
    pub id: String,

    /// Display name, also used in URL paths.
    pub queue_name: String,

    pub message_count: u64,

    pub available_messages: u64,

    /// Delivered to a consumer but neither acknowledged nor expired back to available.
    pub in_flight_messages: u64,

    pub permissions: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Share of a queue's messages in each delivery state, in whole percent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capacity {
    pub available_percent: u8,
    pub in_flight_percent: u8,
    pub other_percent: u8,
}

impl Queue {
    pub fn capacity(&self) -> Capacity {
        let total = self
            .message_count
            .max(self.available_messages.saturating_add(self.in_flight_messages));
        if total == 0 {
            return Capacity::default();
        }
        let percent = |part: u64| ((part as f64 / total as f64) * 100.0).round() as u8;
        let available_percent = percent(self.available_messages);
        let in_flight_percent = percent(self.in_flight_messages);
        let other_percent = 100u8.saturating_sub(available_percent.saturating_add(in_flight_percent));
        Capacity {
            available_percent,
            in_flight_percent,
            other_percent,
        }
    }

    pub fn display_name(&self) -> String {
        format::title_case(&self.queue_name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueCollection {
    pub queues: Vec<Queue>,

    /// Reported total, which may exceed the number of queues returned.
    pub count: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,

    pub timestamp: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility_timeout: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt_handle: Option<String>,

    pub receive_count: u64,

    /// Opaque payload: plain text, a JSON document encoded as text, or structured JSON.
    pub message_body: Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue_id: Option<String>,
}

impl Message {
    pub fn pretty_body(&self) -> String {
        format::pretty_body(&self.message_body)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePage {
    pub messages: Vec<Message>,

    /// Number of messages on this page.
    pub count: u64,

    /// Backend reported total across all pages. May be an estimate.
    pub total: u64,

    pub offset: u64,

    pub limit: u64,

    pub has_more: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    pub id: String,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partitions: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replication_factor: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumerGroup {
    pub id: String,

    pub name: String,

    pub members: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue_id: Option<String>,
}

/// Body of `POST /queues`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateQueueRequest {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CreateQueueRequest {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            description: None,
        }
    }
}

/// Body of `POST /topics`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTopicRequest {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub partitions: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub replication_factor: Option<u32>,
}

impl CreateTopicRequest {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            partitions: None,
            replication_factor: None,
        }
    }
}

/// Body of `PUT /topics/{id}`. Only the fields that are set are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTopicRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub partitions: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub replication_factor: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queue(message_count: u64, available: u64, in_flight: u64) -> Queue {
        Queue {
            id: "orders".to_owned(),
            queue_name: "orders".to_owned(),
            message_count,
            available_messages: available,
            in_flight_messages: in_flight,
            ..Default::default()
        }
    }

    #[test]
    fn test_capacity() {
        let capacity = queue(10, 5, 2).capacity();
        assert_eq!(capacity.available_percent, 50);
        assert_eq!(capacity.in_flight_percent, 20);
        assert_eq!(capacity.other_percent, 30);
    }

    #[test]
    fn test_capacity_uses_larger_denominator() {
        let capacity = queue(1, 3, 1).capacity();
        assert_eq!(capacity.available_percent, 75);
        assert_eq!(capacity.in_flight_percent, 25);
        assert_eq!(capacity.other_percent, 0);
    }

    #[test]
    fn test_capacity_of_huge_queue() {
        let capacity = queue(0, u64::MAX, u64::MAX).capacity();
        assert_eq!(capacity.available_percent, 100);
        assert_eq!(capacity.in_flight_percent, 100);
        assert_eq!(capacity.other_percent, 0);
    }

    #[test]
    fn test_capacity_of_empty_queue() {
        assert_eq!(queue(0, 0, 0).capacity(), Capacity::default());
    }

    #[test]
    fn test_update_topic_request_serialization() -> Result<(), Box<dyn std::error::Error>> {
        let request = UpdateTopicRequest {
            replication_factor: Some(3),
            ..Default::default()
        };
        assert_eq!(serde_json::to_string(&request)?, r#"{"replicationFactor":3}"#);
        Ok(())
    }

    #[test]
    fn test_create_queue_request_serialization() -> Result<(), Box<dyn std::error::Error>> {
        let request = CreateQueueRequest::new("orders");
        assert_eq!(serde_json::to_string(&request)?, r#"{"name":"orders"}"#);
        Ok(())
    }
}
