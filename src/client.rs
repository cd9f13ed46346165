//!
//! This module defines QueueService, the typed entry point to the admin API.
//!
//! Every call returns canonical records. Mutations return only what the backend echoed back; callers refetch the
//! owning collection afterwards rather than patching local state.
//!
use serde::Serialize;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::model::{
    ConsumerGroup, CreateQueueRequest, CreateTopicRequest, MessagePage, Queue, QueueCollection,
    Topic, UpdateTopicRequest,
};
use crate::normalize;
use crate::pagination::PageRequest;
use crate::transport::{HttpTransport, Request, Transport};

pub struct QueueService<T> {
    transport: T,
}

impl QueueService<HttpTransport> {
    /// Build a service talking HTTP to `config.base_url`.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        Ok(Self::new(HttpTransport::new(config)?))
    }
}

fn to_body(body: &impl Serialize) -> Result<Value, ClientError> {
    serde_json::to_value(body).map_err(|e| ClientError::InvalidBody(e.to_string()))
}

impl<T: Transport> QueueService<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// `GET /queues`
    pub async fn list_queues(&self) -> Result<QueueCollection, ClientError> {
        let payload = self.transport.request(Request::get(&["queues"])).await?;
        Ok(normalize::queue_collection(&payload))
    }

    /// `GET /queues/{queueId}/info`. `None` if the payload holds no queue record.
    pub async fn queue_info(&self, queue_id: &str) -> Result<Option<Queue>, ClientError> {
        let payload = self
            .transport
            .request(Request::get(&["queues", queue_id, "info"]))
            .await?;
        Ok(normalize::queue_record(&payload, queue_id))
    }

    /// `GET /queues/{queueId}/messages?limit=&offset=`
    pub async fn messages(
        &self,
        queue_id: &str,
        window: PageRequest,
    ) -> Result<MessagePage, ClientError> {
        let request = Request::get(&["queues", queue_id, "messages"])
            .with_query("limit", window.limit)
            .with_query("offset", window.offset);
        let payload = self.transport.request(request).await?;
        Ok(normalize::message_page(&payload, window.offset, window.limit))
    }

    /// `POST /queues`
    pub async fn create_queue(
        &self,
        queue: &CreateQueueRequest,
    ) -> Result<Option<Queue>, ClientError> {
        let payload = self
            .transport
            .request(Request::post(&["queues"], to_body(queue)?))
            .await?;
        Ok(normalize::queue_record(&payload, &queue.name))
    }

    /// `DELETE /queues/{queueId}`
    pub async fn delete_queue(&self, queue_id: &str) -> Result<(), ClientError> {
        self.transport
            .request(Request::delete(&["queues", queue_id]))
            .await?;
        Ok(())
    }

    /// `GET /topics`
    pub async fn list_topics(&self) -> Result<Vec<Topic>, ClientError> {
        let payload = self.transport.request(Request::get(&["topics"])).await?;
        Ok(normalize::normalize(&payload))
    }

    /// `POST /topics`
    pub async fn create_topic(
        &self,
        topic: &CreateTopicRequest,
    ) -> Result<Option<Topic>, ClientError> {
        let payload = self
            .transport
            .request(Request::post(&["topics"], to_body(topic)?))
            .await?;
        Ok(normalize::topic_record(&payload))
    }

    /// `PUT /topics/{id}` with only the changed fields.
    pub async fn update_topic(
        &self,
        topic_id: &str,
        changes: &UpdateTopicRequest,
    ) -> Result<Option<Topic>, ClientError> {
        let payload = self
            .transport
            .request(Request::put(&["topics", topic_id], to_body(changes)?))
            .await?;
        Ok(normalize::topic_record(&payload))
    }

    /// `DELETE /topics/{id}`
    pub async fn delete_topic(&self, topic_id: &str) -> Result<(), ClientError> {
        self.transport
            .request(Request::delete(&["topics", topic_id]))
            .await?;
        Ok(())
    }

    /// `GET /consumer-groups`
    pub async fn list_consumer_groups(&self) -> Result<Vec<ConsumerGroup>, ClientError> {
        let payload = self
            .transport
            .request(Request::get(&["consumer-groups"]))
            .await?;
        Ok(normalize::normalize(&payload))
    }
}
