//! NATS message producer for prediction replies

use crate::types::prediction::PredictionReply;
use anyhow::Result;
use async_nats::{Client, Subject};
use tracing::debug;

/// Publishes prediction replies to NATS
#[derive(Clone)]
pub struct PredictionProducer {
    client: Client,
    subject: String,
}

impl PredictionProducer {
    pub fn new(client: Client, subject: &str) -> Self {
        Self {
            client,
            subject: subject.to_string(),
        }
    }

    /// Publish a reply to the request's reply subject, or to the default
    /// prediction subject when the request did not ask for a reply.
    pub async fn publish(&self, reply: &PredictionReply, reply_to: Option<Subject>) -> Result<()> {
        let payload = serde_json::to_vec(reply)?;

        match reply_to {
            Some(inbox) => {
                debug!(subject = %inbox, "Replying to request inbox");
                self.client.publish(inbox, payload.into()).await?;
            }
            None => {
                self.client
                    .publish(self.subject.clone(), payload.into())
                    .await?;
            }
        }

        match reply {
            PredictionReply::Predicted(prediction) => debug!(
                prediction_id = %prediction.prediction_id,
                predicted_revenue = prediction.predicted_revenue,
                tier = prediction.tier.label(),
                "Published revenue prediction"
            ),
            PredictionReply::Rejected(rejected) => debug!(
                request_id = ?rejected.request_id,
                kind = %rejected.kind,
                "Published request rejection"
            ),
        }

        Ok(())
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }
}
