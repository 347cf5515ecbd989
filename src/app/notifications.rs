//! Fire-and-forget inquiry notifications.
//!
//! Submissions hand a message to [`NotificationDispatcher::dispatch`] and return immediately; a
//! background task delivers it through a [`Notifier`] and logs failures. Delivery problems have no
//! path back to the request that triggered them.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, PartialEq)]
pub struct InquiryNotification {
    pub product_id: String,
    pub price: f64,
    pub colors: String,
    pub notes: String,
    pub image_url: Option<String>,
}

/// Outbound channel for inquiry notifications (e.g. transactional email).
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: &InquiryNotification) -> anyhow::Result<()>;
}

#[derive(Clone, Debug, Default)]
pub struct NotificationDispatcher {
    tx: Option<mpsc::UnboundedSender<InquiryNotification>>,
}

impl NotificationDispatcher {
    /// A dispatcher that drops everything; used when no notifier is configured.
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    /// Spawns the delivery task. It runs until every dispatcher clone is dropped.
    pub fn start(notifier: Arc<dyn Notifier>) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::unbounded_channel::<InquiryNotification>();
        let handle = tokio::spawn(async move {
            while let Some(notification) = rx.recv().await {
                match notifier.notify(&notification).await {
                    Ok(()) => tracing::info!(
                        product_id = %notification.product_id,
                        "Inquiry notification sent"
                    ),
                    Err(e) => tracing::warn!(
                        product_id = %notification.product_id,
                        error = %e,
                        "Inquiry notification failed"
                    ),
                }
            }
            tracing::debug!("Notification dispatcher stopped");
        });
        (Self { tx: Some(tx) }, handle)
    }

    pub fn is_enabled(&self) -> bool {
        self.tx.is_some()
    }

    /// Queues a notification. Never fails the caller.
    pub fn dispatch(&self, notification: InquiryNotification) {
        let Some(tx) = &self.tx else {
            return;
        };
        if let Err(e) = tx.send(notification) {
            tracing::warn!(product_id = %e.0.product_id, "Notification task is gone, dropping notification");
        }
    }
}
