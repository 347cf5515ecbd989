//! Inquiry notifications over the Resend transactional email API.

use std::time::Duration;

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::Serialize;

use crate::app::notifications::{InquiryNotification, Notifier};
use crate::infra::config::EmailConfig;

pub const RESEND_API_URL: &str = "https://api.resend.com/emails";

#[derive(Clone)]
pub struct ResendNotifier {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    from: String,
    to: String,
}

impl std::fmt::Debug for ResendNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResendNotifier")
            .field("api_url", &self.api_url)
            .field("from", &self.from)
            .field("to", &self.to)
            .finish()
    }
}

#[derive(Serialize, Debug, PartialEq)]
struct EmailMessage {
    from: String,
    to: Vec<String>,
    subject: String,
    html: String,
}

impl ResendNotifier {
    pub fn new(config: &EmailConfig, timeout: Duration) -> anyhow::Result<Self> {
        let http_client = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("failed to build email HTTP client")?;
        Ok(Self {
            http_client,
            api_key: config.api_key.clone(),
            api_url: RESEND_API_URL.to_string(),
            from: config.from.clone(),
            to: config.to.clone(),
        })
    }

    fn compose(&self, n: &InquiryNotification) -> EmailMessage {
        let or_dash = |s: &str| if s.is_empty() { "-".to_string() } else { escape_html(s) };
        let image = match &n.image_url {
            Some(url) => format!(
                "<p><img src=\"{}\" alt=\"{}\" style=\"max-width:320px\"></p>",
                escape_html(url),
                escape_html(&n.product_id)
            ),
            None => String::new(),
        };
        EmailMessage {
            from: self.from.clone(),
            to: vec![self.to.clone()],
            subject: format!("New price inquiry for {}", n.product_id),
            html: format!(
                "<h2>New price inquiry</h2>\
                 <p><strong>Product:</strong> {}</p>\
                 <p><strong>Price:</strong> {}</p>\
                 <p><strong>Colors:</strong> {}</p>\
                 <p><strong>Notes:</strong> {}</p>{}",
                escape_html(&n.product_id),
                n.price,
                or_dash(&n.colors),
                or_dash(&n.notes),
                image
            ),
        }
    }
}

#[async_trait]
impl Notifier for ResendNotifier {
    async fn notify(&self, notification: &InquiryNotification) -> anyhow::Result<()> {
        let message = self.compose(notification);
        let response = self
            .http_client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&message)
            .send()
            .await
            .context("email API unreachable")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("email API returned {}: {}", status, body));
        }
        Ok(())
    }
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notifier() -> ResendNotifier {
        ResendNotifier::new(
            &EmailConfig {
                api_key: "re_secret".into(),
                from: "shop@resend.dev".into(),
                to: "owner@example.com".into(),
            },
            Duration::from_secs(1),
        )
        .unwrap()
    }

    #[test]
    fn composes_all_inquiry_details() {
        let msg = notifier().compose(&InquiryNotification {
            product_id: "proj_123456_item2".into(),
            price: 150000.0,
            colors: "red, blue".into(),
            notes: "<b>urgent</b>".into(),
            image_url: Some("https://host/a.png".into()),
        });
        assert_eq!(msg.subject, "New price inquiry for proj_123456_item2");
        assert_eq!(msg.to, vec!["owner@example.com".to_string()]);
        assert!(msg.html.contains("150000"));
        assert!(msg.html.contains("red, blue"));
        assert!(msg.html.contains("&lt;b&gt;urgent&lt;/b&gt;"));
        assert!(msg.html.contains("https://host/a.png"));
    }

    #[test]
    fn empty_fields_render_as_dashes() {
        let msg = notifier().compose(&InquiryNotification {
            product_id: "p".into(),
            price: 1.5,
            colors: String::new(),
            notes: String::new(),
            image_url: None,
        });
        assert!(msg.html.contains("<strong>Colors:</strong> -"));
        assert!(!msg.html.contains("<img"));
        assert!(!format!("{:?}", notifier()).contains("re_secret"));
    }
}
