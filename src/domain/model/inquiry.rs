use super::{Fields, NewRow};
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value as JsonValue;

pub const INQUIRIES_TABLE: &str = "inquiries";
pub const INQUIRY_STATUS_SUBMITTED: &str = "Submitted";

/// A quoted price: finite and strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Price(f64);

impl Price {
    /// Accepts a JSON number or a numeric string.
    pub fn parse(value: &JsonValue) -> Result<Self, String> {
        let n = match value {
            JsonValue::Number(n) => n.as_f64(),
            JsonValue::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
        .ok_or_else(|| "price must be a number".to_string())?;
        Self::new(n)
    }

    pub fn new(n: f64) -> Result<Self, String> {
        if !n.is_finite() || n <= 0.0 {
            return Err("price must be a positive number".to_string());
        }
        Ok(Self(n))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

/// An inquiry about to be appended, with a snapshot of the product it refers to.
#[derive(Debug, Clone, PartialEq)]
pub struct NewInquiry {
    pub product_id: String,
    pub price: Price,
    pub colors: String,
    pub notes: String,
    pub submitted_at: DateTime<Utc>,
    pub image_url: Option<String>,
    pub project_refs: Vec<String>,
}

impl NewRow for NewInquiry {
    const TABLE: &'static str = INQUIRIES_TABLE;

    fn to_fields(&self) -> Fields {
        let mut fields = Fields::new();
        fields.insert("productId".into(), JsonValue::from(self.product_id.clone()));
        fields.insert("price".into(), JsonValue::from(self.price.value()));
        fields.insert("colors".into(), JsonValue::from(self.colors.clone()));
        fields.insert("notes".into(), JsonValue::from(self.notes.clone()));
        fields.insert(
            "submittedAt".into(),
            JsonValue::from(self.submitted_at.to_rfc3339_opts(SecondsFormat::Secs, true)),
        );
        fields.insert("status".into(), JsonValue::from(INQUIRY_STATUS_SUBMITTED));
        if let Some(url) = &self.image_url {
            fields.insert("imageUrl".into(), JsonValue::from(url.clone()));
        }
        if !self.project_refs.is_empty() {
            fields.insert(
                "project".into(),
                JsonValue::Array(self.project_refs.iter().cloned().map(JsonValue::from).collect()),
            );
        }
        fields
    }
}
