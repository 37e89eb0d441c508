use serde::{Deserialize, Serialize};

/// Event fields the banner analyzer extracted from an uploaded image.
/// Every field is best-effort; empty strings mean "not found".
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct ExtractedEvent {
    pub title: String,
    pub description: String,
    pub category: String,
    pub venue_name: String,
    pub venue_address: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub entry_fee: String,
    pub tags: Vec<String>,
    pub confidence: String,
}

/// One JSON object as printed by the analyzer on stdout.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct BannerAnalysis {
    pub success: bool,
    #[serde(default)]
    pub event_data: Option<ExtractedEvent>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub raw_ocr_text: Option<String>,
    /// Diagnostics and model outputs we pass through untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}
