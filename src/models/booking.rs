use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A merchant's request to show content on a screen for a priced time window.
///
/// `duration_hours` and `total_price_minor` are derived by the pricing
/// calculator at submission time; the client never supplies them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenBooking {
    pub id: String,
    pub location_id: String,
    pub pricing_option_id: String,
    pub merchant_id: String,
    pub start_at: NaiveDateTime,
    pub end_at: NaiveDateTime,
    pub duration_hours: i64,
    pub total_price_minor: i64,
    pub media_url: Option<String>,
    pub media_type: Option<MediaType>,
    pub request_notes_en: Option<String>,
    pub request_notes_ar: Option<String>,
    pub status: BookingStatus,
    pub admin_notes: Option<String>,
    pub rejection_reason: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Approved,
    Rejected,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Approved => "approved",
            BookingStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "approved" => BookingStatus::Approved,
            "rejected" => BookingStatus::Rejected,
            _ => BookingStatus::Pending,
        }
    }

    /// Approved and rejected are terminal; no transition leaves them.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, BookingStatus::Pending)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Image => "image",
            MediaType::Video => "video",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "image" => Some(MediaType::Image),
            "video" => Some(MediaType::Video),
            _ => None,
        }
    }

    /// Infers the media kind from an upload's MIME type.
    pub fn from_mime(mime: &str) -> Option<Self> {
        if mime.starts_with("image/") {
            Some(MediaType::Image)
        } else if mime.starts_with("video/") {
            Some(MediaType::Video)
        } else {
            None
        }
    }
}
