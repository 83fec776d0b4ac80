use serde::{Deserialize, Serialize};

/// A record id as it appears on the wire.
///
/// Seeded records carry small integer ids; records created through the API
/// get generated string ids (epoch milliseconds for guestbook entries).
/// Both shapes coexist inside one collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(i64),
    Text(String),
}

/// A lit memorial candle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candle {
    pub id: RecordId,
    pub name: String,
    #[serde(rename = "litAt")]
    pub lit_at: String,
}

/// A flower planted in the memorial garden.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flower {
    pub id: RecordId,
    pub name: String,
    #[serde(rename = "plantedAt")]
    pub planted_at: String,
}

/// A sky lantern released in remembrance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lantern {
    pub id: RecordId,
    pub name: String,
    #[serde(rename = "releasedAt")]
    pub released_at: String,
}

/// A guestbook entry. `date` is the human-readable form shown on the page,
/// `created_at` the machine timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuestbookEntry {
    pub id: RecordId,
    pub name: String,
    pub location: String,
    pub message: String,
    pub date: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

/// The tribute collections served by this API.
///
/// Each kind maps to one key in the record store and one response key in
/// the JSON the front-end consumes. The handlers in `crate::api` are
/// generic over this descriptor; adding a collection means adding a
/// variant here and a seed in `crate::seeds`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Candles,
    Flowers,
    Lanterns,
    Guestbook,
}

impl Kind {
    /// Resolve a URL path segment to a collection kind.
    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug {
            "candles" => Some(Kind::Candles),
            "flowers" | "garden" => Some(Kind::Flowers),
            "lanterns" => Some(Kind::Lanterns),
            "guestbook" => Some(Kind::Guestbook),
            _ => None,
        }
    }

    /// The record store key this collection persists under.
    pub fn store_key(self) -> &'static str {
        match self {
            Kind::Candles => "candles",
            Kind::Flowers => "flowers",
            Kind::Lanterns => "lanterns",
            Kind::Guestbook => "entries",
        }
    }

    /// The key wrapping the record array in responses and replace bodies.
    pub fn response_key(self) -> &'static str {
        self.store_key()
    }

    /// Whether appends to this collection require a message body.
    pub fn requires_message(self) -> bool {
        matches!(self, Kind::Guestbook)
    }
}

// Request/Response types for API

#[derive(Debug, Deserialize)]
pub struct AppendRequest {
    pub name: Option<String>,
    pub location: Option<String>,
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_slug_resolution() {
        assert_eq!(Kind::from_slug("candles"), Some(Kind::Candles));
        assert_eq!(Kind::from_slug("flowers"), Some(Kind::Flowers));
        assert_eq!(Kind::from_slug("garden"), Some(Kind::Flowers));
        assert_eq!(Kind::from_slug("lanterns"), Some(Kind::Lanterns));
        assert_eq!(Kind::from_slug("guestbook"), Some(Kind::Guestbook));
        assert_eq!(Kind::from_slug("metrics"), None);
        assert_eq!(Kind::from_slug(""), None);
    }

    #[test]
    fn test_guestbook_stores_under_entries() {
        assert_eq!(Kind::Guestbook.store_key(), "entries");
        assert_eq!(Kind::Guestbook.response_key(), "entries");
        assert_eq!(Kind::Candles.store_key(), "candles");
    }

    #[test]
    fn test_record_id_accepts_both_wire_shapes() {
        let numeric: RecordId = serde_json::from_value(json!(3)).unwrap();
        assert_eq!(numeric, RecordId::Number(3));

        let text: RecordId = serde_json::from_value(json!("1764028800000")).unwrap();
        assert_eq!(text, RecordId::Text("1764028800000".to_string()));

        assert_eq!(serde_json::to_value(&RecordId::Number(7)).unwrap(), json!(7));
        assert_eq!(
            serde_json::to_value(&RecordId::Text("welcome".into())).unwrap(),
            json!("welcome")
        );
    }

    #[test]
    fn test_candle_wire_format_is_camel_case() {
        let candle = Candle {
            id: RecordId::Number(1),
            name: "Ada".to_string(),
            lit_at: "2025-11-20T18:00:00Z".to_string(),
        };
        let value = serde_json::to_value(&candle).unwrap();
        assert_eq!(value["litAt"], "2025-11-20T18:00:00Z");
        assert!(value.get("lit_at").is_none());
    }
}
