//! Default collection contents, returned whenever the record store has no
//! value for a collection's key. Pure data: identical on every call, never
//! written back unless a visitor contributes something.

use serde_json::{json, Value};

use crate::models::Kind;

/// The default collection for a kind.
pub fn for_kind(kind: Kind) -> Vec<Value> {
    match kind {
        Kind::Candles => candles(),
        Kind::Flowers => flowers(),
        Kind::Lanterns => lanterns(),
        Kind::Guestbook => guestbook(),
    }
}

fn candles() -> Vec<Value> {
    vec![
        json!({
            "id": 1,
            "name": "The Matthews Family",
            "litAt": "2025-11-22T18:00:00Z"
        }),
        json!({
            "id": 2,
            "name": "Ruth & Gerald Okafor",
            "litAt": "2025-11-23T09:30:00Z"
        }),
        json!({
            "id": 3,
            "name": "Her friends at the Riverside Choir",
            "litAt": "2025-11-24T20:15:00Z"
        }),
    ]
}

fn flowers() -> Vec<Value> {
    vec![
        json!({
            "id": 1,
            "name": "Margaret & the garden club",
            "plantedAt": "2025-11-23T10:00:00Z"
        }),
        json!({
            "id": 2,
            "name": "The Delgado family",
            "plantedAt": "2025-11-25T14:45:00Z"
        }),
    ]
}

fn lanterns() -> Vec<Value> {
    vec![
        json!({
            "id": 1,
            "name": "Sam, with love from Vancouver",
            "releasedAt": "2025-11-26T21:00:00Z"
        }),
        json!({
            "id": 2,
            "name": "Her grandchildren",
            "releasedAt": "2025-11-26T21:05:00Z"
        }),
    ]
}

// The guestbook seeds a single pinned entry; the append handler keeps it
// first regardless of how many entries arrive after it.
fn guestbook() -> Vec<Value> {
    vec![json!({
        "id": "welcome",
        "name": "The Matthews Family",
        "location": "Portland, Oregon",
        "message": "Thank you for visiting Eleanor's memorial. She treasured \
                    every one of you. Please feel welcome to share a memory, \
                    light a candle, or simply sit with us a while.",
        "date": "November 22, 2025",
        "createdAt": "2025-11-22T17:00:00Z"
    })]
}
