use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("event is missing required attribute {0}")]
    IncompleteEvent(&'static str),
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct EventAttribute {
    pub key: String,
    pub value: String,
}

/// A contract event as it appears in a hub transaction log.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct Event {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub attributes: Vec<EventAttribute>,
}

impl Event {
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attribute| attribute.key == key)
            .map(|attribute| attribute.value.as_str())
    }
}

/// The fields of a routed message event, mapped out of the unordered
/// attribute list. Unknown attributes are ignored; a missing or empty field
/// means the contract's event schema has drifted and is fatal.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UnfurledEvent {
    pub source_chain: String,
    pub source_address: String,
    pub message_id: String,
    pub payload: String,
    pub payload_hash: String,
    pub destination_chain: String,
    pub destination_address: String,
}

impl TryFrom<&Event> for UnfurledEvent {
    type Error = Error;

    fn try_from(event: &Event) -> Result<Self, Error> {
        let mut unfurled = UnfurledEvent::default();

        for attribute in &event.attributes {
            let value = attribute.value.clone();
            match attribute.key.as_str() {
                "source_chain" => unfurled.source_chain = value,
                "source_address" => unfurled.source_address = value,
                "message_id" => unfurled.message_id = value,
                "payload" => unfurled.payload = value,
                "payload_hash" => unfurled.payload_hash = value,
                "destination_chain" => unfurled.destination_chain = value,
                "destination_address" => unfurled.destination_address = value,
                _ => (),
            }
        }

        for (field, value) in [
            ("source_chain", &unfurled.source_chain),
            ("source_address", &unfurled.source_address),
            ("message_id", &unfurled.message_id),
            ("payload", &unfurled.payload),
            ("payload_hash", &unfurled.payload_hash),
            ("destination_chain", &unfurled.destination_chain),
            ("destination_address", &unfurled.destination_address),
        ] {
            if value.is_empty() {
                return Err(Error::IncompleteEvent(field));
            }
        }

        Ok(unfurled)
    }
}
