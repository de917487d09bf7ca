use serde::{Deserialize, Serialize};

/// A delivery/visit address, Brazilian postal layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct Address {
    pub id: i64,
    pub street: String,
    pub number: String,
    #[serde(default)]
    pub complement: Option<String>,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
    #[serde(rename = "zipCode")]
    pub zip_code: String,
}

impl Address {
    /// One-line rendering, e.g. "Rua das Flores, 120 - Centro, Sao Paulo/SP".
    pub fn formatted(&self) -> String {
        match self.complement.as_deref().filter(|c| !c.is_empty()) {
            Some(complement) => format!(
                "{}, {} ({}) - {}, {}/{}",
                self.street, self.number, complement, self.neighborhood, self.city, self.state
            ),
            None => format!(
                "{}, {} - {}, {}/{}",
                self.street, self.number, self.neighborhood, self.city, self.state
            ),
        }
    }

    pub fn city_state(&self) -> String {
        format!("{}/{}", self.city, self.state)
    }
}

/// Payload for registering a new address.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct AddressCreate {
    pub street: String,
    pub number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complement: Option<String>,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
    #[serde(rename = "zipCode")]
    pub zip_code: String,
}

impl AddressCreate {
    pub fn validate(&self) -> Result<(), String> {
        for (field, value) in [
            ("street", &self.street),
            ("number", &self.number),
            ("neighborhood", &self.neighborhood),
            ("city", &self.city),
            ("state", &self.state),
            ("zipCode", &self.zip_code),
        ] {
            if value.trim().is_empty() {
                return Err(format!("{field} is required"));
            }
        }
        Ok(())
    }
}

/// Partial update for an existing address.
#[derive(Debug, Clone, Default, Serialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct AddressUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complement: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub neighborhood: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(rename = "zipCode", skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
}
