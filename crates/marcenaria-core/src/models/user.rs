use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Marketplace role carried by every account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub enum UserRole {
    Client,
    Seller,
    Carpenter,
}

impl UserRole {
    /// Wire tag as the API spells it, also used in query strings.
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Client => "CLIENT",
            UserRole::Seller => "SELLER",
            UserRole::Carpenter => "CARPENTER",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registered account as the API returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(rename = "userType")]
    pub role: UserRole,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub document: Option<String>,
    pub active: bool,
    #[serde(default)]
    pub rating: f64,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_client(&self) -> bool {
        self.role == UserRole::Client
    }

    pub fn is_seller(&self) -> bool {
        self.role == UserRole::Seller
    }

    pub fn is_carpenter(&self) -> bool {
        self.role == UserRole::Carpenter
    }

    /// Rating rendered the way listings show it, e.g. "4.8".
    pub fn rating_str(&self) -> String {
        format!("{:.1}", self.rating)
    }
}

/// Payload for account creation.
///
/// `document` is the craft registration number; it only applies to
/// carpenter accounts and is omitted from the wire format when absent.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct UserCreate {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    #[serde(rename = "userType")]
    pub role: UserRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
}

impl UserCreate {
    /// Check the payload before it goes anywhere near the network.
    pub fn validate(&self) -> Result<(), String> {
        for (field, value) in [
            ("name", &self.name),
            ("email", &self.email),
            ("phone", &self.phone),
            ("password", &self.password),
        ] {
            if value.trim().is_empty() {
                return Err(format!("{field} is required"));
            }
        }
        Ok(())
    }
}

/// Partial update for an existing account. Unset fields are left as-is
/// server side; the role is deliberately not updatable here.
#[derive(Debug, Clone, Default, Serialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.avatar.is_none()
            && self.document.is_none()
            && self.active.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_user() {
        let json = r#"{
            "id": 42,
            "name": "Ana Souza",
            "email": "ana@example.com",
            "phone": "+55 11 98765-4321",
            "userType": "CARPENTER",
            "document": "CR-1234",
            "active": true,
            "rating": 4.8,
            "createdAt": "2025-11-02T14:30:00Z",
            "updatedAt": "2025-11-10T09:00:00Z"
        }"#;

        let user: User = serde_json::from_str(json).expect("should parse user");
        assert_eq!(user.id, 42);
        assert_eq!(user.role, UserRole::Carpenter);
        assert!(user.is_carpenter());
        assert_eq!(user.document.as_deref(), Some("CR-1234"));
        assert_eq!(user.avatar, None);
        assert_eq!(user.rating_str(), "4.8");
    }

    #[test]
    fn test_parse_user_without_optional_fields() {
        let json = r#"{
            "id": 7,
            "name": "Bruno Lima",
            "email": "bruno@example.com",
            "phone": "+55 21 91234-0000",
            "userType": "CLIENT",
            "active": true,
            "createdAt": "2025-10-01T08:00:00Z",
            "updatedAt": "2025-10-01T08:00:00Z"
        }"#;

        let user: User = serde_json::from_str(json).expect("should parse user");
        assert!(user.is_client());
        assert_eq!(user.rating, 0.0);
        assert_eq!(user.document, None);
    }

    #[test]
    fn test_role_wire_tags() {
        assert_eq!(
            serde_json::to_string(&UserRole::Carpenter).unwrap(),
            "\"CARPENTER\""
        );
        let role: UserRole = serde_json::from_str("\"SELLER\"").unwrap();
        assert_eq!(role, UserRole::Seller);
        assert_eq!(UserRole::Client.to_string(), "CLIENT");
    }

    #[test]
    fn test_user_create_serializes_role_tag() {
        let create = UserCreate {
            name: "Ana".into(),
            email: "ana@example.com".into(),
            phone: "+55 11 90000-0000".into(),
            password: "segredo".into(),
            role: UserRole::Seller,
            document: None,
        };
        let value = serde_json::to_value(&create).unwrap();
        assert_eq!(value["userType"], "SELLER");
        assert!(value.get("document").is_none());
    }

    #[test]
    fn test_user_create_validate_rejects_blank_fields() {
        let create = UserCreate {
            name: "  ".into(),
            email: "ana@example.com".into(),
            phone: "+55 11 90000-0000".into(),
            password: "segredo".into(),
            role: UserRole::Client,
            document: None,
        };
        let err = create.validate().unwrap_err();
        assert!(err.contains("name"));
    }

    #[test]
    fn test_user_update_serializes_only_set_fields() {
        let update = UserUpdate {
            phone: Some("+55 11 95555-1111".into()),
            ..Default::default()
        };
        let value = serde_json::to_value(&update).unwrap();
        let map = value.as_object().unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map["phone"], "+55 11 95555-1111");

        assert!(UserUpdate::default().is_empty());
        assert!(!update.is_empty());
    }
}
