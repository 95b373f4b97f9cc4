//! Instance configuration records handed to checks under test

use serde::{Deserialize, Serialize};

/// Basic-auth credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

/// How a check reaches the monitored service.
///
/// Every constructor returns a fresh owned value, so a test that mutates its
/// copy never affects another test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceConfig {
    /// Base URL of the service
    pub server: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Restricts the check to a single cluster node
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Tags the check attaches to everything it submits
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl InstanceConfig {
    /// Unauthenticated instance pointing at `server`
    pub fn new(server: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            user: None,
            password: None,
            name: None,
            tags: Vec::new(),
        }
    }

    /// Attach credentials
    pub fn with_credentials(mut self, credentials: &Credentials) -> Self {
        self.user = Some(credentials.user.clone());
        self.password = Some(credentials.password.clone());
        self
    }

    /// Restrict to a named node
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Attach tags, replacing any already set
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Credentials, when both user and password are present
    pub fn credentials(&self) -> Option<Credentials> {
        match (&self.user, &self.password) {
            (Some(user), Some(password)) => Some(Credentials {
                user: user.clone(),
                password: password.clone(),
            }),
            _ => None,
        }
    }

    /// Render as a JSON object
    pub fn to_json(&self) -> serde_json::Value {
        // Plain strings and options always serialize.
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unauthenticated_json_omits_credentials() {
        let instance = InstanceConfig::new("http://localhost:5984");
        assert_eq!(instance.to_json(), json!({"server": "http://localhost:5984"}));
        assert!(instance.credentials().is_none());
    }

    #[test]
    fn test_credentials_round_trip() {
        let creds = Credentials {
            user: "u".to_string(),
            password: "p".to_string(),
        };
        let instance = InstanceConfig::new("http://h:1")
            .with_credentials(&creds)
            .with_name("node1@127.0.0.1");

        assert_eq!(instance.credentials(), Some(creds));
        assert_eq!(
            instance.to_json(),
            json!({
                "server": "http://h:1",
                "user": "u",
                "password": "p",
                "name": "node1@127.0.0.1"
            })
        );
    }

    #[test]
    fn test_tags_serialize_only_when_set() {
        let instance = InstanceConfig::new("http://h:1").with_tags(["env:test", "role:primary"]);
        assert_eq!(
            instance.to_json(),
            json!({"server": "http://h:1", "tags": ["env:test", "role:primary"]})
        );

        let parsed: InstanceConfig =
            serde_json::from_value(json!({"server": "http://h:1"})).unwrap();
        assert!(parsed.tags.is_empty());
    }

    #[test]
    fn test_partial_credentials_are_ignored() {
        let mut instance = InstanceConfig::new("http://h:1");
        instance.user = Some("only-user".to_string());
        assert!(instance.credentials().is_none());
    }
}
