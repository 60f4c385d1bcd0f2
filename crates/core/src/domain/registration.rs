use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

/// Account creation request accepted by the registration proxy.
///
/// Every field is optional: the proxy forwards what it was given and leaves
/// validation to the user service.
#[derive(Clone, Debug, Default)]
pub struct RegistrationRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<SecretString>,
    pub role: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RegistrationForm {
    username: Option<String>,
    email: Option<String>,
    password: Option<String>,
    role: Option<String>,
}

/// Payload shape expected by the user service.
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct BackendUserPayload<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<&'a str>,
}

impl RegistrationRequest {
    /// Reads a request body leniently. Anything that is not a JSON object with
    /// string fields yields a request with the affected fields absent.
    pub fn from_json_slice(body: &[u8]) -> Self {
        let form = serde_json::from_slice::<RegistrationForm>(body).unwrap_or_default();
        Self {
            username: form.username,
            email: form.email,
            password: form.password.map(SecretString::from),
            role: form.role,
        }
    }

    pub fn backend_payload(&self) -> BackendUserPayload<'_> {
        BackendUserPayload {
            name: self.username.as_deref(),
            email: self.email.as_deref(),
            password: self.password.as_ref().map(|secret| secret.expose_secret()),
            role: self.role.as_deref(),
        }
    }
}
