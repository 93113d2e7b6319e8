use super::stores::Store;
use super::MessageResponse;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, Serializer};
use std::borrow::Cow;
use tower_api_client::{Method, Request, RequestData};

// Common

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    /// `LOCAL` for email sign-ups, otherwise the social login provider
    pub auth_provider: String,
    #[serde(default)]
    pub store_list: Vec<Store>,
    pub file_url: Option<String>,
    #[serde(default)]
    pub is_email_consent: bool,
}

impl User {
    pub fn store(&self, store_id: i64) -> Option<&Store> {
        self.store_list.iter().find(|store| store.id == store_id)
    }
}

fn expose<S: Serializer>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileForm {
    pub name: String,
    pub phone: String,
    pub is_email_consent: bool,
}

impl From<&User> for ProfileForm {
    fn from(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            phone: user.phone.clone(),
            is_email_consent: user.is_email_consent,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    #[serde(serialize_with = "expose")]
    current_password: SecretString,
    #[serde(serialize_with = "expose")]
    new_password: SecretString,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupForm {
    pub name: String,
    pub email: String,
    #[serde(serialize_with = "expose")]
    password: SecretString,
    pub phone: String,
    pub is_email_consent: bool,
}

impl SignupForm {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: SecretString,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password,
            phone: phone.into(),
            is_email_consent: false,
        }
    }

    pub fn email_consent(mut self, consent: bool) -> Self {
        self.is_email_consent = consent;
        self
    }
}

// Requests

#[derive(Debug, Clone, Default)]
pub struct GetCurrentUser;

impl Request for GetCurrentUser {
    type Data = ();
    type Response = User;

    fn endpoint(&self) -> Cow<'_, str> {
        "/users/me".into()
    }
}

#[derive(Debug, Clone)]
pub struct UpdateProfile {
    form: ProfileForm,
}

impl UpdateProfile {
    pub fn new(form: ProfileForm) -> Self {
        Self { form }
    }
}

impl Request for UpdateProfile {
    type Data = ProfileForm;
    type Response = MessageResponse;
    const METHOD: Method = Method::PUT;

    fn endpoint(&self) -> Cow<'_, str> {
        "/users/me".into()
    }

    fn data(&self) -> RequestData<&Self::Data> {
        RequestData::Json(&self.form)
    }
}

#[derive(Debug, Clone)]
pub struct ChangePassword {
    change: PasswordChange,
}

impl ChangePassword {
    pub fn new(current_password: SecretString, new_password: SecretString) -> Self {
        Self {
            change: PasswordChange {
                current_password,
                new_password,
            },
        }
    }
}

impl Request for ChangePassword {
    type Data = PasswordChange;
    type Response = MessageResponse;
    const METHOD: Method = Method::PATCH;

    fn endpoint(&self) -> Cow<'_, str> {
        "/users/me/password".into()
    }

    fn data(&self) -> RequestData<&Self::Data> {
        RequestData::Json(&self.change)
    }
}

/// Account creation. Goes out without a bearer token.
#[derive(Debug, Clone)]
pub struct Register {
    form: SignupForm,
}

impl Register {
    pub fn new(form: SignupForm) -> Self {
        Self { form }
    }
}

impl Request for Register {
    type Data = SignupForm;
    type Response = MessageResponse;
    const METHOD: Method = Method::POST;

    fn endpoint(&self) -> Cow<'_, str> {
        "/auth/signup".into()
    }

    fn data(&self) -> RequestData<&Self::Data> {
        RequestData::Json(&self.form)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_with_stores() {
        let user: User = serde_json::from_value(json!({
            "id": 1,
            "name": "김사장",
            "email": "owner@example.com",
            "phone": "010-0000-0000",
            "authProvider": "LOCAL",
            "storeList": [{
                "id": 9,
                "storeName": "Tally Chicken",
                "businessType": "RESTAURANT",
                "description": ""
            }],
            "isEmailConsent": true
        }))
        .unwrap();

        assert_eq!(user.store(9).map(|s| s.store_name.as_str()), Some("Tally Chicken"));
        assert!(user.store(10).is_none());
        assert_eq!(user.file_url, None);
    }

    #[test]
    fn test_password_change_body() {
        let req = ChangePassword::new("old-pw".into(), "new-pw".into());
        let body = serde_json::to_value(&req.change).unwrap();
        assert_eq!(
            body,
            json!({"currentPassword": "old-pw", "newPassword": "new-pw"})
        );
        assert!(!format!("{:?}", req).contains("new-pw"));
    }

    #[test]
    fn test_signup_is_an_auth_endpoint() {
        let req = Register::new(SignupForm::new(
            "김사장",
            "owner@example.com",
            "pw".into(),
            "010",
        ));
        assert!(tally_auth::is_auth_endpoint(&req.endpoint()));
        assert!(!tally_auth::is_auth_endpoint(&GetCurrentUser.endpoint()));
    }
}
