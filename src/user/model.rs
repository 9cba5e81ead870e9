use crate::core::{Change, DaoError, Result, ensure_not_empty};
use crate::locale::Locale;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user account as stored by the user DAO.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    id: String,
    creation_date_time: DateTime<Utc>,
    last_modification_date_time: Option<DateTime<Utc>>,
    deletion_date_time: Option<DateTime<Utc>>,
    login_name: String,
    email_address: String,
    password_hash: String,
    first_name: Option<String>,
    last_name: Option<String>,
    desired_locale: Option<Locale>,
    // Insertion order is kept
    custom_attributes: Vec<(String, String)>,
    deleted: bool,
    disabled: bool,
}

impl User {
    /// Start a user with a fresh ID, created now.
    pub fn builder(
        login_name: impl Into<String>,
        email_address: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> UserBuilder {
        UserBuilder {
            user: User {
                id: Uuid::new_v4().to_string(),
                creation_date_time: Utc::now(),
                last_modification_date_time: None,
                deletion_date_time: None,
                login_name: login_name.into(),
                email_address: email_address.into(),
                password_hash: password_hash.into(),
                first_name: None,
                last_name: None,
                desired_locale: None,
                custom_attributes: Vec::new(),
                deleted: false,
                disabled: false,
            },
        }
    }

    /// bcrypt hash with the default cost.
    pub fn hash_password(plain_text: &str) -> Result<String> {
        Self::hash_password_with_cost(plain_text, bcrypt::DEFAULT_COST)
    }

    pub fn hash_password_with_cost(plain_text: &str, cost: u32) -> Result<String> {
        bcrypt::hash(plain_text, cost)
            .map_err(|e| DaoError::IllegalArgument(format!("Failed to hash password: {}", e)))
    }

    /// A malformed stored hash never matches.
    pub fn verify_password(&self, plain_text: &str) -> bool {
        bcrypt::verify(plain_text, &self.password_hash).unwrap_or(false)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn creation_date_time(&self) -> DateTime<Utc> {
        self.creation_date_time
    }

    pub fn last_modification_date_time(&self) -> Option<DateTime<Utc>> {
        self.last_modification_date_time
    }

    pub fn deletion_date_time(&self) -> Option<DateTime<Utc>> {
        self.deletion_date_time
    }

    pub fn login_name(&self) -> &str {
        &self.login_name
    }

    pub fn email_address(&self) -> &str {
        &self.email_address
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn first_name(&self) -> Option<&str> {
        self.first_name.as_deref()
    }

    pub fn last_name(&self) -> Option<&str> {
        self.last_name.as_deref()
    }

    /// "First Last", or the login name when neither is set.
    pub fn display_name(&self) -> String {
        match (self.first_name(), self.last_name()) {
            (Some(first), Some(last)) => format!("{} {}", first, last),
            (Some(name), None) | (None, Some(name)) => name.to_string(),
            (None, None) => self.login_name.clone(),
        }
    }

    pub fn desired_locale(&self) -> Option<&Locale> {
        self.desired_locale.as_ref()
    }

    pub fn custom_attributes(&self) -> &[(String, String)] {
        &self.custom_attributes
    }

    pub fn custom_attribute(&self, name: &str) -> Option<&str> {
        self.custom_attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn is_enabled(&self) -> bool {
        !self.disabled
    }

    fn touch(&mut self) {
        self.last_modification_date_time = Some(Utc::now());
    }

    pub fn set_email_address(&mut self, email_address: &str) -> Result<Change> {
        ensure_not_empty(email_address, "email address")?;
        if self.email_address == email_address {
            return Ok(Change::Unchanged);
        }
        self.email_address = email_address.to_string();
        self.touch();
        Ok(Change::Changed)
    }

    pub fn set_password_hash(&mut self, password_hash: &str) -> Result<Change> {
        ensure_not_empty(password_hash, "password hash")?;
        if self.password_hash == password_hash {
            return Ok(Change::Unchanged);
        }
        self.password_hash = password_hash.to_string();
        self.touch();
        Ok(Change::Changed)
    }

    pub fn set_custom_attribute(&mut self, name: &str, value: &str) -> Change {
        match self.custom_attributes.iter_mut().find(|(n, _)| n == name) {
            Some((_, current)) if current.as_str() == value => return Change::Unchanged,
            Some((_, current)) => *current = value.to_string(),
            None => self.custom_attributes.push((name.to_string(), value.to_string())),
        }
        self.touch();
        Change::Changed
    }

    pub fn set_disabled(&mut self, disabled: bool) -> Change {
        if self.disabled == disabled {
            return Change::Unchanged;
        }
        self.disabled = disabled;
        self.touch();
        Change::Changed
    }

    /// Soft delete; the user stays stored.
    pub fn mark_deleted(&mut self) -> Change {
        if self.deleted {
            return Change::Unchanged;
        }
        self.deleted = true;
        self.deletion_date_time = Some(Utc::now());
        self.touch();
        Change::Changed
    }

    pub fn mark_undeleted(&mut self) -> Change {
        if !self.deleted {
            return Change::Unchanged;
        }
        self.deleted = false;
        self.deletion_date_time = None;
        self.touch();
        Change::Changed
    }
}

/// Builder returned by [`User::builder`].
#[derive(Debug, Clone)]
pub struct UserBuilder {
    user: User,
}

impl UserBuilder {
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.user.id = id.into();
        self
    }

    pub fn creation_date_time(mut self, date_time: DateTime<Utc>) -> Self {
        self.user.creation_date_time = date_time;
        self
    }

    pub fn last_modification_date_time(mut self, date_time: Option<DateTime<Utc>>) -> Self {
        self.user.last_modification_date_time = date_time;
        self
    }

    pub fn deletion_date_time(mut self, date_time: Option<DateTime<Utc>>) -> Self {
        self.user.deletion_date_time = date_time;
        self
    }

    pub fn first_name(mut self, first_name: Option<String>) -> Self {
        self.user.first_name = first_name;
        self
    }

    pub fn last_name(mut self, last_name: Option<String>) -> Self {
        self.user.last_name = last_name;
        self
    }

    pub fn desired_locale(mut self, locale: Option<Locale>) -> Self {
        self.user.desired_locale = locale;
        self
    }

    pub fn custom_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.user.custom_attributes.iter_mut().find(|(n, _)| *n == name) {
            Some((_, current)) => *current = value,
            None => self.user.custom_attributes.push((name, value)),
        }
        self
    }

    pub fn deleted(mut self, deleted: bool) -> Self {
        self.user.deleted = deleted;
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.user.disabled = disabled;
        self
    }

    /// Fails on an empty ID, login name, email address or password hash.
    pub fn build(self) -> Result<User> {
        ensure_not_empty(&self.user.id, "user ID")?;
        ensure_not_empty(&self.user.login_name, "login name")?;
        ensure_not_empty(&self.user.email_address, "email address")?;
        ensure_not_empty(&self.user.password_hash, "password hash")?;
        Ok(self.user)
    }
}
