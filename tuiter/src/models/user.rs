mod current_user;

pub use current_user::CurrentUser;

use std::collections::HashMap;

use bcrypt::{hash, verify};
use bson::doc;
use chrono::{DateTime, Utc};
use email_address::EmailAddress;
use log::error;
use serde::{Deserialize, Serialize};

use crate::constants::BCRYPT_COST;
use crate::errors::TuiterError;
use crate::store::{Model, Store};
use crate::utils::defaults::new_id;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccountType {
    #[default]
    Personal,
    Academic,
    Professional,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
#[serde(rename_all = "UPPERCASE")]
pub enum MaritalStatus {
    Married,
    #[default]
    Single,
    Widowed,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Active,
    #[default]
    Offline,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", default = "new_id")]
    pub id: String,

    pub username: String,

    pub password: String,

    pub email: String,

    pub first_name: Option<String>,

    pub last_name: Option<String>,

    pub profile_photo: Option<String>,

    pub header_image: Option<String>,

    #[serde(default)]
    pub account_type: AccountType,

    #[serde(default)]
    pub marital_status: MaritalStatus,

    pub biography: Option<String>,

    pub date_of_birth: Option<DateTime<Utc>>,

    #[serde(default = "Utc::now")]
    pub joined: DateTime<Utc>,

    pub location: Option<Location>,

    #[serde(default)]
    pub status: Status,
}

impl Model for User {
    const COLLECTION: &'static str = "users";
    const UNIQUE_INDEXES: &'static [&'static [&'static str]] = &[&["username"]];
}

impl User {
    pub async fn find_by_id(store: &Store, id: &str) -> Result<User, TuiterError> {
        store
            .find_one(doc! { "_id": id })
            .await?
            .ok_or_else(|| TuiterError::NotFound(format!("user {} not found", id)))
    }

    pub async fn find_by_username(store: &Store, username: &str) -> Result<Option<User>, TuiterError> {
        store.find_one(doc! { "username": username }).await
    }

    pub async fn find_all(store: &Store) -> Result<Vec<ShowUser>, TuiterError> {
        let users: Vec<User> = store.find(doc! {}).await?;

        Ok(users.into_iter().map(ShowUser::from).collect())
    }

    /// Resolves user references into public profiles, keyed by id. Unknown ids are skipped.
    pub async fn find_by_ids(store: &Store, ids: Vec<String>) -> Result<HashMap<String, ShowUser>, TuiterError> {
        let users: Vec<User> = store.find(doc! { "_id": { "$in": ids } }).await?;

        Ok(users.into_iter().map(|u| (u.id.clone(), ShowUser::from(u))).collect())
    }

    fn validate(&self) -> Result<(), TuiterError> {
        if self.username.trim().is_empty() {
            return Err(TuiterError::ValidationError((
                "username".to_string(),
                "can't be blank".to_string(),
            )));
        }

        if self.password.is_empty() {
            return Err(TuiterError::ValidationError((
                "password".to_string(),
                "can't be blank".to_string(),
            )));
        }

        if !EmailAddress::is_valid(&self.email) {
            return Err(TuiterError::ValidationError((
                "email".to_string(),
                "is invalid".to_string(),
            )));
        }

        Ok(())
    }

    fn set_defaults(&mut self) {
        self.id = new_id();
        self.joined = Utc::now();
    }

    fn set_password(&mut self) -> Result<(), TuiterError> {
        self.password = hash(&self.password, BCRYPT_COST).map_err(|e| {
            error!("Failed to hash password: {}", e);

            TuiterError::InternalServerError("Failed to hash password".to_string())
        })?;

        Ok(())
    }

    /// Validates, hashes the password and stores a new user. A taken username is forbidden.
    pub async fn insert(&mut self, store: &Store) -> Result<(), TuiterError> {
        self.validate()?;

        if User::find_by_username(store, &self.username).await?.is_some() {
            return Err(TuiterError::Forbidden(format!(
                "username {} is already taken",
                self.username
            )));
        }

        self.set_defaults();
        self.set_password()?;

        store.insert_one(&*self).await
    }

    pub fn verify_password(&self, password: &str) -> Result<bool, TuiterError> {
        verify(password, &self.password).map_err(|e| {
            error!("Failed to verify password for {}: {}", self.username, e);

            TuiterError::InternalServerError("Failed to verify password".to_string())
        })
    }

    pub async fn update(store: &Store, id: &str, update: &UpdateUser) -> Result<ShowUser, TuiterError> {
        update.validate()?;

        let set = bson::to_document(update)?;
        if set.is_empty() {
            return User::find_by_id(store, id).await.map(ShowUser::from);
        }

        store
            .find_one_and_update::<User>(doc! { "_id": id }, doc! { "$set": set })
            .await?
            .map(ShowUser::from)
            .ok_or_else(|| TuiterError::NotFound(format!("user {} not found", id)))
    }

    pub async fn delete(store: &Store, id: &str) -> Result<u64, TuiterError> {
        store.delete_many::<User>(doc! { "_id": id }).await
    }

    pub async fn delete_by_username(store: &Store, username: &str) -> Result<u64, TuiterError> {
        store.delete_many::<User>(doc! { "username": username }).await
    }
}

/// Profile fields a user may change after signing up.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_photo: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_image: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_type: Option<AccountType>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub marital_status: Option<MaritalStatus>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub biography: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
}

impl UpdateUser {
    fn validate(&self) -> Result<(), TuiterError> {
        if let Some(email) = &self.email {
            if !EmailAddress::is_valid(email) {
                return Err(TuiterError::ValidationError((
                    "email".to_string(),
                    "is invalid".to_string(),
                )));
            }
        }

        Ok(())
    }
}

/// Public view of a user: everything but the password hash.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ShowUser {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_photo: Option<String>,
    pub header_image: Option<String>,
    pub account_type: AccountType,
    pub marital_status: MaritalStatus,
    pub biography: Option<String>,
    pub date_of_birth: Option<DateTime<Utc>>,
    pub joined: DateTime<Utc>,
    pub location: Option<Location>,
    pub status: Status,
}

impl From<User> for ShowUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            profile_photo: user.profile_photo,
            header_image: user.header_image,
            account_type: user.account_type,
            marital_status: user.marital_status,
            biography: user.biography,
            date_of_birth: user.date_of_birth,
            joined: user.joined,
            location: user.location,
            status: user.status,
        }
    }
}
