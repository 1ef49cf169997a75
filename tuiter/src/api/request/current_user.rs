use std::future::{ready, Ready};

use actix_session::{Session, SessionExt};
use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};
use log::error;

use crate::constants::ME;
use crate::errors::TuiterError;
use crate::models::user::CurrentUser;

const CURRENT_USER_KEY: &str = "profile";

impl FromRequest for CurrentUser {
    type Error = TuiterError;
    type Future = Ready<Result<CurrentUser, TuiterError>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let client_session = req.get_session();

        match get_current_user(&client_session) {
            Some(user) => ready(Ok(user)),
            None => ready(Err(TuiterError::Unauthenticated)),
        }
    }
}

pub struct OptCurrentUser(pub Option<CurrentUser>);

impl FromRequest for OptCurrentUser {
    type Error = TuiterError;
    type Future = Ready<Result<Self, TuiterError>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let client_session = req.get_session();

        ready(Ok(OptCurrentUser(get_current_user(&client_session))))
    }
}

impl OptCurrentUser {
    /// Maps a user id path segment to a concrete id: `me` becomes the session user,
    /// anything else is taken as given.
    pub fn resolve(&self, uid: &str) -> Result<String, TuiterError> {
        if uid != ME {
            return Ok(uid.to_string());
        }

        match &self.0 {
            Some(user) => Ok(user.id.clone()),
            None => Err(TuiterError::Unauthenticated),
        }
    }
}

pub fn set_current_user(client_session: &Session, current_user: &CurrentUser) -> Result<(), TuiterError> {
    client_session.insert(CURRENT_USER_KEY, current_user).map_err(|e| {
        error!("Could not set current user. {}", e);

        TuiterError::ClientSessionError("Could not set current user.".to_string())
    })?;

    Ok(())
}

pub fn remove_current_user(client_session: &Session) {
    client_session.remove(CURRENT_USER_KEY);
    client_session.purge();
}

pub fn get_current_user(client_session: &Session) -> Option<CurrentUser> {
    client_session
        .get::<CurrentUser>(CURRENT_USER_KEY)
        .map_err(|e| error!("Could not get current user. {}", e))
        .ok()
        .flatten()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_me_against_the_session() {
        let anonymous = OptCurrentUser(None);
        assert_eq!(anonymous.resolve("abc").unwrap(), "abc");
        assert!(matches!(anonymous.resolve(ME), Err(TuiterError::Unauthenticated)));

        let signed_in = OptCurrentUser(Some(CurrentUser {
            id: "u1".to_string(),
            username: "alice".to_string(),
            ..Default::default()
        }));
        assert_eq!(signed_in.resolve(ME).unwrap(), "u1");
        assert_eq!(signed_in.resolve("u2").unwrap(), "u2");
    }
}
