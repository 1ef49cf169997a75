use actix_session::Session;
use actix_web::{post, web, HttpResponse};
use serde::Deserialize;

use crate::api::request::{remove_current_user, set_current_user};
use crate::api::types::Response;
use crate::app::App;
use crate::errors::TuiterError;
use crate::models::user::{CurrentUser, ShowUser, User};

#[derive(Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[post("/register")]
pub async fn register(app: web::Data<App>, client_session: Session, mut user: web::Json<User>) -> Response {
    user.insert(&app.store).await?;

    set_current_user(&client_session, &CurrentUser::from_user(&user))?;

    Ok(HttpResponse::Ok().json(ShowUser::from(user.into_inner())))
}

#[post("/login")]
pub async fn login(app: web::Data<App>, client_session: Session, credentials: web::Json<Credentials>) -> Response {
    let user = User::find_by_username(&app.store, &credentials.username)
        .await?
        .ok_or(TuiterError::Unauthorized("Invalid username or password"))?;

    if !user.verify_password(&credentials.password)? {
        return Err(TuiterError::Unauthorized("Invalid username or password"));
    }

    set_current_user(&client_session, &CurrentUser::from_user(&user))?;

    Ok(HttpResponse::Ok().json(ShowUser::from(user)))
}

#[post("/profile")]
pub async fn profile(app: web::Data<App>, current_user: CurrentUser) -> Response {
    let user = User::find_by_id(&app.store, &current_user.id).await?;

    Ok(HttpResponse::Ok().json(ShowUser::from(user)))
}

#[post("/logout")]
pub async fn logout(client_session: Session) -> Response {
    remove_current_user(&client_session);

    Ok(HttpResponse::Ok().finish())
}
