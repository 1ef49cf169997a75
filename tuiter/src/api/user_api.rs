use actix_web::{delete, get, post, put, web, HttpResponse};

use crate::api::request::OptCurrentUser;
use crate::api::types::{deleted, Response};
use crate::app::App;
use crate::models::user::{ShowUser, UpdateUser, User};

#[get("")]
pub async fn get_users(app: web::Data<App>) -> Response {
    let users = User::find_all(&app.store).await?;

    Ok(HttpResponse::Ok().json(users))
}

#[get("/{uid}")]
pub async fn get_user(app: web::Data<App>, current_user: OptCurrentUser, uid: web::Path<String>) -> Response {
    let user_id = current_user.resolve(&uid)?;
    let user = User::find_by_id(&app.store, &user_id).await?;

    Ok(HttpResponse::Ok().json(ShowUser::from(user)))
}

#[get("/username/{username}")]
pub async fn get_user_by_username(app: web::Data<App>, username: web::Path<String>) -> Response {
    let user = User::find_by_username(&app.store, &username).await?;

    Ok(HttpResponse::Ok().json(user.map(ShowUser::from)))
}

#[post("")]
pub async fn create_user(app: web::Data<App>, mut user: web::Json<User>) -> Response {
    user.insert(&app.store).await?;

    Ok(HttpResponse::Ok().json(ShowUser::from(user.into_inner())))
}

#[put("/{uid}")]
pub async fn update_user(
    app: web::Data<App>,
    current_user: OptCurrentUser,
    uid: web::Path<String>,
    update: web::Json<UpdateUser>,
) -> Response {
    let user_id = current_user.resolve(&uid)?;
    let user = User::update(&app.store, &user_id, &update).await?;

    Ok(HttpResponse::Ok().json(user))
}

#[delete("/{uid}")]
pub async fn delete_user(app: web::Data<App>, current_user: OptCurrentUser, uid: web::Path<String>) -> Response {
    let user_id = current_user.resolve(&uid)?;
    let count = User::delete(&app.store, &user_id).await?;

    Ok(deleted(count))
}

#[delete("/username/{username}")]
pub async fn delete_user_by_username(app: web::Data<App>, username: web::Path<String>) -> Response {
    let count = User::delete_by_username(&app.store, &username).await?;

    Ok(deleted(count))
}
