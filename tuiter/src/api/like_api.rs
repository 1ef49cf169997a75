use actix_web::{delete, get, post, put, web, HttpResponse};

use crate::api::request::OptCurrentUser;
use crate::api::types::{deleted, Response};
use crate::app::App;
use crate::models::engagement::{engage, toggle, tuits_engaged_by, users_engaged_with, withdraw};
use crate::models::like::Like;

#[put("/{uid}/likes/{tid}")]
pub async fn toggle_like(
    app: web::Data<App>,
    current_user: OptCurrentUser,
    path: web::Path<(String, String)>,
) -> Response {
    let (uid, tid) = path.into_inner();
    let user_id = current_user.resolve(&uid)?;

    toggle::<Like>(&app.store, app.counter_update(), &user_id, &tid).await?;

    Ok(HttpResponse::Ok().finish())
}

#[post("/{uid}/likes/{tid}")]
pub async fn create_like(
    app: web::Data<App>,
    current_user: OptCurrentUser,
    path: web::Path<(String, String)>,
) -> Response {
    let (uid, tid) = path.into_inner();
    let user_id = current_user.resolve(&uid)?;

    let like = engage::<Like>(&app.store, &user_id, &tid).await?;

    Ok(HttpResponse::Ok().json(like))
}

#[delete("/{uid}/likes/{tid}")]
pub async fn delete_like(
    app: web::Data<App>,
    current_user: OptCurrentUser,
    path: web::Path<(String, String)>,
) -> Response {
    let (uid, tid) = path.into_inner();
    let user_id = current_user.resolve(&uid)?;

    let count = withdraw::<Like>(&app.store, &user_id, &tid).await?;

    Ok(deleted(count))
}

#[get("/{uid}/likes")]
pub async fn get_user_likes(app: web::Data<App>, current_user: OptCurrentUser, uid: web::Path<String>) -> Response {
    let user_id = current_user.resolve(&uid)?;
    let tuits = tuits_engaged_by::<Like>(&app.store, &user_id).await?;

    Ok(HttpResponse::Ok().json(tuits))
}

#[get("/{tid}/likes")]
pub async fn get_tuit_likes(app: web::Data<App>, tid: web::Path<String>) -> Response {
    let users = users_engaged_with::<Like>(&app.store, &tid).await?;

    Ok(HttpResponse::Ok().json(users))
}
