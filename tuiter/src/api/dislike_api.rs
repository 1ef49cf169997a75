use actix_web::{delete, get, post, put, web, HttpResponse};

use crate::api::request::OptCurrentUser;
use crate::api::types::{deleted, Response};
use crate::app::App;
use crate::models::dislike::Dislike;
use crate::models::engagement::{engage, toggle, tuits_engaged_by, users_engaged_with, withdraw};

#[put("/{uid}/dislikes/{tid}")]
pub async fn toggle_dislike(
    app: web::Data<App>,
    current_user: OptCurrentUser,
    path: web::Path<(String, String)>,
) -> Response {
    let (uid, tid) = path.into_inner();
    let user_id = current_user.resolve(&uid)?;

    toggle::<Dislike>(&app.store, app.counter_update(), &user_id, &tid).await?;

    Ok(HttpResponse::Ok().finish())
}

#[post("/{uid}/dislikes/{tid}")]
pub async fn create_dislike(
    app: web::Data<App>,
    current_user: OptCurrentUser,
    path: web::Path<(String, String)>,
) -> Response {
    let (uid, tid) = path.into_inner();
    let user_id = current_user.resolve(&uid)?;

    let dislike = engage::<Dislike>(&app.store, &user_id, &tid).await?;

    Ok(HttpResponse::Ok().json(dislike))
}

#[delete("/{uid}/dislikes/{tid}")]
pub async fn delete_dislike(
    app: web::Data<App>,
    current_user: OptCurrentUser,
    path: web::Path<(String, String)>,
) -> Response {
    let (uid, tid) = path.into_inner();
    let user_id = current_user.resolve(&uid)?;

    let count = withdraw::<Dislike>(&app.store, &user_id, &tid).await?;

    Ok(deleted(count))
}

#[get("/{uid}/dislikes")]
pub async fn get_user_dislikes(app: web::Data<App>, current_user: OptCurrentUser, uid: web::Path<String>) -> Response {
    let user_id = current_user.resolve(&uid)?;
    let tuits = tuits_engaged_by::<Dislike>(&app.store, &user_id).await?;

    Ok(HttpResponse::Ok().json(tuits))
}

#[get("/{tid}/dislikes")]
pub async fn get_tuit_dislikes(app: web::Data<App>, tid: web::Path<String>) -> Response {
    let users = users_engaged_with::<Dislike>(&app.store, &tid).await?;

    Ok(HttpResponse::Ok().json(users))
}
