use actix_web::{delete, get, post, web, HttpResponse};

use crate::api::request::OptCurrentUser;
use crate::api::types::{deleted, Response};
use crate::app::App;
use crate::models::follow::Follow;

#[post("/{uid}/follows/{fid}")]
pub async fn follow_user(
    app: web::Data<App>,
    current_user: OptCurrentUser,
    path: web::Path<(String, String)>,
) -> Response {
    let (uid, fid) = path.into_inner();
    let user_id = current_user.resolve(&uid)?;
    let following_id = current_user.resolve(&fid)?;

    let follow = Follow::create(&app.store, &user_id, &following_id).await?;

    Ok(HttpResponse::Ok().json(follow))
}

#[delete("/{uid}/follows/{fid}")]
pub async fn unfollow_user(
    app: web::Data<App>,
    current_user: OptCurrentUser,
    path: web::Path<(String, String)>,
) -> Response {
    let (uid, fid) = path.into_inner();
    let user_id = current_user.resolve(&uid)?;
    let following_id = current_user.resolve(&fid)?;

    let count = Follow::delete(&app.store, &user_id, &following_id).await?;

    Ok(deleted(count))
}

#[get("/{uid}/followers")]
pub async fn get_followers(app: web::Data<App>, current_user: OptCurrentUser, uid: web::Path<String>) -> Response {
    let user_id = current_user.resolve(&uid)?;
    let followers = Follow::followers(&app.store, &user_id).await?;

    Ok(HttpResponse::Ok().json(followers))
}

#[get("/{uid}/following")]
pub async fn get_following(app: web::Data<App>, current_user: OptCurrentUser, uid: web::Path<String>) -> Response {
    let user_id = current_user.resolve(&uid)?;
    let following = Follow::following(&app.store, &user_id).await?;

    Ok(HttpResponse::Ok().json(following))
}

#[get("")]
pub async fn get_follows(app: web::Data<App>) -> Response {
    let follows = Follow::find_all(&app.store).await?;

    Ok(HttpResponse::Ok().json(follows))
}

#[get("/{id}")]
pub async fn get_follow(app: web::Data<App>, id: web::Path<String>) -> Response {
    let follow = Follow::find_populated(&app.store, &id).await?;

    Ok(HttpResponse::Ok().json(follow))
}
