use actix_web::{delete, get, post, web, HttpResponse};

use crate::api::request::OptCurrentUser;
use crate::api::types::{deleted, Response};
use crate::app::App;
use crate::models::bookmark::Bookmark;

#[post("/{uid}/bookmarks/{tid}")]
pub async fn bookmark_tuit(
    app: web::Data<App>,
    current_user: OptCurrentUser,
    path: web::Path<(String, String)>,
) -> Response {
    let (uid, tid) = path.into_inner();
    let user_id = current_user.resolve(&uid)?;

    let bookmark = Bookmark::create(&app.store, &user_id, &tid).await?;

    Ok(HttpResponse::Ok().json(bookmark))
}

#[delete("/{uid}/bookmarks/{tid}")]
pub async fn unbookmark_tuit(
    app: web::Data<App>,
    current_user: OptCurrentUser,
    path: web::Path<(String, String)>,
) -> Response {
    let (uid, tid) = path.into_inner();
    let user_id = current_user.resolve(&uid)?;

    let count = Bookmark::delete(&app.store, &user_id, &tid).await?;

    Ok(deleted(count))
}

#[get("/{uid}/bookmarks")]
pub async fn get_user_bookmarks(app: web::Data<App>, current_user: OptCurrentUser, uid: web::Path<String>) -> Response {
    let user_id = current_user.resolve(&uid)?;
    let tuits = Bookmark::tuits_bookmarked_by(&app.store, &user_id).await?;

    Ok(HttpResponse::Ok().json(tuits))
}

#[get("")]
pub async fn get_bookmarks(app: web::Data<App>) -> Response {
    let bookmarks = Bookmark::find_all(&app.store).await?;

    Ok(HttpResponse::Ok().json(bookmarks))
}

#[get("/{bid}")]
pub async fn get_bookmark(app: web::Data<App>, bid: web::Path<String>) -> Response {
    let bookmark = Bookmark::find_populated(&app.store, &bid).await?;

    Ok(HttpResponse::Ok().json(bookmark))
}
