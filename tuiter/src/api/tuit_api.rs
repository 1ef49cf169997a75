use actix_web::{delete, get, post, put, web, HttpResponse};

use crate::api::request::OptCurrentUser;
use crate::api::types::{deleted, Response};
use crate::app::App;
use crate::models::tuit::{Stats, Tuit, TuitText};

#[get("")]
pub async fn get_tuits(app: web::Data<App>) -> Response {
    let tuits = Tuit::find_all(&app.store).await?;

    Ok(HttpResponse::Ok().json(tuits))
}

#[get("/{tid}")]
pub async fn get_tuit(app: web::Data<App>, tid: web::Path<String>) -> Response {
    let tuit = Tuit::find_populated(&app.store, &tid).await?;

    Ok(HttpResponse::Ok().json(tuit))
}

#[get("/{uid}/tuits")]
pub async fn get_user_tuits(app: web::Data<App>, current_user: OptCurrentUser, uid: web::Path<String>) -> Response {
    let user_id = current_user.resolve(&uid)?;
    let tuits = Tuit::find_by_user(&app.store, &user_id).await?;

    Ok(HttpResponse::Ok().json(tuits))
}

#[post("/{uid}/tuits")]
pub async fn create_tuit(
    app: web::Data<App>,
    current_user: OptCurrentUser,
    uid: web::Path<String>,
    text: web::Json<TuitText>,
) -> Response {
    let user_id = current_user.resolve(&uid)?;
    let tuit = Tuit::create(&app.store, &user_id, &text).await?;

    Ok(HttpResponse::Ok().json(tuit))
}

#[put("/{tid}")]
pub async fn update_tuit(app: web::Data<App>, tid: web::Path<String>, text: web::Json<TuitText>) -> Response {
    let tuit = Tuit::update_text(&app.store, &tid, &text).await?;

    Ok(HttpResponse::Ok().json(tuit))
}

#[delete("/{tid}")]
pub async fn delete_tuit(app: web::Data<App>, tid: web::Path<String>) -> Response {
    let count = Tuit::delete(&app.store, &tid).await?;

    Ok(deleted(count))
}

#[get("/{tid}/stats/check")]
pub async fn check_stats(app: web::Data<App>, tid: web::Path<String>) -> Response {
    let check = Stats::check(&app.store, &tid).await?;

    Ok(HttpResponse::Ok().json(check))
}

#[post("/{tid}/stats/reconcile")]
pub async fn reconcile_stats(app: web::Data<App>, tid: web::Path<String>) -> Response {
    let drifts = Stats::reconcile(&app.store, &tid).await?;

    Ok(HttpResponse::Ok().json(drifts))
}
