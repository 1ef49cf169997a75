use actix_web::{delete, get, post, put, web, HttpResponse};

use crate::api::request::OptCurrentUser;
use crate::api::types::{deleted, Response};
use crate::app::App;
use crate::models::poll_response::{ChosenOption, PollResponse};

#[put("/{uid}/poll/{pid}/response")]
pub async fn toggle_poll_response(
    app: web::Data<App>,
    current_user: OptCurrentUser,
    path: web::Path<(String, String)>,
    choice: web::Json<ChosenOption>,
) -> Response {
    let (uid, pid) = path.into_inner();
    let user_id = current_user.resolve(&uid)?;

    let response = PollResponse::toggle(&app.store, &user_id, &pid, &choice).await?;

    Ok(HttpResponse::Ok().json(response))
}

#[post("/{uid}/poll/{pid}/response")]
pub async fn create_poll_response(
    app: web::Data<App>,
    current_user: OptCurrentUser,
    path: web::Path<(String, String)>,
    choice: web::Json<ChosenOption>,
) -> Response {
    let (uid, pid) = path.into_inner();
    let user_id = current_user.resolve(&uid)?;

    let response = PollResponse::create(&app.store, &user_id, &pid, &choice).await?;

    Ok(HttpResponse::Ok().json(response))
}

#[delete("/{uid}/poll/{pid}/response")]
pub async fn delete_poll_response(
    app: web::Data<App>,
    current_user: OptCurrentUser,
    path: web::Path<(String, String)>,
) -> Response {
    let (uid, pid) = path.into_inner();
    let user_id = current_user.resolve(&uid)?;

    let count = PollResponse::delete(&app.store, &user_id, &pid).await?;

    Ok(deleted(count))
}

#[get("/{uid}/poll-responses")]
pub async fn get_user_poll_responses(
    app: web::Data<App>,
    current_user: OptCurrentUser,
    uid: web::Path<String>,
) -> Response {
    let user_id = current_user.resolve(&uid)?;
    let responses = PollResponse::find_by_user(&app.store, &user_id).await?;

    Ok(HttpResponse::Ok().json(responses))
}
