use actix_web::{delete, get, post, put, web, HttpResponse};

use crate::api::request::OptCurrentUser;
use crate::api::types::{deleted, Response};
use crate::app::App;
use crate::models::poll::{NewPoll, Poll};
use crate::models::poll_response::PollResponse;

#[post("/{uid}/polls")]
pub async fn create_poll(
    app: web::Data<App>,
    current_user: OptCurrentUser,
    uid: web::Path<String>,
    new_poll: web::Json<NewPoll>,
) -> Response {
    let user_id = current_user.resolve(&uid)?;
    let poll = Poll::create(&app.store, &user_id, &new_poll).await?;

    Ok(HttpResponse::Ok().json(poll))
}

#[get("/{uid}/polls")]
pub async fn get_user_polls(app: web::Data<App>, current_user: OptCurrentUser, uid: web::Path<String>) -> Response {
    let user_id = current_user.resolve(&uid)?;
    let polls = Poll::find_by_creator(&app.store, &user_id).await?;

    Ok(HttpResponse::Ok().json(polls))
}

#[put("/{uid}/polls/{pid}/close")]
pub async fn close_poll(
    app: web::Data<App>,
    current_user: OptCurrentUser,
    path: web::Path<(String, String)>,
) -> Response {
    let (uid, pid) = path.into_inner();
    let user_id = current_user.resolve(&uid)?;

    let poll = Poll::close(&app.store, &user_id, &pid).await?;

    Ok(HttpResponse::Ok().json(poll))
}

#[delete("/{uid}/polls/{pid}")]
pub async fn delete_poll(
    app: web::Data<App>,
    current_user: OptCurrentUser,
    path: web::Path<(String, String)>,
) -> Response {
    let (uid, pid) = path.into_inner();
    let user_id = current_user.resolve(&uid)?;

    let count = Poll::delete(&app.store, &user_id, &pid).await?;

    Ok(deleted(count))
}

#[get("")]
pub async fn get_polls(app: web::Data<App>) -> Response {
    let polls = Poll::find_all(&app.store).await?;

    Ok(HttpResponse::Ok().json(polls))
}

#[get("/{pid}")]
pub async fn get_poll(app: web::Data<App>, pid: web::Path<String>) -> Response {
    let poll = Poll::find_populated(&app.store, &pid).await?;

    Ok(HttpResponse::Ok().json(poll))
}

#[get("/{pid}/responses")]
pub async fn get_poll_responses(app: web::Data<App>, pid: web::Path<String>) -> Response {
    let responses = PollResponse::find_by_poll(&app.store, &pid).await?;

    Ok(HttpResponse::Ok().json(responses))
}

#[get("/{pid}/tally")]
pub async fn get_poll_tally(app: web::Data<App>, pid: web::Path<String>) -> Response {
    let tally = Poll::tally(&app.store, &pid).await?;

    Ok(HttpResponse::Ok().json(tally))
}
