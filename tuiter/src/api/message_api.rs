use actix_web::{delete, get, post, web, HttpResponse};

use crate::api::request::OptCurrentUser;
use crate::api::types::{deleted, Response};
use crate::app::App;
use crate::models::message::{Message, NewMessage};

#[post("/{uid}/messages/{rid}")]
pub async fn send_message(
    app: web::Data<App>,
    current_user: OptCurrentUser,
    path: web::Path<(String, String)>,
    body: web::Json<NewMessage>,
) -> Response {
    let (uid, rid) = path.into_inner();
    let user_id = current_user.resolve(&uid)?;
    let recipient_id = current_user.resolve(&rid)?;

    let message = Message::send(&app.store, &user_id, &recipient_id, &body).await?;

    Ok(HttpResponse::Ok().json(message))
}

#[get("/{uid}/messages/sent")]
pub async fn get_sent_messages(app: web::Data<App>, current_user: OptCurrentUser, uid: web::Path<String>) -> Response {
    let user_id = current_user.resolve(&uid)?;
    let messages = Message::sent_by(&app.store, &user_id).await?;

    Ok(HttpResponse::Ok().json(messages))
}

#[get("/{uid}/messages/received")]
pub async fn get_received_messages(
    app: web::Data<App>,
    current_user: OptCurrentUser,
    uid: web::Path<String>,
) -> Response {
    let user_id = current_user.resolve(&uid)?;
    let messages = Message::received_by(&app.store, &user_id).await?;

    Ok(HttpResponse::Ok().json(messages))
}

#[delete("/{uid}/messages/{mid}")]
pub async fn delete_message(
    app: web::Data<App>,
    current_user: OptCurrentUser,
    path: web::Path<(String, String)>,
) -> Response {
    let (uid, mid) = path.into_inner();
    let user_id = current_user.resolve(&uid)?;

    let count = Message::delete(&app.store, &user_id, &mid).await?;

    Ok(deleted(count))
}

#[get("")]
pub async fn get_messages(app: web::Data<App>) -> Response {
    let messages = Message::find_all(&app.store).await?;

    Ok(HttpResponse::Ok().json(messages))
}

#[get("/{mid}")]
pub async fn get_message(app: web::Data<App>, mid: web::Path<String>) -> Response {
    let message = Message::find_by_id(&app.store, &mid).await?;

    Ok(HttpResponse::Ok().json(message))
}
