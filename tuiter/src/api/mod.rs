pub mod request;
pub mod types;

mod auth_api;
mod bookmark_api;
mod dislike_api;
mod follow_api;
mod like_api;
mod message_api;
mod poll_api;
mod poll_response_api;
mod tuit_api;
mod user_api;

pub use auth_api::*;
pub use bookmark_api::*;
pub use dislike_api::*;
pub use follow_api::*;
pub use like_api::*;
pub use message_api::*;
pub use poll_api::*;
pub use poll_response_api::*;
pub use tuit_api::*;
pub use user_api::*;

use actix_web::web;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/auth")
            .service(register)
            .service(login)
            .service(profile)
            .service(logout),
    )
    .service(
        web::scope("/api/users")
            .service(get_users)
            .service(get_user_by_username)
            .service(delete_user_by_username)
            .service(get_user)
            .service(create_user)
            .service(update_user)
            .service(delete_user)
            // tuits
            .service(get_user_tuits)
            .service(create_tuit)
            // likes
            .service(toggle_like)
            .service(create_like)
            .service(delete_like)
            .service(get_user_likes)
            // dislikes
            .service(toggle_dislike)
            .service(create_dislike)
            .service(delete_dislike)
            .service(get_user_dislikes)
            // follows
            .service(follow_user)
            .service(unfollow_user)
            .service(get_followers)
            .service(get_following)
            // bookmarks
            .service(bookmark_tuit)
            .service(unbookmark_tuit)
            .service(get_user_bookmarks)
            // messages
            .service(get_sent_messages)
            .service(get_received_messages)
            .service(send_message)
            .service(delete_message)
            // polls
            .service(create_poll)
            .service(get_user_polls)
            .service(close_poll)
            .service(delete_poll)
            .service(toggle_poll_response)
            .service(create_poll_response)
            .service(delete_poll_response)
            .service(get_user_poll_responses),
    )
    .service(
        web::scope("/api/tuits")
            .service(get_tuits)
            .service(get_tuit)
            .service(update_tuit)
            .service(delete_tuit)
            .service(get_tuit_likes)
            .service(get_tuit_dislikes)
            .service(check_stats)
            .service(reconcile_stats),
    )
    .service(web::scope("/api/follows").service(get_follows).service(get_follow))
    .service(
        web::scope("/api/bookmarks")
            .service(get_bookmarks)
            .service(get_bookmark),
    )
    .service(web::scope("/api/messages").service(get_messages).service(get_message))
    .service(
        web::scope("/api/polls")
            .service(get_polls)
            .service(get_poll)
            .service(get_poll_responses)
            .service(get_poll_tally),
    );
}
