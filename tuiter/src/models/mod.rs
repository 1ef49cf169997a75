pub mod bookmark;
pub mod dislike;
pub mod engagement;
pub mod follow;
pub mod like;
pub mod message;
pub mod poll;
pub mod poll_response;
pub mod tuit;
pub mod user;
