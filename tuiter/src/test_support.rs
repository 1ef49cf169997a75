use crate::app::{App, Config};
use crate::models::poll::{NewPoll, Poll};
use crate::models::tuit::{Tuit, TuitText};
use crate::models::user::User;
use crate::store::{MemoryStore, Store};

pub const PASSWORD: &str = "secret";

const TEST_CONFIG: &str = r#"
port = 4000
allowed_origin = "http://localhost:3000"
secret_key = "test-secret-key-test-secret-key-test-secret-key-test-secret-key!"
"#;

pub fn memory_store() -> Store {
    Store::Memory(MemoryStore::new())
}

pub fn test_app() -> App {
    let config = Config::parse(TEST_CONFIG).expect("test config parses");

    App {
        config,
        store: memory_store(),
    }
}

pub async fn create_user(store: &Store, username: &str) -> User {
    let mut user = User {
        username: username.to_string(),
        password: PASSWORD.to_string(),
        email: format!("{}@tuiter.dev", username),
        ..Default::default()
    };
    user.insert(store).await.expect("user is created");

    user
}

pub async fn create_tuit(store: &Store, user_id: &str, text: &str) -> Tuit {
    let text = TuitText { tuit: text.to_string() };

    Tuit::create(store, user_id, &text).await.expect("tuit is created")
}

pub async fn create_poll(store: &Store, user_id: &str, question: &str, options: &[&str]) -> Poll {
    let new_poll = NewPoll {
        poll_question: question.to_string(),
        poll_options: options.iter().map(|o| o.to_string()).collect(),
    };

    Poll::create(store, user_id, &new_poll).await.expect("poll is created")
}
