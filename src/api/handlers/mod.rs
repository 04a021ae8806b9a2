pub mod callback;
pub use self::callback::{CallbackState, CookieConfig, callback, confirm};

pub mod health;
pub use self::health::health;
