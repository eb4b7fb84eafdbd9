pub mod pause;
pub mod session;
pub mod user;

pub use pause::Pause;
pub use session::WorkSession;
pub use user::User;
