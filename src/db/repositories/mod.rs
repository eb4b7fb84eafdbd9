pub(crate) mod pauses;
pub(crate) mod sessions;
pub(crate) mod users;
