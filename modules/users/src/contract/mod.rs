pub mod client;
pub mod context;
pub mod error;
pub mod model;

pub use context::RequestCtx;
pub use error::UsersError;
pub use model::{NewUser, Pagination, User, UserFilter, UserPatch};
