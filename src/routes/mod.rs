mod auth;
mod authors;
mod blogs;
mod health_check;
mod readinglists;
mod users;

pub use auth::login;
pub use auth::logout;
pub use authors::list_authors;
pub use blogs::{create_blog, delete_blog, list_blogs, update_blog};
pub use health_check::health_check;
pub use readinglists::{create_entry, update_entry};
pub use users::{create_user, get_user, list_users, rename_user};
