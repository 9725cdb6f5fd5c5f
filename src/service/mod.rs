// Domain façades composed over the repositories.

mod auth;
mod backend;
mod resource;
mod test_case;

pub use auth::AuthService;
pub use backend::{Fixtures, Services};
pub use resource::ResourceService;
pub use test_case::TestCaseService;
