// Domain types shared by the repositories, services and the CLI.
// Wire shapes live in `repository::wire`; nothing here knows about them.

pub mod common;
pub mod epic;
pub mod message;
pub mod project;
pub mod settings;
pub mod test_case;
pub mod test_scenario;
pub mod user;
pub mod user_story;

pub use common::*;
pub use epic::*;
pub use message::*;
pub use project::*;
pub use settings::*;
pub use test_case::*;
pub use test_scenario::*;
pub use user::*;
pub use user_story::*;
