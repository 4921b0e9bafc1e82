//! Database entities.

#![allow(missing_docs)]

pub mod alert;
pub mod application;
pub mod article;
pub mod election;
pub mod live_coverage;
pub mod live_coverage_editor;
pub mod live_coverage_question;
pub mod live_coverage_update;
pub mod session;
pub mod user;

pub use alert::Entity as Alert;
pub use application::Entity as Application;
pub use article::Entity as Article;
pub use election::Entity as Election;
pub use live_coverage::Entity as LiveCoverage;
pub use live_coverage_editor::Entity as LiveCoverageEditor;
pub use live_coverage_question::Entity as LiveCoverageQuestion;
pub use live_coverage_update::Entity as LiveCoverageUpdate;
pub use session::Entity as Session;
pub use user::Entity as User;
