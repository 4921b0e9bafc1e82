//! Business logic services.

#![allow(missing_docs)]

pub mod alert;
pub mod application;
pub mod article;
pub mod election;
pub mod live_coverage;
pub mod session;
pub mod user;

pub use alert::{AlertService, CreateAlertInput, UpdateAlertInput};
pub use application::{ApplicationService, SubmitApplicationInput};
pub use article::{ArticlePage, ArticleService, CreateArticleInput, UpdateArticleInput};
pub use election::{
    CandidateResult, CreateElectionInput, ElectionChart, ElectionService, ElectionWithWarnings,
    UpdateElectionInput,
};
pub use live_coverage::{
    AnswerQuestionInput, AnsweredQuestion, AppendUpdateInput, AuthorSummary, CoverageEditor,
    CreateCoverageInput, FeedEntry, LiveCoverageService, ModerateQuestionInput,
    SubmitQuestionInput, UpdateCoverageInput, UpdatePayload,
};
pub use session::{IssuedSession, SessionService};
pub use user::{CreateUserInput, UpdateUserInput, UserService};
