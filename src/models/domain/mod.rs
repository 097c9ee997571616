pub mod challenge;
pub mod challenge_attempt;
pub mod refresh_token;
pub mod test;
pub mod test_result;
pub mod user;
pub use challenge::{Challenge, ChallengeKind};
pub use challenge_attempt::ChallengeAttempt;
pub use refresh_token::RefreshToken;
pub use test::{Question, Test, TestCase, TestKind};
pub use test_result::{
    AnswerFeedback, CaseOutcome, ProctoringEvent, QuestionJudgeDetail, SubmittedAnswer, TestResult,
};
pub use user::{User, UserRole};
