pub mod ai_service;
pub mod challenge_service;
pub mod evaluation_service;
pub mod join_code;
pub mod judge;
pub mod reward_service;
pub mod submission_service;
pub mod test_service;
pub mod user_service;

pub use ai_service::AiService;
pub use challenge_service::ChallengeService;
pub use evaluation_service::EvaluationService;
pub use judge::{CodeJudge, Judge0Client};
pub use reward_service::RewardService;
pub use submission_service::SubmissionService;
pub use test_service::TestService;
pub use user_service::UserService;
