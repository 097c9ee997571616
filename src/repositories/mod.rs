pub mod challenge_attempt_repository;
pub mod challenge_repository;
pub mod refresh_token_repository;
pub mod result_repository;
pub mod test_repository;
pub mod user_repository;

pub use challenge_attempt_repository::{ChallengeAttemptRepository, MongoChallengeAttemptRepository};
pub use challenge_repository::{ChallengeRepository, MongoChallengeRepository};
pub use refresh_token_repository::{MongoRefreshTokenRepository, RefreshTokenRepository};
pub use result_repository::{MongoResultRepository, ResultRepository};
pub use test_repository::{MongoTestRepository, TestRepository};
pub use user_repository::{MongoUserRepository, UserRepository};
