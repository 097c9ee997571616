pub mod ai_handler;
pub mod auth_handler;
pub mod challenge_handler;
pub mod test_handler;
pub mod user_handler;

use actix_web::web;

use crate::auth::AuthMiddleware;

/// Registers every route. Health probes and the auth endpoints are
/// public; everything else sits behind the bearer-token middleware.
/// Fixed paths are registered before their `{id}` siblings so they
/// win the match.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(user_handler::health_check)
        .service(user_handler::health_check_live)
        .service(user_handler::health_check_ready)
        .service(auth_handler::register)
        .service(auth_handler::login)
        .service(auth_handler::refresh_token)
        .service(
            web::scope("")
                .wrap(AuthMiddleware)
                .service(test_handler::create_test)
                .service(test_handler::get_all_tests)
                .service(test_handler::create_ai_test)
                .service(test_handler::get_my_tests)
                .service(test_handler::my_results)
                .service(test_handler::find_test_by_code)
                .service(test_handler::submit_test)
                .service(test_handler::my_result)
                .service(test_handler::results_for_test)
                .service(test_handler::run_code)
                .service(test_handler::evaluate_result)
                .service(test_handler::get_test)
                .service(test_handler::delete_test)
                .service(challenge_handler::create_challenge)
                .service(challenge_handler::list_challenges)
                .service(challenge_handler::todays_challenge)
                .service(challenge_handler::attempt_challenge)
                .service(challenge_handler::get_challenge)
                .service(challenge_handler::update_challenge)
                .service(challenge_handler::delete_challenge)
                .service(user_handler::me)
                .service(user_handler::xp_leaderboard)
                .service(user_handler::my_analytics)
                .service(ai_handler::generate_questions),
        );
}
