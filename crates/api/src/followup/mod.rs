mod check_and_send_followups;

use actix_web::web;
use check_and_send_followups::check_and_send_followups_controller;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/followups/run",
        web::post().to(check_and_send_followups_controller),
    );
}
