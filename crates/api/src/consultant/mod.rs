mod ask_consultant;

use actix_web::web;
use ask_consultant::ask_consultant_controller;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/consultant", web::post().to(ask_consultant_controller));
}
