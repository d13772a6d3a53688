mod get_me;
mod update_profile;

use actix_web::web;
use get_me::get_me_controller;
use update_profile::update_profile_controller;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/me", web::get().to(get_me_controller));
    cfg.route("/me/profile", web::put().to(update_profile_controller));
}
