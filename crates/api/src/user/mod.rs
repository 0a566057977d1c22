pub mod get_or_create_user;

use actix_web::web;
use get_or_create_user::get_or_create_user_controller;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/users", web::post().to(get_or_create_user_controller));
}
