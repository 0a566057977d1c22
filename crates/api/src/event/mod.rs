pub mod create_event;
pub mod delete_event;
pub mod deliver_reminders;
pub mod get_user_events;
pub mod scan_due_events;
pub mod update_event;

use actix_web::web;
use create_event::create_event_controller;
use delete_event::delete_event_controller;
use get_user_events::get_user_events_controller;
use update_event::update_event_controller;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/user/{telegram_id}/events",
        web::post().to(create_event_controller),
    );
    cfg.route(
        "/user/{telegram_id}/events",
        web::get().to(get_user_events_controller),
    );
    cfg.route(
        "/user/{telegram_id}/events/{event_id}",
        web::put().to(update_event_controller),
    );
    cfg.route(
        "/user/{telegram_id}/events/{event_id}",
        web::delete().to(delete_event_controller),
    );
}
