pub mod add_expense;
pub mod delete_expense;
pub mod get_expense_statistics;
pub mod get_top_expenses;

use actix_web::web;
use add_expense::add_expense_controller;
use delete_expense::delete_expense_controller;
use get_expense_statistics::get_expense_statistics_controller;
use get_top_expenses::get_top_expenses_controller;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/user/{telegram_id}/expenses",
        web::post().to(add_expense_controller),
    );
    cfg.route(
        "/user/{telegram_id}/expenses",
        web::get().to(get_top_expenses_controller),
    );
    cfg.route(
        "/user/{telegram_id}/expenses/{expense_id}",
        web::delete().to(delete_expense_controller),
    );
    cfg.route(
        "/user/{telegram_id}/statistics",
        web::get().to(get_expense_statistics_controller),
    );
}
