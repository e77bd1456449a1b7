pub mod health;
pub mod tasks;
pub mod users;

use actix_web::web;

/// Registers every route. Fixed paths must precede the `{id}/avatar`
/// pattern so `/users/me/avatar` is not captured as a user id.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(health::health)
        .service(
            web::scope("/users")
                .service(users::register)
                .service(users::signin)
                .service(users::signout)
                .service(users::signout_all)
                .service(users::me)
                .service(users::update_me)
                .service(users::delete_me)
                .service(users::upload_avatar)
                .service(users::delete_avatar)
                .service(users::get_avatar)
                .service(users::list_users),
        )
        .service(
            web::scope("/tasks")
                .service(tasks::list_tasks)
                .service(tasks::create_task)
                .service(tasks::get_task)
                .service(tasks::update_task)
                .service(tasks::delete_task),
        );
}
