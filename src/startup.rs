use actix_web::{middleware::Logger, web, App, HttpServer};
use actix_web::dev::Server;
use sqlx::PgPool;
use std::net::TcpListener;

use crate::auth::TokenCodec;
use crate::configuration::AuthSettings;
use crate::middleware::RequireAuth;
use crate::routes::{
    create_blog, create_entry, create_user, delete_blog, get_user, health_check, list_authors,
    list_blogs, list_users, login, logout, rename_user, update_blog, update_entry,
};

pub fn run(
    listener: TcpListener,
    connection: PgPool,
    auth_settings: AuthSettings,
) -> Result<Server, std::io::Error> {
    let codec = TokenCodec::new(&auth_settings);
    let pool = connection.clone();
    let connection = web::Data::new(connection);
    let codec_data = web::Data::new(codec.clone());

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())

            // Shared state
            .app_data(connection.clone())
            .app_data(codec_data.clone())

            // Public routes
            .route("/health_check", web::get().to(health_check))
            .route("/api/login", web::post().to(login))
            .service(
                web::resource("/api/users")
                    .route(web::post().to(create_user))
                    .route(web::get().to(list_users)),
            )
            // GET takes a numeric id, PUT the current username; extraction
            // is positional, so one pattern serves both
            .service(
                web::resource("/api/users/{id}")
                    .route(web::get().to(get_user))
                    .route(web::put().to(rename_user)),
            )
            .service(
                web::resource("/api/blogs")
                    .route(web::get().to(list_blogs))
                    .route(web::post().to(create_blog)),
            )
            .service(
                web::resource("/api/blogs/{id}")
                    .route(web::put().to(update_blog))
                    .route(web::delete().to(delete_blog)),
            )
            .route("/api/authors", web::get().to(list_authors))

            // Routes behind the bearer-auth middleware
            .service(
                web::scope("/api/logout")
                    .wrap(RequireAuth::new(pool.clone(), codec.clone()))
                    .route("", web::delete().to(logout)),
            )
            .service(
                web::scope("/api/readinglists")
                    .wrap(RequireAuth::new(pool.clone(), codec.clone()))
                    .route("", web::post().to(create_entry))
                    .route("/{id}", web::put().to(update_entry)),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
