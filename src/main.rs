//Third-party-dependencies
use actix_cors::Cors;
use actix_web::{App, HttpServer};
use log::info;

use timehaven_service::routes;
use timehaven_service::routes::{availability_routes, team_routes};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let address = format!("0.0.0.0:{}", port);

    std::fs::create_dir_all("./storage")?;
    info!("Server started at {}", address);

    HttpServer::new(|| {
        App::new()
            .wrap(Cors::permissive())
            .configure(routes::init_routes)
            .configure(team_routes::init_routes)
            .configure(availability_routes::init_routes)
    })
        .bind(address)?
        .run()
        .await
}
