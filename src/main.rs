use actix_web::{middleware::Logger, web, App, HttpServer};

use quiz_butterfly_server::{
    app_state::AppState,
    config::Config,
    db::Database,
    handlers,
    middleware::{cors, RequestIdMiddleware},
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            log::error!("Invalid configuration: {}", err);
            std::process::exit(1);
        }
    };

    if config.is_production() {
        if let Err(err) = config.validate_for_production() {
            log::error!("Refusing to start in production: {}", err);
            std::process::exit(1);
        }
    }

    let db = match Database::connect(&config).await {
        Ok(db) => db,
        Err(err) => {
            log::error!("Failed to initialize database: {}", err);
            std::process::exit(1);
        }
    };

    let bind_address = config.bind_address();
    let state = web::Data::new(AppState::new(config, &db));

    log::info!(
        "Starting HTTP server on {}:{}",
        bind_address.0,
        bind_address.1
    );

    let server = match HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(RequestIdMiddleware)
            .wrap(Logger::new(
                r#"%a "%r" %s %b %Dms request_id=%{x-request-id}o"#,
            ))
            .wrap(cors())
            .configure(handlers::configure)
    })
    .bind(bind_address)
    {
        Ok(server) => server.run(),
        Err(err) => {
            log::error!("Failed to bind HTTP server: {}", err);
            db.close().await;
            return Err(err);
        }
    };

    let result = server.await;
    if let Err(err) = &result {
        log::error!("HTTP server stopped with an error: {}", err);
    }

    db.close().await;
    result
}
