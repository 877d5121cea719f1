use dotenvy::dotenv;
use log::info;
use order_fulfillment_server::{cli::handle_command_line_args, config::ServerConfig, server::run_server};

#[actix_web::main]
async fn main() {
    dotenv().ok();
    env_logger::init();
    handle_command_line_args();
    let config = ServerConfig::from_env_or_default();

    info!("🚀️ Starting server on {}:{}", config.host, config.port);
    if let Err(e) = run_server(config).await {
        eprintln!("{e}");
        std::process::exit(1);
    }
    println!("Bye!");
}
