mod cli;
mod config;
mod gateways;
mod report;

fn main() {
    dotenvy::dotenv().ok();
    env_logger::init();
    if let Err(err) = cli::run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
