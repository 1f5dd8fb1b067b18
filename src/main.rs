#[tokio::main]
async fn main() {
    if let Err(e) = omni_codec::cli::run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
