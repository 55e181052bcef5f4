#[tokio::main]
async fn main() {
    if let Err(e) = medifyme_lib::run().await {
        eprintln!("medifyme: {e}");
        std::process::exit(1);
    }
}
