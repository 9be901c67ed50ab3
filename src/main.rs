#[tokio::main]
async fn main() {
    if let Err(e) = care_companion_lib::run().await {
        eprintln!("care-companion: {e}");
        std::process::exit(1);
    }
}
