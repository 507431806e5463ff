#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = clientdesk_rust::run().await {
        eprintln!("clientdesk-rust fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
