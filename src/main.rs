use coinvert::{init_logging, App};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let app = App::new().await?;
    app.run().await?;

    Ok(())
}
