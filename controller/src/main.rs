mod gpio;
mod host;
mod w1;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    host::run().await
}
