#[tokio::main]
async fn main() -> anyhow::Result<()> {
    affilink_lib::run().await
}
