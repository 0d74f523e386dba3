use instant_preview_client::{
    Client, EmailSource, ImageUrlOptions, ImageVisibility, PreviewApi, PreviewConfiguration,
    PreviewOptions,
};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), instant_preview_client::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let api_key = std::env::var("INSTANT_API_KEY").unwrap_or_default();
    let client = Client::builder()
        .api_key(api_key)
        .timeout(Duration::from_secs(120))
        .build()?;

    let clients = client.clients().await?;
    println!("Render targets: {}", clients.join(", "));

    let email = EmailSource::from_html("<h1>Hello from Rust</h1>").with_subject("Demo");
    let handle = client.create_email(&email).await?;
    println!("Created: {}", handle.email_guid);

    let targets: Vec<PreviewConfiguration> = clients
        .iter()
        .take(3)
        .map(|name| PreviewConfiguration::new(name.as_str()))
        .collect();
    client.prefetch_previews(&handle.email_guid, &targets).await?;

    for target in &targets {
        let options = PreviewOptions::default().images(ImageVisibility::Allowed);
        match client
            .get_preview(&handle.email_guid, &target.client, &options)
            .await
        {
            Ok(urls) => {
                for (size, url) in urls {
                    println!("{} {size}: {url}", target.client);
                }
            }
            Err(err) => println!("{} failed: {err}", target.client),
        }

        let embed = client.preview_image_url(
            &handle.email_guid,
            &target.client,
            &ImageUrlOptions::default().capture_size("thumb"),
        )?;
        println!("{} embed: {embed}", target.client);
    }

    Ok(())
}
