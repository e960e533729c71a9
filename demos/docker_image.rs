use gitevent::core::{DockerImage, DockerImageRequest, Event, EventSink};
use gitevent::dbus::{SignalEmitter, ZbusTransport};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🐳 Docker image events over the system bus\n");

    let emitter = SignalEmitter::new(ZbusTransport::new());

    println!("Routes this emitter publishes:");
    for route in emitter.signal_emitters().routes() {
        println!("  {} on {}", route.interface, route.path);
    }
    println!();

    // Ask a builder for an image
    let request = Event::DockerImageRequested(DockerImageRequest {
        image_name: "gitevent".to_string(),
        image_version: "0.1.0".to_string(),
    });
    println!("📤 {}", request);
    emitter.accept(request).await?;

    // Announce the result
    let available = Event::DockerImageAvailable(DockerImage {
        image_name: "gitevent".to_string(),
        image_version: "0.1.0".to_string(),
        image_url: "registry.example.com/gitevent:0.1.0".to_string(),
    });
    println!("📤 {}", available);
    emitter.accept(available).await?;

    println!();
    println!("✓ Done. Run `gitevent --listen` in another terminal to see them arrive.");

    Ok(())
}
