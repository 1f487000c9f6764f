//! Starfleet Gateway Example
//!
//! Serves a few in-memory collections through the gateway:
//! - `Starship`: paging, search and retrieval
//! - `Character`: paging and retrieval
//! - `AstronomicalObject`: retrieval only
//!
//! Pass a YAML configuration path as the first argument to change the
//! namespace, the pagination bounds, or to mount upstream HTTP resources.

use jsonapi_gateway::prelude::*;
use tracing_subscriber::EnvFilter;

fn starships() -> InMemoryResource {
    InMemoryResource::new(vec![
        json!({"uid": "STMA0000001", "name": "USS Enterprise", "registry": "NCC-1701", "status": "Destroyed"}),
        json!({"uid": "STMA0000002", "name": "USS Defiant", "registry": "NX-74205", "status": "Destroyed"}),
        json!({"uid": "STMA0000003", "name": "USS Voyager", "registry": "NCC-74656", "status": "Active"}),
        json!({"uid": "STMA0000004", "name": "USS Excelsior", "registry": "NX-2000", "status": "Active"}),
        json!({"uid": "STMA0000005", "name": "USS Enterprise", "registry": "NCC-1701-D", "status": "Destroyed"}),
        json!({"uid": "STMA0000006", "name": "USS Cerritos", "registry": "NCC-75567", "status": "Active"}),
    ])
}

fn characters() -> InMemoryResource {
    InMemoryResource::new(vec![
        json!({"uid": "CHMA0000001", "name": "James T. Kirk", "gender": "M"}),
        json!({"uid": "CHMA0000002", "name": "Kathryn Janeway", "gender": "F"}),
        json!({"uid": "CHMA0000003", "name": "Benjamin Sisko", "gender": "M"}),
    ])
}

fn astronomical_objects() -> InMemoryResource {
    InMemoryResource::new(vec![
        json!({"uid": "AOMA0000001", "name": "Vulcan", "astronomicalObjectType": "PLANET"}),
        json!({"uid": "AOMA0000002", "name": "Qo'noS", "astronomicalObjectType": "PLANET"}),
    ])
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => GatewayConfig::from_yaml_file(&path)?,
        None => GatewayConfig {
            banner: "Starfleet JSON:API gateway".to_string(),
            ..GatewayConfig::default()
        },
    };
    let namespace = config.namespace.trim_matches('/').to_string();

    let characters = Arc::new(characters());

    let builder = GatewayBuilder::new()
        .with_config(config)
        .register(ResourceDescriptor::new("Starship").with_all(Arc::new(starships())))?
        .register(
            ResourceDescriptor::new("Character")
                .with_page(characters.clone())
                .with_get(characters),
        )?
        .register(ResourceDescriptor::new("AstronomicalObject").with_get(Arc::new(astronomical_objects())))?;

    println!("\n🌐 Gateway running on http://127.0.0.1:3000");
    println!("\n📚 Try:");
    println!("    GET  /{}/starship?page=1&size=2", namespace);
    println!("    POST /{}/starship?sort=-registry   (form or JSON criteria)", namespace);
    println!("    GET  /{}/character/CHMA0000002", namespace);
    println!("    GET  /{}/astronomical-object/AOMA0000001", namespace);

    builder.serve("127.0.0.1:3000").await
}
