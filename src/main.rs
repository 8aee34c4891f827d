use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use ldap_data_store::clients::HttpEndpointResolver;
use ldap_data_store::config::Config;
use ldap_data_store::domain::directory::ldap::LdapTransport;
use ldap_data_store::domain::directory::DirectoryTransport;
use ldap_data_store::domain::models::{FieldList, CONFIG_LDAP_ID};
use ldap_data_store::domain::EndpointResolver;
use ldap_data_store::storage::InMemoryEndpointRegistry;
use ldap_data_store::{api, middleware, AppState};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ldap_data_store=debug,actix_web=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env();
    let port = config.port;

    info!("Starting ldap-data-store on port {}", port);

    // Endpoint lookups: the endpoint service wins over a local registry file
    let resolver: Arc<dyn EndpointResolver> = match (&config.endpoint_service_url, &config.endpoints_file) {
        (Some(url), _) => {
            info!("Endpoint service URL: {}", url);
            Arc::new(HttpEndpointResolver::with_api_key(
                url.clone(),
                config.internal_api_key.clone(),
            ))
        }
        (None, Some(path)) => Arc::new(InMemoryEndpointRegistry::from_json_file(path)?),
        (None, None) => {
            warn!("No LDAP endpoint source configured; every lookup will fail");
            Arc::new(InMemoryEndpointRegistry::new())
        }
    };

    let transport: Arc<dyn DirectoryTransport> =
        Arc::new(LdapTransport::new().with_connect_timeout(config.connect_timeout));

    let app_state = web::Data::new(AppState::new(config.clone(), resolver, transport));

    if let Some(ldap_id) = &config.ldap_id {
        app_state.configure(&FieldList::new().with_field(CONFIG_LDAP_ID, ldap_id.clone()))?;
        info!("Configured with LDAP ID {}", ldap_id);
    }

    // Start HTTP server
    HttpServer::new(move || {
        // Configure CORS for local development and production
        let cors = Cors::default()
            .allowed_origin("http://localhost:3000")
            .allowed_origin("http://localhost:5173")
            .allowed_origin("http://127.0.0.1:3000")
            .allowed_origin("http://127.0.0.1:5173")
            .allowed_methods(vec!["GET", "POST", "PUT", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::ACCEPT,
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::HeaderName::from_static(middleware::CORRELATION_ID_HEADER),
            ])
            .max_age(3600);

        App::new()
            .wrap(cors)
            .app_data(app_state.clone())
            .configure(api::configure_routes)
    })
    .bind(("0.0.0.0", port))
    .with_context(|| format!("binding port {}", port))?
    .run()
    .await?;

    Ok(())
}
