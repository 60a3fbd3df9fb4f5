#![allow(non_snake_case)]

#[cfg(feature = "ssr")]
mod config {
    use roster_store::SeedOptions;
    use serde::Deserialize;

    #[derive(Deserialize, Clone, Debug, Default)]
    #[serde(default)]
    pub struct Config {
        pub server: ServerConfig,
        pub storage: StorageConfig,
        pub seed: SeedOptions,
    }

    #[derive(Deserialize, Clone, Debug)]
    #[serde(default)]
    pub struct ServerConfig {
        pub bind: String,
        pub port: u16,
    }

    impl Default for ServerConfig {
        fn default() -> Self {
            Self {
                bind: "0.0.0.0".into(),
                port: 3000,
            }
        }
    }

    #[derive(Deserialize, Clone, Debug)]
    #[serde(default)]
    pub struct StorageConfig {
        pub avatar_dir: String,
    }

    impl Default for StorageConfig {
        fn default() -> Self {
            Self {
                avatar_dir: "storage/avatars".into(),
            }
        }
    }

    pub fn load(path: &str) -> Config {
        match std::fs::read_to_string(path) {
            Ok(contents) => parse(&contents, path),
            Err(e) => {
                tracing::warn!("failed to read config {path}: {e}, using defaults");
                Config::default()
            }
        }
    }

    pub fn parse(contents: &str, path: &str) -> Config {
        match toml::from_str(contents) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("failed to parse config {path}: {e}, using defaults");
                Config::default()
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn missing_sections_fall_back_to_defaults() {
            let config = parse("[server]\nport = 8080\n\n[seed]\ndummy_users = 3\n", "inline");

            assert_eq!(config.server.bind, "0.0.0.0");
            assert_eq!(config.server.port, 8080);
            assert_eq!(config.storage.avatar_dir, "storage/avatars");
            assert_eq!(config.seed.dummy_users, 3);
            assert_eq!(config.seed.admin_email, "admin@example.com");
        }

        #[test]
        fn malformed_file_uses_defaults() {
            let config = parse("[server\nport = nope", "broken.toml");
            assert_eq!(config.server.port, 3000);
        }
    }
}

#[cfg(feature = "ssr")]
#[tokio::main]
async fn main() {
    use std::net::SocketAddr;

    use axum::Router;
    use leptos::prelude::*;
    use leptos_axum::{generate_route_list, LeptosRoutes};
    use roster_api::middleware::auth::AppState;
    use roster_store::{seed, AvatarStore, PasswordHasher, UserDirectory};
    use roster_types::AVATAR_PUBLIC_PATH;
    use roster_ui::{shell, App};
    use tower_http::{services::ServeDir, trace::TraceLayer};
    use tracing_subscriber::{fmt, EnvFilter};

    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let configPath = if let Some(idx) = args.iter().position(|a| a == "--config") {
        args.get(idx + 1)
            .cloned()
            .unwrap_or_else(|| "config.example.toml".into())
    } else {
        "config.example.toml".into()
    };

    let appConfig = config::load(&configPath);
    tracing::info!(
        "loaded config from {configPath}: bind={}:{}, avatars in {}",
        appConfig.server.bind,
        appConfig.server.port,
        appConfig.storage.avatar_dir
    );

    let avatars = AvatarStore::new(&appConfig.storage.avatar_dir);
    let directory = UserDirectory::new(PasswordHasher::default(), avatars);
    seed::seed(&directory, &appConfig.seed)
        .await
        .expect("failed to seed the user directory");

    let appState = AppState { directory };

    let conf = get_configuration(None).expect("failed to load Leptos configuration");
    let leptosOptions = conf.leptos_options;
    let configuredAddr = format!("{}:{}", appConfig.server.bind, appConfig.server.port);
    let addr = configuredAddr.parse::<SocketAddr>().unwrap_or_else(|e| {
        tracing::warn!(
            "invalid bind address {configuredAddr}: {e}, using {}",
            leptosOptions.site_addr
        );
        leptosOptions.site_addr
    });

    let routes = generate_route_list(App);

    // The API carries its own state and is already stateless here.
    let apiRouter = roster_api::api_router(appState);

    let app = Router::new()
        .leptos_routes(&leptosOptions, routes, {
            let leptosOptions = leptosOptions.clone();
            move || shell(leptosOptions.clone())
        })
        .fallback(leptos_axum::file_and_error_handler(shell))
        .with_state(leptosOptions)
        .merge(apiRouter)
        .nest_service(AVATAR_PUBLIC_PATH, ServeDir::new(&appConfig.storage.avatar_dir))
        .layer(TraceLayer::new_for_http());

    tracing::info!("listening on {addr}");
    let listener = tokio::net::TcpListener::bind(&addr).await
        .unwrap_or_else(|e| panic!("failed to bind to {addr}: {e}"));
    axum::serve(listener, app.into_make_service())
        .await
        .expect("server exited with error");
}

#[cfg(not(feature = "ssr"))]
fn main() {}
