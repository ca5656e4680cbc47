//! Backend entry-point: loads settings, prepares storage, and serves the
//! REST API until a shutdown signal arrives.

mod server;

use std::ffi::OsString;
use std::path::Path;

use actix_web::cookie::Key;
use actix_web::web;
use color_eyre::eyre::{Result, WrapErr, eyre};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use edumaster::inbound::http::health::HealthState;
use edumaster::middleware::trace::with_fresh_trace;
use edumaster::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use server::{AppSettings, ServerConfig, create_server};

const MIN_KEY_MATERIAL: usize = 32;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if let Err(e) = fmt().with_env_filter(filter).json().try_init() {
        warn!(error = %e, "tracing init failed");
    }
}

fn load_session_key(path: &Path, allow_ephemeral: bool) -> Result<Key> {
    match std::fs::read(path) {
        Ok(bytes) if bytes.len() >= MIN_KEY_MATERIAL => Ok(Key::derive_from(&bytes)),
        Ok(bytes) => Err(eyre!(
            "session key at {} has {} bytes; at least {MIN_KEY_MATERIAL} are required",
            path.display(),
            bytes.len()
        )),
        Err(e) if cfg!(debug_assertions) || allow_ephemeral => {
            warn!(path = %path.display(), error = %e, "using temporary session key (dev only)");
            Ok(Key::generate())
        }
        Err(e) => Err(e).wrap_err_with(|| format!("failed to read session key at {}", path.display())),
    }
}

async fn connect_database(settings: &AppSettings) -> Result<Option<DbPool>> {
    let Some(url) = settings.database_url.as_deref() else {
        return Ok(None);
    };
    run_pending_migrations(url)
        .await
        .wrap_err("database migrations failed")?;
    let mut pool_config = PoolConfig::new(url);
    if let Some(size) = settings.pool_size {
        pool_config = pool_config.with_max_size(size);
    }
    let pool = DbPool::new(pool_config)
        .await
        .wrap_err("failed to build connection pool")?;
    pool.ping().await.wrap_err("database is unreachable")?;
    info!("database connection pool ready");
    Ok(Some(pool))
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = terminate.recv() => {}
                }
            }
            Err(e) => {
                warn!(error = %e, "SIGTERM handler unavailable; listening for Ctrl-C only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();

    let settings = AppSettings::load_from_iter(std::env::args_os().collect::<Vec<OsString>>())
        .map_err(|err| eyre!("failed to load settings: {err}"))?;
    let key = load_session_key(&settings.session_key_file(), settings.allow_ephemeral_key)?;
    let bind_addr = settings.bind_addr()?;

    let mut config = ServerConfig::new(key, settings.cookie_secure, settings.same_site()?, bind_addr)
        .with_text_generation(settings.text_generation()?);
    if let Some(pool) = with_fresh_trace(connect_database(&settings)).await? {
        config = config.with_db_pool(pool);
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config)?;
    let handle = server.handle();
    info!(%bind_addr, "server listening");

    actix_web::rt::spawn(async move {
        shutdown_signal().await;
        info!("shutdown signal received; draining connections");
        health_state.mark_unhealthy();
        handle.stop(true).await;
    });

    server.await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;

    fn key_file(len: usize) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(&vec![b'k'; len]).expect("write key");
        file
    }

    #[rstest]
    fn key_file_material_is_derived_deterministically() {
        let file = key_file(64);

        let first = load_session_key(file.path(), false).expect("key loads");
        let second = load_session_key(file.path(), false).expect("key loads");

        assert_eq!(first.master(), second.master());
    }

    #[rstest]
    fn short_key_files_are_rejected() {
        let file = key_file(MIN_KEY_MATERIAL - 1);

        let err = load_session_key(file.path(), true).err().expect("short key rejected");
        assert!(err.to_string().contains("at least 32"));
    }

    #[rstest]
    fn missing_key_file_falls_back_when_ephemeral_keys_are_allowed() {
        let dir = tempfile::tempdir().expect("temp dir");

        let key = load_session_key(&dir.path().join("absent"), true);
        assert!(key.is_ok());
    }
}
