use std::sync::Once;

pub mod datetime;
pub mod http;

static RUSTLS_PROVIDER: Once = Once::new();

/// reqwest is built without a bundled crypto provider, install ring once per process.
pub fn ensure_rustls_crypto_provider() {
    RUSTLS_PROVIDER.call_once(|| {
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}
