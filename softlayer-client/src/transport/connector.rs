//! HTTPS connector for SoftLayer endpoints.
//!
//! The public and private endpoints are `https` URLs; plain `http` is
//! accepted as well, for local servers. The crypto provider comes from the
//! `tls-ring` or `tls-aws-lc` feature, otherwise from a process default
//! installed with `CryptoProvider::install_default()`. Root certificates come
//! from `tls-native-roots` (system store) or `tls-webpki-roots` (bundled
//! Mozilla roots); with both enabled the system store is used.

use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::connect::HttpConnector;
use rustls::ClientConfig;

use crate::ClientError;

/// Whether the enabled features are enough to reach an `https` endpoint
/// without a custom rustls configuration.
#[inline]
pub const fn has_tls_support() -> bool {
    cfg!(any(feature = "tls-ring", feature = "tls-aws-lc"))
        && cfg!(any(feature = "tls-native-roots", feature = "tls-webpki-roots"))
}

/// The rustls configuration used when none is supplied.
///
/// `None` if no crypto provider is available.
#[cfg(any(feature = "tls-native-roots", feature = "tls-webpki-roots"))]
pub fn default_tls_config() -> Option<ClientConfig> {
    let config = ClientConfig::builder_with_provider(crypto_provider()?)
        .with_safe_default_protocol_versions()
        .ok()?
        .with_root_certificates(root_store())
        .with_no_client_auth();
    Some(config)
}

#[cfg(any(feature = "tls-native-roots", feature = "tls-webpki-roots"))]
#[allow(unreachable_code)]
fn crypto_provider() -> Option<std::sync::Arc<rustls::crypto::CryptoProvider>> {
    #[cfg(feature = "tls-ring")]
    return Some(std::sync::Arc::new(rustls::crypto::ring::default_provider()));

    #[cfg(feature = "tls-aws-lc")]
    return Some(std::sync::Arc::new(rustls::crypto::aws_lc_rs::default_provider()));

    rustls::crypto::CryptoProvider::get_default().cloned()
}

#[cfg(any(feature = "tls-native-roots", feature = "tls-webpki-roots"))]
fn root_store() -> rustls::RootCertStore {
    let mut roots = rustls::RootCertStore::empty();

    #[cfg(feature = "tls-native-roots")]
    {
        let native = rustls_native_certs::load_native_certs();
        #[cfg(feature = "tracing")]
        if !native.errors.is_empty() {
            tracing::warn!(
                errors = native.errors.len(),
                "some system root certificates could not be loaded"
            );
        }
        roots.add_parsable_certificates(native.certs);
    }

    #[cfg(all(feature = "tls-webpki-roots", not(feature = "tls-native-roots")))]
    roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

    roots
}

/// Wrap `http` so that `https` URLs are served over TLS and `http` URLs over
/// plain TCP.
///
/// `http` must not enforce the `http` scheme. Fails with
/// [`ClientError::Configuration`] when `tls_config` is `None` and the enabled
/// features cannot produce one.
pub fn build_https_connector(
    http: HttpConnector,
    tls_config: Option<ClientConfig>,
) -> Result<HttpsConnector<HttpConnector>, ClientError> {
    let tls_config = match tls_config {
        Some(config) => config,
        None => fallback_tls_config()?,
    };

    Ok(HttpsConnectorBuilder::new()
        .with_tls_config(tls_config)
        .https_or_http()
        .enable_all_versions()
        .wrap_connector(http))
}

#[cfg(any(feature = "tls-native-roots", feature = "tls-webpki-roots"))]
fn fallback_tls_config() -> Result<ClientConfig, ClientError> {
    default_tls_config().ok_or_else(|| {
        ClientError::configuration(
            "no rustls crypto provider: enable `tls-ring` or `tls-aws-lc`, \
             or install a process default",
        )
    })
}

#[cfg(not(any(feature = "tls-native-roots", feature = "tls-webpki-roots")))]
fn fallback_tls_config() -> Result<ClientConfig, ClientError> {
    Err(ClientError::configuration(
        "no root certificates: enable `tls-native-roots` or `tls-webpki-roots`, \
         or supply a rustls ClientConfig",
    ))
}
