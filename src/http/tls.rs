use reqwest::ClientBuilder;

/// Relaxes certificate checks when verification is disabled.
pub(super) fn apply_tls_settings(builder: ClientBuilder, verify_ssl: bool) -> ClientBuilder {
    if verify_ssl {
        return builder;
    }
    builder
        .danger_accept_invalid_certs(true)
        .danger_accept_invalid_hostnames(true)
}
