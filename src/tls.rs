// Copyright 2024-, Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0

use once_cell::sync::Lazy;
use tonic::transport::ClientTlsConfig;
use tracing::debug;

static CONFIG: Lazy<ClientTlsConfig> = Lazy::new(|| {
    // Fails only if another provider was installed first, which is fine.
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        debug!("rustls crypto provider already installed");
    }
    ClientTlsConfig::new().with_native_roots()
});

/// TLS settings trusting the platform's native root store. No client
/// certificate, no extra CA.
pub(crate) fn config() -> &'static ClientTlsConfig {
    &CONFIG
}
