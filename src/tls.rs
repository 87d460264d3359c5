use std::path::PathBuf;
use std::sync::Arc;

/// Receives the transport's pre-verification outcome and returns whether the
/// peer should be accepted.
pub type VerifyCallback = Arc<dyn Fn(bool) -> bool + Send + Sync>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VerifyMode {
    None,
    Peer,
}

/// TLS settings handed to the transport before a secure connection starts.
/// Handshake and certificate validation happen inside the transport; this
/// layer only carries the configuration.
#[derive(Clone, Default)]
pub struct TlsOptions {
    certificate_pem: Option<Vec<u8>>,
    private_key_pem: Option<Vec<u8>>,
    ca_file: Option<PathBuf>,
    verify_mode: Option<VerifyMode>,
    verify_callback: Option<VerifyCallback>,
}

impl TlsOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn certificate_pem(mut self, pem: impl Into<Vec<u8>>) -> Self {
        self.certificate_pem = Some(pem.into());
        self
    }

    pub fn private_key_pem(mut self, pem: impl Into<Vec<u8>>) -> Self {
        self.private_key_pem = Some(pem.into());
        self
    }

    pub fn ca_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.ca_file = Some(path.into());
        self
    }

    pub fn verify_mode(mut self, mode: VerifyMode) -> Self {
        self.verify_mode = Some(mode);
        self
    }

    pub fn verify_callback(mut self, callback: VerifyCallback) -> Self {
        self.verify_callback = Some(callback);
        self
    }

    pub fn certificate_pem_bytes(&self) -> Option<&[u8]> {
        self.certificate_pem.as_deref()
    }

    pub fn private_key_pem_bytes(&self) -> Option<&[u8]> {
        self.private_key_pem.as_deref()
    }

    pub fn ca_file_path(&self) -> Option<&std::path::Path> {
        self.ca_file.as_deref()
    }

    pub fn verify_callback_fn(&self) -> Option<&VerifyCallback> {
        self.verify_callback.as_ref()
    }

    /// Explicit mode wins; otherwise a configured CA file implies peer
    /// verification, and with neither the transport's default applies.
    pub fn effective_verify_mode(&self) -> Option<VerifyMode> {
        self.verify_mode
            .or_else(|| self.ca_file.is_some().then_some(VerifyMode::Peer))
    }

    pub fn is_customized(&self) -> bool {
        self.certificate_pem.is_some()
            || self.private_key_pem.is_some()
            || self.ca_file.is_some()
            || self.verify_mode.is_some()
            || self.verify_callback.is_some()
    }
}

impl std::fmt::Debug for TlsOptions {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("TlsOptions")
            .field("certificate_pem", &self.certificate_pem.as_ref().map(Vec::len))
            .field("private_key_pem", &self.private_key_pem.is_some())
            .field("ca_file", &self.ca_file)
            .field("verify_mode", &self.verify_mode)
            .field("verify_callback", &self.verify_callback.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{TlsOptions, VerifyMode};

    #[test]
    fn verify_mode_defaults_to_peer_when_ca_file_present() {
        let options = TlsOptions::new().ca_file("/etc/ssl/ca.pem");
        assert_eq!(options.effective_verify_mode(), Some(VerifyMode::Peer));
    }

    #[test]
    fn explicit_verify_mode_overrides_ca_file_default() {
        let options = TlsOptions::new()
            .ca_file("/etc/ssl/ca.pem")
            .verify_mode(VerifyMode::None);
        assert_eq!(options.effective_verify_mode(), Some(VerifyMode::None));
    }

    #[test]
    fn unconfigured_options_defer_to_the_transport() {
        assert_eq!(TlsOptions::new().effective_verify_mode(), None);
        assert!(!TlsOptions::new().is_customized());
    }
}
