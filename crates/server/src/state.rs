use std::sync::Arc;
use filedeck_core::{Authenticator, Config, ConversionService, FileLibrary, SanitizedConfig};

/// Shared application state
pub struct AppState {
    config: Config,
    authenticator: Arc<dyn Authenticator>,
    conversion: ConversionService,
    library: Arc<dyn FileLibrary>,
}

impl AppState {
    pub fn new(
        config: Config,
        authenticator: Arc<dyn Authenticator>,
        conversion: ConversionService,
        library: Arc<dyn FileLibrary>,
    ) -> Self {
        Self {
            config,
            authenticator,
            conversion,
            library,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn authenticator(&self) -> &dyn Authenticator {
        self.authenticator.as_ref()
    }

    pub fn conversion(&self) -> &ConversionService {
        &self.conversion
    }

    pub fn library(&self) -> &dyn FileLibrary {
        self.library.as_ref()
    }
}
