pub mod auth;
pub mod config;
pub mod conversion;
pub mod job_service;
pub mod library;
pub mod metrics;
pub mod testing;

pub use auth::{
    create_authenticator, ApiKeyAuthenticator, AuthError, AuthRequest, Authenticator, Identity,
    NoneAuthenticator,
};
pub use config::{
    load_config, load_config_from_str, validate_config, ApiKeyUser, AuthConfig, AuthMethod,
    Config, ConfigError, DatabaseConfig, SanitizedConfig, ServerConfig,
};
pub use conversion::{
    allowed_targets, select_strategy, ConversionError, ConversionOutcome, ConversionRequest,
    ConversionResult, ConversionService, SourceKind, Strategy, TargetFormat, UploadedFile,
};
pub use job_service::{
    create_document_converter, CloudConvertClient, DocumentConverter, JobServiceConfig,
    JobServiceError, PollConfig,
};
pub use library::{
    FileLibrary, FileObject, LibraryError, LibraryQuery, NewFileObject, SortField, SortOrder,
    SqliteLibrary,
};
