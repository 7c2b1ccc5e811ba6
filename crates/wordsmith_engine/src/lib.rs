//! Wordsmith engine: remote calls, timers and effect execution.
mod api;
mod config;
mod driver;
mod http;
mod wizard;

pub use api::{ProcedureApi, ProjectApi};
pub use config::{
    load_config, parse_config, save_config, CacheSettings, ConfigError, WordsmithConfig,
    CONFIG_FILENAME,
};
pub use driver::{DriverEvent, ObserverId, ProcedureDriver};
pub use http::{ApiError, ApiSettings, HttpApi, DEFAULT_BASE_URL};
pub use wizard::{WizardAction, WizardRunner};
