/// Why the process configuration could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("required environment variable {name} is not set")]
    Missing { name: &'static str },

    #[error("environment variable {name} is set but empty")]
    Blank { name: &'static str },

    #[error("environment variable {name}={value:?} is not a valid {expected}")]
    Invalid {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;
