pub mod lock;
pub mod logger;
pub mod path_validator;
