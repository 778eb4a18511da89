pub mod reward_config;
pub use reward_config::*;

pub mod user_record;
pub use user_record::*;

pub mod results;
pub use results::*;
