mod parsing;
mod settings;
mod types;

pub(crate) use parsing::parse_proxy;
pub(crate) use types::Settings;
