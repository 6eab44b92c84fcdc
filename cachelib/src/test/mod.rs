mod config;
mod properties;
