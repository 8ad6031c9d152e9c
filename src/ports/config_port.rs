//! Configuration access port trait.

/// Sectioned key/value settings. Numbers are read as strings and parsed by
/// the caller; `get_bool` falls back to the default for anything it does not
/// recognise.
pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool;
}
