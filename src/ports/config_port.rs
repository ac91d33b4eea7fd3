//! Configuration access port trait.

/// Raw string lookup. Typed parsing and range checks happen in
/// `config_validation`.
pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
}
