/// Memo of serialized projection output, keyed by view and resolved selection.
pub trait ProjectionCache: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
}
