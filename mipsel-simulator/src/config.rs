/// Default machine memory size: 1 MiB.
pub const DEFAULT_MEMORY_SIZE: usize = 1024 * 1024;

#[derive(Debug)]
pub struct Config {
    pub memory_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            memory_size: DEFAULT_MEMORY_SIZE,
        }
    }
}
