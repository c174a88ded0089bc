use std::path::PathBuf;

/// Settings shared by every action: where the API lives, where local state
/// is kept, and the per-request timeout.
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub api_url: String,
    pub data_dir: PathBuf,
    pub timeout_secs: u64,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(api_url: String, data_dir: PathBuf, timeout_secs: u64) -> Self {
        Self {
            api_url,
            data_dir,
            timeout_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_args() {
        let args = GlobalArgs::new(
            "https://api.tumapay.dev".to_string(),
            PathBuf::from("/tmp/tumapay"),
            30,
        );
        assert_eq!(args.api_url, "https://api.tumapay.dev");
        assert_eq!(args.data_dir, PathBuf::from("/tmp/tumapay"));
        assert_eq!(args.timeout_secs, 30);
    }
}
