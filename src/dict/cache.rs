use std::fs;
use std::path::PathBuf;

/// Local copy of remote word lists so a dictionary only has to be fetched once.
pub struct DiskCache {
    base_dir: PathBuf,
}

impl DiskCache {
    pub fn new(subdir: &str) -> Option<Self> {
        Self::with_base_dir(Self::default_dir(subdir)?)
    }

    /// Lives under the platform cache dir, never under the config dir that
    /// user dictionaries are scanned from.
    pub fn default_dir(subdir: &str) -> Option<PathBuf> {
        Some(dirs::cache_dir()?.join("qwerty-learner").join(subdir))
    }

    pub fn with_base_dir(base_dir: PathBuf) -> Option<Self> {
        fs::create_dir_all(&base_dir).ok()?;
        Some(Self { base_dir })
    }

    pub fn get(&self, key: &str) -> Option<String> {
        let path = self.base_dir.join(Self::sanitize_key(key));
        fs::read_to_string(path).ok()
    }

    pub fn put(&self, key: &str, content: &str) -> bool {
        let path = self.base_dir.join(Self::sanitize_key(key));
        fs::write(path, content).is_ok()
    }

    fn sanitize_key(key: &str) -> String {
        key.chars()
            .map(|c| {
                if c.is_alphanumeric() || c == '-' || c == '_' || c == '.' {
                    c
                } else {
                    '_'
                }
            })
            .collect()
    }
}

#[cfg(feature = "network")]
pub fn fetch_url(url: &str) -> Result<String, String> {
    let client = reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(10))
        .build()
        .map_err(|e| e.to_string())?;
    let response = client.get(url).send().map_err(|e| e.to_string())?;
    if response.status().is_success() {
        response.text().map_err(|e| e.to_string())
    } else {
        Err(format!("HTTP {}", response.status()))
    }
}

#[cfg(not(feature = "network"))]
pub fn fetch_url(_url: &str) -> Result<String, String> {
    Err("built without network support".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn put_then_get_uses_sanitized_key() {
        let dir = TempDir::new().unwrap();
        let cache = DiskCache::with_base_dir(dir.path().to_path_buf()).unwrap();
        assert!(cache.put("https://host/dicts/a.json", "[]"));
        assert_eq!(cache.get("https://host/dicts/a.json").as_deref(), Some("[]"));
        assert!(dir.path().join("https___host_dicts_a.json").exists());
    }

    #[test]
    fn cache_is_outside_user_dict_dir() {
        let user_dicts = PathBuf::from(crate::config::Config::default().dict_dir);
        if let Some(cache_dir) = DiskCache::default_dir("dicts") {
            assert!(!cache_dir.starts_with(&user_dicts));
            assert!(!user_dicts.starts_with(&cache_dir));
        }
    }

    #[test]
    fn missing_key_is_none() {
        let dir = TempDir::new().unwrap();
        let cache = DiskCache::with_base_dir(dir.path().to_path_buf()).unwrap();
        assert!(cache.get("nope").is_none());
    }
}
