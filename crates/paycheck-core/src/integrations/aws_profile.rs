//! AWS shared files: `~/.aws/credentials` and `~/.aws/config`.
//!
//! Only the pieces the publisher needs are read: static keys (plus an
//! optional session token) from the credentials file and `region` from the
//! config file, both for the profile named by `AWS_PROFILE`.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

const DEFAULT_PROFILE: &str = "default";

/// Locations and profile name resolved from the environment.
#[derive(Debug, Clone)]
pub struct ProfileFiles {
    profile: String,
    credentials_path: Option<PathBuf>,
    config_path: Option<PathBuf>,
}

impl ProfileFiles {
    /// `AWS_PROFILE`, `AWS_SHARED_CREDENTIALS_FILE` and `AWS_CONFIG_FILE`
    /// override the defaults under the home directory.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let home_file = |name: &str| dirs::home_dir().map(|home| home.join(".aws").join(name));

        Self {
            profile: lookup("AWS_PROFILE").unwrap_or_else(|| DEFAULT_PROFILE.to_string()),
            credentials_path: lookup("AWS_SHARED_CREDENTIALS_FILE")
                .map(PathBuf::from)
                .or_else(|| home_file("credentials")),
            config_path: lookup("AWS_CONFIG_FILE")
                .map(PathBuf::from)
                .or_else(|| home_file("config")),
        }
    }

    pub fn profile(&self) -> &str {
        &self.profile
    }

    /// Keys of the active profile in the credentials file.
    ///
    /// # Errors
    ///
    /// Describes why the section could not be read: no home directory, an
    /// unreadable file, or a missing profile.
    pub fn credentials_section(&self) -> Result<HashMap<String, String>, String> {
        let path = self
            .credentials_path
            .as_ref()
            .ok_or_else(|| "no home directory to find ~/.aws/credentials".to_string())?;
        let contents = fs::read_to_string(path)
            .map_err(|e| format!("cannot read {}: {e}", path.display()))?;

        parse_section(&contents, &self.profile)
            .ok_or_else(|| format!("profile '{}' not found in {}", self.profile, path.display()))
    }

    /// `region` of the active profile in the config file, if any.
    pub fn region(&self) -> Option<String> {
        let contents = fs::read_to_string(self.config_path.as_ref()?).ok()?;

        // Named profiles are written `[profile name]` in the config file
        let section = if self.profile == DEFAULT_PROFILE {
            DEFAULT_PROFILE.to_string()
        } else {
            format!("profile {}", self.profile)
        };

        parse_section(&contents, &section)
            .or_else(|| parse_section(&contents, &self.profile))?
            .remove("region")
            .filter(|region| !region.is_empty())
    }
}

/// Key/value pairs under `[wanted]`, with keys lower-cased. `None` when the
/// section is absent.
fn parse_section(contents: &str, wanted: &str) -> Option<HashMap<String, String>> {
    let mut found: Option<HashMap<String, String>> = None;
    let mut in_section = false;

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        if let Some(header) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            let name = header.split_whitespace().collect::<Vec<_>>().join(" ");
            in_section = name == wanted;
            if in_section {
                found.get_or_insert_with(HashMap::new);
            }
            continue;
        }

        if in_section {
            if let (Some(section), Some((key, value))) = (found.as_mut(), line.split_once('=')) {
                section.insert(key.trim().to_ascii_lowercase(), value.trim().to_string());
            }
        }
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const CREDENTIALS: &str = "\
# managed by hand
[default]
aws_access_key_id = AKIDDEFAULT
aws_secret_access_key = default-secret

[work]
aws_access_key_id=AKIDWORK
aws_secret_access_key=work-secret
aws_session_token = work-token
";

    const CONFIG: &str = "\
[default]
region = us-east-1

[profile work]
region = eu-west-1
output = json
";

    fn files(dir: &TempDir, profile: Option<&str>) -> ProfileFiles {
        let credentials = dir.path().join("credentials");
        let config = dir.path().join("config");
        fs::write(&credentials, CREDENTIALS).unwrap();
        fs::write(&config, CONFIG).unwrap();

        let env: HashMap<&str, String> = [
            ("AWS_SHARED_CREDENTIALS_FILE", Some(credentials.display().to_string())),
            ("AWS_CONFIG_FILE", Some(config.display().to_string())),
            ("AWS_PROFILE", profile.map(String::from)),
        ]
        .into_iter()
        .filter_map(|(k, v)| v.map(|v| (k, v)))
        .collect();
        ProfileFiles::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn default_profile_is_read_when_unset() {
        let dir = TempDir::new().unwrap();
        let files = files(&dir, None);

        let section = files.credentials_section().unwrap();
        assert_eq!(files.profile(), "default");
        assert_eq!(section["aws_access_key_id"], "AKIDDEFAULT");
        assert_eq!(section["aws_secret_access_key"], "default-secret");
        assert_eq!(files.region().as_deref(), Some("us-east-1"));
    }

    #[test]
    fn named_profile_uses_profile_prefix_in_config() {
        let dir = TempDir::new().unwrap();
        let files = files(&dir, Some("work"));

        let section = files.credentials_section().unwrap();
        assert_eq!(section["aws_access_key_id"], "AKIDWORK");
        assert_eq!(section["aws_session_token"], "work-token");
        assert_eq!(files.region().as_deref(), Some("eu-west-1"));
    }

    #[test]
    fn unknown_profile_is_reported() {
        let dir = TempDir::new().unwrap();
        let files = files(&dir, Some("missing"));

        let err = files.credentials_section().unwrap_err();
        assert!(err.contains("profile 'missing' not found"), "{err}");
        assert_eq!(files.region(), None);
    }

    #[test]
    fn absent_files_yield_nothing() {
        let dir = TempDir::new().unwrap();
        let nowhere = dir.path().join("nope").display().to_string();
        let files = ProfileFiles::from_lookup(|key| match key {
            "AWS_SHARED_CREDENTIALS_FILE" | "AWS_CONFIG_FILE" => Some(nowhere.clone()),
            _ => None,
        });

        assert!(files.credentials_section().unwrap_err().starts_with("cannot read"));
        assert_eq!(files.region(), None);
    }
}
