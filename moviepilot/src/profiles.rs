//! Connection profiles: JSON mapping of profile name -> MoviePilot instance.
//! Stored under XDG config dir: $XDG_CONFIG_HOME/moviepilot/profiles.json (fallback: platform config dir)

use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fs, path::PathBuf};

use crate::consts::DEFAULT_PORT;

fn default_port() -> u16 {
    DEFAULT_PORT
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileEntry {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scan_interval: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    #[serde(default)]
    pub verify_tls: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProfilesFile {
    #[serde(default)]
    pub profiles: BTreeMap<String, ProfileEntry>,
    #[serde(default)]
    pub version: u32,
}

pub fn config_dir() -> PathBuf {
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
        PathBuf::from(xdg).join("moviepilot")
    } else {
        dirs_next::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("moviepilot")
    }
}

pub fn profiles_path() -> PathBuf {
    config_dir().join("profiles.json")
}

/// Missing or unreadable files load as empty.
pub fn load_profiles() -> ProfilesFile {
    let path = profiles_path();
    match fs::read_to_string(&path) {
        Ok(s) => serde_json::from_str(&s).unwrap_or_default(),
        Err(_) => ProfilesFile::default(),
    }
}

pub fn save_profiles(p: &ProfilesFile) -> std::io::Result<()> {
    let path = profiles_path();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let data = serde_json::to_vec_pretty(p)?;
    fs::write(path, data)
}

#[derive(Debug, PartialEq, Eq)]
pub enum ResolveProfile {
    /// Use the provided runtime inputs (not persisted yet)
    Direct(ProfileEntry),
    /// Loaded from existing profile entry
    Loaded(ProfileEntry),
    /// Named profile does not exist and no host was given
    Missing(String),
    /// No profile could be resolved (e.g., missing arguments)
    None,
}

#[derive(Debug, Default)]
pub struct ProfileRequest {
    pub profile_name: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub token: Option<String>,
}

impl ProfileRequest {
    pub fn resolve(self, pf: &ProfilesFile) -> ResolveProfile {
        match (self.host, self.profile_name) {
            // Host given -> direct (maybe later saved by caller). A stored profile of
            // the same name still supplies the token when none was passed.
            (Some(host), name) => {
                let stored = name.as_ref().and_then(|n| pf.profiles.get(n));
                ResolveProfile::Direct(ProfileEntry {
                    host,
                    port: self
                        .port
                        .or(stored.map(|e| e.port))
                        .unwrap_or(DEFAULT_PORT),
                    token: self
                        .token
                        .or(stored.map(|e| e.token.clone()))
                        .unwrap_or_default(),
                    scan_interval: stored.and_then(|e| e.scan_interval),
                    timeout: stored.and_then(|e| e.timeout),
                    verify_tls: stored.is_some_and(|e| e.verify_tls),
                })
            }
            // Only profile name given -> try load; explicit flags still win
            (None, Some(name)) => match pf.profiles.get(&name) {
                Some(entry) => {
                    let mut entry = entry.clone();
                    if let Some(port) = self.port {
                        entry.port = port;
                    }
                    if let Some(token) = self.token {
                        entry.token = token;
                    }
                    ResolveProfile::Loaded(entry)
                }
                None => ResolveProfile::Missing(name),
            },
            // Nothing provided -> a single stored profile is unambiguous
            (None, None) => {
                if pf.profiles.len() == 1 {
                    pf.profiles
                        .values()
                        .next()
                        .cloned()
                        .map_or(ResolveProfile::None, ResolveProfile::Loaded)
                } else {
                    ResolveProfile::None
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(host: &str) -> ProfileEntry {
        ProfileEntry {
            host: host.into(),
            port: 3000,
            token: "secret".into(),
            scan_interval: Some(60),
            timeout: None,
            verify_tls: false,
        }
    }

    fn file_with(name: &str, e: ProfileEntry) -> ProfilesFile {
        let mut pf = ProfilesFile::default();
        pf.profiles.insert(name.into(), e);
        pf
    }

    #[test]
    fn profile_only_loads_entry() {
        let pf = file_with("home", entry("nas.local"));
        let req = ProfileRequest {
            profile_name: Some("home".into()),
            ..Default::default()
        };
        assert_eq!(req.resolve(&pf), ResolveProfile::Loaded(entry("nas.local")));
    }

    #[test]
    fn unknown_profile_without_host_is_missing() {
        let req = ProfileRequest {
            profile_name: Some("nope".into()),
            ..Default::default()
        };
        assert_eq!(
            req.resolve(&ProfilesFile::default()),
            ResolveProfile::Missing("nope".into())
        );
    }

    #[test]
    fn direct_host_reuses_stored_token() {
        let pf = file_with("home", entry("nas.local"));
        let req = ProfileRequest {
            profile_name: Some("home".into()),
            host: Some("10.0.0.5".into()),
            port: Some(3001),
            token: None,
        };
        match req.resolve(&pf) {
            ResolveProfile::Direct(e) => {
                assert_eq!(e.host, "10.0.0.5");
                assert_eq!(e.port, 3001);
                assert_eq!(e.token, "secret");
                assert_eq!(e.scan_interval, Some(60));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn nothing_given_picks_single_profile_only() {
        let req = ProfileRequest::default();
        assert_eq!(req.resolve(&ProfilesFile::default()), ResolveProfile::None);

        let pf = file_with("home", entry("nas.local"));
        assert_eq!(
            ProfileRequest::default().resolve(&pf),
            ResolveProfile::Loaded(entry("nas.local"))
        );

        let mut pf2 = pf.clone();
        pf2.profiles.insert("work".into(), entry("mp.work"));
        assert_eq!(ProfileRequest::default().resolve(&pf2), ResolveProfile::None);
    }
}
