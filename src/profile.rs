use std::path::{Path, PathBuf};

/// Saved user details used to pre-populate contacts, the CTA label and the
/// text-improvement API key.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Profile {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub website: String,
    pub cta: String,
    pub api_key: String,
}

#[derive(Debug)]
pub enum ProfileError {
    Io(std::io::Error),
}

impl std::fmt::Display for ProfileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProfileError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for ProfileError {}

impl From<std::io::Error> for ProfileError {
    fn from(e: std::io::Error) -> Self {
        ProfileError::Io(e)
    }
}

impl Profile {
    /// Path to the profile file.
    /// On Linux:   ~/.config/beforeafter/profile.cfg  (XDG_CONFIG_HOME respected)
    /// On Windows: %APPDATA%\BeforeAfter\profile.cfg
    /// On macOS:   ~/Library/Application Support/BeforeAfter/profile.cfg
    /// Fallback:   same directory as the executable.
    pub fn default_path() -> Option<PathBuf> {
        #[cfg(target_os = "linux")]
        {
            let config_dir = std::env::var("XDG_CONFIG_HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|_| {
                    let home = std::env::var("HOME").unwrap_or_else(|_| "~".to_string());
                    PathBuf::from(home).join(".config")
                })
                .join("beforeafter");
            return Some(config_dir.join("profile.cfg"));
        }
        #[cfg(target_os = "windows")]
        {
            let appdata = std::env::var("APPDATA")
                .or_else(|_| std::env::var("USERPROFILE"))
                .ok()?;
            return Some(PathBuf::from(appdata).join("BeforeAfter").join("profile.cfg"));
        }
        #[cfg(target_os = "macos")]
        {
            let home = std::env::var("HOME").unwrap_or_else(|_| "~".to_string());
            return Some(
                PathBuf::from(home)
                    .join("Library")
                    .join("Application Support")
                    .join("BeforeAfter")
                    .join("profile.cfg"),
            );
        }
        #[cfg(not(any(target_os = "linux", target_os = "windows", target_os = "macos")))]
        {
            std::env::current_exe().ok().and_then(|p| p.parent().map(|d| d.join("profile.cfg")))
        }
    }

    /// Missing or unreadable files give the default profile.
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::parse(&content),
            Err(_) => Self::default(),
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ProfileError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_config())?;
        Ok(())
    }

    /// Serialize as `key=value` lines.
    pub fn to_config(&self) -> String {
        format!(
            "name={}\n\
             phone={}\n\
             email={}\n\
             website={}\n\
             cta={}\n\
             api_key={}\n",
            one_line(&self.name),
            one_line(&self.phone),
            one_line(&self.email),
            one_line(&self.website),
            one_line(&self.cta),
            one_line(&self.api_key),
        )
    }

    /// Parse `key=value` lines. Unknown keys and malformed lines are skipped.
    pub fn parse(content: &str) -> Self {
        let mut p = Self::default();
        for line in content.lines() {
            let Some((key, val)) = line.split_once('=') else { continue };
            let val = val.trim().to_string();
            match key.trim() {
                "name" => p.name = val,
                "phone" => p.phone = val,
                "email" => p.email = val,
                "website" => p.website = val,
                "cta" => p.cta = val,
                "api_key" => p.api_key = val,
                _ => {}
            }
        }
        p
    }
}

/// Values are stored one per line; embedded line breaks become spaces.
fn one_line(s: &str) -> String {
    s.trim().replace(['\r', '\n'], " ")
}
