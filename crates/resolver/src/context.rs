use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Host and account information that save-path templates expand against.
///
/// Built once at startup and shared read-only. An empty field means
/// "unknown": the matching placeholder is left in the template.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HostContext {
    pub username: String,
    pub home: String,
    pub documents: String,
    pub locallow: String,
    pub appdata: String,
    pub localappdata: String,
    pub program_files: String,
    pub program_data: String,
    pub public: String,
    pub windir: String,
    pub steam_install: String,
    /// 32-bit Steam account id.
    pub account_id: String,
    /// Hex-encoded Steam account name.
    pub account_hex: String,
    /// Anchor for templates that resolve to a relative path.
    pub working_dir: String,
    /// Environment snapshot, keys upper-cased.
    pub(crate) env: HashMap<String, String>,
}

/// Steam-side inputs to [`HostContext::detect`].
#[derive(Debug, Clone, Default)]
pub struct PlatformAccount {
    pub install_dir: Option<PathBuf>,
    pub account_id: Option<String>,
    pub account_name: Option<String>,
}

impl HostContext {
    /// Builds a context from the process environment and the Steam account.
    pub fn detect(platform: &PlatformAccount) -> Self {
        let env: HashMap<String, String> = std::env::vars()
            .map(|(k, v)| (k.to_uppercase(), v))
            .collect();
        let var = |name: &str| env.get(name).cloned().unwrap_or_default();
        let var_or = |name: &str, fallback: &str| {
            env.get(name)
                .filter(|v| !v.is_empty())
                .cloned()
                .unwrap_or_else(|| fallback.to_string())
        };

        let home = dirs::home_dir().unwrap_or_default();
        let username = env
            .get("USERNAME")
            .or_else(|| env.get("USER"))
            .cloned()
            .unwrap_or_default();

        let account_name = platform.account_name.as_deref().unwrap_or_default();

        Self {
            username,
            documents: path_string(&home, &["Documents"]),
            locallow: path_string(&home, &["AppData", "LocalLow"]),
            home: display(&home),
            appdata: var("APPDATA"),
            localappdata: var("LOCALAPPDATA"),
            program_files: var_or("PROGRAMFILES", r"C:\Program Files"),
            program_data: var_or("PROGRAMDATA", r"C:\ProgramData"),
            public: var_or("PUBLIC", r"C:\Users\Public"),
            windir: var_or("WINDIR", r"C:\Windows"),
            steam_install: platform
                .install_dir
                .as_deref()
                .map(display)
                .unwrap_or_default(),
            account_id: platform.account_id.clone().unwrap_or_default(),
            account_hex: encode_account_name(account_name),
            working_dir: std::env::current_dir()
                .map(|p| display(&p))
                .unwrap_or_default(),
            env,
        }
    }

    /// Replaces the environment snapshot used for `%VAR%` expansion.
    pub fn with_env<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env = vars
            .into_iter()
            .map(|(k, v)| (k.into().to_uppercase(), v.into()))
            .collect();
        self
    }

    /// Looks up an environment variable, ignoring case.
    pub fn env_var(&self, name: &str) -> Option<&str> {
        self.env.get(&name.to_uppercase()).map(String::as_str)
    }

    /// Placeholder tokens and their values, in substitution order.
    pub(crate) fn placeholders(&self) -> [(&'static str, &str); 13] {
        [
            ("{{p|username}}", &self.username),
            ("{{p|userprofile}}", &self.home),
            ("{{p|userprofile\\documents}}", &self.documents),
            ("{{p|userprofile\\appdata\\locallow}}", &self.locallow),
            ("{{p|appdata}}", &self.appdata),
            ("{{p|localappdata}}", &self.localappdata),
            ("{{p|programfiles}}", &self.program_files),
            ("{{p|programdata}}", &self.program_data),
            ("{{p|public}}", &self.public),
            ("{{p|windir}}", &self.windir),
            ("{{p|steam}}", &self.steam_install),
            ("{{p|uid}}", &self.account_id),
            ("{{p|hexuid}}", &self.account_hex),
        ]
    }
}

/// Hex-encodes an account name the way save templates expect (`{{p|hexuid}}`).
pub fn encode_account_name(name: &str) -> String {
    if name.is_empty() {
        return String::new();
    }
    hex::encode(name.as_bytes())
}

fn path_string(base: &Path, parts: &[&str]) -> String {
    if base.as_os_str().is_empty() {
        return String::new();
    }
    display(&parts.iter().fold(base.to_path_buf(), |acc, p| acc.join(p)))
}

fn display(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
