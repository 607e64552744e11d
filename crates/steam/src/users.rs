use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::SteamError;
use crate::paths::Paths;
use crate::vdf;

/// The account that last logged into the Steam client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveAccount {
    /// 64-bit SteamID as written in `loginusers.vdf`.
    pub steam_id64: String,
    /// 32-bit account id (lower half of the SteamID), as used in `userdata/`.
    pub account_id: String,
    pub account_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub persona_name: String,
}

/// Returns the most recent Steam login, if any.
///
/// A missing `loginusers.vdf` is not an error: Steam may never have been
/// logged into on this machine.
pub fn active_account(paths: &Paths) -> Result<Option<ActiveAccount>, SteamError> {
    active_account_from(&paths.login_users_path())
}

/// Reads the most recent login from a specific `loginusers.vdf`.
pub fn active_account_from(path: &Path) -> Result<Option<ActiveAccount>, SteamError> {
    if !path.exists() {
        return Ok(None);
    }

    let root = vdf::load(path)?;
    let Some(users) = root.get_object("users") else {
        return Ok(None);
    };

    for (steam_id64, value) in users.iter() {
        let vdf::Value::Object(info) = value else {
            continue;
        };

        if info.get_str("MostRecent") != Some("1") {
            continue;
        }

        let Some(account_id) = steam_id64_to_account_id(steam_id64) else {
            tracing::warn!(steam_id64, "ignoring login entry with invalid SteamID");
            continue;
        };

        return Ok(Some(ActiveAccount {
            steam_id64: steam_id64.to_string(),
            account_id: account_id.to_string(),
            account_name: info.get_str("AccountName").unwrap_or_default().to_string(),
            persona_name: info.get_str("PersonaName").unwrap_or_default().to_string(),
        }));
    }

    Ok(None)
}

/// Converts a 64-bit SteamID to the 32-bit account id.
pub fn steam_id64_to_account_id(steam_id64: &str) -> Option<u32> {
    let id: u64 = steam_id64.trim().parse().ok()?;
    Some((id & 0xFFFF_FFFF) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const LOGIN_USERS: &str = r#"
"users"
{
	"76561197960287930"
	{
		"AccountName"		"olduser"
		"PersonaName"		"Old"
		"MostRecent"		"0"
	}
	"76561198000000042"
	{
		"AccountName"		"player"
		"PersonaName"		"Player One"
		"RememberPassword"		"1"
		"MostRecent"		"1"
	}
}
"#;

    fn write_steam_dir(contents: &str) -> tempfile::TempDir {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("config")).unwrap();
        fs::write(tmp.path().join("config").join("loginusers.vdf"), contents).unwrap();
        tmp
    }

    #[test]
    fn account_id_conversion() {
        assert_eq!(steam_id64_to_account_id("76561197960287930"), Some(22202));
        assert_eq!(steam_id64_to_account_id("76561198000000042"), Some(39734314));
        assert_eq!(steam_id64_to_account_id("not_a_number"), None);
    }

    #[test]
    fn picks_most_recent_user() {
        let tmp = write_steam_dir(LOGIN_USERS);
        let paths = Paths::with_base(tmp.path());

        let account = active_account(&paths).unwrap().unwrap();
        assert_eq!(account.steam_id64, "76561198000000042");
        assert_eq!(account.account_id, "39734314");
        assert_eq!(account.account_name, "player");
        assert_eq!(account.persona_name, "Player One");
    }

    #[test]
    fn no_recent_user() {
        let tmp = write_steam_dir(r#""users" { "1" { "AccountName" "a" "MostRecent" "0" } }"#);
        let paths = Paths::with_base(tmp.path());
        assert!(active_account(&paths).unwrap().is_none());
    }

    #[test]
    fn missing_file_is_none() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = Paths::with_base(tmp.path());
        assert!(active_account(&paths).unwrap().is_none());
    }

    #[test]
    fn malformed_file_is_error() {
        let tmp = write_steam_dir(r#""users" { "1" { "#);
        let paths = Paths::with_base(tmp.path());
        assert!(active_account(&paths).is_err());
    }

    #[test]
    fn account_json_field_names() {
        let account = ActiveAccount {
            steam_id64: "1".into(),
            account_id: "1".into(),
            account_name: "a".into(),
            persona_name: String::new(),
        };
        let json = serde_json::to_string(&account).unwrap();
        assert!(json.contains("\"steamId64\""));
        assert!(json.contains("\"accountName\""));
        assert!(!json.contains("personaName"));
    }
}
