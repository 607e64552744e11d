use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::validity::is_executable;

/// Score returned for denylisted executables.
pub const REJECTED: i32 = -1000;

const MB: u64 = 1024 * 1024;

/// A file-size range and the points it earns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeBand {
    pub min_bytes: u64,
    pub max_bytes: u64,
    pub weight: i32,
}

impl SizeBand {
    pub fn contains(&self, size: u64) -> bool {
        (self.min_bytes..=self.max_bytes).contains(&size)
    }
}

/// Rule table for picking a game's main executable.
#[derive(Debug, Clone)]
pub struct RankingRules {
    /// Lowercase substrings that disqualify an executable by file name.
    pub denylist: Vec<String>,
    /// Checked in order; only the first matching band counts.
    pub size_bands: Vec<SizeBand>,
    pub exact_name_bonus: i32,
    pub partial_name_bonus: i32,
    /// Path tokens that mark a binaries directory (`bin`, `win64`, ...).
    pub binary_dir_markers: Vec<String>,
    pub binary_dir_bonus: i32,
    /// Walk depth below the install folder (1 = direct children only).
    pub max_depth: usize,
}

impl Default for RankingRules {
    fn default() -> Self {
        let strings = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
        Self {
            denylist: strings(&[
                "unins",
                "uninstall",
                "setup",
                "install",
                "redist",
                "vcredist",
                "vc_redist",
                "directx",
                "dxsetup",
                "dotnet",
                "prereq",
                "crash",
                "bugreport",
                "report",
                "easyanticheat",
                "battleye",
                "beservice",
                "anticheat",
                "launcher",
                "helper",
                "update",
                "patch",
                "cefprocess",
                "webhelper",
                "benchmark",
                "physx",
                "oalinst",
                "dxwebsetup",
                "touchup",
                "cleanup",
            ]),
            size_bands: vec![
                SizeBand {
                    min_bytes: 15 * MB,
                    max_bytes: 500 * MB,
                    weight: 50,
                },
                SizeBand {
                    min_bytes: 2 * MB,
                    max_bytes: 15 * MB,
                    weight: 20,
                },
                SizeBand {
                    min_bytes: MB / 5,
                    max_bytes: 5 * MB,
                    weight: 5,
                },
            ],
            exact_name_bonus: 100,
            partial_name_bonus: 40,
            binary_dir_markers: strings(&["bin", "win64", "shipping"]),
            binary_dir_bonus: 15,
            max_depth: 6,
        }
    }
}

/// An executable found under an install folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub path: PathBuf,
    pub size: u64,
    pub score: i32,
}

/// Scores one executable. Pure: looks only at its arguments.
///
/// `path` is best given relative to the install folder so that directories
/// above the game do not earn the binary-directory bonus.
pub fn score_executable(path: &Path, size: u64, folder_name: &str, rules: &RankingRules) -> i32 {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    if rules.denylist.iter().any(|token| file_name.contains(token.as_str())) {
        return REJECTED;
    }

    let mut score = 0;

    if let Some(band) = rules.size_bands.iter().find(|b| b.contains(size)) {
        score += band.weight;
    }

    let stem = alphanumeric(&path.file_stem().unwrap_or_default().to_string_lossy());
    let folder = alphanumeric(folder_name);
    if !stem.is_empty() && !folder.is_empty() {
        if stem == folder {
            score += rules.exact_name_bonus;
        } else if stem.contains(&folder) || folder.contains(&stem) {
            score += rules.partial_name_bonus;
        }
    }

    if has_binary_marker(path, &rules.binary_dir_markers) {
        score += rules.binary_dir_bonus;
    }

    score
}

/// Lists `.exe` files under `install_path`, scored and ordered best first.
///
/// Rejected executables are dropped. Ties are broken by path.
pub fn rank_candidates(install_path: &Path, rules: &RankingRules) -> Vec<Candidate> {
    let folder_name = install_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut candidates: Vec<Candidate> = WalkDir::new(install_path)
        .min_depth(1)
        .max_depth(rules.max_depth)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && is_executable(e.path()))
        .filter_map(|e| {
            let size = e.metadata().ok()?.len();
            let relative = e.path().strip_prefix(install_path).unwrap_or(e.path());
            let score = score_executable(relative, size, &folder_name, rules);
            (score != REJECTED).then(|| Candidate {
                path: e.into_path(),
                size,
                score,
            })
        })
        .collect();

    candidates.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.path.cmp(&b.path)));
    candidates
}

fn alphanumeric(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// True if any alphanumeric token of any path component is a marker.
/// `Game-Win64-Shipping.exe` and `bin/game.exe` both qualify.
fn has_binary_marker(path: &Path, markers: &[String]) -> bool {
    path.components().any(|component| {
        let component = component.as_os_str().to_string_lossy().to_lowercase();
        component
            .split(|c: char| !c.is_alphanumeric())
            .any(|token| markers.iter().any(|m| m == token))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn score(path: &str, size: u64, folder: &str) -> i32 {
        score_executable(Path::new(path), size, folder, &RankingRules::default())
    }

    // --- Scoring ---

    #[test]
    fn denylisted_names_are_rejected() {
        for name in [
            "unins000.exe",
            "Setup.exe",
            "vc_redist.x64.exe",
            "UnityCrashHandler64.exe",
            "EasyAntiCheat_Setup.exe",
            "GameLauncher.exe",
        ] {
            assert_eq!(score(name, 100 * MB, "Game"), REJECTED, "{name}");
        }
    }

    #[test]
    fn size_bands_take_first_match() {
        assert_eq!(score("x.exe", 100 * MB, "Game"), 50);
        assert_eq!(score("x.exe", 10 * MB, "Game"), 20);
        // 3 MB sits in both the medium and low bands; medium wins.
        assert_eq!(score("x.exe", 3 * MB, "Game"), 20);
        assert_eq!(score("x.exe", MB, "Game"), 5);
        assert_eq!(score("x.exe", 1024, "Game"), 0);
        assert_eq!(score("x.exe", 600 * MB, "Game"), 0);
    }

    #[test]
    fn exact_name_ignores_case_and_punctuation() {
        assert_eq!(score("Example_Game.exe", 0, "Example Game"), 100);
        assert_eq!(score("EXAMPLEGAME.exe", 0, "ExampleGame"), 100);
    }

    #[test]
    fn partial_name_either_direction() {
        assert_eq!(score("ExampleGameDX12.exe", 0, "ExampleGame"), 40);
        assert_eq!(score("Example.exe", 0, "Example Game Remastered"), 40);
        assert_eq!(score("Other.exe", 0, "ExampleGame"), 0);
    }

    #[test]
    fn binary_markers_count_once() {
        assert_eq!(score("bin/x.exe", 0, "Game"), 15);
        assert_eq!(score("Binaries/Win64/Game-Win64-Shipping.exe", 0, "Zzz"), 15);
        assert_eq!(score("binaries/x.exe", 0, "Game"), 0);
    }

    #[test]
    fn bonuses_accumulate() {
        let total = score("Binaries/Win64/ExampleGame.exe", 120 * MB, "ExampleGame");
        assert_eq!(total, 50 + 100 + 15);
    }

    #[test]
    fn custom_rules() {
        let rules = RankingRules {
            denylist: vec!["tool".into()],
            ..RankingRules::default()
        };
        assert_eq!(score_executable(Path::new("Tool.exe"), 0, "g", &rules), REJECTED);
        assert!(score_executable(Path::new("setup.exe"), 0, "g", &rules) >= 0);
    }

    // --- Candidate ranking ---

    fn write_sized(path: &Path, size: u64) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let f = fs::File::create(path).unwrap();
        f.set_len(size).unwrap();
    }

    #[test]
    fn ranks_main_executable_first() {
        let tmp = tempfile::tempdir().unwrap();
        let game = tmp.path().join("ExampleGame");
        write_sized(&game.join("unins000.exe"), 20 * MB);
        write_sized(&game.join("tools").join("editor.exe"), 3 * MB);
        write_sized(&game.join("bin").join("ExampleGame.exe"), 40 * MB);
        write_sized(&game.join("readme.txt"), 10);

        let ranked = rank_candidates(&game, &RankingRules::default());
        let names: Vec<_> = ranked
            .iter()
            .map(|c| c.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["ExampleGame.exe", "editor.exe"]);
        assert_eq!(ranked[0].score, 50 + 100 + 15);
    }

    #[test]
    fn depth_limit_is_respected() {
        let tmp = tempfile::tempdir().unwrap();
        let game = tmp.path().join("G");
        write_sized(&game.join("a/b/c/d/e/ok.exe"), 0);
        write_sized(&game.join("a/b/c/d/e/f/too_deep.exe"), 0);

        let ranked = rank_candidates(&game, &RankingRules::default());
        assert_eq!(ranked.len(), 1);
        assert!(ranked[0].path.ends_with("ok.exe"));
    }

    #[test]
    fn ties_break_by_path() {
        let tmp = tempfile::tempdir().unwrap();
        let game = tmp.path().join("G");
        write_sized(&game.join("b.exe"), 0);
        write_sized(&game.join("a.EXE"), 0);

        let ranked = rank_candidates(&game, &RankingRules::default());
        assert!(ranked[0].path.ends_with("a.EXE"));
        assert!(ranked[1].path.ends_with("b.exe"));
    }

    #[test]
    fn only_denylisted_yields_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let game = tmp.path().join("G");
        write_sized(&game.join("setup.exe"), 30 * MB);
        assert!(rank_candidates(&game, &RankingRules::default()).is_empty());
    }

    #[test]
    fn missing_folder_yields_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(rank_candidates(&tmp.path().join("nope"), &RankingRules::default()).is_empty());
    }
}
