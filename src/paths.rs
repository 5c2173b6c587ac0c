//! Translation of Windows-style drive paths into POSIX paths.
//!
//! Hosts running under a Windows compatibility layer hand out paths such as
//! `C:\users\me\file.txt`; helpers run natively and need the location inside
//! the compatibility prefix instead.

use std::path::Path;

/// Translate `path` using the process environment (`WINEPREFIX`, `HOME`).
pub fn to_posix_path(path: &Path) -> String {
    let prefix = std::env::var("WINEPREFIX").ok();
    let home = std::env::var("HOME").ok();
    translate(&path.to_string_lossy(), prefix.as_deref(), home.as_deref())
}

/// Pure form of [`to_posix_path`].
///
/// Paths without a drive letter are returned unchanged. Drive `Z:` maps to
/// `/`; any other drive maps to `<prefix>/drive_<letter>`, where the prefix is
/// `wine_prefix`, else `<home>/.wine`, else `/.wine`.
pub fn translate(path: &str, wine_prefix: Option<&str>, home: Option<&str>) -> String {
    let mut chars = path.chars();
    let (Some(drive), Some(':')) = (chars.next(), chars.next()) else {
        return path.to_string();
    };
    if !drive.is_ascii_alphabetic() {
        return path.to_string();
    }

    let drive = drive.to_ascii_lowercase();
    let rest = &path[2..];

    let mut translated = if drive == 'z' {
        "/".to_string()
    } else {
        let prefix = match (wine_prefix, home) {
            (Some(prefix), _) => prefix.to_string(),
            (None, Some(home)) => format!("{home}/.wine"),
            (None, None) => "/.wine".to_string(),
        };
        format!("{prefix}/drive_{drive}")
    };

    for part in rest.split(['\\', '/']).filter(|p| !p.is_empty()) {
        if !translated.ends_with('/') {
            translated.push('/');
        }
        translated.push_str(part);
    }

    translated
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_posix_path_is_unchanged() {
        assert_eq!(translate("/home/me/a.txt", None, None), "/home/me/a.txt");
        assert_eq!(translate("relative\\x", None, None), "relative\\x");
        assert_eq!(translate("", None, None), "");
    }

    #[test]
    fn test_z_drive_maps_to_root() {
        assert_eq!(translate("Z:\\home\\me\\a.txt", None, None), "/home/me/a.txt");
        assert_eq!(translate("z:", None, None), "/");
    }

    #[test]
    fn test_drive_uses_wine_prefix() {
        assert_eq!(
            translate("C:\\users\\me\\file.txt", Some("/opt/prefix"), Some("/home/me")),
            "/opt/prefix/drive_c/users/me/file.txt"
        );
    }

    #[test]
    fn test_drive_falls_back_to_home() {
        assert_eq!(
            translate("D:\\games", None, Some("/home/me")),
            "/home/me/.wine/drive_d/games"
        );
        assert_eq!(translate("D:\\games", None, None), "/.wine/drive_d/games");
    }

    #[test]
    fn test_empty_segments_are_dropped() {
        assert_eq!(
            translate("C:\\\\a\\\\b\\", Some("/p"), None),
            "/p/drive_c/a/b"
        );
    }

    #[test]
    fn test_non_letter_drive_is_unchanged() {
        assert_eq!(translate("1:\\x", None, None), "1:\\x");
    }
}
