use filepanel_core::TreeSettings;

/// How an entry name is treated by the visibility settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryClass {
    Regular,
    /// The `.git` directory, governed by `showDotGit` alone
    DotGit,
    /// Any other dotfile, governed by `showHidden`
    Hidden,
}

pub fn classify(name: &str) -> EntryClass {
    if name == ".git" {
        EntryClass::DotGit
    } else if name.starts_with('.') {
        EntryClass::Hidden
    } else {
        EntryClass::Regular
    }
}

pub fn is_visible(name: &str, settings: &TreeSettings) -> bool {
    match classify(name) {
        EntryClass::Regular => true,
        EntryClass::DotGit => settings.show_dot_git,
        EntryClass::Hidden => settings.show_hidden,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn settings(show_hidden: bool, show_dot_git: bool) -> TreeSettings {
        TreeSettings {
            show_hidden,
            show_dot_git,
            ..TreeSettings::default()
        }
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify(".git"), EntryClass::DotGit);
        assert_eq!(classify(".gitignore"), EntryClass::Hidden);
        assert_eq!(classify(".env"), EntryClass::Hidden);
        assert_eq!(classify("readme.md"), EntryClass::Regular);
        assert_eq!(classify("a.git"), EntryClass::Regular);
    }

    #[test]
    fn test_dot_git_ignores_show_hidden() {
        assert!(is_visible(".git", &settings(false, true)));
        assert!(!is_visible(".git", &settings(true, false)));
    }

    proptest! {
        #[test]
        fn prop_dot_git_follows_show_dot_git(hidden in any::<bool>(), dot_git in any::<bool>()) {
            prop_assert_eq!(is_visible(".git", &settings(hidden, dot_git)), dot_git);
        }

        #[test]
        fn prop_dotfiles_follow_show_hidden(
            rest in "[a-zA-Z0-9_.-]{0,12}",
            hidden in any::<bool>(),
            dot_git in any::<bool>(),
        ) {
            let name = format!(".{}", rest);
            prop_assume!(name != ".git");
            prop_assert_eq!(is_visible(&name, &settings(hidden, dot_git)), hidden);
        }

        #[test]
        fn prop_regular_names_always_visible(
            name in "[a-zA-Z0-9_][a-zA-Z0-9_.-]{0,12}",
            hidden in any::<bool>(),
            dot_git in any::<bool>(),
        ) {
            prop_assert!(is_visible(&name, &settings(hidden, dot_git)));
        }
    }
}
