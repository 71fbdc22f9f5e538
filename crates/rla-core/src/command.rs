use crate::config::CheckScope;
use crate::config::Config;

pub const BASE_COMMAND: &str = "rubocop --parallel -f json";
pub const DEFAULT_BASE_BRANCH: &str = "origin/master";

/// Assembles the rubocop command line for one lint run.
///
/// Clauses are appended in a fixed order: fail level, config path, excluded
/// cops, force exclusion, then the modified-files diff. Config values are
/// spliced in as-is, so the config document must come from a trusted source.
#[derive(Debug, Clone, Copy)]
pub struct CommandBuilder<'a> {
    config: Option<&'a Config>,
    external_ref: Option<&'a str>,
}

impl<'a> CommandBuilder<'a> {
    pub fn new(config: Option<&'a Config>, external_ref: Option<&'a str>) -> Self {
        Self {
            config,
            external_ref,
        }
    }

    pub fn build(&self) -> String {
        let mut command = BASE_COMMAND.to_string();
        let Some(config) = self.config else {
            return command;
        };

        if let Some(level) = &config.rubocop_fail_level {
            command.push_str(&format!(" --fail-level {level}"));
        }
        if let Some(path) = &config.rubocop_config_path {
            command.push_str(&format!(" -c {path}"));
        }
        if !config.rubocop_excluded_cops.is_empty() {
            command.push_str(&format!(
                " --except {}",
                config.rubocop_excluded_cops.join(",")
            ));
        }
        if config.rubocop_force_exclusion {
            command.push_str(" --force-exclusion");
        }
        if config.check_scope == CheckScope::Modified {
            command.push_str(&format!(
                " -- $(git diff {}... --name-only --diff-filter=AM | grep . || echo '/dev/null')",
                self.diff_target(config)
            ));
        }
        command
    }

    /// `base_branch` wins over the platform ref, which wins over `origin/master`.
    pub fn diff_target(&self, config: &'a Config) -> &'a str {
        config
            .base_branch
            .as_deref()
            .or(self.external_ref)
            .unwrap_or(DEFAULT_BASE_BRANCH)
    }
}

pub fn build_command(config: Option<&Config>, external_ref: Option<&str>) -> String {
    CommandBuilder::new(config, external_ref).build()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn config(text: &str) -> Option<Config> {
        Config::from_yaml_str(text).expect("config should parse")
    }

    fn modified_diff(branch: &str) -> String {
        format!(
            "rubocop --parallel -f json \
             -- $(git diff {branch}... --name-only --diff-filter=AM | grep . || echo '/dev/null')"
        )
    }

    #[test]
    fn missing_config_returns_base_command() {
        assert_eq!(build_command(None, None), "rubocop --parallel -f json");
        assert_eq!(
            build_command(None, Some("origin/integration")),
            "rubocop --parallel -f json"
        );
    }

    #[test]
    fn config_without_recognized_keys_returns_base_command() {
        let config = config("unrelated: value\n");
        assert_eq!(build_command(config.as_ref(), None), BASE_COMMAND);
    }

    #[test]
    fn modified_scope_defaults_to_origin_master() {
        let config = config("check_scope: modified\n");
        assert_eq!(
            build_command(config.as_ref(), None),
            modified_diff("origin/master")
        );
    }

    #[test]
    fn modified_scope_uses_external_ref() {
        let config = config("check_scope: modified\n");
        assert_eq!(
            build_command(config.as_ref(), Some("origin/integration")),
            modified_diff("origin/integration")
        );
    }

    #[test]
    fn modified_scope_uses_base_branch() {
        let config = config("base_branch: origin/develop\ncheck_scope: modified\n");
        assert_eq!(
            build_command(config.as_ref(), None),
            modified_diff("origin/develop")
        );
    }

    #[test]
    fn base_branch_takes_precedence_over_external_ref() {
        let config = config("base_branch: origin/develop\ncheck_scope: modified\n");
        assert_eq!(
            build_command(config.as_ref(), Some("origin/integration")),
            modified_diff("origin/develop")
        );
    }

    #[test]
    fn base_branch_without_modified_scope_adds_nothing() {
        let config = config("base_branch: origin/develop\n");
        assert_eq!(build_command(config.as_ref(), None), BASE_COMMAND);
    }

    #[test]
    fn fail_level_sets_flag() {
        let config = config("rubocop_fail_level: error\n");
        assert_eq!(
            build_command(config.as_ref(), None),
            "rubocop --parallel -f json --fail-level error"
        );
    }

    #[test]
    fn config_path_sets_flag() {
        let config = config("rubocop_config_path: .rubocop.yml\n");
        assert_eq!(
            build_command(config.as_ref(), None),
            "rubocop --parallel -f json -c .rubocop.yml"
        );
    }

    #[test]
    fn excluded_cops_are_joined_with_commas_in_order() {
        let single = config("rubocop_excluded_cops:\n  - Style/FrozenStringLiteralComment\n");
        assert_eq!(
            build_command(single.as_ref(), None),
            "rubocop --parallel -f json --except Style/FrozenStringLiteralComment"
        );

        let several = config("rubocop_excluded_cops: [Metrics/AbcSize, Layout/LineLength]\n");
        assert_eq!(
            build_command(several.as_ref(), None),
            "rubocop --parallel -f json --except Metrics/AbcSize,Layout/LineLength"
        );
    }

    #[test]
    fn empty_excluded_cops_add_nothing() {
        let config = config("rubocop_excluded_cops: []\n");
        assert_eq!(build_command(config.as_ref(), None), BASE_COMMAND);
    }

    #[test]
    fn force_exclusion_sets_flag_only_when_true() {
        let enabled = config("rubocop_force_exclusion: true\n");
        assert_eq!(
            build_command(enabled.as_ref(), None),
            "rubocop --parallel -f json --force-exclusion"
        );

        let disabled = config("rubocop_force_exclusion: false\n");
        assert_eq!(build_command(disabled.as_ref(), None), BASE_COMMAND);
    }

    #[test]
    fn all_options_render_in_fixed_order() {
        let config = config(include_str!("../tests/fixtures/config.yml"));
        assert_eq!(
            build_command(config.as_ref(), Some("origin/integration")),
            "rubocop --parallel -f json \
             --fail-level error -c .rubocop.yml --except Style/FrozenStringLiteralComment --force-exclusion \
             -- $(git diff origin/develop... --name-only --diff-filter=AM | grep . || echo '/dev/null')"
        );
    }

    #[test]
    fn values_are_passed_through_unescaped() {
        let config = config("rubocop_config_path: \"conf dir/.rubocop.yml\"\n");
        assert_eq!(
            build_command(config.as_ref(), None),
            "rubocop --parallel -f json -c conf dir/.rubocop.yml"
        );
    }

    #[test]
    fn diff_target_follows_precedence() {
        let bare = Config::default();
        let builder = CommandBuilder::new(Some(&bare), None);
        assert_eq!(builder.diff_target(&bare), "origin/master");

        let builder = CommandBuilder::new(Some(&bare), Some("origin/main"));
        assert_eq!(builder.diff_target(&bare), "origin/main");

        let pinned = Config {
            base_branch: Some("origin/release".to_string()),
            ..Config::default()
        };
        assert_eq!(builder.diff_target(&pinned), "origin/release");
    }
}
