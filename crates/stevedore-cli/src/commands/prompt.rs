use std::path::PathBuf;

use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, MultiSelect, Select};
use stevedore_cloud::{DeployClient, PlatformError, ShellExecutor, VersionInfo};
use stevedore_core::{OptionLayer, Region, uncatalogued};

#[derive(Debug, thiserror::Error)]
pub(crate) enum PromptError {
    #[error("deploy not confirmed")]
    Declined,

    #[error("interactive prompt failed")]
    Terminal(#[from] dialoguer::Error),

    #[error("could not list Elastic Beanstalk {what}")]
    Lookup {
        what: &'static str,
        source: PlatformError,
    },

    #[error("no Elastic Beanstalk {0} found")]
    NothingToSelect(&'static str),

    #[error("no region selected")]
    NoRegionSelected,
}

/// One selectable version tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct VersionChoice {
    pub label: String,
    pub value: String,
}

impl VersionChoice {
    fn new(value: &str, kind: &str) -> Self {
        Self {
            label: format!("{value} ({kind})"),
            value: value.to_owned(),
        }
    }
}

/// Candidate image tags derived from repository state, in prompt order.
///
/// Unavailable candidates are skipped. A supplied `current` version is
/// offered last as the custom choice.
pub(crate) fn version_choices(
    name: &str,
    info: &VersionInfo,
    current: Option<&str>,
) -> Vec<VersionChoice> {
    let mut choices = vec![VersionChoice {
        label: "latest".to_owned(),
        value: "latest".to_owned(),
    }];

    let candidates = [
        (info.branch.clone(), "branch"),
        (info.tag.clone(), "tag"),
        (info.branch_short.clone(), "branch-sha1"),
        (info.branch_tag.clone(), "branch-tag"),
        (
            info.branch_tag.as_ref().map(|bt| format!("{name}-{bt}")),
            "name-branch-tag",
        ),
    ];
    for (value, kind) in candidates {
        if let Some(value) = value {
            choices.push(VersionChoice::new(&value, kind));
        }
    }

    if let Some(current) = current.filter(|v| !v.trim().is_empty()) {
        choices.push(VersionChoice::new(current, "custom"));
    }

    choices
}

/// Preselected version: the supplied version, else the branch-sha1 tag,
/// else `latest`.
pub(crate) fn default_version(
    choices: &[VersionChoice],
    info: &VersionInfo,
    current: Option<&str>,
) -> usize {
    let values: Vec<String> = choices.iter().map(|c| c.value.clone()).collect();
    let preferred = current
        .filter(|v| !v.trim().is_empty())
        .or(info.branch_short.as_deref());
    position_of(&values, preferred)
}

/// Index of `current` in `items`, or the first item.
fn position_of(items: &[String], current: Option<&str>) -> usize {
    current
        .and_then(|c| items.iter().position(|item| item == c))
        .unwrap_or(0)
}

/// One entry of the region multi-select.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RegionItem {
    pub label: String,
    pub code: String,
    pub checked: bool,
}

/// Catalogue regions offered for `region_list`, followed by selected regions
/// the catalogue does not know. Selected regions start checked.
pub(crate) fn region_items(selected: &[String], region_list: &[String]) -> Vec<RegionItem> {
    let is_selected = |code: &str| selected.iter().any(|s| s == code);

    let known = Region::offered(selected, region_list)
        .into_iter()
        .map(|r| RegionItem {
            label: r.to_string(),
            code: r.code.to_owned(),
            checked: is_selected(r.code),
        });
    let unknown = uncatalogued(selected).into_iter().map(|code| RegionItem {
        label: code.to_owned(),
        code: code.to_owned(),
        checked: true,
    });

    known.chain(unknown).collect()
}

/// Terminal questionnaire filling in deploy options.
pub(crate) struct DeployPrompt {
    theme: ColorfulTheme,
}

impl DeployPrompt {
    pub(crate) fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }

    /// Ask every question, using `layer` for defaults.
    ///
    /// Answers overwrite the corresponding fields; the region answer replaces
    /// the region set. Returns [`PromptError::Declined`] when the final
    /// confirmation is answered negatively.
    pub(crate) async fn collect<E: ShellExecutor>(
        &self,
        client: &DeployClient<E>,
        mut layer: OptionLayer,
    ) -> Result<OptionLayer, PromptError> {
        let name = self.text(
            "What is the name for your docker image?",
            layer.name.clone(),
        )?;

        let info = client.versions().await;
        let choices = version_choices(&name, &info, layer.version.as_deref());
        let labels: Vec<&str> = choices.iter().map(|c| c.label.as_str()).collect();
        let picked = Select::with_theme(&self.theme)
            .with_prompt("What version would you like to tag the docker image with?")
            .items(&labels)
            .default(default_version(&choices, &info, layer.version.as_deref()))
            .interact()?;
        layer.version = Some(choices[picked].value.clone());
        layer.name = Some(name);

        layer.registry_uri = Some(self.text(
            "What ECR registry should we use?",
            layer.registry_uri.clone(),
        )?);

        let to_platform = Confirm::with_theme(&self.theme)
            .with_prompt("Do you want to deploy to Elastic Beanstalk?")
            .default(layer.deploy_to_platform.unwrap_or(true))
            .interact()?;
        layer.deploy_to_platform = Some(to_platform);

        if to_platform {
            let apps = client
                .describe_applications()
                .await
                .map_err(|e| PromptError::Lookup {
                    what: "applications",
                    source: e,
                })?;
            let app = self.pick(
                "What EB application do you want to deploy?",
                apps,
                layer.platform_app.as_deref(),
                "applications",
            )?;

            let envs = client
                .describe_environments(&app)
                .await
                .map_err(|e| PromptError::Lookup {
                    what: "environments",
                    source: e,
                })?;
            layer.platform_env = Some(self.pick(
                "What EB environment are you deploying to?",
                envs,
                layer.platform_env.as_deref(),
                "environments",
            )?);
            layer.platform_app = Some(app);

            layer.platform_bucket = Some(self.text(
                "What S3 bucket should we save the EB application version to?",
                layer.platform_bucket.clone(),
            )?);
            layer.bundle_template = Some(PathBuf::from(self.text(
                "Where is your Dockerrun file located?",
                layer.bundle_template.as_ref().map(|p| p.display().to_string()),
            )?));
            layer.output_dir = Some(PathBuf::from(self.text(
                "Where should we save the deploy zip?",
                layer.output_dir.as_ref().map(|p| p.display().to_string()),
            )?));
        }

        layer.regions = self.regions(&layer.regions, &layer.region_list)?;
        if to_platform && layer.regions.is_empty() {
            return Err(PromptError::NoRegionSelected);
        }

        let confirmed = Confirm::with_theme(&self.theme)
            .with_prompt("All set, are you sure you want to deploy?")
            .default(false)
            .interact()?;
        if !confirmed {
            return Err(PromptError::Declined);
        }

        Ok(layer)
    }

    fn text(&self, prompt: &str, current: Option<String>) -> Result<String, PromptError> {
        let mut input = Input::<String>::with_theme(&self.theme).with_prompt(prompt);
        if let Some(current) = current.filter(|c| !c.is_empty()) {
            input = input.default(current);
        }
        Ok(input.interact_text()?)
    }

    fn pick(
        &self,
        prompt: &str,
        items: Vec<String>,
        current: Option<&str>,
        what: &'static str,
    ) -> Result<String, PromptError> {
        if items.is_empty() {
            return Err(PromptError::NothingToSelect(what));
        }

        let picked = Select::with_theme(&self.theme)
            .with_prompt(prompt)
            .items(&items)
            .default(position_of(&items, current))
            .interact()?;

        Ok(items[picked].clone())
    }

    fn regions(
        &self,
        selected: &[String],
        region_list: &[String],
    ) -> Result<Vec<String>, PromptError> {
        let items = region_items(selected, region_list);
        let labels: Vec<&str> = items.iter().map(|i| i.label.as_str()).collect();
        let checked: Vec<bool> = items.iter().map(|i| i.checked).collect();

        let picked = MultiSelect::with_theme(&self.theme)
            .with_prompt("What region(s)?")
            .items(&labels)
            .defaults(&checked)
            .max_length(labels.len())
            .interact()?;

        Ok(picked.into_iter().map(|i| items[i].code.clone()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info() -> VersionInfo {
        VersionInfo::new(
            Some("main".to_owned()),
            Some("0123456789abcdef".to_owned()),
            Some("v1.2.0".to_owned()),
        )
    }

    fn values(choices: &[VersionChoice]) -> Vec<&str> {
        choices.iter().map(|c| c.value.as_str()).collect()
    }

    #[test]
    fn version_choices_in_prompt_order() {
        let choices = version_choices("web", &info(), None);
        assert_eq!(
            values(&choices),
            vec![
                "latest",
                "main",
                "v1.2.0",
                "main-0123456",
                "main-v1.2.0",
                "web-main-v1.2.0",
            ]
        );
        assert_eq!(choices[3].label, "main-0123456 (branch-sha1)");
    }

    #[test]
    fn version_choices_offer_current_as_custom() {
        let choices = version_choices("web", &info(), Some("2.0.0"));
        let last = choices.last().unwrap();
        assert_eq!(last.value, "2.0.0");
        assert_eq!(last.label, "2.0.0 (custom)");
    }

    #[test]
    fn version_choices_skip_unavailable_candidates() {
        let untagged = VersionInfo::new(Some("main".to_owned()), Some("abcdef12".to_owned()), None);
        assert_eq!(
            values(&version_choices("web", &untagged, None)),
            vec!["latest", "main", "main-abcdef1"]
        );

        let outside_repo = VersionInfo::default();
        assert_eq!(values(&version_choices("web", &outside_repo, Some(" "))), vec!["latest"]);
    }

    #[test]
    fn default_version_prefers_branch_sha1() {
        let choices = version_choices("web", &info(), None);
        let picked = default_version(&choices, &info(), None);
        assert_eq!(choices[picked].value, "main-0123456");
    }

    #[test]
    fn default_version_prefers_supplied_version() {
        let choices = version_choices("web", &info(), Some("2.0.0"));
        let picked = default_version(&choices, &info(), Some("2.0.0"));
        assert_eq!(choices[picked].label, "2.0.0 (custom)");
    }

    #[test]
    fn default_version_falls_back_to_latest() {
        let outside_repo = VersionInfo::default();
        let choices = version_choices("web", &outside_repo, None);
        assert_eq!(default_version(&choices, &outside_repo, None), 0);
    }

    #[test]
    fn region_items_keep_uncatalogued_selections() {
        let selected = vec!["eu-west-1".to_owned(), "eu-north-1".to_owned()];
        let region_list = vec!["us-east-1".to_owned()];

        let items = region_items(&selected, &region_list);

        let codes: Vec<(&str, bool)> = items
            .iter()
            .map(|i| (i.code.as_str(), i.checked))
            .collect();
        assert_eq!(
            codes,
            vec![("us-east-1", false), ("eu-west-1", true), ("eu-north-1", true)]
        );
        assert_eq!(items[1].label, "eu-west-1 (Ireland)");
        assert_eq!(items[2].label, "eu-north-1");
    }

    #[test]
    fn position_of_falls_back_to_first() {
        let items = vec!["api".to_owned(), "web".to_owned()];
        assert_eq!(position_of(&items, Some("web")), 1);
        assert_eq!(position_of(&items, Some("gone")), 0);
        assert_eq!(position_of(&items, None), 0);
    }
}
