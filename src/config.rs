//! Flag groups declared in a TOML file.
//!
//! ```toml
//! [[group]]
//! name = "spawn"
//!
//! [[group.flag]]
//! name = "count"
//! identifier = "--count"
//! aliases = ["-c"]
//! kind = "number"
//! default = 1
//! min = 1
//! max = 20
//! ```
use std::fs;
use std::path::Path;

use failure::{Error, ResultExt};
use serde::Deserialize;

use crate::creator::{choice_parser, NumberCreator, SwitchCreator, ValueCreator};
use crate::error::{FlagParseError, GroupError};
use crate::group::{FlagGroup, FlagGroupBuilder};
use crate::manager::FlagGroupManager;

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default, rename = "group")]
    pub groups: Vec<GroupConfig>,
}

#[derive(Debug, Deserialize)]
pub struct GroupConfig {
    pub name: String,
    #[serde(default, rename = "flag")]
    pub flags: Vec<FlagConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FlagKindConfig {
    /// `bool`, no value.
    Switch,
    /// `i64`, value required.
    Number,
    /// `String`, value required.
    Text,
    /// `String`, value optional.
    OptionalText,
}

#[derive(Debug, Deserialize)]
pub struct FlagConfig {
    pub name: String,
    pub identifier: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    pub kind: FlagKindConfig,
    /// The value of an absent flag.
    pub default: Option<toml::Value>,
    /// The value of a flag given without a value (`switch` and
    /// `optional-text` only).
    pub present: Option<toml::Value>,
    pub min: Option<i64>,
    pub max: Option<i64>,
    /// Accepted values of `text` and `optional-text` flags.
    #[serde(default)]
    pub choices: Vec<String>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Config, Error> {
        let text = fs::read_to_string(path)
            .with_context(|_| format!("failed to read {}", path.display()))?;
        let config = Config::parse(&text)
            .with_context(|_| format!("failed to load {}", path.display()))?;
        Ok(config)
    }

    pub fn parse(text: &str) -> Result<Config, Error> {
        Ok(toml::from_str(text)?)
    }

    /// Builds every declared group and registers it under its name.
    pub fn register_all(&self, manager: &FlagGroupManager) -> Result<(), GroupError> {
        for group in &self.groups {
            manager.register(&group.name, group.build()?)?;
        }
        Ok(())
    }
}

impl GroupConfig {
    pub fn build(&self) -> Result<FlagGroup, GroupError> {
        let mut builder = FlagGroup::builder();
        for flag in &self.flags {
            flag.add_to(&mut builder)?;
        }
        builder.build()
    }
}

impl FlagConfig {
    fn add_to(&self, builder: &mut FlagGroupBuilder) -> Result<(), GroupError> {
        match self.kind {
            FlagKindConfig::Number => {
                if let (Some(min), Some(max)) = (self.min, self.max) {
                    if min > max {
                        return Err(self.invalid(&format!("`min` ({}) is greater than `max` ({})", min, max)));
                    }
                }
            }
            _ if self.min.is_some() || self.max.is_some() => {
                return Err(self.invalid("`min` and `max` are only allowed on number flags"));
            }
            _ => (),
        }
        match self.kind {
            FlagKindConfig::Switch | FlagKindConfig::OptionalText => (),
            _ if self.present.is_some() => {
                return Err(self.invalid("`present` is only allowed on switch and optional-text flags"));
            }
            _ => (),
        }
        match self.kind {
            FlagKindConfig::Text | FlagKindConfig::OptionalText => (),
            _ if !self.choices.is_empty() => {
                return Err(self.invalid("`choices` are only allowed on text and optional-text flags"));
            }
            _ => (),
        }

        match self.kind {
            FlagKindConfig::Switch => {
                if self.default.is_some() {
                    return Err(self.invalid("a switch defaults to the opposite of `present`"));
                }
                let present = match &self.present {
                    Some(value) => value
                        .as_bool()
                        .ok_or_else(|| self.invalid("`present` must be a boolean"))?,
                    None => true,
                };
                let creator = SwitchCreator::new(self.name.as_str(), self.identifier.as_str())
                    .present_value(present);
                let creator = self.aliases.iter().fold(creator, |c, a| c.alias(a.as_str()));
                builder.add(creator.create());
            }
            FlagKindConfig::Number => {
                let mut creator = NumberCreator::<i64>::new(self.name.as_str(), self.identifier.as_str());
                if let Some(default) = &self.default {
                    let default = default
                        .as_integer()
                        .ok_or_else(|| self.invalid("`default` must be an integer"))?;
                    creator = creator.default_value(default);
                }
                if let Some(min) = self.min {
                    creator = creator.min(min);
                }
                if let Some(max) = self.max {
                    creator = creator.max(max);
                }
                let creator = self.aliases.iter().fold(creator, |c, a| c.alias(a.as_str()));
                builder.add(creator.create());
            }
            FlagKindConfig::Text | FlagKindConfig::OptionalText => {
                let mut creator = if self.choices.is_empty() {
                    ValueCreator::new(
                        self.name.as_str(),
                        self.identifier.as_str(),
                        |input: &str| -> Result<String, FlagParseError> { Ok(input.to_owned()) },
                    )
                } else {
                    ValueCreator::new(
                        self.name.as_str(),
                        self.identifier.as_str(),
                        choice_parser(self.choices.clone()),
                    )
                    .suggestions(self.choices.clone())
                };
                if let Some(default) = &self.default {
                    creator = creator.default_value(self.text(default, "default")?);
                }
                if self.kind == FlagKindConfig::OptionalText {
                    creator = creator.optional();
                    if let Some(present) = &self.present {
                        creator = creator.present_value(self.text(present, "present")?);
                    }
                }
                let creator = self.aliases.iter().fold(creator, |c, a| c.alias(a.as_str()));
                builder.add(creator.create());
            }
        }

        Ok(())
    }

    fn text(&self, value: &toml::Value, field: &str) -> Result<String, GroupError> {
        value
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| self.invalid(&format!("`{}` must be a string", field)))
    }

    fn invalid(&self, reason: &str) -> GroupError {
        GroupError::Config {
            reason: format!("flag '{}': {}", self.name, reason),
        }
    }
}

/// Registers the `demo` group: `--count` (1 to 20) and `--verbose`.
pub fn register_demo_group(manager: &FlagGroupManager) -> Result<(), GroupError> {
    let mut builder = FlagGroup::builder();
    builder.add(
        NumberCreator::<i64>::new("count", "--count")
            .alias("-c")
            .range(1, 20)
            .default_value(1)
            .create(),
    );
    builder.add(SwitchCreator::new("verbose", "--verbose").alias("-v").create());
    manager.register("demo", builder.build()?)?;
    Ok(())
}
