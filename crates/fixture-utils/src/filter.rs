use regex::Regex;
use serde::Deserialize;
use std::{collections::BTreeMap, fs, path::Path};

use crate::path::PathWrapper;

type Folder = String;
type FilterMap = BTreeMap<Folder, Vec<String>>;

/// Filter applied on the fixture files and on the test cases they contain.
///
/// ```yaml
/// directories:
///   - stBrokenPipe
/// filename:
///   stCreate2:
///     - RevertInCreateInInitCreate2_d0g0v0
/// regex:
///   stSStoreTest:
///     - InitCollision_d[0-3]g0v0
/// testname:
///   stRevertTest:
///     - RevertInCreateInInit_d0g0v0_Byzantium
/// ```
#[derive(Debug, Deserialize, Default)]
pub struct Filter {
    /// List of directories that should be skipped entirely.
    #[serde(default)]
    directories: Vec<String>,
    /// Mapping containing the directories and the file stems that should be skipped
    #[serde(default)]
    filename: FilterMap,
    /// Mapping containing the directories and the regex patterns that should be skipped
    #[serde(default)]
    regex: FilterMap,
    /// Mapping containing the directories and the specific test cases that should be skipped
    #[serde(default, rename = "testname")]
    test_name: FilterMap,
    #[serde(skip)]
    compiled_regex: BTreeMap<Folder, Vec<Regex>>,
}

impl Filter {
    pub fn load_file(path: impl AsRef<Path>) -> Result<Self, eyre::Error> {
        let path = path.as_ref();
        let filter = fs::read_to_string(path)
            .map_err(|err| eyre::eyre!("Unable to read filter {}: {}", path.display(), err))?;
        Self::from_yaml(&filter)
    }

    pub fn from_yaml(content: &str) -> Result<Self, eyre::Error> {
        let mut filter: Self = serde_yaml::from_str(content)?;
        filter.compiled_regex = filter
            .regex
            .iter()
            .map(|(folder, patterns)| {
                let compiled = patterns
                    .iter()
                    .map(|pattern| Regex::new(pattern))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok((folder.clone(), compiled))
            })
            .collect::<Result<_, regex::Error>>()?;
        Ok(filter)
    }

    /// Checks if the given fixture file is inside the filter object
    pub fn is_skipped(&self, path: &PathWrapper) -> bool {
        let parent = path.parent();
        if parent.components().any(|component| {
            self.directories
                .iter()
                .any(|dir| component.as_os_str() == dir.as_str())
        }) {
            return true;
        }

        let dir_name = parent.file_stem_to_string();
        let file_name = path.file_stem_to_string();

        let mut should_skip = self
            .filename
            .get(&dir_name)
            .map(|filtered_files| filtered_files.iter().any(|filename| filename == &file_name))
            .unwrap_or_default();

        should_skip |= self
            .compiled_regex
            .get(&dir_name)
            .map(|regexes| regexes.iter().any(|regex| regex.is_match(&file_name)))
            .unwrap_or_default();

        should_skip
    }

    /// Checks if the test case `case_name` of the given fixture file should be skipped
    pub fn is_case_skipped(&self, path: &PathWrapper, case_name: &str) -> bool {
        let dir_name = path.parent().file_stem_to_string();
        self.test_name
            .get(&dir_name)
            .map(|tests| tests.iter().any(|test| test == case_name))
            .unwrap_or_default()
    }
}
