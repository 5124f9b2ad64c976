//! Stack configuration
//!
//! Loaded once at program entry and passed to every stack definition.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use strata_core::assert_defined;
use strata_core::error::{ConfigurationError, DefinitionError, DefinitionResult};
use strata_provider_aws::s3::BucketAcl;
use strata_provider_aws::schemas::types::validate_region;

pub const DEFAULT_DEMO_NAME: &str = "cn-prague";
pub const DEFAULT_POLICY_FILE: &str = "iam_policy.json";

fn default_demo_name() -> String {
    DEFAULT_DEMO_NAME.to_string()
}

fn default_policy_file() -> PathBuf {
    PathBuf::from(DEFAULT_POLICY_FILE)
}

fn default_acl() -> String {
    "private".to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AwsConfig {
    pub region: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BucketConfig {
    #[serde(default = "default_acl")]
    pub acl: String,
    pub justification: Option<String>,
}

impl Default for BucketConfig {
    fn default() -> Self {
        Self {
            acl: default_acl(),
            justification: None,
        }
    }
}

/// Settings shared by the stack definitions
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StackConfig {
    pub project: String,
    pub stack: String,
    #[serde(default)]
    pub aws: AwsConfig,
    #[serde(default = "default_demo_name")]
    pub demo_name: String,
    /// Permissions policy of the load balancer controller
    #[serde(default = "default_policy_file")]
    pub policy_file: PathBuf,
    #[serde(default)]
    pub bucket: BucketConfig,
}

impl StackConfig {
    pub fn new(project: impl Into<String>, stack: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            stack: stack.into(),
            aws: AwsConfig::default(),
            demo_name: default_demo_name(),
            policy_file: default_policy_file(),
            bucket: BucketConfig::default(),
        }
    }

    /// Read a YAML config file
    pub fn load(path: impl AsRef<Path>) -> DefinitionResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| DefinitionError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&content).map_err(|e| DefinitionError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = project.into();
        self
    }

    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = stack.into();
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.aws.region = Some(region.into());
        self
    }

    pub fn with_policy_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.policy_file = path.into();
        self
    }

    /// Required AWS region, normalized to AWS format
    pub fn region(&self) -> Result<String, ConfigurationError> {
        let region = assert_defined("aws:region", self.aws.region.as_deref())?;
        validate_region(region).map_err(|msg| ConfigurationError::invalid("aws:region", msg))
    }

    pub fn bucket_acl(&self) -> Result<BucketAcl, ConfigurationError> {
        BucketAcl::parse(&self.bucket.acl, self.bucket.justification.as_deref())
    }
}
