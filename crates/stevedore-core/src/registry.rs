use crate::error::OptionsError;

/// ECR registry coordinates needed for `aws ecr get-login`.
///
/// Parsed by convention from `<ACCOUNT_ID>.dkr.ecr.<REGION>.amazonaws.com/<NAME>`:
/// the first dot-separated segment is the registry id, the fourth the region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryTarget {
    pub registry_id: String,
    pub region: String,
}

impl RegistryTarget {
    pub fn parse(uri: &str) -> Result<Self, OptionsError> {
        let segments: Vec<&str> = uri.trim().split('.').collect();
        let invalid = || OptionsError::InvalidRegistryUri {
            uri: uri.to_owned(),
        };

        let registry_id = segments.first().filter(|s| !s.is_empty()).ok_or_else(invalid)?;
        let region = segments.get(3).filter(|s| !s.is_empty()).ok_or_else(invalid)?;

        Ok(Self {
            registry_id: (*registry_id).to_owned(),
            region: (*region).to_owned(),
        })
    }
}
