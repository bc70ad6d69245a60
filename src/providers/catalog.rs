//! List operations offered by the service
//!
//! Each entry maps a command-line operation name onto the REST path that
//! lists it, the response field holding the records, and the hard maximum
//! page size the service enforces for that collection.

use super::remote::{PAGE_SIZE_PARAM, TOKEN_PARAM};
use crate::paginator::ListError;
use std::collections::BTreeMap;

/// A single list operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operation {
    /// Name used on the command line
    pub name: &'static str,
    /// One-line description for `cloudls operations`
    pub description: &'static str,
    /// Path below the endpoint; `{name}` segments are filled from filters
    pub path: &'static str,
    /// Response field holding the page's records
    pub records_key: &'static str,
    /// Service-side maximum page size
    pub max_page_size: u32,
    /// Record fields shown in table output
    pub columns: &'static [&'static str],
}

/// All known operations
pub const OPERATIONS: &[Operation] = &[
    Operation {
        name: "buckets",
        description: "Storage buckets owned by the account",
        path: "buckets",
        records_key: "Buckets",
        max_page_size: 1000,
        columns: &["Name", "Region", "CreationDate"],
    },
    Operation {
        name: "objects",
        description: "Objects in a bucket (filters: bucket, prefix, delimiter)",
        path: "buckets/{bucket}/objects",
        records_key: "Contents",
        max_page_size: 1000,
        columns: &["Key", "Size", "StorageClass", "LastModified"],
    },
    Operation {
        name: "object-versions",
        description: "Object versions and delete markers in a bucket (filters: bucket, prefix)",
        path: "buckets/{bucket}/versions",
        records_key: "Versions",
        max_page_size: 1000,
        columns: &["Key", "VersionId", "IsLatest", "Size"],
    },
    Operation {
        name: "multipart-uploads",
        description: "In-progress multipart uploads in a bucket (filters: bucket, prefix)",
        path: "buckets/{bucket}/uploads",
        records_key: "Uploads",
        max_page_size: 1000,
        columns: &["Key", "UploadId", "Initiated"],
    },
    Operation {
        name: "vaults",
        description: "Archive vaults and their lock state",
        path: "vaults",
        records_key: "VaultList",
        max_page_size: 10,
        columns: &["VaultName", "LockState", "NumberOfArchives", "SizeInBytes"],
    },
    Operation {
        name: "fleets",
        description: "Compute fleets (filters: status)",
        path: "fleets",
        records_key: "Fleets",
        max_page_size: 100,
        columns: &["FleetId", "Name", "Status", "InstanceCount"],
    },
    Operation {
        name: "fleet-instances",
        description: "Instances in a fleet (filters: fleet, status)",
        path: "fleets/{fleet}/instances",
        records_key: "Instances",
        max_page_size: 100,
        columns: &["InstanceId", "InstanceType", "Status", "IpAddress"],
    },
    Operation {
        name: "fleet-events",
        description: "Scaling and health events of a fleet (filters: fleet, start-time, end-time)",
        path: "fleets/{fleet}/events",
        records_key: "Events",
        max_page_size: 100,
        columns: &["EventId", "EventCode", "EventTime", "Message"],
    },
];

/// Find an operation by name
pub fn find(name: &str) -> Option<&'static Operation> {
    OPERATIONS.iter().find(|op| op.name == name)
}

impl Operation {
    /// Filters that are substituted into the path and therefore required
    pub fn path_params(&self) -> impl Iterator<Item = &'static str> {
        self.path.split('/').filter_map(|segment| {
            segment
                .strip_prefix('{')
                .and_then(|rest| rest.strip_suffix('}'))
        })
    }

    /// Split filters into path segments and query parameters
    ///
    /// Filters may not use the query parameters that carry the page size and
    /// the continuation token.
    pub fn resolve(
        &self,
        filters: &BTreeMap<String, String>,
    ) -> Result<(Vec<String>, Vec<(String, String)>), ListError> {
        if let Some(reserved) = [PAGE_SIZE_PARAM, TOKEN_PARAM]
            .into_iter()
            .find(|param| filters.contains_key(*param))
        {
            return Err(ListError::InvalidRequest(format!(
                "'{}' is reserved for paging and cannot be used as a filter \
                 (use --page-size, --max-items or --starting-token)",
                reserved
            )));
        }

        let mut query: BTreeMap<&str, &str> = filters
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();

        let mut segments = Vec::new();
        for segment in self.path.split('/') {
            match segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                Some(param) => {
                    let value = query.remove(param).filter(|v| !v.is_empty()).ok_or_else(|| {
                        ListError::InvalidRequest(format!(
                            "operation '{}' requires the filter '{}'",
                            self.name, param
                        ))
                    })?;
                    segments.push(value.to_string());
                }
                None => segments.push(segment.to_string()),
            }
        }

        let query = query
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        Ok((segments, query))
    }
}
