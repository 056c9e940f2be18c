//! Bucket records as exchanged with the admin API and our clients.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::aggregator::EnrichTarget;
use crate::upstream::FetchOptions;

pub const LIST_BUCKETS_PATH: &str = "/v2/ListBuckets";
pub const BUCKET_INFO_PATH: &str = "/v2/GetBucketInfo";

/// A bucket alias scoped to one access key.
///
/// The list call reports either bare alias names or `{accessKeyId, alias}`
/// pairs depending on the admin API version; both are passed through as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocalAlias {
    Name(String),
    Scoped {
        #[serde(rename = "accessKeyId")]
        access_key_id: String,
        alias: String,
    },
}

impl From<&str> for LocalAlias {
    fn from(name: &str) -> Self {
        LocalAlias::Name(name.to_string())
    }
}

/// One entry of `ListBuckets`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketSummary {
    pub id: String,
    #[serde(default)]
    pub local_aliases: Vec<LocalAlias>,
}

/// The body of `GetBucketInfo`. Fields other than the id and global aliases
/// (sizes, keys, quotas, website config...) are kept opaque.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketInfo {
    pub id: String,
    #[serde(default)]
    pub global_aliases: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A bucket as returned by `GET /buckets`.
///
/// `global_aliases` is `None` and `extra` empty when the detail lookup failed.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bucket {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_aliases: Option<Vec<String>>,
    #[serde(default)]
    pub local_aliases: Vec<LocalAlias>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Bucket {
    /// True when only the list-call identity is present.
    pub fn is_minimal(&self) -> bool {
        self.global_aliases.is_none() && self.extra.is_empty()
    }
}

impl EnrichTarget for BucketSummary {
    type Detail = BucketInfo;
    type Merged = Bucket;

    fn id(&self) -> &str {
        &self.id
    }

    fn detail_request(&self) -> (String, FetchOptions) {
        (
            BUCKET_INFO_PATH.to_string(),
            FetchOptions::get().query("id", self.id.clone()),
        )
    }

    fn merge(self, detail: BucketInfo) -> Bucket {
        let mut extra = detail.extra;
        extra.remove("localAliases");
        Bucket {
            id: self.id,
            global_aliases: Some(detail.global_aliases),
            local_aliases: self.local_aliases,
            extra,
        }
    }

    fn degrade(self) -> Bucket {
        Bucket {
            id: self.id,
            global_aliases: None,
            local_aliases: self.local_aliases,
            extra: Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_local_alias_shapes() {
        let list: Vec<BucketSummary> = serde_json::from_value(json!([
            { "id": "b1", "globalAliases": ["photos"], "localAliases": ["a"] },
            { "id": "b2", "localAliases": [{ "accessKeyId": "GK1", "alias": "mine" }] },
            { "id": "b3" }
        ]))
        .unwrap();

        assert_eq!(list[0].local_aliases, vec![LocalAlias::from("a")]);
        assert_eq!(
            list[1].local_aliases,
            vec![LocalAlias::Scoped {
                access_key_id: "GK1".into(),
                alias: "mine".into()
            }]
        );
        assert!(list[2].local_aliases.is_empty());
    }

    #[test]
    fn test_merge_overwrites_local_aliases() {
        let shallow = BucketSummary {
            id: "b1".into(),
            local_aliases: vec!["a".into()],
        };
        let detail: BucketInfo = serde_json::from_value(json!({
            "id": "b1",
            "globalAliases": ["g1"],
            "localAliases": ["stale"],
            "bytes": 1024,
            "quotas": { "maxSize": null, "maxObjects": 10 }
        }))
        .unwrap();

        let merged = shallow.merge(detail);
        assert_eq!(
            serde_json::to_value(&merged).unwrap(),
            json!({
                "id": "b1",
                "globalAliases": ["g1"],
                "localAliases": ["a"],
                "bytes": 1024,
                "quotas": { "maxSize": null, "maxObjects": 10 }
            })
        );
    }

    #[test]
    fn test_degraded_serializes_identity_only() {
        let shallow = BucketSummary {
            id: "b2".into(),
            local_aliases: vec!["b".into()],
        };
        let degraded = shallow.degrade();
        assert!(degraded.is_minimal());
        assert_eq!(
            serde_json::to_value(&degraded).unwrap(),
            json!({ "id": "b2", "localAliases": ["b"] })
        );
    }

    #[test]
    fn test_detail_request() {
        let shallow = BucketSummary {
            id: "abc".into(),
            local_aliases: vec![],
        };
        let (path, options) = shallow.detail_request();
        assert_eq!(path, BUCKET_INFO_PATH);
        assert_eq!(options.query, vec![("id".to_string(), "abc".to_string())]);
    }
}
