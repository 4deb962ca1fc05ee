//! Serde adapter for optional ISO 8601 durations such as `PT1H30M` or `P2D`.
//!
//! Use with `#[serde(default, with = "crate::serialization::iso_duration")]`.
use iso8601_duration::Duration;
use serde::{Deserialize, Deserializer, Serializer};

pub fn serialize<S: Serializer>(
    value: &Option<Duration>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(duration) => serializer.serialize_str(&duration.to_string()),
        None => serializer.serialize_none(),
    }
}

pub fn deserialize<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Duration>, D::Error> {
    Option::<String>::deserialize(deserializer)?
        .map(|value| {
            value.parse::<Duration>().map_err(|_| {
                serde::de::Error::custom(format!("invalid ISO 8601 duration {value:?}"))
            })
        })
        .transpose()
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use serde::{Deserialize, Serialize};
    use serde_json::json;
    use test_log::test;

    use super::*;

    #[derive(Debug, PartialEq, Default, Serialize, Deserialize)]
    struct Policy {
        #[serde(
            default,
            skip_serializing_if = "Option::is_none",
            with = "crate::serialization::iso_duration"
        )]
        lead_time: Option<Duration>,
    }

    #[test]
    fn test_reads_and_writes_durations() {
        let policy: Policy = serde_json::from_value(json!({"lead_time": "PT1H30M"})).unwrap();
        let lead_time = policy.lead_time.as_ref().unwrap();
        assert_eq!(lead_time.hour, 1.0);
        assert_eq!(lead_time.minute, 30.0);

        let written = serde_json::to_value(&policy).unwrap();
        let reread: Policy = serde_json::from_value(written).unwrap();
        assert_eq!(reread, policy);
    }

    #[test]
    fn test_missing_and_null_are_none() {
        let policy: Policy = serde_json::from_value(json!({"lead_time": null})).unwrap();
        assert_eq!(policy, Policy::default());
        assert_eq!(serde_json::to_value(&policy).unwrap(), json!({}));
    }

    #[test]
    fn test_rejects_other_strings() {
        let err = serde_json::from_value::<Policy>(json!({"lead_time": "90 minutes"})).unwrap_err();
        assert!(err.to_string().contains("invalid ISO 8601 duration"));
    }
}
