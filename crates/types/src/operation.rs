//! Operation batches and the ordered plan they come from

use rootstrap_errors::{Error, PlanError};
use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// The kind of package operation a batch performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationMode {
    Install,
    LocalInstall,
    Remove,
    TryInstall,
    TryRemove,
}

impl OperationMode {
    /// Canonical name as it appears in operation plans
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Install => "install",
            Self::LocalInstall => "localinstall",
            Self::Remove => "remove",
            Self::TryInstall => "try_install",
            Self::TryRemove => "try_remove",
        }
    }

    /// Whether this mode removes packages from the target
    #[must_use]
    pub fn is_removal(self) -> bool {
        matches!(self, Self::Remove | Self::TryRemove)
    }

    /// Whether a failing batch of this mode may be tolerated
    #[must_use]
    pub fn is_tolerant(self) -> bool {
        matches!(self, Self::TryInstall | Self::TryRemove)
    }
}

impl fmt::Display for OperationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationMode {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "install" => Ok(Self::Install),
            "localinstall" | "local-install" | "local_install" => Ok(Self::LocalInstall),
            "remove" => Ok(Self::Remove),
            "try_install" | "try-install" => Ok(Self::TryInstall),
            "try_remove" | "try-remove" => Ok(Self::TryRemove),
            other => Err(PlanError::UnknownMode {
                mode: other.to_string(),
            }),
        }
    }
}

impl Serialize for OperationMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for OperationMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// One package entry inside a mode's list; extra fields are ignored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRecord {
    pub package: String,
}

impl PackageRecord {
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
        }
    }
}

/// A single batch: one mode and the packages it applies to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Operation {
    pub mode: OperationMode,
    pub packages: Vec<String>,
}

impl Operation {
    pub fn new<I, S>(mode: OperationMode, packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            mode,
            packages: packages.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

/// Ordered list of operations built from a mode-name to records mapping.
///
/// Order follows the source document. Both a single JSON object
/// (`{"install": [...], "remove": [...]}`) and a list of such objects are
/// accepted; in the list form a mode may repeat.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct OperationPlan {
    operations: Vec<Operation>,
}

impl OperationPlan {
    #[must_use]
    pub fn new(operations: Vec<Operation>) -> Self {
        Self { operations }
    }

    /// Parse a plan from JSON text
    ///
    /// # Errors
    ///
    /// Returns a `PlanError` if the text is not a valid plan document.
    pub fn from_json(text: &str) -> Result<Self, Error> {
        serde_json::from_str(text).map_err(|e| {
            PlanError::Malformed {
                message: e.to_string(),
            }
            .into()
        })
    }

    /// Read and parse a plan file
    ///
    /// # Errors
    ///
    /// Returns `PlanError::NotFound` for a missing file, an I/O error
    /// carrying the path for any other read failure, or a `PlanError` if
    /// the contents are not a valid plan.
    pub async fn load(path: &Path) -> Result<Self, Error> {
        let text = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::from(PlanError::NotFound {
                    path: path.display().to_string(),
                })
            } else {
                Error::io_with_path(&e, path)
            }
        })?;
        Self::from_json(&text)
    }

    #[must_use]
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Operation> {
        self.operations.iter()
    }
}

impl<'a> IntoIterator for &'a OperationPlan {
    type Item = &'a Operation;
    type IntoIter = std::slice::Iter<'a, Operation>;

    fn into_iter(self) -> Self::IntoIter {
        self.operations.iter()
    }
}

struct PlanVisitor;

impl PlanVisitor {
    fn read_map<'de, A: MapAccess<'de>>(
        mut map: A,
        operations: &mut Vec<Operation>,
    ) -> Result<(), A::Error> {
        while let Some(mode) = map.next_key::<OperationMode>()? {
            let records: Vec<PackageRecord> = map.next_value()?;
            operations.push(Operation::new(
                mode,
                records.into_iter().map(|record| record.package),
            ));
        }
        Ok(())
    }
}

impl<'de> Visitor<'de> for PlanVisitor {
    type Value = OperationPlan;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map from operation mode to package records")
    }

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Self::Value, A::Error> {
        let mut operations = Vec::new();
        Self::read_map(map, &mut operations)?;
        Ok(OperationPlan { operations })
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut operations = Vec::new();
        while let Some(chunk) = seq.next_element::<OperationPlan>()? {
            operations.extend(chunk.operations);
        }
        Ok(OperationPlan { operations })
    }
}

impl<'de> Deserialize<'de> for OperationPlan {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(PlanVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_keeps_document_order() {
        let plan = OperationPlan::from_json(
            r#"{
                "try_remove": [{"package": "old"}],
                "install": [{"package": "pkg-a"}, {"package": "pkg-b", "source": "repo"}],
                "localinstall": []
            }"#,
        )
        .unwrap();

        let modes: Vec<_> = plan.iter().map(|op| op.mode).collect();
        assert_eq!(
            modes,
            vec![
                OperationMode::TryRemove,
                OperationMode::Install,
                OperationMode::LocalInstall
            ]
        );
        assert_eq!(plan.operations()[1].packages, vec!["pkg-a", "pkg-b"]);
        assert!(plan.operations()[2].is_empty());
    }

    #[test]
    fn plan_accepts_list_of_maps() {
        let plan = OperationPlan::from_json(
            r#"[{"install": [{"package": "a"}]}, {"remove": [{"package": "b"}]}, {"install": [{"package": "c"}]}]"#,
        )
        .unwrap();
        assert_eq!(plan.len(), 3);
        assert_eq!(plan.operations()[2].packages, vec!["c"]);
    }

    #[test]
    fn unknown_mode_is_rejected() {
        let err = OperationPlan::from_json(r#"{"upgrade": []}"#).unwrap_err();
        assert!(err.to_string().contains("unknown operation mode"));
    }

    #[test]
    fn record_without_package_is_rejected() {
        assert!(OperationPlan::from_json(r#"{"install": [{"name": "a"}]}"#).is_err());
    }

    #[test]
    fn mode_aliases() {
        assert_eq!(
            "local-install".parse::<OperationMode>().unwrap(),
            OperationMode::LocalInstall
        );
        assert_eq!(
            "try-remove".parse::<OperationMode>().unwrap(),
            OperationMode::TryRemove
        );
        assert!(OperationMode::TryInstall.is_tolerant());
        assert!(!OperationMode::Remove.is_tolerant());
        assert!(OperationMode::Remove.is_removal());
    }
}
