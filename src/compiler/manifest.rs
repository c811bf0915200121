use crate::model::PackageRef;
use itertools::Itertools;
use std::fmt;

/// A later package reference that disagreed with the one already kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageConflict {
    pub kept: PackageRef,
    pub dropped: PackageRef,
}

/// The deduplicated list of external package requirements for an assembled unit.
///
/// One entry per distinct package name, in first-seen order. The first-seen version and
/// specifier win; disagreeing later references are kept in `conflicts` so callers can
/// surface them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequirementsManifest {
    pub requirements: Vec<PackageRef>,
    pub conflicts: Vec<PackageConflict>,
}

impl RequirementsManifest {
    pub fn from_packages<'a>(packages: impl IntoIterator<Item = &'a PackageRef>) -> Self {
        let packages: Vec<&PackageRef> = packages.into_iter().collect();
        let requirements: Vec<PackageRef> = packages
            .iter()
            .unique_by(|p| p.package_name.clone())
            .map(|p| (*p).clone())
            .collect();

        let conflicts = packages
            .iter()
            .filter_map(|candidate| {
                let kept = requirements
                    .iter()
                    .find(|r| r.package_name == candidate.package_name)?;
                let differs =
                    kept.version != candidate.version || kept.specifier != candidate.specifier;
                differs.then(|| PackageConflict {
                    kept: kept.clone(),
                    dropped: (*candidate).clone(),
                })
            })
            .collect();

        Self {
            requirements,
            conflicts,
        }
    }

    pub fn lines(&self) -> Vec<String> {
        self.requirements
            .iter()
            .map(PackageRef::requirement_line)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }
}

impl fmt::Display for RequirementsManifest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.lines().join("\n"))
    }
}
