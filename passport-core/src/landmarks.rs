//! Landmark groups and their fixed schema.
//!
//! A [`LandmarkSet`] is whatever the landmark extractor returned for one face: a map from
//! group name to an ordered list of points. The verifiers index into these lists by
//! position, so every group they read must have exactly the cardinality listed in
//! [`LandmarkGroup::required_points`]. Anything else means the extractor and the
//! verifiers disagree on the schema, which is reported as a [`SchemaError`] and never
//! treated as an ordinary rejection.

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::Point;

/// Named landmark groups read by the verifier bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LandmarkGroup {
    NoseBridge,
    LeftEyebrow,
    RightEyebrow,
    TopLip,
    BottomLip,
    Chin,
    LeftEye,
    RightEye,
}

impl LandmarkGroup {
    pub const ALL: [LandmarkGroup; 8] = [
        LandmarkGroup::NoseBridge,
        LandmarkGroup::LeftEyebrow,
        LandmarkGroup::RightEyebrow,
        LandmarkGroup::TopLip,
        LandmarkGroup::BottomLip,
        LandmarkGroup::Chin,
        LandmarkGroup::LeftEye,
        LandmarkGroup::RightEye,
    ];

    /// Key used by landmark extractors for this group.
    pub fn name(self) -> &'static str {
        match self {
            LandmarkGroup::NoseBridge => "nose_bridge",
            LandmarkGroup::LeftEyebrow => "left_eyebrow",
            LandmarkGroup::RightEyebrow => "right_eyebrow",
            LandmarkGroup::TopLip => "top_lip",
            LandmarkGroup::BottomLip => "bottom_lip",
            LandmarkGroup::Chin => "chin",
            LandmarkGroup::LeftEye => "left_eye",
            LandmarkGroup::RightEye => "right_eye",
        }
    }

    pub fn required_points(self) -> usize {
        match self {
            LandmarkGroup::NoseBridge => 4,
            LandmarkGroup::LeftEyebrow | LandmarkGroup::RightEyebrow => 5,
            LandmarkGroup::TopLip | LandmarkGroup::BottomLip => 12,
            LandmarkGroup::Chin => 17,
            LandmarkGroup::LeftEye | LandmarkGroup::RightEye => 6,
        }
    }
}

impl fmt::Display for LandmarkGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Landmark output that does not match the fixed group schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("landmark group '{0}' is missing")]
    MissingGroup(LandmarkGroup),

    #[error("landmark group '{group}' has {found} point(s), expected {expected}")]
    Cardinality {
        group: LandmarkGroup,
        expected: usize,
        found: usize,
    },
}

/// Landmarks of a single detected face, keyed by group name.
///
/// Groups the verifiers do not use (for example `nose_tip`) are kept but ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LandmarkSet {
    groups: BTreeMap<String, Vec<Point>>,
}

impl LandmarkSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the points of `group`.
    pub fn insert(&mut self, group: LandmarkGroup, points: Vec<Point>) -> Option<Vec<Point>> {
        self.groups.insert(group.name().to_string(), points)
    }

    /// Insert a group by its raw name, including groups outside [`LandmarkGroup`].
    pub fn insert_named(&mut self, name: impl Into<String>, points: Vec<Point>) {
        self.groups.insert(name.into(), points);
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, group: LandmarkGroup, points: Vec<Point>) -> Self {
        self.insert(group, points);
        self
    }

    /// Points of `group` without any cardinality check.
    pub fn raw(&self, group: LandmarkGroup) -> Option<&[Point]> {
        self.groups.get(group.name()).map(Vec::as_slice)
    }

    /// Points of `group`, guaranteed to have the required cardinality.
    pub fn group(&self, group: LandmarkGroup) -> Result<&[Point], SchemaError> {
        let points = self.raw(group).ok_or(SchemaError::MissingGroup(group))?;
        let expected = group.required_points();
        if points.len() != expected {
            return Err(SchemaError::Cardinality {
                group,
                expected,
                found: points.len(),
            });
        }
        Ok(points)
    }

    /// Check every group in `groups` against the schema.
    pub fn validate_groups(&self, groups: &[LandmarkGroup]) -> Result<(), SchemaError> {
        groups.iter().try_for_each(|&g| self.group(g).map(|_| ()))
    }

    /// Check all required groups against the schema.
    pub fn validate(&self) -> Result<(), SchemaError> {
        self.validate_groups(&LandmarkGroup::ALL)
    }

    /// Iterate over every stored group, known or not.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Point])> {
        self.groups
            .iter()
            .map(|(name, points)| (name.as_str(), points.as_slice()))
    }
}
