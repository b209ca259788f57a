//! Layout engine: level rows, slot positions and parent→child connectors.
//!
//! Everything here is derived from a [`TreeStore`] on demand and never stored.
//! Coordinates are abstract: `x` is a fraction of the row width in `0..1`,
//! `y` is the level number, so row `n` sits at `y = n`.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::entities::{Level, MemberId};
use crate::domain::error::ValidationError;
use crate::domain::model::ModelPolicy;
use crate::domain::store::TreeStore;

/// The card grid never has fewer columns than this.
pub const MIN_GRID_COLUMNS: usize = 3;

/// How connector paths are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConnectorStyle {
    /// Drop from the parent, bend at the midpoint between rows, drop to the child.
    /// Slots are spread over the actual bucket size.
    #[default]
    Elbow,
    /// Straight line between the two cards on a grid of at least
    /// [`MIN_GRID_COLUMNS`] columns.
    Diagonal,
}

impl ConnectorStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            ConnectorStyle::Elbow => "elbow",
            ConnectorStyle::Diagonal => "diagonal",
        }
    }

    fn columns(self, bucket_size: usize) -> usize {
        match self {
            ConnectorStyle::Elbow => bucket_size.max(1),
            ConnectorStyle::Diagonal => bucket_size.max(MIN_GRID_COLUMNS),
        }
    }

    fn path(self, from: Point, to: Point) -> Vec<Point> {
        match self {
            ConnectorStyle::Diagonal => vec![from, to],
            ConnectorStyle::Elbow => {
                let mid = (from.y + to.y) / 2.0;
                vec![
                    from,
                    Point { x: from.x, y: mid },
                    Point { x: to.x, y: mid },
                    to,
                ]
            }
        }
    }
}

impl fmt::Display for ConnectorStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConnectorStyle {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "elbow" => Ok(ConnectorStyle::Elbow),
            "diagonal" | "straight" => Ok(ConnectorStyle::Diagonal),
            _ => Err(ValidationError::UnknownConnectorStyle(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// A member's position within its row.
#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    pub member: MemberId,
    /// Position in insertion order within the level.
    pub index: usize,
    pub x: f64,
}

/// One occupied level.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub level: Level,
    pub label: String,
    pub slots: Vec<Slot>,
}

/// Line from one parent card to one child card.
#[derive(Debug, Clone, PartialEq)]
pub struct Connector {
    pub parent: MemberId,
    pub child: MemberId,
    pub child_level: Level,
    /// Two points for diagonal connectors, four for elbows.
    pub points: Vec<Point>,
}

impl Connector {
    pub fn start(&self) -> Option<Point> {
        self.points.first().copied()
    }

    pub fn end(&self) -> Option<Point> {
        self.points.last().copied()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    style: ConnectorStyle,
    rows: Vec<Row>,
    connectors: Vec<Connector>,
}

impl Layout {
    /// Lay out `store` row by row and derive one connector per parent reference.
    ///
    /// Empty levels get no row. Parent references that do not resolve get no
    /// connector.
    pub fn compute(store: &TreeStore, policy: &ModelPolicy, style: ConnectorStyle) -> Self {
        let buckets = store.iter().into_group_map_by(|m| m.level);
        let mut positions: HashMap<MemberId, Point> = HashMap::with_capacity(store.len());
        let mut rows = Vec::with_capacity(buckets.len());

        for level in buckets.keys().copied().sorted() {
            let members = &buckets[&level];
            let columns = style.columns(members.len()) as f64;
            let slots = members
                .iter()
                .enumerate()
                .map(|(index, member)| {
                    let x = (index as f64 + 0.5) / columns;
                    positions.insert(
                        member.id,
                        Point {
                            x,
                            y: f64::from(level),
                        },
                    );
                    Slot {
                        member: member.id,
                        index,
                        x,
                    }
                })
                .collect();
            rows.push(Row {
                level,
                label: policy.level_label(level),
                slots,
            });
        }

        let mut connectors = Vec::new();
        for child in store.iter() {
            let Some(&to) = positions.get(&child.id) else {
                continue;
            };
            for parent in &child.parent_ids {
                match positions.get(parent) {
                    Some(&from) => connectors.push(Connector {
                        parent: *parent,
                        child: child.id,
                        child_level: child.level,
                        points: style.path(from, to),
                    }),
                    None => debug!("layout: skipping missing parent {} of {}", parent, child.id),
                }
            }
        }

        Self {
            style,
            rows,
            connectors,
        }
    }

    pub fn style(&self) -> ConnectorStyle {
        self.style
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, level: Level) -> Option<&Row> {
        self.rows.iter().find(|r| r.level == level)
    }

    /// Occupied levels, ascending.
    pub fn levels(&self) -> Vec<Level> {
        self.rows.iter().map(|r| r.level).collect()
    }

    pub fn connectors(&self) -> &[Connector] {
        &self.connectors
    }

    /// Connectors drawn into `level`, i.e. ending at a child on that level.
    pub fn connectors_for_level(&self, level: Level) -> impl Iterator<Item = &Connector> {
        self.connectors
            .iter()
            .filter(move |c| c.child_level == level)
    }

    pub fn slot_of(&self, member: MemberId) -> Option<(Level, &Slot)> {
        self.rows.iter().find_map(|row| {
            row.slots
                .iter()
                .find(|s| s.member == member)
                .map(|slot| (row.level, slot))
        })
    }
}
