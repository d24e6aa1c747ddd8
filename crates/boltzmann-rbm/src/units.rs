use std::ops::Range;

use boltzmann_core::{Float, Matrix};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{RbmError, RbmResult};

/// Kind of a visible unit group. Determines both the mean-field activation
/// and the sampling rule; both are dispatched from this enum only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VisibleUnitType {
    /// Bernoulli units with a logistic activation.
    Binary,
    /// One-of-K units; exactly one unit per sample is active.
    Softmax,
    /// Unit-variance Gaussian units; the linear input is the mean.
    Gaussian,
}

impl VisibleUnitType {
    /// Turn the linear inputs in `rows` of `state` into conditional means.
    pub(crate) fn activate<T: Float>(self, state: &mut Matrix<T>, rows: Range<usize>) {
        match self {
            VisibleUnitType::Binary => {
                for i in rows {
                    state.row_mut(i).iter_mut().for_each(|x| *x = x.sigmoid());
                }
            }
            VisibleUnitType::Softmax => {
                // log-domain normalisation after subtracting the column max
                for j in 0..state.cols() {
                    let max = rows
                        .clone()
                        .map(|i| state[(i, j)])
                        .fold(state[(rows.start, j)], |m, x| m.max(x));
                    let sum: T = rows.clone().map(|i| (state[(i, j)] - max).exp()).sum();
                    let normalizer = sum.ln();
                    for i in rows.clone() {
                        state[(i, j)] = (state[(i, j)] - max - normalizer).exp();
                    }
                }
            }
            VisibleUnitType::Gaussian => {}
        }
    }

    /// Replace the means in `rows` of `state` with a sample drawn from them.
    ///
    /// Gaussian groups keep their mean.
    pub(crate) fn sample<T: Float, R: Rng + ?Sized>(
        self,
        state: &mut Matrix<T>,
        rows: Range<usize>,
        rng: &mut R,
    ) {
        match self {
            VisibleUnitType::Binary => {
                for i in rows {
                    bernoulli_in_place(state.row_mut(i), rng);
                }
            }
            VisibleUnitType::Softmax => {
                for j in 0..state.cols() {
                    let r = T::from_f64(rng.gen::<f64>());
                    let mut chosen = rows.end - 1;
                    let mut cumulative = T::ZERO;
                    for i in rows.clone() {
                        cumulative += state[(i, j)];
                        if r <= cumulative {
                            chosen = i;
                            break;
                        }
                    }
                    for i in rows.clone() {
                        state[(i, j)] = if i == chosen { T::ONE } else { T::ZERO };
                    }
                }
            }
            VisibleUnitType::Gaussian => {}
        }
    }
}

/// Draw a 0/1 sample from each probability in `values`, in place.
pub(crate) fn bernoulli_in_place<T: Float, R: Rng + ?Sized>(values: &mut [T], rng: &mut R) {
    for x in values.iter_mut() {
        *x = if T::from_f64(rng.gen::<f64>()) < *x { T::ONE } else { T::ZERO };
    }
}

/// A contiguous block of visible units sharing one unit type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibleGroup {
    pub size: usize,
    pub unit_type: VisibleUnitType,
    /// Index of the group's first row in the visible state.
    pub offset: usize,
}

impl VisibleGroup {
    /// Rows of the visible state covered by this group.
    pub fn rows(&self) -> Range<usize> {
        self.offset..self.offset + self.size
    }
}

/// Append-only registry of visible unit groups.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VisibleGroups {
    groups: Vec<VisibleGroup>,
    num_visible: usize,
}

impl VisibleGroups {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a group; its offset is the running sum of the previous sizes.
    pub fn add(&mut self, size: usize, unit_type: VisibleUnitType) -> RbmResult<&VisibleGroup> {
        if size == 0 {
            return Err(RbmError::InvalidConfig(
                "visible groups must contain at least one unit".into(),
            ));
        }
        let offset = self.groups.last().map(|g| g.offset + g.size).unwrap_or(0);
        self.groups.push(VisibleGroup { size, unit_type, offset });
        self.num_visible += size;
        Ok(&self.groups[self.groups.len() - 1])
    }

    pub fn get(&self, index: usize) -> RbmResult<&VisibleGroup> {
        self.groups.get(index).ok_or(RbmError::GroupIndex {
            index,
            count: self.groups.len(),
        })
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn num_visible(&self) -> usize {
        self.num_visible
    }

    pub fn iter(&self) -> impl Iterator<Item = &VisibleGroup> {
        self.groups.iter()
    }

    /// Fail unless every group is [`VisibleUnitType::Binary`].
    pub fn require_binary(&self, operation: &'static str) -> RbmResult<()> {
        match self
            .groups
            .iter()
            .enumerate()
            .find(|(_, g)| g.unit_type != VisibleUnitType::Binary)
        {
            Some((group, g)) => Err(RbmError::UnsupportedUnitType {
                operation,
                group,
                unit_type: g.unit_type,
            }),
            None => Ok(()),
        }
    }

    /// Apply each group's activation to the linear visible inputs.
    pub(crate) fn activate<T: Float>(&self, state: &mut Matrix<T>) {
        for g in &self.groups {
            g.unit_type.activate(state, g.rows());
        }
    }
}
