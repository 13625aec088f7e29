//! Sweep point generation

use std::fmt;

use crate::config::EvalConfig;
use crate::signal::SampleRate;

/// One combination of converter parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepPoint {
    pub fdev: f64,
    pub op_rate: SampleRate,
    pub ip_rate: SampleRate,
}

impl SweepPoint {
    /// File-name fragment identifying this point
    pub fn tag(&self) -> String {
        format!("{}_{}_{:.6}", self.ip_rate, self.op_rate, self.fdev)
    }
}

impl fmt::Display for SweepPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ip={}Hz op={}Hz fdev={:.6}",
            self.ip_rate, self.op_rate, self.fdev
        )
    }
}

/// The full cross product of deviations and rate pairs
#[derive(Debug, Clone, PartialEq)]
pub struct SweepPlan {
    fdevs: Vec<f64>,
    rates: Vec<SampleRate>,
}

impl SweepPlan {
    pub fn new(fdevs: Vec<f64>, rates: Vec<SampleRate>) -> Self {
        Self { fdevs, rates }
    }

    pub fn from_config(config: &EvalConfig) -> Self {
        Self::new(config.fdevs.clone(), config.rates.clone())
    }

    /// Total number of points
    pub fn len(&self) -> usize {
        self.fdevs.len() * self.rates.len() * self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate the points lazily, fdev outermost and input rate innermost
    pub fn points(&self) -> SweepPoints<'_> {
        SweepPoints {
            plan: self,
            next: 0,
        }
    }
}

impl<'a> IntoIterator for &'a SweepPlan {
    type Item = SweepPoint;
    type IntoIter = SweepPoints<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.points()
    }
}

/// Lazy iterator over a [`SweepPlan`]
#[derive(Debug, Clone)]
pub struct SweepPoints<'a> {
    plan: &'a SweepPlan,
    next: usize,
}

impl Iterator for SweepPoints<'_> {
    type Item = SweepPoint;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.plan.len() {
            return None;
        }

        let rates = self.plan.rates.len();
        let index = self.next;
        self.next += 1;

        Some(SweepPoint {
            fdev: self.plan.fdevs[index / (rates * rates)],
            op_rate: self.plan.rates[(index / rates) % rates],
            ip_rate: self.plan.rates[index % rates],
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.plan.len().saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for SweepPoints<'_> {}
