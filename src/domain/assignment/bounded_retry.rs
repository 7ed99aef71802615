//! Randomized assignment with a fixed attempt budget.

use rand::seq::SliceRandom;
use rand::RngCore;
use std::collections::HashSet;

use super::matching::diagnose;
use super::{build_assignment, screen, Assignment, AssignmentStrategy, Candidate, Infeasible};
use crate::domain::foundation::RoleId;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 100;
pub const DEFAULT_POOL_REDRAW_INTERVAL: u32 = 10;

/// Samples a pool of `|candidates|` roles, then walks the candidates in a
/// shuffled order handing each a random unused pool role it permits.
///
/// A walk that strands a candidate counts as one failed attempt. The pool
/// is re-sampled after every `pool_redraw_interval` failures. This can give
/// up on inputs that do have a solution; the reported reason then says
/// `AttemptsExhausted`.
#[derive(Debug, Clone, Copy)]
pub struct BoundedRetryAssigner {
    max_attempts: u32,
    pool_redraw_interval: u32,
}

impl Default for BoundedRetryAssigner {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            pool_redraw_interval: DEFAULT_POOL_REDRAW_INTERVAL,
        }
    }
}

impl BoundedRetryAssigner {
    /// Both values are clamped to at least 1.
    pub fn new(max_attempts: u32, pool_redraw_interval: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            pool_redraw_interval: pool_redraw_interval.max(1),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn pool_redraw_interval(&self) -> u32 {
        self.pool_redraw_interval
    }

    /// One pass over `order`; returns the chosen role per candidate index.
    fn walk<'r>(
        candidates: &[Candidate],
        order: &[usize],
        pool: &[&'r RoleId],
        rng: &mut dyn RngCore,
    ) -> Option<Vec<&'r RoleId>> {
        let mut used: HashSet<&RoleId> = HashSet::with_capacity(pool.len());
        let mut chosen: Vec<Option<&'r RoleId>> = vec![None; candidates.len()];

        for &idx in order {
            let options: Vec<&'r RoleId> = pool
                .iter()
                .copied()
                .filter(|role| !used.contains(role) && candidates[idx].permits(role))
                .collect();
            let role = *options.choose(&mut *rng)?;
            used.insert(role);
            chosen[idx] = Some(role);
        }
        chosen.into_iter().collect()
    }
}

impl AssignmentStrategy for BoundedRetryAssigner {
    fn assign(
        &self,
        candidates: &[Candidate],
        catalog: &[RoleId],
        rng: &mut dyn RngCore,
    ) -> Result<Assignment, Infeasible> {
        screen(candidates, catalog)?;

        let mut distinct: Vec<&RoleId> = Vec::with_capacity(catalog.len());
        for role in catalog {
            if !distinct.contains(&role) {
                distinct.push(role);
            }
        }
        let mut pool = sample_pool(&distinct, candidates.len(), &mut *rng);
        let mut order: Vec<usize> = (0..candidates.len()).collect();
        order.sort_by_key(|&idx| candidates[idx].permitted().len());

        for attempt in 1..=self.max_attempts {
            let mut walk_order = order.clone();
            walk_order.shuffle(&mut *rng);

            if let Some(chosen) = Self::walk(candidates, &walk_order, &pool, &mut *rng) {
                return build_assignment(candidates, &chosen, attempt);
            }
            if attempt % self.pool_redraw_interval == 0 {
                pool = sample_pool(&distinct, candidates.len(), &mut *rng);
            }
        }

        let reason = diagnose(candidates, catalog, self.max_attempts);
        tracing::debug!(
            attempts = self.max_attempts,
            reason = %reason,
            "bounded retry gave up"
        );
        Err(Infeasible::after(reason, self.max_attempts))
    }

    fn name(&self) -> &'static str {
        "bounded_retry"
    }
}

/// Uniform sample of `size` roles without replacement.
fn sample_pool<'r>(roles: &[&'r RoleId], size: usize, rng: &mut dyn RngCore) -> Vec<&'r RoleId> {
    roles.choose_multiple(rng, size).copied().collect()
}
