//! The population collaborator contract: the people, their clocks, and the attack round.
//!
//! Contact-network construction, infection progression and the realized-R0 bookkeeping all
//! live behind this trait, as does every source of randomness. A population is parameterized
//! by the society type it is reset against.

use std::collections::HashSet;

use crate::disease::StrainSet;

pub trait Person {
    fn age(&self) -> f64;

    /// Whether this person is currently removed from contact by testing/policy.
    fn is_isolating(&self) -> bool;

    /// Names of every strain this person has ever been exposed to.
    fn strain_exposures(&self) -> &HashSet<String>;
}

pub trait Population<S> {
    type Member: Person;

    fn people(&self) -> &[Self::Member];

    /// Infects `seed_size` initial members, drawing from the given strain(s).
    fn seed_infections(&mut self, seed_size: usize, strains: &StrainSet);

    /// Advances each member's internal clock by one period.
    fn update_time(&mut self);

    /// Runs one contact/attack round partitioned into clusters of `group_size`, producing new
    /// infections.
    fn attack_in_groupings(&mut self, group_size: usize);

    /// Number of people ever infected, optionally restricted to one strain.
    fn count_infected(&self, strain: Option<&str>) -> usize;

    /// Number of people currently infectious, optionally restricted to one strain.
    fn count_infectious(&self, strain: Option<&str>) -> usize;

    /// Average number of secondary infections per early primary infection in this run.
    fn realized_r0(&self) -> f64;

    /// Re-homes the members in a new society, clearing transient per-person state.
    fn reset_people(&mut self, society: &S);
}
