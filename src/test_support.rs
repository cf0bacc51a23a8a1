//! Deterministic collaborator doubles shared by the unit tests.
//!
//! The stub society isolates every infectious member it sees, and the stub population never
//! attacks from isolation; both journal their calls into a shared log so tests can assert the
//! engine's per-period ordering.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::config::Config;
use crate::disease::StrainSet;
use crate::population::{Person, Population};
use crate::society::{Society, Test, TestQueue};

pub type Journal = Rc<RefCell<Vec<String>>>;

pub struct StubQueue {
    pub completed: Vec<Test>,
    pub pending: Vec<Test>,
}

impl TestQueue for StubQueue {
    fn completed_tests(&self) -> &[Test] {
        &self.completed
    }

    fn pending_tests(&self) -> &[Test] {
        &self.pending
    }
}

pub struct StubSociety {
    pub queues: Vec<StubQueue>,
    pub encounter_size: usize,
    pub episodes_per_day: u32,
    pub config: Config,
    pub journal: Journal,
}

impl StubSociety {
    pub fn new(episodes_per_day: u32) -> (StubSociety, Journal) {
        let journal: Journal = Rc::new(RefCell::new(Vec::new()));
        let society = StubSociety {
            queues: vec![StubQueue {
                completed: Vec::new(),
                pending: Vec::new(),
            }],
            encounter_size: 3,
            episodes_per_day,
            config: Config::default(),
            journal: journal.clone(),
        };
        (society, journal)
    }

    /// Puts one completed test and two pending tests (one swabbed) on the first queue.
    pub fn stock_queues(&mut self) {
        self.queues[0].completed = vec![Test {
            swab_taken: true,
            positive: false,
        }];
        self.queues[0].pending = vec![
            Test {
                swab_taken: true,
                positive: false,
            },
            Test {
                swab_taken: false,
                positive: false,
            },
        ];
    }
}

impl Society<StubPopulation> for StubSociety {
    type Queue = StubQueue;

    fn clear_queues(&mut self) {
        self.journal.borrow_mut().push("clear_queues".to_string());
        for queue in &mut self.queues {
            queue.completed.clear();
            queue.pending.clear();
        }
    }

    fn manage_outbreak(&mut self, population: &mut StubPopulation) {
        self.journal.borrow_mut().push("manage_outbreak".to_string());
        // Perfect contact tracing: everybody infectious isolates at once.
        for member in &mut population.members {
            if member.infectious {
                member.isolating = true;
            }
        }
    }

    fn encounter_size(&self) -> usize {
        self.encounter_size
    }

    fn episodes_per_day(&self) -> u32 {
        self.episodes_per_day
    }

    fn queues(&self) -> &[StubQueue] {
        &self.queues
    }

    fn config(&self) -> &Config {
        &self.config
    }
}

pub struct StubPerson {
    pub age: f64,
    pub isolating: bool,
    pub infected: bool,
    pub infectious: bool,
    pub exposures: HashSet<String>,
}

impl Person for StubPerson {
    fn age(&self) -> f64 {
        self.age
    }

    fn is_isolating(&self) -> bool {
        self.isolating
    }

    fn strain_exposures(&self) -> &HashSet<String> {
        &self.exposures
    }
}

pub struct StubPopulation {
    pub members: Vec<StubPerson>,
    pub clock: u32,
    pub rng: SmallRng,
    pub journal: Journal,
    pub reset_count: u32,
    pub secondary_per_primary: f64,
}

impl StubPopulation {
    pub fn with_members(n: usize, seed: u64) -> StubPopulation {
        Self::with_members_and_journal(n, seed, Rc::new(RefCell::new(Vec::new())))
    }

    pub fn with_members_and_journal(n: usize, seed: u64, journal: Journal) -> StubPopulation {
        let members = (0..n)
            .map(|i| StubPerson {
                age: 20.0 + ((i * 7) % 70) as f64,
                isolating: false,
                infected: false,
                infectious: false,
                exposures: HashSet::new(),
            })
            .collect();
        StubPopulation {
            members,
            clock: 0,
            rng: SmallRng::seed_from_u64(seed),
            journal,
            reset_count: 0,
            secondary_per_primary: 1.5,
        }
    }

    /// A population factory sharing the society's journal, for `Outbreak::build`.
    pub fn factory(seed: u64) -> impl FnOnce(usize, &StubSociety) -> StubPopulation {
        move |pop_size, society| {
            Self::with_members_and_journal(pop_size, seed, society.journal.clone())
        }
    }

    /// Marks the first `n` members infected and infectious with the named strain.
    pub fn infect_first(&mut self, n: usize, strain: &str) {
        for member in self.members.iter_mut().take(n) {
            member.infected = true;
            member.infectious = true;
            member.exposures.insert(strain.to_string());
        }
    }
}

impl Population<StubSociety> for StubPopulation {
    type Member = StubPerson;

    fn people(&self) -> &[StubPerson] {
        &self.members
    }

    fn seed_infections(&mut self, seed_size: usize, strains: &StrainSet) {
        self.journal
            .borrow_mut()
            .push(format!("seed:{seed_size}"));
        let strains = strains.as_slice();
        for (i, member) in self.members.iter_mut().enumerate().take(seed_size) {
            member.infected = true;
            member.infectious = true;
            if !strains.is_empty() {
                member
                    .exposures
                    .insert(strains[i % strains.len()].name().to_string());
            }
        }
    }

    fn update_time(&mut self) {
        self.journal.borrow_mut().push("update_time".to_string());
        self.clock += 1;
    }

    fn attack_in_groupings(&mut self, group_size: usize) {
        self.journal
            .borrow_mut()
            .push("attack_in_groupings".to_string());
        let attacking_strains: Vec<String> = self
            .members
            .iter()
            .filter(|m| m.infectious && !m.isolating)
            .flat_map(|m| m.exposures.iter().cloned())
            .collect();
        if attacking_strains.is_empty() || self.members.is_empty() {
            return;
        }
        // One crude transmission attempt per cluster.
        let n_clusters = self.members.len().div_ceil(group_size.max(1));
        for _ in 0..n_clusters {
            let target = self.rng.random_range(0..self.members.len());
            let member = &mut self.members[target];
            if !member.infected && !member.isolating && self.rng.random::<f64>() < 0.5 {
                member.infected = true;
                member.infectious = true;
                member.exposures.insert(attacking_strains[0].clone());
            }
        }
    }

    fn count_infected(&self, strain: Option<&str>) -> usize {
        self.members
            .iter()
            .filter(|m| m.infected && strain.is_none_or(|name| m.exposures.contains(name)))
            .count()
    }

    fn count_infectious(&self, strain: Option<&str>) -> usize {
        self.members
            .iter()
            .filter(|m| m.infectious && strain.is_none_or(|name| m.exposures.contains(name)))
            .count()
    }

    fn realized_r0(&self) -> f64 {
        self.secondary_per_primary
    }

    fn reset_people(&mut self, _society: &StubSociety) {
        self.journal.borrow_mut().push("reset_people".to_string());
        self.reset_count += 1;
        for member in &mut self.members {
            member.isolating = false;
        }
    }
}
