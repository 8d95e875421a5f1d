use std::collections::HashMap;

/// A list or panel whose content is fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Periods,
    Students,
    Availabilities,
    Trainings,
    StudentDetail,
    AvailabilityDetail,
    Contacts,
    /// Create/delete requests. Always applied once the server answered.
    Mutation,
}

impl Scope {
    /// Everything that depends on the section
    pub const SECTION_DEPENDENTS: &'static [Scope] = &[
        Scope::Periods,
        Scope::Students,
        Scope::Availabilities,
        Scope::Trainings,
        Scope::StudentDetail,
        Scope::AvailabilityDetail,
        Scope::Contacts,
    ];

    /// Everything that depends on the period
    pub const PERIOD_DEPENDENTS: &'static [Scope] = &[
        Scope::Students,
        Scope::Availabilities,
        Scope::Trainings,
        Scope::StudentDetail,
        Scope::AvailabilityDetail,
        Scope::Contacts,
    ];

    /// Student list and the panel built on its selection
    pub const STUDENT_LIST: &'static [Scope] = &[Scope::Students, Scope::StudentDetail];

    /// Availability list and what hangs off its selection
    pub const AVAILABILITY_LIST: &'static [Scope] = &[
        Scope::Availabilities,
        Scope::AvailabilityDetail,
        Scope::Contacts,
    ];
}

/// Stamp given to a fetch when it is issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub scope: Scope,
    pub epoch: u64,
    /// Id of the selection the fetch was issued for, for logging
    pub key: Option<i64>,
}

/// Per-scope invalidation counters.
///
/// Bumping a scope makes every ticket issued before for it stale, even if
/// the same id gets selected again afterwards.
#[derive(Debug, Default)]
pub struct Epochs {
    counters: HashMap<Scope, u64>,
    period_generation: u64,
}

impl Epochs {
    pub fn issue(&self, scope: Scope, key: Option<i64>) -> Ticket {
        Ticket {
            scope,
            epoch: self.epoch(scope),
            key,
        }
    }

    pub fn epoch(&self, scope: Scope) -> u64 {
        self.counters.get(&scope).copied().unwrap_or(0)
    }

    pub fn invalidate(&mut self, scopes: &[Scope]) {
        for scope in scopes {
            *self.counters.entry(*scope).or_insert(0) += 1;
        }
        if scopes.contains(&Scope::Students) && scopes.contains(&Scope::Availabilities) {
            self.period_generation += 1;
        }
    }

    pub fn is_current(&self, ticket: &Ticket) -> bool {
        ticket.scope == Scope::Mutation || ticket.epoch == self.epoch(ticket.scope)
    }

    /// Changes each time the period's lists are replaced as a whole
    pub fn period_generation(&self) -> u64 {
        self.period_generation
    }
}
