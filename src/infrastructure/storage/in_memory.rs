//! In-memory storage implementation
//!
//! A single lock-protected state shared by the in-memory repositories. A
//! membership transaction holds the lock for its whole lifetime and works on a
//! private copy, so uncommitted writes are never observed and a dropped
//! transaction leaves the store untouched.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, MutexGuard, OwnedMutexGuard};

use crate::domain::company::{Company, CompanyId};
use crate::domain::survey::{
    default_options, default_questions, Answer, AnswerId, Survey, SurveyId, SurveyOption,
    SurveyQuestion,
};
use crate::domain::team::{MembershipTransaction, Team, TeamId};
use crate::domain::user::{NewUser, User, UserId};
use crate::domain::DomainError;

/// Failures injected into the store by tests
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct Faults {
    /// Every email lookup fails with a storage error
    pub fail_user_lookup: bool,
    /// Every user insert fails with a storage error
    pub fail_user_create: bool,
    /// The n-th link attempt (0-based) inside a transaction fails
    pub fail_link_at: Option<usize>,
}

/// Tables of the in-memory store
#[derive(Debug, Clone, Default)]
pub struct InMemoryState {
    pub(crate) users: BTreeMap<i64, User>,
    pub(crate) companies: BTreeMap<i64, Company>,
    pub(crate) teams: BTreeMap<i64, Team>,
    /// (team id, user id) pairs
    pub(crate) members: BTreeSet<(i64, i64)>,
    pub(crate) surveys: BTreeMap<i64, Survey>,
    pub(crate) answers: BTreeMap<i64, Answer>,
    pub(crate) questions: Vec<SurveyQuestion>,
    pub(crate) options: Vec<SurveyOption>,
    last_user_id: i64,
    last_company_id: i64,
    last_team_id: i64,
    last_survey_id: i64,
    last_answer_id: i64,
    #[cfg(test)]
    pub(crate) faults: Faults,
}

impl InMemoryState {
    /// Empty tables plus the built-in question catalog
    pub(crate) fn seeded() -> Self {
        Self {
            questions: default_questions(),
            options: default_options(),
            ..Self::default()
        }
    }

    pub(crate) fn user_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        #[cfg(test)]
        if self.faults.fail_user_lookup {
            return Err(DomainError::storage("injected lookup failure"));
        }

        Ok(self.users.values().find(|u| u.email() == email).cloned())
    }

    pub(crate) fn insert_user(&mut self, new_user: NewUser) -> Result<User, DomainError> {
        #[cfg(test)]
        if self.faults.fail_user_create {
            return Err(DomainError::storage("injected create failure"));
        }

        if self.users.values().any(|u| u.email() == new_user.email) {
            return Err(DomainError::conflict(format!(
                "Email '{}' is already registered",
                new_user.email
            )));
        }

        self.last_user_id += 1;
        let id = UserId::new(self.last_user_id)
            .map_err(|e| DomainError::internal(e.to_string()))?;
        let user = User::from_new(id, new_user);
        self.users.insert(id.value(), user.clone());

        Ok(user)
    }

    pub(crate) fn next_company_id(&mut self) -> Result<CompanyId, DomainError> {
        self.last_company_id += 1;
        CompanyId::new(self.last_company_id)
    }

    pub(crate) fn next_team_id(&mut self) -> Result<TeamId, DomainError> {
        self.last_team_id += 1;
        TeamId::new(self.last_team_id).map_err(|e| DomainError::internal(e.to_string()))
    }

    pub(crate) fn next_survey_id(&mut self) -> Result<SurveyId, DomainError> {
        self.last_survey_id += 1;
        SurveyId::new(self.last_survey_id)
    }

    pub(crate) fn next_answer_id(&mut self) -> Result<AnswerId, DomainError> {
        self.last_answer_id += 1;
        AnswerId::new(self.last_answer_id)
    }

    /// Remove a team with its links, surveys and answers
    pub(crate) fn remove_team(&mut self, team: TeamId) -> bool {
        if self.teams.remove(&team.value()).is_none() {
            return false;
        }

        self.members.retain(|(team_id, _)| *team_id != team.value());

        let surveys: Vec<i64> = self
            .surveys
            .values()
            .filter(|s| s.team_id == team)
            .map(|s| s.id.value())
            .collect();
        for survey in surveys {
            self.remove_survey(survey);
        }

        true
    }

    pub(crate) fn remove_survey(&mut self, survey: i64) -> bool {
        if self.surveys.remove(&survey).is_none() {
            return false;
        }

        self.answers.retain(|_, a| a.survey_id.value() != survey);
        true
    }

    /// Remove a user with their links and answers
    ///
    /// Users that created companies, teams or surveys are kept and reported
    /// as a conflict.
    pub(crate) fn remove_user(&mut self, user: UserId) -> Result<bool, DomainError> {
        if !self.users.contains_key(&user.value()) {
            return Ok(false);
        }

        let owns_resources = self.companies.values().any(|c| c.created_by == user)
            || self.teams.values().any(|t| t.created_by() == user)
            || self.surveys.values().any(|s| s.created_by == user);

        if owns_resources {
            return Err(user_still_owns(user));
        }

        self.users.remove(&user.value());
        self.members.retain(|(_, user_id)| *user_id != user.value());
        self.answers.retain(|_, a| a.user_id != user);

        Ok(true)
    }

    pub(crate) fn link(&mut self, team: TeamId, user: UserId) -> Result<bool, DomainError> {
        if !self.teams.contains_key(&team.value()) {
            return Err(DomainError::not_found(format!("Team '{}' not found", team)));
        }

        if !self.users.contains_key(&user.value()) {
            return Err(DomainError::not_found(format!("User '{}' not found", user)));
        }

        Ok(self.members.insert((team.value(), user.value())))
    }
}

/// Conflict reported when deleting a user that still owns resources
pub(crate) fn user_still_owns(user: UserId) -> DomainError {
    DomainError::conflict(format!(
        "User '{}' still owns companies, teams or surveys",
        user
    ))
}

/// Shared handle to the in-memory tables
#[derive(Debug, Clone)]
pub struct InMemoryDatabase {
    state: Arc<Mutex<InMemoryState>>,
}

impl Default for InMemoryDatabase {
    fn default() -> Self {
        Self {
            state: Arc::new(Mutex::new(InMemoryState::seeded())),
        }
    }
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) async fn lock(&self) -> MutexGuard<'_, InMemoryState> {
        self.state.lock().await
    }

    /// Start a membership transaction
    pub async fn begin(&self) -> InMemoryTransaction {
        let guard = self.state.clone().lock_owned().await;
        let working = InMemoryState::clone(&guard);

        InMemoryTransaction {
            guard: Some(guard),
            working,
            link_attempts: 0,
        }
    }

    #[cfg(test)]
    pub async fn inject(&self, faults: Faults) {
        self.state.lock().await.faults = faults;
    }
}

/// Transaction over a private copy of the tables
pub struct InMemoryTransaction {
    guard: Option<OwnedMutexGuard<InMemoryState>>,
    working: InMemoryState,
    link_attempts: usize,
}

impl InMemoryTransaction {
    fn ensure_open(&self) -> Result<(), DomainError> {
        if self.guard.is_none() {
            return Err(DomainError::storage("Transaction already finished"));
        }

        Ok(())
    }
}

#[async_trait]
impl MembershipTransaction for InMemoryTransaction {
    async fn find_user_by_email(&mut self, email: &str) -> Result<Option<User>, DomainError> {
        self.ensure_open()?;
        self.working.user_by_email(email)
    }

    async fn create_user(&mut self, user: NewUser) -> Result<User, DomainError> {
        self.ensure_open()?;
        self.working.insert_user(user)
    }

    async fn link_user(&mut self, team: TeamId, user: UserId) -> Result<bool, DomainError> {
        self.ensure_open()?;

        #[cfg(test)]
        if self.working.faults.fail_link_at == Some(self.link_attempts) {
            return Err(DomainError::storage("injected link failure"));
        }

        self.link_attempts += 1;
        self.working.link(team, user)
    }

    async fn commit(&mut self) -> Result<(), DomainError> {
        let mut guard = self
            .guard
            .take()
            .ok_or_else(|| DomainError::storage("Transaction already finished"))?;

        *guard = std::mem::take(&mut self.working);
        Ok(())
    }

    async fn rollback(&mut self) -> Result<(), DomainError> {
        self.guard = None;
        Ok(())
    }
}
